use serde::Serialize;

use crate::analyzers::types::CounterpartyRecord;

pub const HOURS_PER_DAY: usize = 24;

/// Partition-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total: u64,
    pub duration: u64,
    pub missed: u64,
}

impl SummaryStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CounterpartyRecord>) -> Self {
        let mut s = SummaryStats::default();

        for r in records {
            s.total = s.total.saturating_add(r.count);
            s.duration = s.duration.saturating_add(r.duration);
            s.missed = s.missed.saturating_add(r.missed);
        }

        s
    }

    pub fn pct(part: u64, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn missed_pct(&self) -> f64 {
        Self::pct(self.missed, self.total)
    }

    /// Mean seconds per call, 0 for an empty partition.
    pub fn average_duration(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.duration as f64 / self.total as f64
        }
    }
}

/// Call counts per local hour of day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HourlyHistogram([u64; HOURS_PER_DAY]);

impl HourlyHistogram {
    /// Counts one call in `hour`; hours past 23 are ignored.
    pub fn record(&mut self, hour: u8) {
        if let Some(slot) = self.0.get_mut(usize::from(hour)) {
            *slot = slot.saturating_add(1);
        }
    }

    pub fn get(&self, hour: usize) -> u64 {
        self.0.get(hour).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[u64; HOURS_PER_DAY] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().fold(0, |acc, &c| acc.saturating_add(c))
    }

    /// Busiest hour, earliest on ties; `None` when nothing was recorded.
    pub fn peak_hour(&self) -> Option<usize> {
        let max = *self.0.iter().max()?;
        if max == 0 {
            return None;
        }
        self.0.iter().position(|&c| c == max)
    }
}

impl std::ops::Index<usize> for HourlyHistogram {
    type Output = u64;

    fn index(&self, hour: usize) -> &u64 {
        &self.0[hour]
    }
}
