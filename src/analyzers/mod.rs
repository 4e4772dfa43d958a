//! Call-log classification, aggregation and ranking.
//!
//! Raw entries are classified against the contact index, folded into
//! per-partition accumulators, then finalized into sorted snapshots.

pub mod aggregate;
pub mod classify;
pub mod rank;
pub mod types;
