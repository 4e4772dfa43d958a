pub mod analyzers;
pub mod config;
pub mod contacts;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod snapshot;
pub mod sources;
pub mod stats;

pub use analyzers::classify::HourZone;
pub use analyzers::rank::Ranking;
pub use analyzers::types::{CallType, CounterpartyRecord, Partition, RawCallEntry};
pub use contacts::{ContactIndex, RawContact};
pub use error::{Error, Result};
pub use snapshot::{
    AnalyticsSnapshot, PartitionSnapshot, PublishedSnapshot, SnapshotStore, build_snapshot,
};
