//! Local skin-condition history for SkinMe.
//!
//! Two independent, capped record lists persisted through a key-value store,
//! with a change notification other components can subscribe to.

pub mod error;
pub mod kv;
pub mod record;
pub mod store;

pub use error::HistoryError;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use record::{AnalysisSummary, SkinConditionRecord, WeatherSnapshot};
pub use store::{HistoryEvent, HistoryList, HistoryStore};
