#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Learning-and-prediction engine for recurring catalogue snapshots.
//!
//! Raw snapshot lines are normalized into item keys, the keys bump weights in
//! a persisted per-category frequency table, and the next snapshot is guessed
//! by weighted sampling without replacement over the learned weights.

pub mod backend;
pub mod engine;
mod error;
pub mod learning;
pub mod normalize;
pub mod predictor;
pub mod snapshot;
pub mod store;

pub use backend::{JsonFileBackend, MemoryBackend, StateBackend};
pub use engine::EngineConfig;
pub use error::{Error, Result};
pub use normalize::normalize_item;
pub use predictor::sample_without_replacement;
pub use snapshot::{CategoryForecast, Forecast, Snapshot, SnapshotHandler};
pub use store::{FrequencyStore, FrequencyTable, display_name};
