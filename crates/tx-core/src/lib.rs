//! tx-core: stable foundation for the TRIAXUS live-feed simulator.
//!
//! Contains:
//! - schema (CNV channel names, spans, walk sigmas, bad-value sentinel)
//! - geo (coordinate primitives + unit conversions)
//! - walk (seedable bounded Gaussian random walk)
//! - track (straight-line mission track navigator)
//! - error (shared error types)

pub mod error;
pub mod geo;
pub mod schema;
pub mod track;
pub mod walk;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TxError, TxResult};
pub use geo::*;
pub use schema::{BAD_FLAG, CHANNEL_COUNT, CHANNELS, Channel, ScanRow, WALK_CHANNEL_COUNT};
pub use track::MissionTrack;
pub use walk::RandomWalk;
