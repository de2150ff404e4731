//! tx-sim: fixed-rate CNV live-feed simulator engine.
//!
//! The [`Simulator`] owns the mutable feed state (walking signals, counters,
//! mission track, output file) and drives a single background writer thread
//! at the configured interval. Administrative operations are thread-safe and
//! serialize against the writer tick through one shared lock.

pub mod config;
pub mod error;
pub mod simulator;
mod state;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use simulator::{RowObserver, Simulator, Status};
