//! Engine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use tx_codec::HeaderMeta;
use tx_core::GeoPoint;

/// Default output rate: 24 Hz, the deck-unit scan rate the feed emulates.
pub const DEFAULT_HZ: f64 = 24.0;

/// Construction-time options for [`crate::Simulator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Output CNV path.
    pub path: PathBuf,
    /// Seconds between rows.
    pub interval_s: f64,
    /// Random-walk seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Append to an existing file instead of starting fresh.
    pub append: bool,
    /// Cruise metadata for the header block.
    pub meta: HeaderMeta,
    /// Initial position (and mission start when a track is configured).
    pub start: GeoPoint,
    /// Mission end point; enables the track when set.
    pub end: Option<GeoPoint>,
    /// Track speed in knots.
    pub speed_knots: f64,
    /// Bounce at the track endpoints instead of stopping at the end.
    pub pingpong: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("triaxus_sim_001.cnv"),
            interval_s: 1.0 / DEFAULT_HZ,
            seed: None,
            append: false,
            meta: HeaderMeta::default(),
            start: GeoPoint::new(-35.57462, 154.30952),
            end: None,
            speed_knots: 6.0,
            pingpong: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_trackless_24hz() {
        let config = SimConfig::default();
        assert!(config.end.is_none());
        assert!((config.interval_s - 1.0 / 24.0).abs() < 1e-12);
        assert!(config.pingpong);
    }
}
