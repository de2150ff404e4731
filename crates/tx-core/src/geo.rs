//! Geographic primitives shared by the track navigator and the engine.

use serde::{Deserialize, Serialize};

use crate::error::{TxError, TxResult};

/// Conversion factor from knots to meters per second.
pub const KNOT_TO_MPS: f64 = 0.514444;

/// Meters per degree of latitude (spherical-earth average).
pub const M_PER_DEG_LAT: f64 = 111_320.0;

/// A coordinate in decimal degrees, positive north/east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validate that both components are finite and within physical ranges.
    pub fn validated(self) -> TxResult<Self> {
        if !self.lat.is_finite() {
            return Err(TxError::NonFinite {
                what: "latitude",
                value: self.lat,
            });
        }
        if !self.lon.is_finite() {
            return Err(TxError::NonFinite {
                what: "longitude",
                value: self.lon,
            });
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(TxError::CoordinateRange {
                what: "latitude",
                value: self.lat,
            });
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(TxError::CoordinateRange {
                what: "longitude",
                value: self.lon,
            });
        }
        Ok(self)
    }
}
