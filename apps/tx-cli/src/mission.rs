//! Optional YAML mission file.
//!
//! All fields are optional; command-line flags take precedence over whatever
//! the file provides.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use tx_core::GeoPoint;

#[derive(Error, Debug)]
pub enum MissionError {
    #[error("Cannot read mission file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid mission YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid mission: {what}")]
    Invalid { what: &'static str },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissionFile {
    pub start: Option<GeoPoint>,
    pub end: Option<GeoPoint>,
    pub speed_knots: Option<f64>,
    pub pingpong: Option<bool>,
    pub hz: Option<f64>,
    pub seed: Option<u64>,
    pub operator: Option<String>,
    pub ship: Option<String>,
    pub cruise: Option<String>,
    pub station: Option<String>,
}

pub fn load(path: &Path) -> Result<MissionFile, MissionError> {
    let text = std::fs::read_to_string(path)?;
    let mission: MissionFile = serde_yaml::from_str(&text)?;
    validate(&mission)?;
    Ok(mission)
}

fn validate(mission: &MissionFile) -> Result<(), MissionError> {
    for point in [mission.start, mission.end].into_iter().flatten() {
        point.validated().map_err(|_| MissionError::Invalid {
            what: "coordinate out of range",
        })?;
    }
    if let Some(speed) = mission.speed_knots {
        if !speed.is_finite() || speed < 0.0 {
            return Err(MissionError::Invalid {
                what: "speed_knots must be non-negative",
            });
        }
    }
    if let Some(hz) = mission.hz {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(MissionError::Invalid {
                what: "hz must be positive",
            });
        }
    }
    Ok(())
}
