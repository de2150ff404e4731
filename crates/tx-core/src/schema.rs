//! CNV channel schema.
//!
//! The 17 variables of the emulated Seasave output, in column order. The
//! declared spans serve two purposes: they are printed in the header's
//! `# span` lines, and they bound the random walk for the 11 live signal
//! channels. Scan count, elapsed time, pump status, position and the quality
//! flag are maintained by the engine rather than walked.

use serde::{Deserialize, Serialize};

/// Total number of columns in a data row.
pub const CHANNEL_COUNT: usize = 17;

/// The leading channels driven by the bounded random walk.
pub const WALK_CHANNEL_COUNT: usize = 11;

/// Sentinel used by Sea-Bird tools to mark missing/bad data. Printed in the
/// header; never emitted by the simulator itself.
pub const BAD_FLAG: f64 = -9.990e-29;

/// Sigma (degrees per tick) for the trackless lat/lon drift walk.
pub const DRIFT_SIGMA_DEG: f64 = 0.00005;

/// One CNV variable: header label, declared span and walk step size.
#[derive(Debug, Clone, Copy)]
pub struct Channel {
    /// Full descriptive label as printed in `# name` header lines.
    pub name: &'static str,
    /// Declared `[min, max]` span.
    pub span: (f64, f64),
    /// Gaussian step sigma; zero for channels the engine maintains directly.
    pub sigma: f64,
}

impl Channel {
    /// Short key, the label part before the first `:`.
    pub fn key(&self) -> &'static str {
        self.name.split(':').next().unwrap_or(self.name)
    }

    /// Midpoint of the declared span, used to seed fresh walks.
    pub fn midpoint(&self) -> f64 {
        (self.span.0 + self.span.1) / 2.0
    }
}

/// Column indices, matching the declared channel order.
pub mod col {
    pub const T090C: usize = 0;
    pub const C0: usize = 1;
    pub const PRESSURE: usize = 2;
    pub const T190C: usize = 3;
    pub const C1: usize = 4;
    pub const OXYGEN0: usize = 5;
    pub const OXYGEN1: usize = 6;
    pub const PAR: usize = 7;
    pub const CSTAR: usize = 8;
    pub const SAL00: usize = 9;
    pub const SAL11: usize = 10;
    pub const SCAN: usize = 11;
    pub const TIME_S: usize = 12;
    pub const PUMPS: usize = 13;
    pub const LATITUDE: usize = 14;
    pub const LONGITUDE: usize = 15;
    pub const FLAG: usize = 16;
}

/// The channel table. Spans mirror a reference deployment off the east
/// Australian shelf; sigmas are tuned for visually smooth traces at 24 Hz.
pub const CHANNELS: [Channel; CHANNEL_COUNT] = [
    Channel {
        name: "t090C: Temperature [ITS-90, deg C]",
        span: (12.3276, 21.6890),
        sigma: 0.003,
    },
    Channel {
        name: "c0S/m: Conductivity [S/m]",
        span: (4.055418, 5.027629),
        sigma: 0.0002,
    },
    Channel {
        name: "prDM: Pressure, Digiquartz [db]",
        span: (1.956, 292.795),
        sigma: 0.15,
    },
    Channel {
        name: "t190C: Temperature, 2 [ITS-90, deg C]",
        span: (12.3361, 21.6988),
        sigma: 0.003,
    },
    Channel {
        name: "c1S/m: Conductivity, 2 [S/m]",
        span: (4.055566, 5.027419),
        sigma: 0.0002,
    },
    Channel {
        name: "sbeox0Mm/L: Oxygen, SBE 43 [umol/l]",
        span: (172.359, 253.438),
        sigma: 0.20,
    },
    Channel {
        name: "sbeox1Mm/L: Oxygen, SBE 43, 2 [umol/l]",
        span: (168.476, 247.188),
        sigma: 0.20,
    },
    Channel {
        name: "par: PAR/Irradiance, Biospherical/Licor [umol photons/m^2/sec]",
        span: (1.0e-12, 3.2782e-05),
        sigma: (3.2782e-05 - 1.0e-12) * 0.05,
    },
    Channel {
        name: "CStarTr0: Beam Transmission, WET Labs C-Star [%]",
        span: (84.6324, 98.2135),
        sigma: 0.10,
    },
    Channel {
        name: "sal00: Salinity, Practical [PSU]",
        span: (35.0889, 35.8769),
        sigma: 0.001,
    },
    Channel {
        name: "sal11: Salinity, Practical, 2 [PSU]",
        span: (35.0814, 35.8393),
        sigma: 0.001,
    },
    Channel {
        name: "scan: Scan Count",
        span: (1.0, 304611.0),
        sigma: 0.0,
    },
    Channel {
        name: "timeS: Time, Elapsed [seconds]",
        span: (0.0, 12692.083),
        sigma: 0.0,
    },
    Channel {
        name: "pumps: Pump Status",
        span: (1.0, 1.0),
        sigma: 0.0,
    },
    Channel {
        name: "latitude: Latitude [deg]",
        span: (-35.57462, -35.20616),
        sigma: 0.0,
    },
    Channel {
        name: "longitude: Longitude [deg]",
        span: (154.30952, 154.33126),
        sigma: 0.0,
    },
    Channel {
        name: "flag: 0.000e+00",
        span: (0.0, 0.0),
        sigma: 0.0,
    },
];

/// Case-insensitive lookup of a column index by channel key.
pub fn channel_index(key: &str) -> Option<usize> {
    CHANNELS
        .iter()
        .position(|ch| ch.key().eq_ignore_ascii_case(key))
}

/// One scan: the 17 channel values in declared column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanRow(pub [f64; CHANNEL_COUNT]);

impl ScanRow {
    pub fn scan(&self) -> u64 {
        self.0[col::SCAN] as u64
    }

    pub fn elapsed_s(&self) -> f64 {
        self.0[col::TIME_S]
    }

    pub fn pumps(&self) -> i64 {
        self.0[col::PUMPS] as i64
    }

    pub fn lat(&self) -> f64 {
        self.0[col::LATITUDE]
    }

    pub fn lon(&self) -> f64 {
        self.0[col::LONGITUDE]
    }
}
