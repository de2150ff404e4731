//! Mutable feed state and per-tick row generation.

use tx_core::schema::{
    CHANNEL_COUNT, CHANNELS, DRIFT_SIGMA_DEG, ScanRow, WALK_CHANNEL_COUNT, col,
};
use tx_core::{GeoPoint, MissionTrack, RandomWalk};

/// The values the engine carries from tick to tick.
#[derive(Debug, Clone)]
pub(crate) struct FeedState {
    pub scan: u64,
    pub time_s: f64,
    pub pumps: i64,
    pub lat: f64,
    pub lon: f64,
    /// The 11 walking signal channels, in column order.
    pub signals: [f64; WALK_CHANNEL_COUNT],
}

impl FeedState {
    /// Fresh state: counters reset, signals seeded at span midpoints.
    pub fn fresh(start: GeoPoint) -> Self {
        let mut signals = [0.0; WALK_CHANNEL_COUNT];
        for (slot, channel) in signals.iter_mut().zip(CHANNELS.iter()) {
            *slot = channel.midpoint();
        }
        Self {
            scan: 1,
            time_s: 0.0,
            pumps: 1,
            lat: start.lat,
            lon: start.lon,
            signals,
        }
    }

    /// Continue from the last row of an existing file: next scan, next time
    /// slot, and walks picking up from the previously written values.
    pub fn resume_from(row: &ScanRow, interval_s: f64) -> Self {
        let mut signals = [0.0; WALK_CHANNEL_COUNT];
        signals.copy_from_slice(&row.0[..WALK_CHANNEL_COUNT]);
        Self {
            scan: row.scan() + 1,
            time_s: row.elapsed_s() + interval_s,
            pumps: row.pumps(),
            lat: row.lat(),
            lon: row.lon(),
            signals,
        }
    }

    /// Generate the next scan and advance the counters.
    pub fn next_row(
        &mut self,
        walk: &mut RandomWalk,
        track: Option<&mut MissionTrack>,
        interval_s: f64,
    ) -> ScanRow {
        for (i, slot) in self.signals.iter_mut().enumerate() {
            let channel = &CHANNELS[i];
            if i == col::PAR {
                if let Some(floor) = walk.par_floor() {
                    *slot = floor;
                    continue;
                }
            }
            *slot = walk.step(*slot, channel.span.0, channel.span.1, channel.sigma);
        }

        // Position: follow the mission track if set, else drift slowly within
        // physical coordinate ranges.
        match track {
            Some(track) => {
                let p = track.step(interval_s);
                self.lat = p.lat;
                self.lon = p.lon;
            }
            None => {
                self.lat = walk.step(self.lat, -90.0, 90.0, DRIFT_SIGMA_DEG);
                self.lon = walk.step(self.lon, -180.0, 180.0, DRIFT_SIGMA_DEG);
            }
        }

        let mut values = [0.0; CHANNEL_COUNT];
        values[..WALK_CHANNEL_COUNT].copy_from_slice(&self.signals);
        values[col::SCAN] = self.scan as f64;
        values[col::TIME_S] = self.time_s;
        values[col::PUMPS] = self.pumps as f64;
        values[col::LATITUDE] = self.lat;
        values[col::LONGITUDE] = self.lon;
        values[col::FLAG] = 0.0;

        self.scan += 1;
        self.time_s += interval_s;
        ScanRow(values)
    }
}
