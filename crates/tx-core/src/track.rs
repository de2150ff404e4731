//! Straight-line mission track between two geographic points.
//!
//! The track advances position at constant speed along the line from start to
//! end. With ping-pong enabled it bounces at the endpoints; otherwise it
//! clamps at the end. Geometry uses an equirectangular local-plane
//! approximation with longitude scaled by the cosine of the midpoint
//! latitude, which is adequate for mission-scale spans.

use crate::geo::{GeoPoint, KNOT_TO_MPS, M_PER_DEG_LAT};

#[derive(Debug, Clone)]
pub struct MissionTrack {
    start: GeoPoint,
    end: GeoPoint,
    speed_mps: f64,
    pingpong: bool,
    dlat_deg: f64,
    dlon_deg: f64,
    length_m: f64,
    deg_lat_per_m: f64,
    deg_lon_per_m: f64,
    /// Distance progressed from start along the line, in meters.
    s_m: f64,
    /// Direction of travel: +1.0 toward end, -1.0 toward start.
    dir: f64,
}

impl MissionTrack {
    pub fn new(start: GeoPoint, end: GeoPoint, speed_knots: f64, pingpong: bool) -> Self {
        let dlat_deg = end.lat - start.lat;
        let dlon_deg = end.lon - start.lon;
        let mid_lat_rad = (start.lat + end.lat) / 2.0 * std::f64::consts::PI / 180.0;
        let m_per_deg_lon = M_PER_DEG_LAT * mid_lat_rad.cos().abs().max(1e-6);
        let dlat_m = dlat_deg * M_PER_DEG_LAT;
        let dlon_m = dlon_deg * m_per_deg_lon;
        let length_m = dlat_m.hypot(dlon_m);
        let (deg_lat_per_m, deg_lon_per_m) = if length_m > 0.0 {
            (dlat_deg / length_m, dlon_deg / length_m)
        } else {
            (0.0, 0.0)
        };
        Self {
            start,
            end,
            speed_mps: speed_knots.max(0.0) * KNOT_TO_MPS,
            pingpong,
            dlat_deg,
            dlon_deg,
            length_m,
            deg_lat_per_m,
            deg_lon_per_m,
            s_m: 0.0,
            dir: 1.0,
        }
    }

    /// Update speed in place; progress and direction are untouched.
    pub fn set_speed(&mut self, knots: f64) {
        self.speed_mps = knots.max(0.0) * KNOT_TO_MPS;
    }

    pub fn speed_knots(&self) -> f64 {
        self.speed_mps / KNOT_TO_MPS
    }

    pub fn pingpong(&self) -> bool {
        self.pingpong
    }

    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    pub fn progress_m(&self) -> f64 {
        self.s_m
    }

    pub fn direction(&self) -> f64 {
        self.dir
    }

    /// Align the along-track distance to the provided point.
    ///
    /// Projects the start-to-point vector onto the track direction and clamps
    /// the resulting fraction to `[0, 1]`. Used to continue smoothly from a
    /// previously known position instead of teleporting back to start.
    pub fn reset_position(&mut self, lat: f64, lon: f64) {
        let denom = self.dlat_deg * self.dlat_deg + self.dlon_deg * self.dlon_deg;
        if self.length_m <= 0.0 || denom <= 0.0 {
            self.s_m = 0.0;
            return;
        }
        let dv_lat = lat - self.start.lat;
        let dv_lon = lon - self.start.lon;
        let t = ((dv_lat * self.dlat_deg + dv_lon * self.dlon_deg) / denom).clamp(0.0, 1.0);
        self.s_m = t * self.length_m;
    }

    /// Advance by `dt` seconds and return the new position.
    pub fn step(&mut self, dt: f64) -> GeoPoint {
        if self.length_m <= 0.0 {
            // Degenerate: stay at end
            return self.end;
        }

        self.s_m += self.speed_mps * dt.max(0.0) * self.dir;
        if self.pingpong {
            if self.s_m < 0.0 || self.s_m > self.length_m {
                // Fold onto the triangle wave of period 2*length. A folded
                // position in the back half means the direction reversed.
                let period = 2.0 * self.length_m;
                let folded = self.s_m.rem_euclid(period);
                if folded <= self.length_m {
                    self.s_m = folded;
                } else {
                    self.s_m = period - folded;
                    self.dir = -self.dir;
                }
            }
        } else {
            self.s_m = self.s_m.clamp(0.0, self.length_m);
        }

        GeoPoint {
            lat: self.start.lat + self.deg_lat_per_m * self.s_m,
            lon: self.start.lon + self.deg_lon_per_m * self.s_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf_track(pingpong: bool) -> MissionTrack {
        MissionTrack::new(
            GeoPoint::new(-31.95, 115.86),
            GeoPoint::new(-32.06, 115.74),
            6.0,
            pingpong,
        )
    }

    #[test]
    fn step_moves_toward_end() {
        let mut track = shelf_track(false);
        let p = track.step(60.0);
        assert!(p.lat < -31.95 && p.lat > -32.06);
        assert!(p.lon < 115.86 && p.lon > 115.74);
        assert!(track.progress_m() > 0.0);
    }

    #[test]
    fn clamps_at_end_without_pingpong() {
        let mut track = shelf_track(false);
        // Far longer than the track takes to traverse at 6 knots.
        let p = track.step(1e7);
        assert!((p.lat - -32.06).abs() < 1e-9);
        assert!((p.lon - 115.74).abs() < 1e-9);
        assert_eq!(track.progress_m(), track.length_m());
        assert_eq!(track.direction(), 1.0);
    }

    #[test]
    fn pingpong_reflects_and_flips_direction() {
        let mut track = shelf_track(true);
        let length = track.length_m();
        // Overshoot the end by a quarter length.
        let dt = (length * 1.25) / (6.0 * KNOT_TO_MPS);
        track.step(dt);
        assert_eq!(track.direction(), -1.0);
        let expected = length * 0.75;
        assert!((track.progress_m() - expected).abs() < 1.0);
    }

    #[test]
    fn pingpong_progress_stays_in_bounds_over_many_bounces() {
        let mut track = MissionTrack::new(
            GeoPoint::new(-31.95000, 115.86000),
            GeoPoint::new(-31.95005, 115.86005),
            6.0,
            true,
        );
        for _ in 0..500 {
            let p = track.step(1.0 / 60.0);
            assert!(track.progress_m() >= 0.0);
            assert!(track.progress_m() <= track.length_m());
            assert!(p.lat.is_finite() && p.lon.is_finite());
        }
    }

    #[test]
    fn zero_length_track_reports_end() {
        let point = GeoPoint::new(-35.0, 154.0);
        let mut track = MissionTrack::new(point, point, 6.0, true);
        assert_eq!(track.length_m(), 0.0);
        for _ in 0..10 {
            let p = track.step(1.0);
            assert_eq!(p, point);
        }
    }

    #[test]
    fn reset_position_projects_onto_track() {
        let mut track = shelf_track(true);
        let mid = GeoPoint::new((-31.95 + -32.06) / 2.0, (115.86 + 115.74) / 2.0);
        track.reset_position(mid.lat, mid.lon);
        let expected = track.length_m() / 2.0;
        assert!((track.progress_m() - expected).abs() < track.length_m() * 1e-6);
    }

    #[test]
    fn reset_position_clamps_off_track_points() {
        let mut track = shelf_track(true);
        // Behind the start: fraction clamps to zero.
        track.reset_position(-31.80, 115.99);
        assert_eq!(track.progress_m(), 0.0);
        // Beyond the end: fraction clamps to one.
        track.reset_position(-32.20, 115.60);
        assert_eq!(track.progress_m(), track.length_m());
    }

    #[test]
    fn set_speed_preserves_progress_and_direction() {
        let mut track = shelf_track(true);
        track.step(120.0);
        let s = track.progress_m();
        let dir = track.direction();
        track.set_speed(12.0);
        assert_eq!(track.progress_m(), s);
        assert_eq!(track.direction(), dir);
        assert!((track.speed_knots() - 12.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn progress_stays_within_track(
            steps in prop::collection::vec(0.0_f64..30.0, 1..200),
            speed in 0.1_f64..20.0,
            pingpong in any::<bool>(),
        ) {
            let mut track = MissionTrack::new(
                GeoPoint::new(-31.95, 115.86),
                GeoPoint::new(-31.96, 115.85),
                speed,
                pingpong,
            );
            for dt in steps {
                track.step(dt);
                prop_assert!(track.progress_m() >= 0.0);
                prop_assert!(track.progress_m() <= track.length_m());
                prop_assert!(track.direction() == 1.0 || track.direction() == -1.0);
            }
        }
    }
}
