//! End-to-end tests driving the engine against real files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tx_core::GeoPoint;
use tx_sim::{SimConfig, Simulator};

const INTERVAL: f64 = 1.0 / 60.0;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tx_sim_{}_{}.cnv", std::process::id(), name))
}

fn shelf_config(path: &Path) -> SimConfig {
    SimConfig {
        path: path.to_path_buf(),
        interval_s: INTERVAL,
        seed: Some(123),
        start: GeoPoint::new(-31.95, 115.86),
        end: Some(GeoPoint::new(-32.06, 115.74)),
        speed_knots: 6.0,
        pingpong: true,
        ..SimConfig::default()
    }
}

fn data_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .filter(|l| !l.trim().is_empty() && !l.starts_with('*') && !l.starts_with('#'))
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn run_until_rows(sim: &mut Simulator, path: &Path, target: usize) {
    sim.start().unwrap();
    let deadline = Instant::now() + Duration::from_secs(30);
    while Instant::now() < deadline && data_lines(path).len() < target {
        std::thread::sleep(Duration::from_millis(20));
    }
    sim.stop().unwrap();
    assert!(
        data_lines(path).len() >= target,
        "only {} rows before deadline",
        data_lines(path).len()
    );
}

fn parse_cols(line: &str) -> (u64, f64, f64, f64, usize) {
    let fields: Vec<&str> = line.split_whitespace().collect();
    (
        fields[11].parse().unwrap(),
        fields[12].parse().unwrap(),
        fields[14].parse().unwrap(),
        fields[15].parse().unwrap(),
        fields.len(),
    )
}

#[test]
fn seeded_scenario_produces_well_formed_rows() {
    let path = scratch_path("basic");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    run_until_rows(&mut sim, &path, 80);

    let lines = data_lines(&path);
    let mut prev_scan = 0u64;
    let mut prev_time = -1.0f64;
    for line in &lines {
        let (scan, time_s, lat, lon, field_count) = parse_cols(line);
        assert_eq!(field_count, 17, "row with {field_count} fields");
        assert_eq!(scan, prev_scan + 1, "scan must increase by one");
        assert!(time_s >= prev_time, "timeS must be non-decreasing");
        assert!((-90.0..=90.0).contains(&lat), "latitude out of bounds");
        assert!((-180.0..=180.0).contains(&lon), "longitude out of bounds");
        prev_scan = scan;
        prev_time = time_s;
    }
    fs::remove_file(&path).unwrap();
}

#[test]
fn header_precedes_data_and_declares_schema() {
    let path = scratch_path("header");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    run_until_rows(&mut sim, &path, 5);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("# nquan = 17"));
    let end_pos = content.find("*END*").expect("missing end marker");
    let first_data = content
        .lines()
        .position(|l| !l.trim().is_empty() && !l.starts_with('*') && !l.starts_with('#'))
        .unwrap();
    let end_line = content[..end_pos].lines().count();
    assert!(end_line < first_data, "data rows must follow *END*");
    fs::remove_file(&path).unwrap();
}

#[test]
fn pingpong_reverses_direction_on_short_track() {
    let path = scratch_path("pingpong");
    let mut config = shelf_config(&path);
    // Very short track so the endpoint is hit and bounced quickly.
    config.start = GeoPoint::new(-31.95000, 115.86000);
    config.end = Some(GeoPoint::new(-31.95005, 115.86005));
    let mut sim = Simulator::new(config).unwrap();
    run_until_rows(&mut sim, &path, 160);

    let lines = data_lines(&path);
    let latlon = |line: &String| {
        let (_, _, lat, lon, _) = parse_cols(line);
        (lat, lon)
    };
    let head: Vec<(f64, f64)> = lines.iter().take(5).map(latlon).collect();
    let tail: Vec<(f64, f64)> = lines.iter().rev().take(5).rev().map(latlon).collect();

    let d_start = (
        head[head.len() - 1].0 - head[0].0,
        head[head.len() - 1].1 - head[0].1,
    );
    let d_end = (
        tail[tail.len() - 1].0 - tail[0].0,
        tail[tail.len() - 1].1 - tail[0].1,
    );
    let dot = d_start.0 * d_end.0 + d_start.1 * d_end.1;
    assert!(dot <= 0.0, "expected direction reversal, dot={dot}");
    fs::remove_file(&path).unwrap();
}

#[test]
fn append_mode_continues_scan_and_time() {
    let path = scratch_path("append");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    run_until_rows(&mut sim, &path, 20);
    let first_run = data_lines(&path);
    let (last_scan, last_time, _, _, _) = parse_cols(first_run.last().unwrap());
    drop(sim);

    let mut config = shelf_config(&path);
    config.append = true;
    let mut resumed = Simulator::new(config).unwrap();
    run_until_rows(&mut resumed, &path, first_run.len() + 10);

    let all = data_lines(&path);
    let (next_scan, next_time, _, _, _) = parse_cols(&all[first_run.len()]);
    assert_eq!(next_scan, last_scan + 1, "scan must continue");
    assert!(
        (next_time - (last_time + INTERVAL)).abs() < 2e-3,
        "timeS must continue: {last_time} -> {next_time}"
    );
    fs::remove_file(&path).unwrap();
}

#[test]
fn append_to_missing_file_starts_fresh() {
    let path = scratch_path("append_missing");
    let _ = fs::remove_file(&path);
    let mut config = shelf_config(&path);
    config.append = true;
    let mut sim = Simulator::new(config).unwrap();
    run_until_rows(&mut sim, &path, 3);

    let (scan, _, _, _, _) = parse_cols(&data_lines(&path)[0]);
    assert_eq!(scan, 1);
    fs::remove_file(&path).unwrap();
}

#[test]
fn clear_then_resume_restarts_scan_numbers() {
    let path = scratch_path("clear");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    sim.start().unwrap();
    let deadline = Instant::now() + Duration::from_secs(30);
    while Instant::now() < deadline && data_lines(&path).len() < 20 {
        std::thread::sleep(Duration::from_millis(20));
    }

    sim.clear_current_file().unwrap();
    // An already in-flight tick may add a single row; anything more means
    // the writer kept running.
    assert!(data_lines(&path).len() <= 1, "writer kept running after clear");
    assert!(!sim.status().running, "clear leaves the engine paused");

    sim.resume();
    while Instant::now() < deadline && data_lines(&path).len() < 5 {
        std::thread::sleep(Duration::from_millis(20));
    }
    sim.stop().unwrap();

    let lines = data_lines(&path);
    assert!(lines.len() >= 5, "no rows after resume");
    let (scan, _, _, _, _) = parse_cols(&lines[0]);
    assert_eq!(scan, 1, "first row after clear must restart at scan 1");
    fs::remove_file(&path).unwrap();
}

#[test]
fn pause_suppresses_row_generation() {
    let path = scratch_path("pause");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    sim.start().unwrap();
    let deadline = Instant::now() + Duration::from_secs(30);
    while Instant::now() < deadline && data_lines(&path).len() < 10 {
        std::thread::sleep(Duration::from_millis(20));
    }

    sim.pause();
    // Allow an in-flight tick to settle before sampling the count.
    std::thread::sleep(Duration::from_millis(100));
    let frozen = data_lines(&path).len();
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(data_lines(&path).len(), frozen, "rows written while paused");

    sim.resume();
    while Instant::now() < deadline && data_lines(&path).len() <= frozen {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(data_lines(&path).len() > frozen, "no rows after resume");
    sim.stop().unwrap();
    fs::remove_file(&path).unwrap();
}

#[test]
fn observer_sees_rows_and_panics_are_contained() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    let path = scratch_path("observer");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    let seen = Arc::new(AtomicU64::new(0));
    let seen_in_cb = Arc::clone(&seen);
    sim.set_row_observer(move |row| {
        seen_in_cb.store(row.scan(), Ordering::Relaxed);
        if row.scan() == 3 {
            panic!("misbehaving observer");
        }
    });
    run_until_rows(&mut sim, &path, 10);

    assert!(seen.load(Ordering::Relaxed) >= 10, "observer missed rows");
    assert!(
        data_lines(&path).len() >= 10,
        "a panicking observer must not halt the feed"
    );
    fs::remove_file(&path).unwrap();
}

#[test]
fn update_track_reroutes_without_restarting_counters() {
    let path = scratch_path("reroute");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    sim.start().unwrap();
    let deadline = Instant::now() + Duration::from_secs(30);
    while Instant::now() < deadline && data_lines(&path).len() < 10 {
        std::thread::sleep(Duration::from_millis(20));
    }
    sim.pause();
    std::thread::sleep(Duration::from_millis(100));
    let before = data_lines(&path).len();
    assert!(before >= 10);

    let new_start = GeoPoint::new(-31.90, 115.90);
    let new_end = GeoPoint::new(-31.80, 116.00);
    sim.update_track(new_start, new_end, Some(40.0), None)
        .unwrap();

    // The position jumps to the new start immediately.
    let status = sim.status();
    assert_eq!(status.position.lat, new_start.lat);
    assert_eq!(status.position.lon, new_start.lon);

    sim.resume();
    while Instant::now() < deadline && data_lines(&path).len() < before + 10 {
        std::thread::sleep(Duration::from_millis(20));
    }
    sim.pause();
    std::thread::sleep(Duration::from_millis(100));
    let after = sim.status();
    sim.stop().unwrap();

    let lines = data_lines(&path);
    let (scan_last_old, _, _, _, _) = parse_cols(&lines[before - 1]);
    let (scan_first_new, _, lat_first, lon_first, _) = parse_cols(&lines[before]);
    assert_eq!(
        scan_first_new,
        scan_last_old + 1,
        "reroute must not reset counters"
    );
    // One tick at 40 knots moves well under the printed resolution, so the
    // first rerouted row sits at the new start.
    assert!((lat_first - new_start.lat).abs() < 1e-4);
    assert!((lon_first - new_start.lon).abs() < 1e-4);

    // Subsequent motion heads from the new start toward the new end.
    let heading = (after.position.lat - new_start.lat) * (new_end.lat - new_start.lat)
        + (after.position.lon - new_start.lon) * (new_end.lon - new_start.lon);
    assert!(heading > 0.0, "motion must follow the new track");
    fs::remove_file(&path).unwrap();
}

#[test]
fn set_track_speed_scales_motion_in_place() {
    let path = scratch_path("speed");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    sim.start().unwrap();
    let deadline = Instant::now() + Duration::from_secs(30);

    // Phase boundaries are sampled from status snapshots: file rows only
    // carry five decimals, too coarse for per-tick motion at these speeds.
    let settle = |sim: &Simulator| {
        sim.pause();
        std::thread::sleep(Duration::from_millis(100));
        sim.status()
    };
    let wait_rows = |sim: &Simulator, target: u64| {
        sim.resume();
        while Instant::now() < deadline && sim.status().scans_written < target {
            std::thread::sleep(Duration::from_millis(20));
        }
    };
    let dist = |a: GeoPoint, b: GeoPoint| (b.lat - a.lat).hypot(b.lon - a.lon);

    wait_rows(&sim, 5);
    let first = settle(&sim);
    wait_rows(&sim, first.scans_written + 10);
    let second = settle(&sim);
    let per_row_slow = dist(first.position, second.position)
        / (second.scans_written - first.scans_written) as f64;

    sim.set_track_speed(24.0).unwrap();
    wait_rows(&sim, second.scans_written + 10);
    let third = settle(&sim);
    let per_row_fast = dist(second.position, third.position)
        / (third.scans_written - second.scans_written) as f64;
    sim.stop().unwrap();

    // 6 -> 24 knots quadruples the per-row displacement.
    let ratio = per_row_fast / per_row_slow;
    assert!(
        (3.5..=4.5).contains(&ratio),
        "expected ~4x per-row motion, got {ratio}"
    );

    // Progress and direction are preserved: still moving away from start.
    let slow_leg = (second.position.lat - first.position.lat,
        second.position.lon - first.position.lon);
    let fast_leg = (third.position.lat - second.position.lat,
        third.position.lon - second.position.lon);
    let dot = slow_leg.0 * fast_leg.0 + slow_leg.1 * fast_leg.1;
    assert!(dot > 0.0, "speed change must not reverse or reset the track");
    fs::remove_file(&path).unwrap();
}

#[test]
fn stop_is_final() {
    let path = scratch_path("final");
    let mut sim = Simulator::new(shelf_config(&path)).unwrap();
    sim.start().unwrap();
    sim.stop().unwrap();
    assert!(sim.start().is_err(), "stopped engine must not restart");
    fs::remove_file(&path).unwrap();
}

#[test]
fn switch_to_new_file_writes_fresh_header() {
    let first = scratch_path("switch_a");
    let second = scratch_path("switch_b");
    let mut sim = Simulator::new(shelf_config(&first)).unwrap();
    run_until_rows(&mut sim, &first, 5);

    sim.switch_to_new_file(&second).unwrap();
    let content = fs::read_to_string(&second).unwrap();
    assert!(content.contains("*END*"));
    assert_eq!(sim.status().scans_written, 0);
    fs::remove_file(&first).unwrap();
    fs::remove_file(&second).unwrap();
}
