//! The simulator engine: file management, writer loop and admin operations.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{LineWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use tx_codec::{CodecError, HeaderMeta, format_header, format_row, read_last_row};
use tx_core::schema::ScanRow;
use tx_core::{GeoPoint, MissionTrack, RandomWalk};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::state::FeedState;

/// Callback invoked with each freshly written row, on the writer thread.
pub type RowObserver = Box<dyn FnMut(&ScanRow) + Send>;

/// Sleep while paused, between run-flag polls.
const PAUSE_SLEEP: Duration = Duration::from_millis(50);
/// Upper bound on a single pre-tick sleep, keeping the stop flag responsive.
const TICK_SLEEP: Duration = Duration::from_millis(5);
/// How long `stop()` waits for the writer thread before giving up.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Point-in-time snapshot returned by [`Simulator::status`].
#[derive(Debug, Clone)]
pub struct Status {
    pub path: PathBuf,
    pub scans_written: u64,
    pub elapsed_s: f64,
    pub position: GeoPoint,
    pub interval_s: f64,
    pub running: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file={} scans={} timeS={:.3} lat={:.5} lon={:.5} running={}",
            self.path.display(),
            self.scans_written,
            self.elapsed_s,
            self.position.lat,
            self.position.lon,
            self.running
        )
    }
}

/// Everything the writer tick and the admin operations contend for.
struct Inner {
    path: PathBuf,
    interval_s: f64,
    meta: HeaderMeta,
    walk: RandomWalk,
    track: Option<MissionTrack>,
    track_speed_knots: f64,
    track_pingpong: bool,
    state: FeedState,
    file: Option<LineWriter<File>>,
    observer: Option<RowObserver>,
}

impl Inner {
    fn io_err(&self, source: std::io::Error) -> SimError {
        SimError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Create (or truncate) the output file and write a fresh header.
    /// Counters reset; signal values carry over so traces stay smooth.
    fn start_new_file(&mut self) -> SimResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }
        let raw_name = self.path.with_extension("hex");
        let header = format_header(
            &self.meta,
            &raw_name.to_string_lossy(),
            GeoPoint::new(self.state.lat, self.state.lon),
            self.interval_s,
            Utc::now(),
        );
        let file = File::create(&self.path).map_err(|e| self.io_err(e))?;
        let mut writer = LineWriter::new(file);
        writer
            .write_all(header.as_bytes())
            .map_err(|e| self.io_err(e))?;
        self.file = Some(writer);
        self.state.scan = 1;
        self.state.time_s = 0.0;
        info!(path = %self.path.display(), "started fresh feed file");
        Ok(())
    }

    /// Open an existing file and resume counters from its last data row.
    /// A file without a parseable data row is restarted fresh instead.
    fn open_for_append(&mut self) -> SimResult<()> {
        match read_last_row(&self.path) {
            Ok(Some(row)) => {
                self.state = FeedState::resume_from(&row, self.interval_s);
                if let Some(track) = self.track.as_mut() {
                    track.reset_position(self.state.lat, self.state.lon);
                }
                let file = OpenOptions::new()
                    .append(true)
                    .open(&self.path)
                    .map_err(|e| self.io_err(e))?;
                self.file = Some(LineWriter::new(file));
                info!(
                    path = %self.path.display(),
                    scan = self.state.scan,
                    "resuming existing feed file"
                );
                Ok(())
            }
            Ok(None) => {
                warn!(
                    path = %self.path.display(),
                    "append target has no data rows; rewriting header"
                );
                self.start_new_file()
            }
            Err(CodecError::MalformedLine { what }) => {
                warn!(
                    path = %self.path.display(),
                    what, "could not parse last data row; starting fresh"
                );
                self.start_new_file()
            }
            Err(CodecError::Io(source)) => Err(self.io_err(source)),
        }
    }

    /// Flush and drop the current file handle, if any.
    fn close_file(&mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(err) = file.flush() {
                warn!(path = %self.path.display(), %err, "flush on close failed");
            }
        }
    }

    /// One writer tick: generate, write, notify.
    fn write_tick(&mut self) {
        let interval_s = self.interval_s;
        let row = self
            .state
            .next_row(&mut self.walk, self.track.as_mut(), interval_s);
        if let Some(file) = self.file.as_mut() {
            if let Err(err) = file.write_all(format_row(&row).as_bytes()) {
                warn!(path = %self.path.display(), %err, "dropping row after write failure");
            }
        }
        if let Some(observer) = self.observer.as_mut() {
            if panic::catch_unwind(AssertUnwindSafe(|| observer(&row))).is_err() {
                warn!("row observer panicked; ignoring");
            }
        }
    }
}

/// Continuously writes simulated scans to a CNV file.
///
/// Lifecycle: `Created -> Running <-> Paused -> Stopped`. A stopped engine is
/// final; construct a new one to restart. Exactly one background writer
/// thread exists per instance.
pub struct Simulator {
    inner: Arc<Mutex<Inner>>,
    run: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    done_rx: Option<Receiver<()>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Simulator {
    /// Build the engine and set up its output file (fresh or append).
    ///
    /// Filesystem failures here abort construction; missing parent
    /// directories are created automatically.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        if !config.interval_s.is_finite() || config.interval_s <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "interval must be positive",
            });
        }
        let start = config.start.validated()?;
        let track = match config.end {
            Some(end) => Some(MissionTrack::new(
                start,
                end.validated()?,
                config.speed_knots,
                config.pingpong,
            )),
            None => None,
        };

        let mut inner = Inner {
            path: config.path,
            interval_s: config.interval_s,
            meta: config.meta,
            walk: RandomWalk::new(config.seed),
            track,
            track_speed_knots: config.speed_knots,
            track_pingpong: config.pingpong,
            state: FeedState::fresh(start),
            file: None,
            observer: None,
        };
        if config.append && inner.path.exists() {
            inner.open_for_append()?;
        } else {
            inner.start_new_file()?;
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
            run: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            worker: None,
            done_rx: None,
        })
    }

    /// Start the background writer, or resume it when paused.
    ///
    /// Idempotent while the engine lives; an error after `stop()`.
    pub fn start(&mut self) -> SimResult<()> {
        if self.stop.load(Ordering::Relaxed) {
            return Err(SimError::InvalidArg {
                what: "simulator is stopped",
            });
        }
        self.run.store(true, Ordering::Relaxed);
        if self.worker.is_none() {
            let (done_tx, done_rx) = mpsc::channel();
            let inner = Arc::clone(&self.inner);
            let run = Arc::clone(&self.run);
            let stop = Arc::clone(&self.stop);
            let handle = thread::Builder::new()
                .name("cnv-writer".to_string())
                .spawn(move || {
                    writer_loop(&inner, &run, &stop);
                    drop(done_tx);
                })
                .map_err(|source| SimError::Spawn { source })?;
            self.worker = Some(handle);
            self.done_rx = Some(done_rx);
        }
        Ok(())
    }

    /// Temporarily suppress row generation without stopping the thread.
    pub fn pause(&self) {
        self.run.store(false, Ordering::Relaxed);
    }

    /// Resume writing after a pause. The scheduler restarts from "now", so a
    /// long pause never causes a burst of catch-up rows.
    pub fn resume(&self) {
        self.run.store(true, Ordering::Relaxed);
    }

    /// Stop the writer thread and close the file. Final: the engine cannot be
    /// started again afterwards.
    ///
    /// Blocks until the worker exits or the join timeout elapses; the file is
    /// force-flushed and closed either way.
    pub fn stop(&mut self) -> SimResult<()> {
        self.run.store(false, Ordering::Relaxed);
        self.stop.store(true, Ordering::Relaxed);

        let mut timed_out = false;
        if let Some(done_rx) = self.done_rx.take() {
            match done_rx.recv_timeout(JOIN_TIMEOUT) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
                Err(RecvTimeoutError::Timeout) => timed_out = true,
            }
        }
        if let Some(handle) = self.worker.take() {
            if timed_out {
                // Leave the thread detached; it can no longer write once the
                // file handle is gone.
                warn!("writer thread did not exit in time");
            } else if handle.join().is_err() {
                warn!("writer thread panicked");
            }
        }

        lock(&self.inner).close_file();
        if timed_out {
            return Err(SimError::ShutdownTimeout {
                timeout_ms: JOIN_TIMEOUT.as_millis() as u64,
            });
        }
        Ok(())
    }

    /// Close the current file and start a brand new CNV at `path`.
    pub fn switch_to_new_file(&self, path: impl Into<PathBuf>) -> SimResult<()> {
        let mut inner = lock(&self.inner);
        inner.close_file();
        inner.path = path.into();
        inner.start_new_file()
    }

    /// Close the current file and append to an existing CNV at `path`.
    pub fn switch_to_append_file(&self, path: impl Into<PathBuf>) -> SimResult<()> {
        let mut inner = lock(&self.inner);
        inner.close_file();
        inner.path = path.into();
        if inner.path.exists() {
            inner.open_for_append()
        } else {
            inner.start_new_file()
        }
    }

    /// Delete the current file and start a fresh one with a new header.
    ///
    /// Pauses the writer first and leaves it paused, so the caller decides
    /// when rows flow again.
    pub fn clear_current_file(&self) -> SimResult<()> {
        self.run.store(false, Ordering::Relaxed);
        let mut inner = lock(&self.inner);
        inner.close_file();
        if let Err(err) = fs::remove_file(&inner.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %inner.path.display(), %err, "could not delete feed file");
            }
        }
        inner.start_new_file()
    }

    /// Atomically replace the mission track.
    ///
    /// The current position jumps to `start`; `speed_knots` and `pingpong`
    /// keep their previous configuration when `None`.
    pub fn update_track(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        speed_knots: Option<f64>,
        pingpong: Option<bool>,
    ) -> SimResult<()> {
        let start = start.validated()?;
        let end = end.validated()?;
        let mut inner = lock(&self.inner);
        if let Some(knots) = speed_knots {
            inner.track_speed_knots = knots;
        }
        if let Some(pp) = pingpong {
            inner.track_pingpong = pp;
        }
        inner.state.lat = start.lat;
        inner.state.lon = start.lon;
        inner.track = Some(MissionTrack::new(
            start,
            end,
            inner.track_speed_knots,
            inner.track_pingpong,
        ));
        info!(
            lat = start.lat,
            lon = start.lon,
            "mission track replaced"
        );
        Ok(())
    }

    /// Update the active track's speed without resetting its progress.
    pub fn set_track_speed(&self, knots: f64) -> SimResult<()> {
        if !knots.is_finite() || knots < 0.0 {
            return Err(SimError::InvalidArg {
                what: "speed must be non-negative",
            });
        }
        let mut inner = lock(&self.inner);
        inner.track_speed_knots = knots;
        if let Some(track) = inner.track.as_mut() {
            track.set_speed(knots);
        }
        Ok(())
    }

    /// Change the output rate on the fly.
    pub fn set_rate(&self, hz: f64) -> SimResult<()> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "rate must be positive",
            });
        }
        lock(&self.inner).interval_s = 1.0 / hz;
        Ok(())
    }

    /// Register a callback receiving each written row.
    pub fn set_row_observer<F>(&self, observer: F)
    where
        F: FnMut(&ScanRow) + Send + 'static,
    {
        lock(&self.inner).observer = Some(Box::new(observer));
    }

    /// Remove the row callback.
    pub fn clear_row_observer(&self) {
        lock(&self.inner).observer = None;
    }

    /// Snapshot the engine's current state.
    pub fn status(&self) -> Status {
        let inner = lock(&self.inner);
        Status {
            path: inner.path.clone(),
            scans_written: inner.state.scan.saturating_sub(1),
            elapsed_s: inner.state.time_s,
            position: GeoPoint::new(inner.state.lat, inner.state.lon),
            interval_s: inner.interval_s,
            running: self.run.load(Ordering::Relaxed) && !self.stop.load(Ordering::Relaxed),
        }
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.run.store(false, Ordering::Relaxed);
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        lock(&self.inner).close_file();
    }
}

/// Writer loop: a monotonic tick scheduler targeting the configured rate.
///
/// While paused it sleeps briefly and pushes the next tick into the future so
/// resuming never produces a backlog burst. Row generation, the file write
/// and the observer call all happen under the shared lock, serializing with
/// the admin operations.
fn writer_loop(inner: &Mutex<Inner>, run: &AtomicBool, stop: &AtomicBool) {
    let mut next_tick = Instant::now();
    while !stop.load(Ordering::Relaxed) {
        if !run.load(Ordering::Relaxed) {
            thread::sleep(PAUSE_SLEEP);
            let interval_s = lock(inner).interval_s;
            next_tick = Instant::now() + Duration::from_secs_f64(interval_s);
            continue;
        }

        let now = Instant::now();
        if now < next_tick {
            thread::sleep((next_tick - now).min(TICK_SLEEP));
            continue;
        }

        let mut guard = lock(inner);
        next_tick += Duration::from_secs_f64(guard.interval_s);
        guard.write_tick();
    }
}
