use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use tx_codec::HeaderMeta;
use tx_core::GeoPoint;
use tx_sim::config::DEFAULT_HZ;
use tx_sim::{SimConfig, Simulator};

mod cities;
mod live;
mod mission;

use live::{LiveOptions, LivePrinter};

#[derive(Parser)]
#[command(name = "tx-cli")]
#[command(about = "Simulate TRIAXUS writing a .cnv live-feed file", long_about = None)]
struct Cli {
    /// Output CNV file path
    #[arg(long, default_value = "triaxus_sim_001.cnv")]
    file: PathBuf,
    /// Output rate in Hz (default 24)
    #[arg(long)]
    hz: Option<f64>,
    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
    /// Load mission parameters from a YAML file (flags take precedence)
    #[arg(long)]
    mission: Option<PathBuf>,
    /// Mission start latitude [deg]
    #[arg(long, requires = "start_lon")]
    start_lat: Option<f64>,
    /// Mission start longitude [deg]
    #[arg(long, requires = "start_lat")]
    start_lon: Option<f64>,
    /// Mission start city name (overrides mission file if known)
    #[arg(long)]
    start_city: Option<String>,
    /// Mission end latitude [deg]; enables the track when set with --end-lon
    #[arg(long, requires = "end_lon")]
    end_lat: Option<f64>,
    /// Mission end longitude [deg]
    #[arg(long, requires = "end_lat")]
    end_lon: Option<f64>,
    /// Mission end city name (enables the track)
    #[arg(long)]
    end_city: Option<String>,
    /// Track speed in knots (default 6.0)
    #[arg(long)]
    speed_knots: Option<f64>,
    /// Bounce back and forth on the mission track (default on)
    #[arg(long, overrides_with = "no_pingpong")]
    pingpong: bool,
    /// Do not bounce; stop at the end of the mission track
    #[arg(long)]
    no_pingpong: bool,
    /// Append to an existing file instead of starting a new one
    #[arg(long)]
    append: bool,
    /// Run non-interactively for --count scans
    #[arg(long)]
    noninteractive: bool,
    /// With --noninteractive, how many scans to write (0 = forever)
    #[arg(long, default_value_t = 0)]
    count: u64,
    /// Print periodic live row summaries to stdout
    #[arg(long)]
    live: bool,
    /// Print every N rows when --live is set
    #[arg(long, default_value_t = 24)]
    live_every: u64,
    /// Comma list of fields to print when --live is set
    #[arg(long, default_value = "scan,timeS,latitude,longitude,prDM,t090C,sal00")]
    live_fields: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mission = match &cli.mission {
        Some(path) => mission::load(path)?,
        None => mission::MissionFile::default(),
    };

    let config = build_config(&cli, &mission);
    let live_options = cli
        .live
        .then(|| LiveOptions::from_list(cli.live_every, &cli.live_fields));

    let mut sim = Simulator::new(config.clone())?;
    install_live(&sim, &live_options);

    if cli.noninteractive || !io::stdin().is_terminal() {
        run_headless(&mut sim, &cli)?;
    } else {
        run_console(sim, config, live_options)?;
    }
    Ok(())
}

/// Merge CLI flags over the mission file over built-in defaults.
fn build_config(cli: &Cli, mission: &mission::MissionFile) -> SimConfig {
    let mut meta = HeaderMeta::default();
    if let Some(operator) = &mission.operator {
        meta.operator = operator.clone();
    }
    if let Some(ship) = &mission.ship {
        meta.ship = ship.clone();
    }
    if let Some(cruise) = &mission.cruise {
        meta.cruise = cruise.clone();
    }
    if let Some(station) = &mission.station {
        meta.station = station.clone();
    }

    let defaults = SimConfig::default();
    let mut start = mission.start.unwrap_or(defaults.start);
    if let Some(city) = &cli.start_city {
        match cities::lookup(city) {
            Some(point) => start = point,
            None => eprintln!("[warn] Unknown start city: {city}"),
        }
    }
    if let (Some(lat), Some(lon)) = (cli.start_lat, cli.start_lon) {
        start = GeoPoint::new(lat, lon);
    }

    let mut end = mission.end;
    if let Some(city) = &cli.end_city {
        match cities::lookup(city) {
            Some(point) => end = Some(point),
            None => eprintln!("[warn] Unknown end city: {city}"),
        }
    }
    if let (Some(lat), Some(lon)) = (cli.end_lat, cli.end_lon) {
        end = Some(GeoPoint::new(lat, lon));
    }

    let pingpong = if cli.no_pingpong {
        false
    } else if cli.pingpong {
        true
    } else {
        mission.pingpong.unwrap_or(defaults.pingpong)
    };

    let hz = cli.hz.or(mission.hz).unwrap_or(DEFAULT_HZ);

    SimConfig {
        path: cli.file.clone(),
        interval_s: 1.0 / hz,
        seed: cli.seed.or(mission.seed),
        append: cli.append,
        meta,
        start,
        end,
        speed_knots: cli
            .speed_knots
            .or(mission.speed_knots)
            .unwrap_or(defaults.speed_knots),
        pingpong,
    }
}

fn install_live(sim: &Simulator, options: &Option<LiveOptions>) {
    if let Some(options) = options {
        let mut printer = LivePrinter::new(options);
        sim.set_row_observer(move |row| printer.observe(row));
    }
}

/// Headless mode: run until Ctrl+C or until `--count` scans are written.
fn run_headless(sim: &mut Simulator, cli: &Cli) -> Result<(), Box<dyn Error>> {
    sim.start()?;
    println!("Writing to: {}. Press Ctrl+C to stop.", cli.file.display());
    if cli.count == 0 {
        loop {
            std::thread::sleep(Duration::from_secs(1));
        }
    }
    while sim.status().scans_written < cli.count {
        std::thread::sleep(Duration::from_millis(100));
    }
    sim.stop()?;
    Ok(())
}

/// Simple console to control the simulator during manual runs.
fn run_console(
    mut sim: Simulator,
    base: SimConfig,
    live_options: Option<LiveOptions>,
) -> Result<(), Box<dyn Error>> {
    println!(
        "CNV live-feed simulator. Commands: start <path> | append <path> | new <path> | \
         pause | resume | status | rate <hz> | track <lat lon lat lon [knots]> | \
         speed <knots> | stop/quit"
    );
    sim.start()?;
    println!("Auto-started. Writing to: {}", base.path.display());

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF behaves like quit
            report(sim.stop());
            println!("bye");
            return Ok(());
        }
        let mut tokens = line.split_whitespace();
        let Some(op) = tokens.next() else { continue };
        let args: Vec<&str> = tokens.collect();
        let arg = args.first().copied();

        match op.to_lowercase().as_str() {
            "quit" | "exit" | "q" | "stop" => {
                report(sim.stop());
                println!("bye");
                return Ok(());
            }
            "start" => {
                let path = arg.map(PathBuf::from).unwrap_or_else(|| base.path.clone());
                report(sim.stop());
                let config = SimConfig {
                    path: path.clone(),
                    append: false,
                    ..base.clone()
                };
                match Simulator::new(config) {
                    Ok(fresh) => {
                        sim = fresh;
                        install_live(&sim, &live_options);
                        report(sim.start());
                        println!("Started new file: {}", path.display());
                    }
                    Err(err) => eprintln!("error: {err}"),
                }
            }
            "new" => {
                let path = arg.map(PathBuf::from).unwrap_or_else(|| base.path.clone());
                report(sim.switch_to_new_file(&path));
                report(sim.start());
                println!("Switched to new file: {}", path.display());
            }
            "append" => {
                let Some(path) = arg.map(PathBuf::from) else {
                    println!("usage: append <path>");
                    continue;
                };
                if !path.exists() {
                    println!("No such file to append: {}", path.display());
                    continue;
                }
                report(sim.switch_to_append_file(&path));
                report(sim.start());
                println!("Appending to existing: {}", path.display());
            }
            "pause" => {
                sim.pause();
                println!("paused");
            }
            "resume" | "continue" => {
                sim.resume();
                println!("resumed");
            }
            "status" => println!("{}", sim.status()),
            "rate" => match arg {
                None => {
                    println!("current rate: {:.3} Hz", 1.0 / sim.status().interval_s);
                }
                Some(raw) => match raw.parse::<f64>() {
                    Ok(hz) if hz > 0.0 => {
                        report(sim.set_rate(hz));
                        println!("rate set to {hz:.3} Hz");
                    }
                    _ => println!("usage: rate <hz>"),
                },
            },
            "track" => {
                let parsed: Vec<f64> = args
                    .iter()
                    .take(5)
                    .filter_map(|raw| raw.parse().ok())
                    .collect();
                if parsed.len() < 4 || parsed.len() < args.len().min(5) {
                    println!("usage: track <start-lat> <start-lon> <end-lat> <end-lon> [knots]");
                    continue;
                }
                match sim.update_track(
                    GeoPoint::new(parsed[0], parsed[1]),
                    GeoPoint::new(parsed[2], parsed[3]),
                    parsed.get(4).copied(),
                    None,
                ) {
                    Ok(()) => println!("track updated"),
                    Err(err) => eprintln!("error: {err}"),
                }
            }
            "speed" => match arg.and_then(|raw| raw.parse::<f64>().ok()) {
                Some(knots) => match sim.set_track_speed(knots) {
                    Ok(()) => println!("speed set to {knots:.1} knots"),
                    Err(err) => eprintln!("error: {err}"),
                },
                None => println!("usage: speed <knots>"),
            },
            _ => println!(
                "commands: start <path> | append <path> | new <path> | pause | resume | \
                 status | rate <hz> | track <lat lon lat lon [knots]> | speed <knots> | quit"
            ),
        }
    }
}

fn report<T>(result: tx_sim::SimResult<T>) {
    if let Err(err) = result {
        eprintln!("error: {err}");
    }
}
