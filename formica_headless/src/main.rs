// CLI entry point for running formica matches without a frontend.
//
// Builds a `SimState` from a seed and an optional JSON config, then drives it
// through a `TickAccumulator` in simulated frames (no sleeping, so a match
// runs as fast as the CPU allows while still exercising the same frame →
// tick conversion a real-time frontend uses). Periodic `SimStats` snapshots
// go to stdout as JSON lines; logs go to stderr, filtered by `RUST_LOG`.
//
// Usage:
//   formica [OPTIONS]
//     --seed <N>            PRNG seed (default: 1)
//     --ticks <N>           Stop after this many ticks (default: 6000)
//     --config <PATH>       JSON GameConfig; missing fields take defaults
//     --speed <LEVEL>       Index into speed_multipliers (default: 0)
//     --frame-ms <MS>       Simulated frame length (default: 16)
//     --report-every <N>    Ticks between stats lines (default: 500)
//     --events              Also print every SimEvent as a JSON line
//     --dump-config         Print the effective config as JSON and exit

use std::process::ExitCode;
use std::time::Duration;

use formica_sim::clock::TickAccumulator;
use formica_sim::config::GameConfig;
use formica_sim::sim::SimState;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct Options {
    seed: u64,
    ticks: u64,
    config_path: Option<String>,
    speed_level: usize,
    frame_ms: u64,
    report_every: u64,
    print_events: bool,
    dump_config: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: 1,
            ticks: 6000,
            config_path: None,
            speed_level: 0,
            frame_ms: 16,
            report_every: 500,
            print_events: false,
            dump_config: false,
        }
    }
}

/// One stdout line. Tagged so consumers can tell stats from events.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Line<'a, T: Serialize> {
    Stats(&'a T),
    Event(&'a T),
    Final(&'a T),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let opts = parse_args();

    let config = match &opts.config_path {
        Some(path) => match GameConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path, "bad config: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    if opts.dump_config {
        return match serde_json::to_string_pretty(&config) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("failed to serialize config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let mut sim = match SimState::with_config(opts.seed, config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("cannot start match: {e}");
            return ExitCode::FAILURE;
        }
    };
    if !sim.set_speed_level(opts.speed_level) {
        error!(
            level = opts.speed_level,
            levels = sim.config.speed_multipliers.len(),
            "no such speed level"
        );
        return ExitCode::FAILURE;
    }

    let mut acc = TickAccumulator::from_config(&sim.config);
    let frame = Duration::from_millis(opts.frame_ms.max(1));
    let mut next_report = opts.report_every;

    while sim.tick < opts.ticks && !sim.is_game_over() {
        let events = sim.run_frame_until(&mut acc, frame, opts.ticks);
        if opts.print_events {
            for event in &events {
                emit(&Line::Event(event));
            }
        }
        if opts.report_every > 0 && sim.tick >= next_report {
            emit(&Line::Stats(&sim.stats()));
            next_report = sim.tick + opts.report_every;
        }
    }

    let stats = sim.stats();
    info!(
        tick = stats.tick,
        victory = ?stats.victory,
        result = ?sim.player_result(),
        dropped_ticks = acc.dropped_ticks(),
        "match finished"
    );
    emit(&Line::Final(&stats));
    ExitCode::SUCCESS
}

fn emit<T: Serialize>(line: &Line<'_, T>) {
    match serde_json::to_string(line) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("failed to serialize output line: {e}"),
    }
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Options {
    let mut opts = Options::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                opts.seed = parse_value(&args, i, "--seed");
            }
            "--ticks" => {
                i += 1;
                opts.ticks = parse_value(&args, i, "--ticks");
            }
            "--config" => {
                i += 1;
                opts.config_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--speed" => {
                i += 1;
                opts.speed_level = parse_value(&args, i, "--speed");
            }
            "--frame-ms" => {
                i += 1;
                opts.frame_ms = parse_value(&args, i, "--frame-ms");
            }
            "--report-every" => {
                i += 1;
                opts.report_every = parse_value(&args, i, "--report-every");
            }
            "--events" => opts.print_events = true,
            "--dump-config" => opts.dump_config = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    opts
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("{flag} requires a valid number");
        std::process::exit(1);
    })
}

fn print_usage() {
    eprintln!("Usage: formica [OPTIONS]");
    eprintln!("  --seed <N>            PRNG seed (default: 1)");
    eprintln!("  --ticks <N>           Stop after this many ticks (default: 6000)");
    eprintln!("  --config <PATH>       JSON GameConfig; missing fields take defaults");
    eprintln!("  --speed <LEVEL>       Index into speed_multipliers (default: 0)");
    eprintln!("  --frame-ms <MS>       Simulated frame length (default: 16)");
    eprintln!("  --report-every <N>    Ticks between stats lines (default: 500)");
    eprintln!("  --events              Also print every SimEvent as a JSON line");
    eprintln!("  --dump-config         Print the effective config as JSON and exit");
}
