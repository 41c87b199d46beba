//! grid-sim: run a headless gridphys scenario and print snapshots as JSON.
//!
//! Usage:
//!   grid-sim drop --height 12 --ticks 240
//!   grid-sim scatter --seed 7 --count 50 --ticks 600 --every

use std::path::PathBuf;
use std::process;

use glam::Vec3;
use gridphys_core::commands::PhysicsCommand;
use gridphys_core::Bounds;
use gridphys_sim::systems::snapshot::PhysicsSnapshot;
use gridphys_sim::{world_setup, SimConfig, SimulationEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DIMS: [usize; 3] = [32, 32, 32];
const FLOOR_HEIGHT: usize = 4;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "drop" => cmd_drop(&args[2..]),
        "scatter" => cmd_scatter(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "grid-sim: headless gridphys scenario runner\n\
         \n\
         Commands:\n\
         \n\
         drop      Drop a single body onto a flat floor\n\
         \n\
           --height <H>       Starting height of the body (default: 12)\n\
         \n\
         scatter   Drop many bodies at seeded random positions\n\
         \n\
           --count <N>        Number of bodies (default: 25)\n\
         \n\
         Common options:\n\
         \n\
           --ticks <N>        Ticks to run (default: 240)\n\
           --seed <N>         RNG seed (default: from config, else 42)\n\
           --config <path>    SimConfig JSON file\n\
           --every            Print every snapshot as a JSON line, not just the last\n\
         \n\
         Set RUST_LOG=debug for engine logs on stderr.\n"
    );
}

fn parse_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn load_config(args: &[String]) -> SimConfig {
    let mut config = match parse_value::<PathBuf>(args, "--config") {
        Some(path) => {
            let json = std::fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Error reading {}: {e}", path.display());
                process::exit(1);
            });
            SimConfig::from_json(&json).unwrap_or_else(|e| {
                eprintln!("Error in {}: {e}", path.display());
                process::exit(1);
            })
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = parse_value(args, "--seed") {
        config.seed = seed;
    }
    config
}

fn new_engine(args: &[String]) -> SimulationEngine {
    let config = load_config(args);
    info!(seed = config.seed, tick_rate = config.physics.tick_rate, "starting scenario");
    let mut engine = SimulationEngine::new(config);
    engine.queue_command(PhysicsCommand::SetTiles {
        dims: DIMS,
        tiles: world_setup::flat_floor_tiles(DIMS, FLOOR_HEIGHT),
    });
    engine
}

fn run(engine: &mut SimulationEngine, args: &[String]) {
    let ticks: u64 = parse_value(args, "--ticks").unwrap_or(240);
    let every = has_flag(args, "--every");

    let mut last = None;
    for _ in 0..ticks {
        let snapshot = engine.tick();
        if every {
            print_snapshot(&snapshot);
        }
        last = Some(snapshot);
    }

    if let Some(snapshot) = last.filter(|_| !every) {
        print_snapshot(&snapshot);
    }
    info!(ticks, elapsed = engine.time().elapsed_secs, "scenario finished");
}

fn print_snapshot(snapshot: &PhysicsSnapshot) {
    match serde_json::to_string(snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing snapshot: {e}");
            process::exit(1);
        }
    }
}

// --- Drop command ---

fn cmd_drop(args: &[String]) {
    let height: f32 = parse_value(args, "--height").unwrap_or(12.0);
    let mut engine = new_engine(args);
    let center = DIMS[0] as f32 / 2.0;
    engine.spawn_body(Vec3::new(center, height, center), Vec3::splat(0.5));
    run(&mut engine, args);
}

// --- Scatter command ---

fn cmd_scatter(args: &[String]) {
    let count: usize = parse_value(args, "--count").unwrap_or(25);
    let mut engine = new_engine(args);
    let center = DIMS[0] as f32 / 2.0;
    let region = Bounds::new(
        Vec3::new(center, 16.0, center),
        Vec3::new(center - 4.0, 8.0, center - 4.0),
    );
    engine.scatter_bodies(count, &region);
    run(&mut engine, args);
}
