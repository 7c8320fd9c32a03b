//! Command-line driver: build or load a dungeon, optionally save or print it,
//! then let the monsters hunt an idle player until someone wins.

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser};
use log::{error, info, warn, LevelFilter, Log, Metadata, Record};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rogue_dungeon::config::GameConfig;
use rogue_dungeon::dungeon::DungeonLayout;
use rogue_dungeon::engine::{self, IdleController, NullSink, Outcome, Simulation};
use rogue_dungeon::error::{exit_codes, GameError, LoadError};
use rogue_dungeon::persistence;
use rogue_dungeon::render::{self, ConsoleSink};

#[derive(Parser, Debug)]
#[command(name = "rogue-dungeon")]
#[command(version, about = "Procedural dungeon with speed-ordered monster AI", long_about = None)]
struct Args {
    /// Load a binary dungeon (default ~/.rlg327/dungeon)
    #[arg(short = 'l', long, num_args = 0..=1, value_name = "PATH")]
    load: Option<Option<PathBuf>>,

    /// Save the dungeon in binary form (default ~/.rlg327/dungeon)
    #[arg(short = 's', long, num_args = 0..=1, value_name = "PATH")]
    save: Option<Option<PathBuf>>,

    /// Load a PGM hardness map (default ~/.rlg327/dungeon.pgm)
    #[arg(long, num_args = 0..=1, value_name = "PATH", conflicts_with = "load")]
    pgm_load: Option<Option<PathBuf>>,

    /// Save a PGM hardness map (default ~/.rlg327/dungeon.pgm)
    #[arg(long, num_args = 0..=1, value_name = "PATH")]
    pgm_save: Option<Option<PathBuf>>,

    /// Add stairs to a loaded dungeon that has none
    #[arg(long)]
    stairs: bool,

    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Number of monsters
    #[arg(short = 'n', long = "nummon")]
    nummon: Option<usize>,

    /// Print the map and both cost fields instead of playing
    #[arg(short = 'p', long)]
    print: bool,

    /// JSON config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stop after this many actor turns
    #[arg(long)]
    max_turns: Option<u64>,

    /// Run without drawing frames
    #[arg(long)]
    headless: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,

    /// Raise the log level once per use
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn level(&self) -> LevelFilter {
        const LEVELS: [LevelFilter; 6] = [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
            LevelFilter::Trace,
        ];
        let current = LEVELS.iter().position(|&l| l == self.log_level).unwrap_or(0);
        LEVELS[(current + self.verbose as usize).min(LEVELS.len() - 1)]
    }
}

// =============================================================================
// LOGGING
// =============================================================================

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

// =============================================================================
// MAIN
// =============================================================================

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::INVALID_ARGUMENT
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    init_logging(args.level());

    let code = match run(&args) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            error!("{}", err);
            err.exit_code()
        }
    };
    process::exit(code);
}

fn run(args: &Args) -> Result<(), GameError> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    if let Some(count) = args.nummon {
        config.actors.monster_count = count;
    }
    if args.max_turns.is_some() {
        config.simulation.max_turns = args.max_turns;
    }
    config.validate()?;

    let seed = config.simulation.seed.unwrap_or_else(rand::random);
    info!("seed {}", seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let loaded = load_layout(args, &config).map(|mut layout| {
        let has_stairs = layout.grid.tiles.iter().any(|t| t.tile_type.is_stair());
        if args.stairs {
            engine::ensure_stairs(&mut layout, &mut rng);
        } else if !has_stairs {
            warn!("loaded dungeon has no stairs; pass --stairs to add them");
        }
        layout
    });

    let dungeon = engine::initialize_dungeon(&config, loaded, &mut rng)?;

    if let Some(path) = resolve(&args.save, persistence::default_dungeon_path) {
        persistence::save_dungeon(&dungeon, &path).map_err(GameError::Save)?;
    }
    if let Some(path) = resolve(&args.pgm_save, persistence::default_pgm_path) {
        persistence::save_pgm(&dungeon.grid, &path).map_err(GameError::Save)?;
    }

    if args.print {
        print!("{}", render::render_map(&dungeon));
        println!();
        print!("{}", render::render_costs(&dungeon.grid, &dungeon.walker_field));
        println!();
        print!("{}", render::render_costs(&dungeon.grid, &dungeon.tunneler_field));
        return Ok(());
    }

    let mut simulation = Simulation::new(dungeon, &config);
    let outcome = if args.headless {
        simulation.run(&mut IdleController, &mut NullSink, &mut rng)
    } else {
        let mut sink = ConsoleSink::new(io::stdout(), config.simulation.frames_per_second);
        simulation.run(&mut IdleController, &mut sink, &mut rng)
    };

    print!("{}", render::render_map(simulation.dungeon()));
    match outcome {
        Outcome::Victory => println!("The player survived every monster."),
        Outcome::Defeat => println!("The player was killed."),
        Outcome::TurnLimit => println!("Stopped after {} turns.", simulation.turns()),
    }
    Ok(())
}

/// Turn an optional path flag into a concrete path, falling back to the
/// default location when the flag was given without a value.
fn resolve(flag: &Option<Option<PathBuf>>, default: fn() -> Option<PathBuf>) -> Option<PathBuf> {
    match flag {
        None => None,
        Some(Some(path)) => Some(path.clone()),
        Some(None) => {
            let path = default();
            if path.is_none() {
                warn!("no home directory; cannot use the default save location");
            }
            path
        }
    }
}

/// Read the requested dungeon file. Any failure is logged and the session
/// falls back to a generated dungeon.
fn load_layout(args: &Args, config: &GameConfig) -> Option<DungeonLayout> {
    let (width, height) = (config.dungeon.width, config.dungeon.height);

    type Loader = fn(&Path, usize, usize) -> Result<DungeonLayout, LoadError>;
    let (path, loader): (PathBuf, Loader) =
        if let Some(path) = resolve(&args.pgm_load, persistence::default_pgm_path) {
            (path, persistence::load_pgm)
        } else if let Some(path) = resolve(&args.load, persistence::default_dungeon_path) {
            (path, persistence::load_dungeon)
        } else {
            return None;
        };

    match loader(&path, width, height) {
        Ok(layout) => Some(layout),
        Err(err) => {
            warn!("cannot load {}: {}; using a random dungeon", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_flags_conflict() {
        let err = Args::try_parse_from(["rogue-dungeon", "--load", "--pgm-load"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_optional_paths() {
        let args = Args::try_parse_from(["rogue-dungeon", "--pgm-load", "map.pgm", "-s"]).unwrap();
        assert_eq!(args.pgm_load, Some(Some(PathBuf::from("map.pgm"))));
        assert_eq!(args.save, Some(None));
        assert_eq!(args.load, None);
    }

    #[test]
    fn test_verbosity_raises_level() {
        let args = Args::try_parse_from(["rogue-dungeon", "-vv"]).unwrap();
        assert_eq!(args.level(), LevelFilter::Debug);
        let args = Args::try_parse_from(["rogue-dungeon", "--log-level", "debug", "-vvvv"]).unwrap();
        assert_eq!(args.level(), LevelFilter::Trace);
    }
}
