use argh::FromArgs;
use museumghosts::config::Config;
use museumghosts::partition::build_partition_with_nudge;
use museumghosts::Arena;
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::TermLogger;
use std::error::Error;

/// Build the visibility partition for an arena and save it as JSON
#[derive(Debug, FromArgs)]
struct Options {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    verbose: Option<log::LevelFilter>,
    /// path to the config file
    #[argh(option, default = "String::from(\"config.toml\")")]
    config: String,
    /// arena JSON to partition; a new arena is generated when omitted
    #[argh(option)]
    arena: Option<String>,
    /// save the generated arena here
    #[argh(option)]
    save_arena: Option<String>,
    /// override the maze seed
    #[argh(option)]
    seed: Option<u64>,
    /// override the cell size
    #[argh(option)]
    cellsize: Option<f64>,
    /// output path, defaults to the configured cache path
    #[argh(option, short = 'o')]
    output: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let options: Options = argh::from_env();
    let config = Config::load_from(&options.config);

    TermLogger::init(
        options.verbose.unwrap_or_else(|| config.logging.level_filter()),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let arena = match &options.arena {
        Some(path) => Arena::load_from_file(path)?,
        None => {
            let seed = options.seed.unwrap_or(config.maze.seed);
            let mut rng = StdRng::seed_from_u64(seed);
            log::info!("Generating arena with seed {}", seed);
            Arena::generate(
                config.arena.width,
                config.arena.height,
                config.maze.cols,
                config.maze.rows,
                config.maze.random_walls,
                &mut rng,
            )
        }
    };

    if let Some(path) = &options.save_arena {
        arena.save_to_file(path)?;
        log::info!("Saved arena to {}", path);
    }

    let cellsize = options.cellsize.unwrap_or(config.partition.cellsize);
    let partition = build_partition_with_nudge(arena.size(), &arena.walls, cellsize, config.partition.nudge)?;

    let output = options.output.unwrap_or(config.partition.cache_path);
    partition.save_to_file(&output)?;
    log::info!(
        "Saved {} cells ({:.1} of {} walls per cell) to {}",
        partition.cells.len(),
        partition.average_walls(),
        arena.walls.len(),
        output
    );

    Ok(())
}
