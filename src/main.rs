use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use raceline::{
    strategy::Unobserved, Car, CovarianceAdaptation, Environment, Evaluator, Evolutionary,
    FromFile, Launch, SearchConfig, Strategy, ToFile, Track,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Search {
    /// Mutation and roulette selection
    Evolutionary,
    /// Covariance matrix adaptation
    Cma,
}

/// Search for the fastest racing line between two track limits
#[derive(Parser)]
#[command(name = "raceline")]
#[command(version)]
struct Cli {
    /// JSON file holding the `left` and `right` track limits as [x, y, z] points
    #[arg(short, long)]
    track: PathBuf,

    /// JSON car parameters, defaults used for anything left out
    #[arg(short, long)]
    car: Option<PathBuf>,

    /// JSON air density and gravity
    #[arg(short, long)]
    environment: Option<PathBuf>,

    /// JSON search configuration
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Search::Evolutionary)]
    strategy: Search,

    /// Overrides the configured number of generations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Overrides the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Start the lap at the speed a lap from rest carries over the line
    #[arg(long)]
    flying: bool,

    /// Speed in m/s to start the lap at, and to be back down to by the end of it
    #[arg(long, default_value_t = 0., conflicts_with = "flying")]
    launch_velocity: f64,

    /// Where to write the best racing line
    #[arg(short, long, default_value = "raceline.json")]
    output: PathBuf,

    /// Where to write the velocity profile of the best racing line
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load<T: FromFile + Default>(path: Option<&Path>, what: &str) -> Result<T> {
    match path {
        Some(path) => {
            T::from_file(path).with_context(|| format!("loading {what} from {}", path.display()))
        }
        None => Ok(T::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let track = Track::from_file(&cli.track)
        .with_context(|| format!("loading track from {}", cli.track.display()))?;
    let car = load::<Car>(cli.car.as_deref(), "car")?;
    let env = load::<Environment>(cli.environment.as_deref(), "environment")?;

    let mut config = load::<SearchConfig>(cli.config.as_deref(), "search config")?;
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let launch = if cli.flying {
        Launch::Flying
    } else {
        Launch::Standing {
            velocity: cli.launch_velocity,
        }
    };
    let evaluator = Evaluator::new(track, car, env, launch)?;
    info!(
        vertices = evaluator.dimension(),
        strategy = ?cli.strategy,
        launch = ?launch,
        iterations = config.iterations,
        "searching"
    );

    let outcome = match cli.strategy {
        Search::Evolutionary => Evolutionary::with_config(config).run(&evaluator, Unobserved)?,
        Search::Cma => CovarianceAdaptation::with_config(config).run(&evaluator, Unobserved)?,
    };

    outcome
        .line
        .to_file(&cli.output)
        .with_context(|| format!("writing racing line to {}", cli.output.display()))?;
    if let Some(path) = &cli.profile {
        evaluator
            .profile(outcome.best.weights())?
            .to_file(path)
            .with_context(|| format!("writing profile to {}", path.display()))?;
    }

    info!(
        lap_time = outcome.lap_time().unwrap_or(f64::NAN),
        generations = outcome.generations,
        centre_line = evaluator.lap_time(&vec![0.5; evaluator.dimension()])?,
        output = %cli.output.display(),
        "best line written"
    );
    Ok(())
}
