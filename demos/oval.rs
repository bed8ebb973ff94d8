//! Searches an oval with both strategies and prints each generation.
//!
//! `RUST_LOG=debug cargo run --example oval` shows the per generation details as well.

use core::{f64::consts::PI, ops::ControlFlow};
use raceline::{
    Car, CovarianceAdaptation, Environment, Evaluator, Evolutionary, Launch, Point, Population,
    SearchConfig, Stats, Strategy, Track,
};
use tracing_subscriber::EnvFilter;

const VERTICES: usize = 240;

fn oval(a: f64, b: f64) -> Vec<Point> {
    (0..VERTICES)
        .map(|i| {
            let θ = 2. * PI * i as f64 / VERTICES as f64;
            Point::new(a * θ.cos(), b * θ.sin(), 0.)
        })
        .collect()
}

fn report(stats: &Stats, _: &Population) -> ControlFlow<()> {
    println!(
        "  gen {:>3}: best {:>8.3}s  mean {:>8.3}s  failed {}",
        stats.generation,
        stats.best_lap_time.unwrap_or(f64::NAN),
        stats.mean_lap_time.unwrap_or(f64::NAN),
        stats.failed,
    );
    ControlFlow::Continue(())
}

fn search<S: Strategy>(name: &str, evaluator: &Evaluator, config: &SearchConfig) {
    println!("{name}");
    match S::with_config(config.clone()).run(evaluator, report) {
        Ok(outcome) => println!(
            "  best {:.3}s after {} generations\n",
            outcome.lap_time().unwrap_or(f64::NAN),
            outcome.generations
        ),
        Err(e) => println!("  failed: {e}\n"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let track = match Track::new(oval(150., 60.), oval(165., 75.)) {
        Ok(track) => track,
        Err(e) => return eprintln!("{e}"),
    };
    let evaluator =
        match Evaluator::new(track, Car::default(), Environment::default(), Launch::Flying) {
            Ok(evaluator) => evaluator,
            Err(e) => return eprintln!("{e}"),
        };
    let centre = vec![0.5; evaluator.dimension()];
    if let Ok(t) = evaluator.lap_time(&centre) {
        println!("centre line {t:.3}s\n");
    }

    let config = SearchConfig {
        iterations: 25,
        seed: Some(2024),
        ..SearchConfig::default()
    };
    search::<Evolutionary>("evolutionary", &evaluator, &config);
    search::<CovarianceAdaptation>("covariance adaptation", &evaluator, &config);
}
