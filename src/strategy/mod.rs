//! Generation loops over a [Population], scored by an [Evaluator].

mod cma;
mod evolutionary;

pub use cma::CovarianceAdaptation;
pub use evolutionary::Evolutionary;

use crate::{
    candidate::{Candidate, Fitness},
    config::SearchConfig,
    error::{RacingError, Result},
    evaluate::Evaluator,
    population::Population,
    random::{search_rng, WyRng},
    track::RacingLine,
};
use core::ops::ControlFlow;
use tracing::info;

/// Summary of one generation, handed to a [Hook]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// 0 is the seeded population
    pub generation: usize,
    pub best_lap_time: Option<f64>,
    pub mean_lap_time: Option<f64>,
    pub failed: usize,
    pub population: usize,
}

impl Stats {
    pub fn of(generation: usize, population: &Population) -> Self {
        Self {
            generation,
            best_lap_time: population.best().and_then(Candidate::lap_time),
            mean_lap_time: population.mean_lap_time(),
            failed: population.failed(),
            population: population.len(),
        }
    }
}

/// Observes every generation once it is scored. Breaking stops the search before the next
/// generation is bred.
pub trait Hook {
    fn on_generation(&mut self, stats: &Stats, population: &Population) -> ControlFlow<()>;
}

impl<F> Hook for F
where
    F: FnMut(&Stats, &Population) -> ControlFlow<()>,
{
    fn on_generation(&mut self, stats: &Stats, population: &Population) -> ControlFlow<()> {
        self(stats, population)
    }
}

/// A [Hook] that never interrupts
#[derive(Debug, Clone, Copy, Default)]
pub struct Unobserved;

impl Hook for Unobserved {
    fn on_generation(&mut self, _: &Stats, _: &Population) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Result of a search: the fittest candidate of the last generation and its line
#[derive(Debug, Clone)]
pub struct Outcome {
    pub best: Candidate,
    pub line: RacingLine,
    pub fitness: Fitness,
    /// Generations bred after seeding
    pub generations: usize,
    pub population: Population,
}

impl Outcome {
    #[inline]
    pub fn lap_time(&self) -> Option<f64> {
        self.fitness.lap_time()
    }
}

pub trait Strategy {
    fn with_config(config: SearchConfig) -> Self
    where
        Self: Sized;

    fn config(&self) -> &SearchConfig;

    /// The first generation, scored
    fn seed(&mut self, evaluator: &Evaluator, rng: &mut WyRng) -> Result<Population>;

    /// The generation after `population`, scored
    fn step(
        &mut self,
        population: Population,
        evaluator: &Evaluator,
        rng: &mut WyRng,
    ) -> Result<Population>;

    /// Seed, then breed `iterations` generations or until `hook` breaks
    fn run(&mut self, evaluator: &Evaluator, mut hook: impl Hook) -> Result<Outcome> {
        let config = self.config().clone();
        config.validate()?;
        let mut rng = search_rng(config.seed)?;

        let mut population = self.seed(evaluator, &mut rng)?;
        let mut generation = 0;
        loop {
            let stats = Stats::of(generation, &population);
            info!(
                generation,
                best = stats.best_lap_time.unwrap_or(f64::NAN),
                mean = stats.mean_lap_time.unwrap_or(f64::NAN),
                failed = stats.failed,
                "generation scored"
            );

            if hook.on_generation(&stats, &population).is_break() {
                info!(generation, "search stopped by hook");
                break;
            }
            if generation >= config.iterations {
                break;
            }

            population = self.step(population, evaluator, &mut rng)?;
            generation += 1;
        }

        let best = population
            .best()
            .cloned()
            .ok_or(RacingError::EmptyPopulation)?;
        let fitness = evaluator.score(&best);
        Ok(Outcome {
            line: evaluator.line(best.weights())?,
            best,
            fitness,
            generations: generation,
            population,
        })
    }
}

/// A freshly seeded population, scored
fn seeded(config: &SearchConfig, evaluator: &Evaluator, rng: &mut WyRng) -> Result<Population> {
    let population = Population::seed(
        config.population_size,
        evaluator.dimension(),
        config,
        rng,
    )?;
    evaluator.score_all(population.members());
    Ok(population)
}
