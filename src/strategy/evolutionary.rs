use super::{seeded, Strategy};
use crate::{
    config::SearchConfig, error::Result, evaluate::Evaluator, population::Population,
    random::WyRng,
};
use tracing::debug;

/// Mutation of uniformly picked parents, then roulette selection back down to the population
/// size
#[derive(Debug, Clone, Default)]
pub struct Evolutionary {
    config: SearchConfig,
}

impl Strategy for Evolutionary {
    fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn seed(&mut self, evaluator: &Evaluator, rng: &mut WyRng) -> Result<Population> {
        seeded(&self.config, evaluator, rng)
    }

    fn step(
        &mut self,
        population: Population,
        evaluator: &Evaluator,
        rng: &mut WyRng,
    ) -> Result<Population> {
        let offspring = population.offspring(self.config.num_offspring, &self.config, rng)?;
        let population = population.with_offspring(offspring);
        evaluator.score_all(population.members());
        debug!(
            candidates = population.len(),
            failed = population.failed(),
            "selecting"
        );
        population.select(self.config.population_size, rng)
    }
}
