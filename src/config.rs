//! Search hyperparameters. Loadable from JSON with any field left out taking its default.

use crate::{
    constants::*,
    error::{RacingError, Result},
    smoothing::Smoothing,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidates kept from one generation to the next
    pub population_size: usize,
    /// Generations to run after seeding
    pub iterations: usize,
    /// Offspring bred each generation before selection
    pub num_offspring: usize,
    /// Consecutive vertices sharing one random draw
    pub weight_group_size: usize,
    /// Applied to every freshly built weight vector, if set
    pub smoothing: Option<Smoothing>,
    pub mutation_factor: f64,
    /// Spread of the per group mutation draw
    pub standard_deviation: f64,
    /// Fixes every random choice, making a search replayable
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: RACELINE_POPULATION_SIZE,
            iterations: RACELINE_ITERATIONS,
            num_offspring: RACELINE_NUM_OFFSPRING,
            weight_group_size: RACELINE_WEIGHT_GROUP_SIZE,
            smoothing: Some(Smoothing::default()),
            mutation_factor: RACELINE_MUTATION_FACTOR,
            standard_deviation: RACELINE_STANDARD_DEVIATION,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(RacingError::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        if self.weight_group_size == 0 {
            return Err(RacingError::InvalidConfig(
                "weight_group_size must be at least 1".into(),
            ));
        }
        for (name, v) in [
            ("mutation_factor", self.mutation_factor),
            ("standard_deviation", self.standard_deviation),
        ] {
            if !v.is_finite() || v < 0. {
                return Err(RacingError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {v}"
                )));
            }
        }
        if let Some(smoothing) = &self.smoothing {
            smoothing.validate()?;
        }

        Ok(())
    }
}

/// Settings specific to covariance adaptation, on top of a [SearchConfig]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmaConfig {
    /// Starting step size. Falls back to the search standard deviation when unset
    pub initial_step_size: Option<f64>,
    pub min_step_size: f64,
    pub max_step_size: f64,
    /// Added to the diagonal of the seeded covariance estimate
    pub regularisation: f64,
}

impl Default for CmaConfig {
    fn default() -> Self {
        Self {
            initial_step_size: None,
            min_step_size: RACELINE_CMA_SIGMA_MIN,
            max_step_size: RACELINE_CMA_SIGMA_MAX,
            regularisation: RACELINE_CMA_REGULARISATION,
        }
    }
}

impl CmaConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_step_size > 0. && self.min_step_size <= self.max_step_size) {
            return Err(RacingError::InvalidConfig(format!(
                "step size bounds must satisfy 0 < {} <= {}",
                self.min_step_size, self.max_step_size
            )));
        }
        if let Some(sigma) = self.initial_step_size {
            if !(sigma > 0. && sigma.is_finite()) {
                return Err(RacingError::InvalidConfig(format!(
                    "initial_step_size must be positive, got {sigma}"
                )));
            }
        }
        if !(self.regularisation >= 0. && self.regularisation.is_finite()) {
            return Err(RacingError::InvalidConfig(format!(
                "regularisation must be non-negative, got {}",
                self.regularisation
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(CmaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let c = serde_json::from_str::<SearchConfig>(
            r#"{"population_size": 12, "seed": 3}"#,
        )
        .unwrap();
        assert_eq!(c.population_size, 12);
        assert_eq!(c.seed, Some(3));
        assert_eq!(c.weight_group_size, RACELINE_WEIGHT_GROUP_SIZE);
        assert_eq!(c.smoothing, Some(Smoothing::default()));

        let c = serde_json::from_str::<SearchConfig>(r#"{"smoothing": null}"#).unwrap();
        assert_eq!(c.smoothing, None);
    }

    #[test]
    fn test_rejects() {
        for bad in [
            SearchConfig {
                population_size: 0,
                ..SearchConfig::default()
            },
            SearchConfig {
                weight_group_size: 0,
                ..SearchConfig::default()
            },
            SearchConfig {
                standard_deviation: -1.,
                ..SearchConfig::default()
            },
            SearchConfig {
                mutation_factor: f64::NAN,
                ..SearchConfig::default()
            },
            SearchConfig {
                smoothing: Some(Smoothing { window: 4, order: 1 }),
                ..SearchConfig::default()
            },
        ] {
            assert!(matches!(bad.validate(), Err(RacingError::InvalidConfig(_))));
        }

        assert!(CmaConfig {
            min_step_size: 2.,
            max_step_size: 1.,
            ..CmaConfig::default()
        }
        .validate()
        .is_err());
    }
}
