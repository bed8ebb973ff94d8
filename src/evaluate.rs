use crate::{
    candidate::{Candidate, Fitness},
    car::{Car, Environment},
    error::{RacingError, Result},
    laptime::{LapProfile, LapTimeCalculator, Launch},
    track::{RacingLine, Track},
};
use tracing::warn;

/// Everything needed to turn a weight vector into a lap time. Shared read-only between every
/// candidate of a search, and across threads when scoring in parallel.
#[derive(Debug, Clone)]
pub struct Evaluator {
    track: Track,
    calculator: LapTimeCalculator,
    launch: Launch,
}

impl Evaluator {
    /// Fails on car or environment parameters the dynamics cannot work with, such as a
    /// non-finite or zero mass
    pub fn new(track: Track, car: Car, env: Environment, launch: Launch) -> Result<Self> {
        car.validate()?;
        env.validate()?;
        if let Launch::Standing { velocity } = launch {
            if !velocity.is_finite() || velocity < 0. {
                return Err(RacingError::InvalidConfig(format!(
                    "standing launch velocity must be finite and non-negative, got {velocity}"
                )));
            }
        }

        Ok(Self {
            track,
            calculator: LapTimeCalculator::new(car, env),
            launch,
        })
    }

    #[inline]
    pub fn track(&self) -> &Track {
        &self.track
    }

    #[inline]
    pub fn calculator(&self) -> &LapTimeCalculator {
        &self.calculator
    }

    #[inline]
    pub fn launch(&self) -> Launch {
        self.launch
    }

    /// Length of every weight vector on this track
    #[inline]
    pub fn dimension(&self) -> usize {
        self.track.len()
    }

    pub fn line(&self, weights: &[f64]) -> Result<RacingLine> {
        self.track.line(weights)
    }

    pub fn lap_time(&self, weights: &[f64]) -> Result<f64> {
        self.calculator.lap_time(&self.line(weights)?, self.launch)
    }

    pub fn profile(&self, weights: &[f64]) -> Result<LapProfile> {
        self.calculator.profile(&self.line(weights)?, self.launch)
    }

    /// Lap time as a fitness. Anything that stops the lap from being simulated marks the
    /// candidate as failed rather than aborting the search.
    pub fn fitness(&self, weights: &[f64]) -> Fitness {
        match self.lap_time(weights) {
            Ok(t) if t.is_finite() => Fitness::LapTime(t),
            Ok(t) => {
                warn!(lap_time = t, "non-finite lap time, candidate failed");
                Fitness::Failed
            }
            Err(e) => {
                warn!(error = %e, "candidate failed to evaluate");
                Fitness::Failed
            }
        }
    }

    #[inline]
    pub fn score(&self, candidate: &Candidate) -> Fitness {
        candidate.ensure_scored(|w| self.fitness(w))
    }

    /// Score every unscored candidate, spread over the rayon pool when built with `parallel`
    pub fn score_all(&self, candidates: &[Candidate]) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            candidates.par_iter().for_each(|c| {
                self.score(c);
            });
        }
        #[cfg(not(feature = "parallel"))]
        for c in candidates {
            self.score(c);
        }
    }
}
