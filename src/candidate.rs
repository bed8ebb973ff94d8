use core::cmp::Ordering;
use std::sync::OnceLock;

/// Outcome of scoring a candidate. Lower lap times are fitter; a candidate whose line could
/// not be simulated ranks below every lap time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fitness {
    LapTime(f64),
    Failed,
}

impl Fitness {
    #[inline]
    pub fn lap_time(&self) -> Option<f64> {
        match self {
            Self::LapTime(t) => Some(*t),
            Self::Failed => None,
        }
    }

    /// Order from fittest to least fit
    pub fn rank(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::LapTime(l), Self::LapTime(r)) => l.total_cmp(r),
            (Self::LapTime(_), Self::Failed) => Ordering::Less,
            (Self::Failed, Self::LapTime(_)) => Ordering::Greater,
            (Self::Failed, Self::Failed) => Ordering::Equal,
        }
    }
}

/// One point in the search space: an interpolation weight per path vertex, each in [0, 1].
/// Its fitness is computed at most once, and a lap time of exactly zero still counts as scored.
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    weights: Vec<f64>,
    fitness: OnceLock<Fitness>,
}

impl Candidate {
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            fitness: OnceLock::new(),
        }
    }

    /// A candidate whose fitness is already known
    pub fn scored(weights: Vec<f64>, fitness: Fitness) -> Self {
        Self {
            weights,
            fitness: OnceLock::from(fitness),
        }
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn into_weights(self) -> Vec<f64> {
        self.weights
    }

    /// The cached fitness, or `None` if this candidate has never been scored
    #[inline]
    pub fn fitness(&self) -> Option<Fitness> {
        self.fitness.get().copied()
    }

    #[inline]
    pub fn is_scored(&self) -> bool {
        self.fitness.get().is_some()
    }

    #[inline]
    pub fn lap_time(&self) -> Option<f64> {
        self.fitness().and_then(|f| f.lap_time())
    }

    /// Score with `score` unless a fitness is already cached, and return the fitness
    pub fn ensure_scored(&self, score: impl FnOnce(&[f64]) -> Fitness) -> Fitness {
        *self.fitness.get_or_init(|| score(&self.weights))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_scored_once() {
        let calls = Cell::new(0);
        let c = Candidate::new(vec![0.5; 4]);
        assert!(!c.is_scored());
        assert_eq!(c.fitness(), None);

        for _ in 0..3 {
            let f = c.ensure_scored(|w| {
                calls.set(calls.get() + 1);
                Fitness::LapTime(w.iter().sum())
            });
            assert_eq!(f, Fitness::LapTime(2.));
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(c.lap_time(), Some(2.));
    }

    #[test]
    fn test_zero_lap_time_is_scored() {
        let c = Candidate::new(vec![]);
        assert_eq!(c.ensure_scored(|_| Fitness::LapTime(0.)), Fitness::LapTime(0.));
        assert!(c.is_scored());
        assert_eq!(
            c.ensure_scored(|_| panic!("rescored a zero lap time")),
            Fitness::LapTime(0.)
        );
    }

    #[test]
    fn test_clone_keeps_score() {
        let c = Candidate::scored(vec![0.1], Fitness::LapTime(12.));
        let d = c.clone();
        assert_eq!(d.lap_time(), Some(12.));
        assert_eq!(d.weights(), c.weights());
    }

    #[test]
    fn test_rank() {
        let mut fits = vec![
            Fitness::Failed,
            Fitness::LapTime(30.),
            Fitness::LapTime(10.),
            Fitness::Failed,
            Fitness::LapTime(20.),
        ];
        fits.sort_by(Fitness::rank);
        assert_eq!(
            fits,
            vec![
                Fitness::LapTime(10.),
                Fitness::LapTime(20.),
                Fitness::LapTime(30.),
                Fitness::Failed,
                Fitness::Failed,
            ]
        );
    }
}
