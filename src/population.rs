//! Functions and structs related to building, breeding and culling populations of
//! [Candidate]s.

use crate::{
    candidate::{Candidate, Fitness},
    config::SearchConfig,
    constants::RACELINE_SELECTION_EPSILON,
    error::{RacingError, Result},
    smoothing::Smoothing,
};
use core::ops::Range;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

/// Contiguous blocks of `size` vertices covering `0..len`. The last block holds whatever is left
/// over when `size` does not divide `len`.
pub fn weight_groups(len: usize, size: usize) -> impl Iterator<Item = Range<usize>> {
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(move |start| start..(start + size).min(len))
}

#[inline]
pub fn group_count(len: usize, size: usize) -> usize {
    len.div_ceil(size.max(1))
}

/// Spread one value per weight group over every vertex of its group
pub fn broadcast(genes: &[f64], len: usize, size: usize) -> Vec<f64> {
    let mut weights = vec![0.; len];
    for (range, gene) in weight_groups(len, size).zip(genes) {
        weights[range].fill(*gene);
    }
    weights
}

/// Mean weight of every group, the inverse of [broadcast] for piecewise constant weights
pub fn genes(weights: &[f64], size: usize) -> Vec<f64> {
    weight_groups(weights.len(), size)
        .map(|range| {
            let n = range.len() as f64;
            weights[range].iter().sum::<f64>() / n
        })
        .collect()
}

/// Clamp to [0, 1], then smooth if asked to
pub fn finish(mut weights: Vec<f64>, smoothing: Option<&Smoothing>) -> Result<Vec<f64>> {
    for w in weights.iter_mut() {
        *w = w.clamp(0., 1.);
    }
    match smoothing {
        Some(s) => s.apply(&weights),
        None => Ok(weights),
    }
}

/// A fresh weight vector of `len` vertices, with one uniform draw per weight group
pub fn seed_weights(
    len: usize,
    config: &SearchConfig,
    rng: &mut impl RngCore,
) -> Result<Vec<f64>> {
    let genes = (0..group_count(len, config.weight_group_size))
        .map(|_| rng.random::<f64>())
        .collect::<Vec<_>>();
    finish(
        broadcast(&genes, len, config.weight_group_size),
        config.smoothing.as_ref(),
    )
}

/// Perturb `parent` by one normal draw per weight group, scaled by the mutation factor
pub fn mutate(
    parent: &[f64],
    config: &SearchConfig,
    normal: &Normal<f64>,
    rng: &mut impl RngCore,
) -> Result<Vec<f64>> {
    let mut weights = parent.to_vec();
    for range in weight_groups(parent.len(), config.weight_group_size) {
        let delta = normal.sample(rng) * config.mutation_factor;
        for w in weights[range].iter_mut() {
            *w += delta;
        }
    }
    finish(weights, config.smoothing.as_ref())
}

/// Roulette weights favouring short lap times: each lap time's share of the total, inverted and
/// normalized so the weights sum to one
pub fn selection_weights(lap_times: &[f64]) -> Result<Vec<f64>> {
    let total = lap_times.iter().sum::<f64>();
    if total == 0. || !total.is_finite() {
        return Err(RacingError::ZeroFitness);
    }

    let inverted = lap_times
        .iter()
        .map(|t| 1. - t / total + RACELINE_SELECTION_EPSILON)
        .collect::<Vec<_>>();
    let norm = inverted.iter().sum::<f64>();
    Ok(inverted.into_iter().map(|w| w / norm).collect())
}

/// Pick an index with probability proportional to its weight
fn roulette(weights: &[f64], rng: &mut impl RngCore) -> usize {
    let total = weights.iter().sum::<f64>();
    let mut threshold = rng.random::<f64>() * total;
    for (idx, weight) in weights.iter().enumerate() {
        threshold -= weight;
        if threshold <= 0. {
            return idx;
        }
    }

    // floating point leftovers
    weights.len() - 1
}

/// A generation of candidates. Each generation is built from the last rather than edited in
/// place.
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<Candidate>,
}

impl Population {
    pub fn new(members: Vec<Candidate>) -> Self {
        Self { members }
    }

    /// `size` fresh candidates over `len` vertices
    pub fn seed(
        size: usize,
        len: usize,
        config: &SearchConfig,
        rng: &mut impl RngCore,
    ) -> Result<Self> {
        Ok(Self::new(
            (0..size)
                .map(|_| seed_weights(len, config, rng).map(Candidate::new))
                .collect::<Result<Vec<_>>>()?,
        ))
    }

    #[inline]
    pub fn members(&self) -> &[Candidate] {
        &self.members
    }

    #[inline]
    pub fn into_members(self) -> Vec<Candidate> {
        self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.members.iter()
    }

    /// Mutated copies of parents picked uniformly at random, with replacement
    pub fn offspring(
        &self,
        count: usize,
        config: &SearchConfig,
        rng: &mut impl RngCore,
    ) -> Result<Vec<Candidate>> {
        if count == 0 {
            return Ok(vec![]);
        }
        if self.members.is_empty() {
            return Err(RacingError::EmptyPopulation);
        }

        let normal = Normal::new(0., config.standard_deviation)
            .map_err(|e| RacingError::InvalidConfig(e.to_string()))?;
        (0..count)
            .map(|_| {
                let parent = &self.members[rng.random_range(0..self.members.len())];
                mutate(parent.weights(), config, &normal, rng).map(Candidate::new)
            })
            .collect()
    }

    /// This population with `offspring` added alongside the existing members
    pub fn with_offspring(mut self, offspring: Vec<Candidate>) -> Self {
        self.members.extend(offspring);
        self
    }

    /// Roulette selection of `size` distinct candidates, lower lap times more likely. Failed and
    /// unscored candidates never survive. When no more than `size` are eligible, all of them are
    /// kept.
    pub fn select(self, size: usize, rng: &mut impl RngCore) -> Result<Self> {
        let (mut pool, mut lap_times): (Vec<_>, Vec<_>) = self
            .members
            .into_iter()
            .filter_map(|c| c.lap_time().map(|t| (c, t)))
            .unzip();

        if pool.is_empty() {
            return Err(RacingError::EmptyPopulation);
        }
        if pool.len() <= size {
            return Ok(Self::new(pool));
        }

        let mut weights = selection_weights(&lap_times)?;
        let mut chosen = Vec::with_capacity(size);
        for _ in 0..size {
            let idx = roulette(&weights, rng);
            chosen.push(pool.swap_remove(idx));
            weights.swap_remove(idx);
            lap_times.swap_remove(idx);
        }

        Ok(Self::new(chosen))
    }

    /// The fittest scored candidate
    pub fn best(&self) -> Option<&Candidate> {
        self.members
            .iter()
            .filter_map(|c| c.fitness().map(|f| (c, f)))
            .min_by(|(_, l), (_, r)| l.rank(r))
            .map(|(c, _)| c)
    }

    pub fn lap_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.members.iter().filter_map(Candidate::lap_time)
    }

    pub fn failed(&self) -> usize {
        self.members
            .iter()
            .filter(|c| matches!(c.fitness(), Some(Fitness::Failed)))
            .count()
    }

    pub fn mean_lap_time(&self) -> Option<f64> {
        let (sum, n) = self
            .lap_times()
            .fold((0., 0usize), |(sum, n), t| (sum + t, n + 1));
        (n > 0).then(|| sum / n as f64)
    }
}

impl FromIterator<Candidate> for Population {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, random::WyRng};

    fn config(group: usize, smoothing: Option<Smoothing>) -> SearchConfig {
        SearchConfig {
            weight_group_size: group,
            smoothing,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_weight_groups_remainder() {
        let groups = weight_groups(10, 4).collect::<Vec<_>>();
        assert_eq!(groups, vec![0..4, 4..8, 8..10]);
        assert_eq!(group_count(10, 4), 3);
        assert_eq!(weight_groups(8, 4).count(), 2);
        assert_eq!(weight_groups(0, 4).count(), 0);
        assert_eq!(weight_groups(3, 20).collect::<Vec<_>>(), vec![0..3]);
    }

    #[test]
    fn test_broadcast() {
        assert_eq!(
            broadcast(&[0.1, 0.5, 0.9], 7, 3),
            vec![0.1, 0.1, 0.1, 0.5, 0.5, 0.5, 0.9]
        );
        assert_eq!(genes(&broadcast(&[0.25, 0.5, 0.75], 7, 3), 3), vec![0.25, 0.5, 0.75]);
        assert_eq!(genes(&[0., 1., 0.5], 2), vec![0.5, 0.5]);
    }

    #[test]
    fn test_seed_is_piecewise_constant() {
        let mut rng = WyRng::seeded(1);
        let w = seed_weights(25, &config(10, None), &mut rng).unwrap();
        assert_eq!(w.len(), 25);
        for range in weight_groups(25, 10) {
            assert!(w[range.clone()].iter().all(|v| *v == w[range.start]));
        }
        assert!(w.iter().all(|v| (0. ..=1.).contains(v)));
        assert_ne!(w[0], w[10]);
    }

    #[test]
    fn test_seed_smoothed_in_range() {
        let mut rng = WyRng::seeded(2);
        for _ in 0..20 {
            let w = seed_weights(60, &config(6, Some(Smoothing::default())), &mut rng).unwrap();
            assert!(w.iter().all(|v| (0. ..=1.).contains(v)));
        }
    }

    #[test]
    fn test_mutate_clamps_and_groups() {
        let mut rng = WyRng::seeded(3);
        let c = SearchConfig {
            mutation_factor: 10.,
            ..config(5, None)
        };
        let normal = Normal::new(0., 1.).unwrap();
        let parent = vec![0.5; 23];
        for _ in 0..20 {
            let child = mutate(&parent, &c, &normal, &mut rng).unwrap();
            assert!(child.iter().all(|v| (0. ..=1.).contains(v)));
            for range in weight_groups(23, 5) {
                assert!(child[range.clone()].iter().all(|v| *v == child[range.start]));
            }
        }
    }

    #[test]
    fn test_zero_deviation_copies_parent() {
        let mut rng = WyRng::seeded(4);
        let pop = Population::new(vec![Candidate::new(vec![0.25; 12])]);
        let c = SearchConfig {
            standard_deviation: 0.,
            ..config(4, None)
        };
        for child in pop.offspring(5, &c, &mut rng).unwrap() {
            assert_eq!(child.weights(), &[0.25; 12]);
            assert!(!child.is_scored());
        }
    }

    #[test]
    fn test_offspring_from_empty() {
        let mut rng = WyRng::seeded(5);
        let c = SearchConfig::default();
        assert!(Population::default().offspring(0, &c, &mut rng).unwrap().is_empty());
        assert!(matches!(
            Population::default().offspring(3, &c, &mut rng),
            Err(RacingError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_selection_weights_favour_fast() {
        let w = selection_weights(&[10., 20.]).unwrap();
        assert!(w[0] > w[1]);
        assert_f64_approx!(w.iter().sum::<f64>(), 1., 1e-12);
        assert_f64_approx!(w[0], 2. / 3., 1e-6);

        assert!(matches!(
            selection_weights(&[0., 0.]),
            Err(RacingError::ZeroFitness)
        ));
        assert!(matches!(selection_weights(&[]), Err(RacingError::ZeroFitness)));
    }

    #[test]
    fn test_select_two_prefers_faster() {
        let mut rng = WyRng::seeded(6);
        let mut fast = 0;
        for _ in 0..2000 {
            let pop = Population::new(vec![
                Candidate::scored(vec![0.], Fitness::LapTime(20.)),
                Candidate::scored(vec![1.], Fitness::LapTime(10.)),
            ]);
            let chosen = pop.select(1, &mut rng).unwrap();
            assert_eq!(chosen.len(), 1);
            if chosen.members()[0].lap_time() == Some(10.) {
                fast += 1;
            }
        }
        // expect two thirds
        assert!((1200..1500).contains(&fast), "{fast}");
    }

    #[test]
    fn test_select_without_replacement() {
        let mut rng = WyRng::seeded(7);
        let pop = (0..30)
            .map(|i| Candidate::scored(vec![i as f64], Fitness::LapTime(10. + i as f64)))
            .collect::<Population>();
        let chosen = pop.select(12, &mut rng).unwrap();
        assert_eq!(chosen.len(), 12);
        let mut ids = chosen.iter().map(|c| c.weights()[0] as usize).collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_select_drops_failed() {
        let mut rng = WyRng::seeded(8);
        let pop = Population::new(vec![
            Candidate::scored(vec![0.], Fitness::Failed),
            Candidate::scored(vec![1.], Fitness::LapTime(30.)),
            Candidate::new(vec![2.]),
            Candidate::scored(vec![3.], Fitness::LapTime(40.)),
        ]);
        let chosen = pop.select(3, &mut rng).unwrap();
        assert_eq!(chosen.len(), 2);
        assert!(chosen.iter().all(|c| c.lap_time().is_some()));

        let all_failed = Population::new(vec![Candidate::scored(vec![0.], Fitness::Failed)]);
        assert!(matches!(
            all_failed.select(1, &mut rng),
            Err(RacingError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_select_zero_lap_times() {
        let mut rng = WyRng::seeded(9);
        let pop = Population::new(vec![
            Candidate::scored(vec![0.], Fitness::LapTime(0.)),
            Candidate::scored(vec![1.], Fitness::LapTime(0.)),
            Candidate::scored(vec![2.], Fitness::LapTime(0.)),
        ]);
        assert!(matches!(pop.select(2, &mut rng), Err(RacingError::ZeroFitness)));
    }

    #[test]
    fn test_best_and_stats() {
        let pop = Population::new(vec![
            Candidate::scored(vec![0.], Fitness::Failed),
            Candidate::scored(vec![1.], Fitness::LapTime(30.)),
            Candidate::scored(vec![2.], Fitness::LapTime(20.)),
            Candidate::new(vec![3.]),
        ]);
        assert_eq!(pop.best().unwrap().weights(), &[2.]);
        assert_eq!(pop.failed(), 1);
        assert_f64_approx!(pop.mean_lap_time().unwrap(), 25.);
        assert!(Population::default().best().is_none());
        assert!(Population::default().mean_lap_time().is_none());
    }
}
