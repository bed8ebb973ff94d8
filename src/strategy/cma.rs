use super::{seeded, Strategy};
use crate::{
    candidate::Candidate,
    config::{CmaConfig, SearchConfig},
    constants::RACELINE_CMA_EIGEN_FLOOR,
    error::Result,
    evaluate::Evaluator,
    linalg::{Eigensystem, SampleStatistics},
    population::{broadcast, finish, genes, Population},
    random::WyRng,
};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

/// Covariance matrix adaptation over one gene per weight group.
///
/// The search distribution starts from the mean and covariance of the seeded population. Every
/// generation samples `population_size` offspring from it, recombines the better half into a new
/// mean and adapts the step size and covariance from the evolution paths. The population handed
/// to the hook holds the fittest `population_size` of parents and offspring together.
#[derive(Debug, Clone, Default)]
pub struct CovarianceAdaptation {
    config: SearchConfig,
    cma: CmaConfig,
    state: Option<State>,
}

impl CovarianceAdaptation {
    pub fn new(config: SearchConfig, cma: CmaConfig) -> Self {
        Self {
            config,
            cma,
            state: None,
        }
    }

    /// Current step size, once seeded
    pub fn step_size(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sigma)
    }

    /// Current distribution mean over genes, once seeded
    pub fn mean(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.mean.as_slice())
    }
}

/// Learning rates fixed by the dimension and offspring count
#[derive(Debug, Clone)]
struct Rates {
    mu: usize,
    weights: Vec<f64>,
    mu_eff: f64,
    c_sigma: f64,
    d_sigma: f64,
    c_c: f64,
    c_1: f64,
    c_mu: f64,
    expected_norm: f64,
}

impl Rates {
    fn new(n: usize, lambda: usize) -> Self {
        let nf = n as f64;
        let mu = (lambda / 2).max(1);

        let raw = (0..mu)
            .map(|i| (mu as f64 + 0.5).ln() - ((i + 1) as f64).ln())
            .collect::<Vec<_>>();
        let total = raw.iter().sum::<f64>();
        let weights = raw.into_iter().map(|w| w / total).collect::<Vec<_>>();
        let mu_eff = 1. / weights.iter().map(|w| w * w).sum::<f64>();

        let c_sigma = (mu_eff + 2.) / (nf + mu_eff + 5.);
        let d_sigma = 1. + 2. * (((mu_eff - 1.) / (nf + 1.)).sqrt() - 1.).max(0.) + c_sigma;
        let c_c = (4. + mu_eff / nf) / (nf + 4. + 2. * mu_eff / nf);
        let c_1 = 2. / ((nf + 1.3).powi(2) + mu_eff);
        let c_mu = (1. - c_1)
            .min(2. * (mu_eff - 2. + 1. / mu_eff) / ((nf + 2.).powi(2) + mu_eff));
        let expected_norm = nf.sqrt() * (1. - 1. / (4. * nf) + 1. / (21. * nf * nf));

        Self {
            mu,
            weights,
            mu_eff,
            c_sigma,
            d_sigma,
            c_c,
            c_1,
            c_mu,
            expected_norm,
        }
    }
}

#[derive(Debug, Clone)]
struct State {
    rates: Rates,
    mean: DVector<f64>,
    sigma: f64,
    covariance: DMatrix<f64>,
    p_sigma: DVector<f64>,
    p_c: DVector<f64>,
    generation: usize,
    /// Distribution to fall back to when the numbers stop being finite
    initial: (DVector<f64>, f64, DMatrix<f64>),
}

impl State {
    fn new(rates: Rates, mean: DVector<f64>, sigma: f64, covariance: DMatrix<f64>) -> Self {
        let n = mean.len();
        Self {
            rates,
            initial: (mean.clone(), sigma, covariance.clone()),
            mean,
            sigma,
            covariance,
            p_sigma: DVector::zeros(n),
            p_c: DVector::zeros(n),
            generation: 0,
        }
    }

    fn is_finite(&self) -> bool {
        self.sigma.is_finite()
            && self.mean.iter().all(|v| v.is_finite())
            && self.covariance.iter().all(|v| v.is_finite())
    }

    fn reset(&mut self) {
        let (mean, sigma, covariance) = self.initial.clone();
        self.mean = mean;
        self.sigma = sigma;
        self.covariance = covariance;
        self.p_sigma.fill(0.);
        self.p_c.fill(0.);
    }

    /// Move the distribution towards `steps`, the offspring displacements `(x - m) / σ` ordered
    /// fittest first
    fn update(&mut self, steps: &[DVector<f64>], cma: &CmaConfig) {
        let r = &self.rates;
        let n = self.mean.len();
        let nf = n as f64;

        // recombination weights renormalised over the viable offspring
        let used = steps.len().min(r.mu);
        let total = r.weights[..used].iter().sum::<f64>();
        let weights = r.weights[..used]
            .iter()
            .map(|w| w / total)
            .collect::<Vec<_>>();

        let y_w = weights
            .iter()
            .zip(steps)
            .fold(DVector::<f64>::zeros(n), |acc, (w, y)| acc + y * *w);
        self.mean += &y_w * self.sigma;

        let whitened = match Eigensystem::new(&self.covariance, RACELINE_CMA_EIGEN_FLOOR) {
            Ok(eigen) => eigen.whiten(&y_w),
            Err(e) => {
                warn!(error = %e, "covariance decomposition failed, resetting");
                self.reset();
                return;
            }
        };

        let cs = r.c_sigma;
        self.p_sigma = &self.p_sigma * (1. - cs) + whitened * (cs * (2. - cs) * r.mu_eff).sqrt();

        let ps_norm = self.p_sigma.norm();
        let decay = (1. - (1. - cs).powi(2 * (self.generation as i32 + 1))).sqrt();
        let h_sigma = ps_norm / decay / r.expected_norm < 1.4 + 2. / (nf + 1.);
        let h = if h_sigma { 1. } else { 0. };

        let cc = r.c_c;
        self.p_c = &self.p_c * (1. - cc) + &y_w * (h * (cc * (2. - cc) * r.mu_eff).sqrt());

        let mut rank_mu = DMatrix::<f64>::zeros(n, n);
        for (w, y) in weights.iter().zip(steps) {
            rank_mu += y * y.transpose() * *w;
        }
        let correction = (1. - h) * cc * (2. - cc);
        let rank_one = &self.p_c * self.p_c.transpose() + &self.covariance * correction;
        let covariance = &self.covariance * (1. - r.c_1 - r.c_mu)
            + rank_one * r.c_1
            + rank_mu * r.c_mu;
        self.covariance = (&covariance + covariance.transpose()) * 0.5;

        self.sigma = (self.sigma * ((cs / r.d_sigma) * (ps_norm / r.expected_norm - 1.)).exp())
            .clamp(cma.min_step_size, cma.max_step_size);
        self.generation += 1;

        if !self.is_finite() {
            warn!(
                generation = self.generation,
                "search distribution is not finite, resetting"
            );
            self.reset();
        }
    }
}

impl Strategy for CovarianceAdaptation {
    fn with_config(config: SearchConfig) -> Self {
        Self::new(config, CmaConfig::default())
    }

    fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn seed(&mut self, evaluator: &Evaluator, rng: &mut WyRng) -> Result<Population> {
        self.cma.validate()?;
        let population = seeded(&self.config, evaluator, rng)?;

        let group = self.config.weight_group_size;
        let samples = population
            .iter()
            .map(|c| genes(c.weights(), group))
            .collect::<Vec<_>>();
        self.state = SampleStatistics::estimate(&samples).map(|stats| {
            let n = stats.mean.len();
            let sigma = self
                .cma
                .initial_step_size
                .unwrap_or(self.config.standard_deviation)
                .clamp(self.cma.min_step_size, self.cma.max_step_size);

            // σ² C = Σ + εI
            let regularisation = DMatrix::<f64>::identity(n, n) * self.cma.regularisation;
            let covariance = (stats.covariance + regularisation) / (sigma * sigma);

            State::new(
                Rates::new(n, self.config.population_size),
                stats.mean,
                sigma,
                covariance,
            )
        });

        Ok(population)
    }

    fn step(
        &mut self,
        population: Population,
        evaluator: &Evaluator,
        rng: &mut WyRng,
    ) -> Result<Population> {
        let Some(state) = self.state.as_mut() else {
            return Ok(population);
        };
        let n = state.mean.len();
        if n == 0 {
            return Ok(population);
        }

        let group = self.config.weight_group_size;
        let len = evaluator.dimension();

        if let Some(stats) = SampleStatistics::estimate(
            &population
                .iter()
                .map(|c| genes(c.weights(), group))
                .collect::<Vec<_>>(),
        ) {
            debug!(
                spread = stats.covariance.trace(),
                "population gene statistics"
            );
        }

        let eigen = Eigensystem::new(&state.covariance, RACELINE_CMA_EIGEN_FLOOR)?;
        debug!(
            sigma = state.sigma,
            trace = state.covariance.trace(),
            condition = eigen.condition(),
            "sampling"
        );

        let offspring = (0..self.config.population_size)
            .map(|_| {
                let z = DVector::from_fn(n, |_, _| rng.sample::<f64, _>(StandardNormal));
                let x = (&state.mean + eigen.transform(&z) * state.sigma).map(|v| v.clamp(0., 1.));
                finish(
                    broadcast(x.as_slice(), len, group),
                    self.config.smoothing.as_ref(),
                )
                    .map(Candidate::new)
            })
            .collect::<Result<Vec<_>>>()?;
        evaluator.score_all(&offspring);

        let mut ranked = offspring
            .iter()
            .filter_map(|c| c.lap_time().map(|t| (c, t)))
            .collect::<Vec<_>>();
        ranked.sort_by(|(_, l), (_, r)| l.total_cmp(r));

        if ranked.is_empty() {
            warn!("every sampled candidate failed, distribution unchanged");
        } else {
            // displacement of what was actually evaluated, after clamping and smoothing
            let steps = ranked
                .iter()
                .map(|(c, _)| {
                    (DVector::from_vec(genes(c.weights(), group)) - &state.mean) / state.sigma
                })
                .collect::<Vec<_>>();
            state.update(&steps, &self.cma);
        }

        let mut members = population.with_offspring(offspring).into_members();
        members.sort_by(|l, r| match (l.fitness(), r.fitness()) {
            (Some(l), Some(r)) => l.rank(&r),
            (Some(_), None) => core::cmp::Ordering::Less,
            (None, Some(_)) => core::cmp::Ordering::Greater,
            (None, None) => core::cmp::Ordering::Equal,
        });
        members.truncate(self.config.population_size);
        Ok(Population::new(members))
    }
}
