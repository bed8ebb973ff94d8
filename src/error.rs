//! Error kinds surfaced by the geometry, dynamics and search layers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RacingError {
    /// Boundary curves or weight vectors of unequal length
    #[error("{context}: expected {expected} points, found {found}")]
    GeometricMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// Centripetal demand exceeds the force the tyres can provide at this exit speed
    #[error("infeasible corner: centripetal force {centripetal:.1}N exceeds available {available:.1}N")]
    InfeasibleDynamics { centripetal: f64, available: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("total population lap time is zero, cannot weight selection")]
    ZeroFitness,

    #[error("no scored candidates left in the population")]
    EmptyPopulation,

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, RacingError>;

impl From<rulinalg::error::Error> for RacingError {
    fn from(e: rulinalg::error::Error) -> Self {
        Self::Numerical(e.to_string())
    }
}
