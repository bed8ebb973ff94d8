#![allow(mixed_script_confusables)]
#![allow(confusable_idents)]

pub mod candidate;
pub mod car;
pub mod config;
pub mod constants;
pub mod error;
pub mod evaluate;
pub mod laptime;
pub mod linalg;
pub mod macros;
pub mod population;
pub mod random;
pub mod serde_traits;
pub mod smoothing;
pub mod strategy;
pub mod track;

#[cfg(test)]
pub(crate) mod fixtures;

pub use candidate::{Candidate, Fitness};
pub use car::{Car, Environment};
pub use config::{CmaConfig, SearchConfig};
pub use error::{RacingError, Result};
pub use evaluate::Evaluator;
pub use laptime::{LapProfile, LapTimeCalculator, Launch};
pub use population::Population;
pub use serde_traits::{FromFile, ToFile};
pub use smoothing::Smoothing;
pub use strategy::{CovarianceAdaptation, Evolutionary, Hook, Outcome, Stats, Strategy};
pub use track::{Point, RacingLine, Sector, Track};
