//! Centralized defaults for the racing line search.
//!
//! Every tunable carries the `RACELINE_` prefix. None of these are read as globals by the
//! simulation itself: they only seed the `Default` impls of [crate::Car], [crate::Environment],
//! [crate::SearchConfig] and [crate::CmaConfig], which are then passed around explicitly.

// ============================================================================
// Environment
// ============================================================================

/// Density of air in kg/m^3
pub const RACELINE_AIR_DENSITY: f64 = 1.19;

/// Gravitational acceleration in m/s^2
pub const RACELINE_GRAVITY: f64 = 9.81;

// ============================================================================
// Car
// ============================================================================

/// Top speed in m/s
pub const RACELINE_CAR_MAX_VELOCITY: f64 = 100.0;

/// Peak longitudinal acceleration in m/s^2, before velocity derating
pub const RACELINE_CAR_MAX_ACCELERATION: f64 = 10.0;

/// Tyre friction coefficient
pub const RACELINE_CAR_FRICTION: f64 = 1.6;

/// Mass in kg
pub const RACELINE_CAR_MASS: f64 = 740.0;

pub const RACELINE_CAR_DRAG_COEFFICIENT: f64 = 1.0;

/// Frontal area in m^2
pub const RACELINE_CAR_FRONTAL_AREA: f64 = 1.5;

/// Engine power at the bottom of the rev range, in W
pub const RACELINE_CAR_BASE_POWER: f64 = 300_000.0;

/// Peak engine power, in W
pub const RACELINE_CAR_MAX_POWER: f64 = 560_000.0;

/// Lower edges of the engine power bands in m/s, paired with the blend fraction from base to
/// max power applied inside that band
pub const RACELINE_POWER_BANDS: [(f64, f64); 5] =
    [(0.0, 0.2), (10.0, 0.5), (40.0, 0.7), (70.0, 0.9), (90.0, 1.0)];

/// Lower edges of the acceleration derating bands as fractions of max velocity, paired with
/// the multiplier applied to max acceleration inside that band
pub const RACELINE_ACCELERATION_BANDS: [(f64, f64); 4] =
    [(0.0, 0.75), (0.1, 1.0), (0.4, 0.45), (0.7, 0.3)];

/// Velocity used in place of a standing start when dividing power by velocity
pub const RACELINE_POWER_VELOCITY_FLOOR: f64 = 1.0;

/// Upper bound on backward braking passes around a closed lap. Braking carried past the start
/// line lowers the first entry speed, which in turn can require braking at the end of the lap.
pub const RACELINE_BRAKING_PASSES: usize = 4;

// ============================================================================
// Search
// ============================================================================

pub const RACELINE_POPULATION_SIZE: usize = 50;

pub const RACELINE_ITERATIONS: usize = 5;

pub const RACELINE_NUM_OFFSPRING: usize = 50;

/// Number of consecutive path vertices sharing one random draw
pub const RACELINE_WEIGHT_GROUP_SIZE: usize = 20;

/// Savitzky-Golay window length, must be odd
pub const RACELINE_SMOOTHING_WINDOW: usize = 9;

/// Savitzky-Golay polynomial order
pub const RACELINE_SMOOTHING_ORDER: usize = 1;

pub const RACELINE_MUTATION_FACTOR: f64 = 0.5;

pub const RACELINE_STANDARD_DEVIATION: f64 = 0.3;

/// Added to every roulette weight so that no candidate has zero chance of selection
pub const RACELINE_SELECTION_EPSILON: f64 = 1e-9;

// ============================================================================
// Covariance adaptation
// ============================================================================

/// Smallest step size before it is clamped
pub const RACELINE_CMA_SIGMA_MIN: f64 = 1e-8;

/// Largest step size; weights live in [0, 1] so anything wider only samples the clamp
pub const RACELINE_CMA_SIGMA_MAX: f64 = 1.0;

/// Added to the diagonal of the seeded covariance estimate so it stays positive definite
pub const RACELINE_CMA_REGULARISATION: f64 = 1e-6;

/// Smallest eigenvalue kept when taking square roots of the covariance
pub const RACELINE_CMA_EIGEN_FLOOR: f64 = 1e-20;
