//! Quasi-static vehicle model. Every sector is treated on its own: the car may use whatever
//! friction is left over from cornering to accelerate or brake, bounded by a friction circle.

use crate::{
    constants::*,
    error::{RacingError, Result},
    track::Sector,
};
use serde::{Deserialize, Serialize};

/// Physical constants of the world the car drives in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// kg/m^3
    pub air_density: f64,
    /// m/s^2
    pub gravity: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            air_density: RACELINE_AIR_DENSITY,
            gravity: RACELINE_GRAVITY,
        }
    }
}

impl Environment {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("air_density", self.air_density), ("gravity", self.gravity)] {
            if !v.is_finite() || v < 0. {
                return Err(RacingError::InvalidConfig(format!(
                    "environment {name} must be finite and non-negative, got {v}"
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Car {
    /// m/s
    pub max_velocity: f64,
    /// m/s^2, before derating by velocity
    pub max_acceleration: f64,
    pub friction: f64,
    /// kg
    pub mass: f64,
    pub drag_coefficient: f64,
    /// m^2
    pub frontal_area: f64,
    /// W
    pub base_power: f64,
    /// W
    pub max_power: f64,
}

impl Default for Car {
    fn default() -> Self {
        Self {
            max_velocity: RACELINE_CAR_MAX_VELOCITY,
            max_acceleration: RACELINE_CAR_MAX_ACCELERATION,
            friction: RACELINE_CAR_FRICTION,
            mass: RACELINE_CAR_MASS,
            drag_coefficient: RACELINE_CAR_DRAG_COEFFICIENT,
            frontal_area: RACELINE_CAR_FRONTAL_AREA,
            base_power: RACELINE_CAR_BASE_POWER,
            max_power: RACELINE_CAR_MAX_POWER,
        }
    }
}

/// Find the value paired with the highest band edge at or below `x`
#[inline]
fn band<const N: usize>(bands: &[(f64, f64); N], x: f64) -> f64 {
    bands
        .iter()
        .rev()
        .find_map(|(edge, v)| (x >= *edge).then_some(*v))
        .unwrap_or(bands[0].1)
}

impl Car {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_velocity", self.max_velocity),
            ("max_acceleration", self.max_acceleration),
            ("friction", self.friction),
            ("mass", self.mass),
            ("drag_coefficient", self.drag_coefficient),
            ("frontal_area", self.frontal_area),
            ("base_power", self.base_power),
            ("max_power", self.max_power),
        ];
        for (name, v) in fields {
            if !v.is_finite() || v < 0. {
                return Err(RacingError::InvalidConfig(format!(
                    "car {name} must be finite and non-negative, got {v}"
                )));
            }
        }
        if self.mass == 0. {
            return Err(RacingError::InvalidConfig("car mass must be positive".into()));
        }

        Ok(())
    }

    /// Engine power output in W, stepping from base towards max power as velocity climbs
    pub fn engine_power(&self, velocity: f64) -> f64 {
        self.base_power + band(&RACELINE_POWER_BANDS, velocity) * (self.max_power - self.base_power)
    }

    /// Usable acceleration in m/s^2 at `velocity`, derated at the ends of the speed range and
    /// zero past max velocity
    pub fn max_acceleration(&self, velocity: f64) -> f64 {
        if velocity > self.max_velocity {
            return 0.;
        }

        let fraction = if self.max_velocity > 0. {
            velocity / self.max_velocity
        } else {
            0.
        };
        self.max_acceleration * band(&RACELINE_ACCELERATION_BANDS, fraction)
    }

    /// Aerodynamic drag in N at `velocity`
    #[inline]
    pub fn drag_force(&self, velocity: f64, env: &Environment) -> f64 {
        self.drag_term(env) * velocity * velocity
    }

    #[inline]
    fn drag_term(&self, env: &Environment) -> f64 {
        0.5 * self.drag_coefficient * env.air_density * self.frontal_area
    }

    /// Total grip in N shared between cornering and braking
    #[inline]
    pub fn total_force(&self, env: &Environment) -> f64 {
        self.friction * self.mass * env.gravity
    }

    /// Highest speed the tyres can hold through `sector`, never above max velocity
    pub fn max_cornering_velocity(&self, sector: &Sector, env: &Environment) -> f64 {
        let radius = sector.radius();
        if radius.is_infinite() {
            return self.max_velocity;
        }

        let drag = self.drag_term(env);
        let denominator = ((self.mass / radius).powi(2) + drag * drag).powf(0.25);
        let velocity = self.total_force(env).sqrt() / denominator;
        if velocity.is_nan() {
            0.
        } else {
            velocity.min(self.max_velocity)
        }
    }

    /// Highest speed reachable at the end of `sector` when entering at `entry_velocity` under
    /// full power
    pub fn exit_velocity(&self, sector: &Sector, entry_velocity: f64, env: &Environment) -> f64 {
        let p_velocity = if entry_velocity == 0. {
            RACELINE_POWER_VELOCITY_FLOOR
        } else {
            entry_velocity
        };

        let acceleration = ((self.engine_power(entry_velocity) / p_velocity)
            - self.drag_force(entry_velocity, env))
            / self.mass;
        let acceleration = acceleration.min(self.max_acceleration(entry_velocity));

        let v_squared = entry_velocity * entry_velocity + 2. * acceleration * sector.length();
        v_squared.max(0.).sqrt().min(self.max_velocity)
    }

    /// Highest speed the car may enter `sector` with and still brake down to `exit_velocity` by
    /// its end. Fails when cornering at `exit_velocity` alone already needs more grip than the
    /// tyres have.
    pub fn entry_velocity(
        &self,
        sector: &Sector,
        exit_velocity: f64,
        env: &Environment,
    ) -> Result<f64> {
        let total = self.total_force(env);
        let centripetal = self.mass * exit_velocity * exit_velocity / sector.radius();
        if centripetal > total {
            return Err(RacingError::InfeasibleDynamics {
                centripetal,
                available: total,
            });
        }

        let braking = (total * total - centripetal * centripetal).sqrt();
        let decelerative = braking + self.drag_force(exit_velocity, env);
        let delta = 2. * sector.length() * decelerative / self.mass;

        Ok((exit_velocity * exit_velocity + delta)
            .sqrt()
            .min(self.max_velocity))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_f64_approx, track::Point};
    use core::f64::consts::PI;

    fn straight(length: f64) -> Sector {
        Sector::new(
            Point::new(0., 0., 0.),
            Point::new(length / 2., 0., 0.),
            Point::new(length, 0., 0.),
        )
    }

    fn arc(r: f64, span: f64) -> Sector {
        let at = |θ: f64| Point::new(r * θ.cos(), r * θ.sin(), 0.);
        Sector::new(at(0.), at(span / 2.), at(span))
    }

    #[test]
    fn test_engine_power_bands() {
        let car = Car {
            base_power: 100.,
            max_power: 200.,
            ..Car::default()
        };
        for (v, want) in [
            (0., 120.),
            (9.99, 120.),
            (10., 150.),
            (39., 150.),
            (40., 170.),
            (70., 190.),
            (89.9, 190.),
            (90., 200.),
            (500., 200.),
        ] {
            assert_f64_approx!(car.engine_power(v), want, 1e-9, format!("at {v}"));
        }
    }

    #[test]
    fn test_max_acceleration_bands() {
        let car = Car {
            max_velocity: 100.,
            max_acceleration: 10.,
            ..Car::default()
        };
        for (v, want) in [
            (0., 7.5),
            (5., 7.5),
            (10., 10.),
            (39.9, 10.),
            (40., 4.5),
            (70., 3.),
            (100., 3.),
            (100.1, 0.),
        ] {
            assert_f64_approx!(car.max_acceleration(v), want, 1e-9, format!("at {v}"));
        }
    }

    #[test]
    fn test_straight_corners_at_max_velocity() {
        let env = Environment::default();
        for (friction, mass) in [(0.1, 10.), (1.6, 740.), (3., 5000.)] {
            let car = Car {
                friction,
                mass,
                ..Car::default()
            };
            assert_eq!(
                car.max_cornering_velocity(&straight(20.), &env),
                car.max_velocity
            );
        }
    }

    #[test]
    fn test_cornering_velocity_formula() {
        let env = Environment::default();
        let car = Car::default();
        let r = 50.;
        let drag = 0.5 * car.drag_coefficient * env.air_density * car.frontal_area;
        let want = (car.friction * car.mass * env.gravity).sqrt()
            / ((car.mass / r).powi(2) + drag * drag).powf(0.25);
        assert_f64_approx!(car.max_cornering_velocity(&arc(r, 0.3), &env), want, 1e-6);
        assert!(want < car.max_velocity);
    }

    #[test]
    fn test_cornering_velocity_grows_with_radius() {
        let env = Environment::default();
        let car = Car::default();
        let tight = car.max_cornering_velocity(&arc(15., 0.5), &env);
        let wide = car.max_cornering_velocity(&arc(150., 0.5), &env);
        assert!(tight < wide);
    }

    #[test]
    fn test_exit_velocity_standing_start() {
        let env = Environment::default();
        let car = Car::default();
        let v = car.exit_velocity(&straight(10.), 0., &env);
        // launch is traction limited, not power limited
        let want = (2. * car.max_acceleration(0.) * 10.).sqrt();
        assert_f64_approx!(v, want, 1e-9);
    }

    #[test]
    fn test_exit_velocity_capped() {
        let env = Environment::default();
        let car = Car::default();
        assert_eq!(
            car.exit_velocity(&straight(10_000.), 50., &env),
            car.max_velocity
        );
        assert!(car.exit_velocity(&straight(10.), 20., &env) > 20.);
    }

    #[test]
    fn test_exit_velocity_drag_never_nan() {
        let env = Environment::default();
        let car = Car {
            base_power: 0.,
            max_power: 0.,
            ..Car::default()
        };
        let v = car.exit_velocity(&straight(1_000.), 80., &env);
        assert!(v.is_finite());
        assert!(v < 80.);
    }

    #[test]
    fn test_entry_velocity_braking() {
        let env = Environment::default();
        let car = Car::default();
        let v = car.entry_velocity(&straight(50.), 20., &env).unwrap();
        assert!(v > 20.);
        assert!(v <= car.max_velocity);
        assert_eq!(
            car.entry_velocity(&straight(1e6), 20., &env).unwrap(),
            car.max_velocity
        );
    }

    #[test]
    fn test_entry_velocity_infeasible() {
        let env = Environment::default();
        let car = Car::default();
        let sector = arc(10., PI / 4.);
        let too_fast = 2. * (car.friction * env.gravity * 10.).sqrt();
        assert!(matches!(
            car.entry_velocity(&sector, too_fast, &env),
            Err(RacingError::InfeasibleDynamics { .. })
        ));
        let cornering = car.max_cornering_velocity(&sector, &env);
        assert!(car.entry_velocity(&sector, cornering, &env).is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(Car::default().validate().is_ok());
        assert!(Car {
            mass: 0.,
            ..Car::default()
        }
        .validate()
        .is_err());
        assert!(Car {
            friction: f64::NAN,
            ..Car::default()
        }
        .validate()
        .is_err());

        assert!(Environment::default().validate().is_ok());
        assert!(Environment {
            gravity: f64::INFINITY,
            ..Environment::default()
        }
        .validate()
        .is_err());
    }
}
