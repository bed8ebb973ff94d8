//! Two pass velocity profile over the sectors of a racing line. The forward pass accelerates
//! as hard as power, traction and cornering grip allow; the backward pass then pulls speeds
//! down ahead of every corner the car could not otherwise brake for.

use crate::{
    car::{Car, Environment},
    constants::RACELINE_BRAKING_PASSES,
    error::{RacingError, Result},
    track::{RacingLine, Sector},
};
use serde::{Deserialize, Serialize};

/// How the car crosses the start of the line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Launch {
    /// Start at a fixed speed and cross the line again no faster than it, so the lap can be
    /// driven back to back
    Standing { velocity: f64 },
    /// Start at whatever speed a lap from rest carries over the line
    Flying,
}

impl Default for Launch {
    fn default() -> Self {
        Self::Standing { velocity: 0. }
    }
}

/// Per sector velocities and timings of a single lap, for anyone who wants more than the total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LapProfile {
    pub entry_velocities: Vec<f64>,
    pub exit_velocities: Vec<f64>,
    pub sector_times: Vec<f64>,
    /// Distance covered by the end of each sector
    pub distances: Vec<f64>,
}

impl LapProfile {
    #[inline]
    pub fn lap_time(&self) -> f64 {
        self.sector_times.iter().sum()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sector_times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sector_times.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LapTimeCalculator {
    car: Car,
    env: Environment,
}

impl LapTimeCalculator {
    pub fn new(car: Car, env: Environment) -> Self {
        Self { car, env }
    }

    #[inline]
    pub fn car(&self) -> &Car {
        &self.car
    }

    #[inline]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn lap_time(&self, line: &RacingLine, launch: Launch) -> Result<f64> {
        Ok(self.profile(line, launch)?.lap_time())
    }

    pub fn profile(&self, line: &RacingLine, launch: Launch) -> Result<LapProfile> {
        self.profile_sectors(&line.sectors(), launch)
    }

    pub fn profile_sectors(&self, sectors: &[Sector], launch: Launch) -> Result<LapProfile> {
        if sectors.is_empty() {
            return Ok(LapProfile::default());
        }

        let start = match launch {
            Launch::Standing { velocity } => velocity,
            Launch::Flying => *self.forward(sectors, 0.).1.last().unwrap_or(&0.),
        };

        let (mut entry, mut exit) = self.forward(sectors, start);
        self.backward(sectors, &mut entry, &mut exit)?;

        let sector_times = sectors
            .iter()
            .zip(entry.iter().zip(&exit))
            .enumerate()
            .map(|(idx, (sector, (v_in, v_out)))| {
                let length = sector.length();
                if length == 0. {
                    Ok(0.)
                } else if v_in + v_out <= 0. {
                    Err(RacingError::Numerical(format!(
                        "car is stationary through sector {idx}"
                    )))
                } else {
                    Ok(2. * length / (v_in + v_out))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let distances = sectors
            .iter()
            .scan(0., |acc, sector| {
                *acc += sector.length();
                Some(*acc)
            })
            .collect();

        Ok(LapProfile {
            entry_velocities: entry,
            exit_velocities: exit,
            sector_times,
            distances,
        })
    }

    /// Accelerate through every sector in order, capped by each sector's cornering limit
    fn forward(&self, sectors: &[Sector], start: f64) -> (Vec<f64>, Vec<f64>) {
        let mut entries = Vec::with_capacity(sectors.len());
        let mut exits = Vec::with_capacity(sectors.len());
        let mut entry = start;
        for sector in sectors {
            let limit = self.car.max_cornering_velocity(sector, &self.env);
            let exit = self
                .car
                .exit_velocity(sector, entry, &self.env)
                .min(limit);
            entries.push(entry.min(limit));
            exits.push(exit);
            entry = exit;
        }

        (entries, exits)
    }

    /// Walk backwards, and wherever a sector leaves faster than the next one may be entered,
    /// brake within it. The last sector leads into the first, so the walk goes round again
    /// until braking no longer reaches across the start line.
    fn backward(
        &self,
        sectors: &[Sector],
        entries: &mut [f64],
        exits: &mut [f64],
    ) -> Result<()> {
        let n = sectors.len();
        for _ in 0..RACELINE_BRAKING_PASSES {
            let mut changed = false;
            let mut next = 0;
            for idx in (0..n).rev() {
                if exits[idx] > entries[next] {
                    let limit = self
                        .car
                        .entry_velocity(&sectors[idx], entries[next], &self.env)?;
                    if entries[idx] > limit {
                        entries[idx] = limit;
                    }
                    exits[idx] = entries[next];
                    changed = true;
                }
                next = idx;
            }
            if !changed {
                break;
            }
        }

        Ok(())
    }
}
