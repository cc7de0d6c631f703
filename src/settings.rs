//! Simulation settings types.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Default simulation timestep
pub const SIM_TIMESTEP: f64 = 0.01;

/// Default simulation duration
pub const SIM_DURATION: f64 = 10.0;

/// Time grid of a run
///
/// Settings describe the sampling of a run only; models are assembled in
/// code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Time of the first sample
    pub start: f64,

    /// Simulation duration
    pub duration: f64,

    /// Time step
    pub dt: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            start: 0.0,
            duration: SIM_DURATION,
            dt: SIM_TIMESTEP,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> SimResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::config(
                "settings",
                format!("dt must be positive and finite, got {}", self.dt),
            ));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(SimError::config(
                "settings",
                format!("duration must be non-negative and finite, got {}", self.duration),
            ));
        }
        if !self.start.is_finite() {
            return Err(SimError::config("settings", "start time must be finite"));
        }
        Ok(())
    }

    /// Number of samples in `[start, start + duration)`
    pub fn num_samples(&self) -> SimResult<usize> {
        self.validate()?;
        // Tolerate float noise so 1.0 / 0.1 yields 10 samples, not 11
        let n = (self.duration / self.dt - 1e-9).ceil();
        Ok(n.max(0.0) as usize)
    }

    /// Evenly spaced sample times, `start + k * dt`
    pub fn time_vector(&self) -> SimResult<Vec<f64>> {
        let n = self.num_samples()?;
        Ok((0..n).map(|k| self.start + k as f64 * self.dt).collect())
    }
}
