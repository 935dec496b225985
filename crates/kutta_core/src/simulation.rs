//! Fixed-step simulation driver.
//!
//! [`simulate`] advances a system for a fixed number of steps, optionally
//! dropping a warm-up prefix, and stops early when the divergence guard trips.

use crate::solvers::Method;
use crate::state::StateVector;
use crate::traits::{DynamicalSystem, Steppable};
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Components larger than this in magnitude are treated as numerical blow-up.
pub const DIVERGENCE_THRESHOLD: f64 = 1e6;

/// Upper bound on the points reserved up front; longer runs grow on demand.
pub(crate) const MAX_PREALLOCATED_POINTS: usize = 1 << 16;

/// Settings controlling a fixed-step run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub method: Method,
    pub step_size: f64,
    pub steps: usize,
    /// Number of leading states that are integrated but not recorded.
    pub discard: usize,
    pub divergence_threshold: f64,
    pub initial_time: f64,
}

impl SimulationSettings {
    /// A run of `steps` steps from t = 0 that records every state and uses
    /// [`DIVERGENCE_THRESHOLD`] as its guard.
    pub fn new(method: Method, step_size: f64, steps: usize) -> Self {
        Self {
            method,
            step_size,
            steps,
            discard: 0,
            divergence_threshold: DIVERGENCE_THRESHOLD,
            initial_time: 0.0,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            bail!("Step size must be positive and finite.");
        }
        if self.divergence_threshold.is_nan() || self.divergence_threshold <= 0.0 {
            bail!("Divergence threshold must be positive.");
        }
        Ok(())
    }

    /// Number of points a run retains if the guard never trips.
    pub fn expected_points(&self) -> usize {
        self.steps.saturating_sub(self.discard)
    }

    pub(crate) fn initial_capacity(&self) -> usize {
        self.expected_points().min(MAX_PREALLOCATED_POINTS)
    }
}

/// Ordered (time, state) samples of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<StateVector<f64>>,
}

impl Trajectory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, t: f64, state: StateVector<f64>) {
        self.times.push(t);
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn last(&self) -> Option<(f64, &StateVector<f64>)> {
        self.times.last().copied().zip(self.states.last())
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunStatus {
    /// All requested steps were taken.
    Completed,
    /// The state produced by step `step` (1-based) at `time` left the guard's bounds.
    Diverged { step: usize, time: f64 },
}

impl RunStatus {
    pub fn is_diverged(&self) -> bool {
        matches!(self, RunStatus::Diverged { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub trajectory: Trajectory,
    pub status: RunStatus,
    pub steps_taken: usize,
}

impl SimulationReport {
    pub fn points(&self) -> usize {
        self.trajectory.len()
    }
}

/// Runs `settings.steps` fixed steps of `system` from `initial_state`.
///
/// Before each step the current state is recorded unless it falls inside the
/// warm-up prefix. After each step the new state is checked against the
/// divergence threshold; a state outside it ends the run with
/// [`RunStatus::Diverged`] and is not recorded.
pub fn simulate<S>(
    system: &S,
    initial_state: &[f64],
    settings: &SimulationSettings,
) -> Result<SimulationReport>
where
    S: DynamicalSystem<f64>,
{
    settings.validate()?;
    let dim = system.dimension();
    if dim == 0 {
        bail!("System has zero dimension.");
    }
    if initial_state.len() != dim {
        bail!(
            "Initial state dimension mismatch. Expected {}, got {}.",
            dim,
            initial_state.len()
        );
    }

    debug!(
        "simulating {} steps of size {} with {:?} (discard {})",
        settings.steps, settings.step_size, settings.method, settings.discard
    );

    let h = settings.step_size;
    let mut trajectory = Trajectory::with_capacity(settings.initial_capacity());
    let mut state = StateVector::from_slice(initial_state);
    let mut status = RunStatus::Completed;
    let mut steps_taken = 0usize;

    for i in 0..settings.steps {
        let t = settings.initial_time + i as f64 * h;
        if i >= settings.discard {
            trajectory.push(t, state.clone());
        }

        state = settings
            .method
            .step(system, &state, h)
            .with_context(|| format!("Integration failed at step {}.", i + 1))?;
        steps_taken += 1;

        if !state.is_bounded_by(settings.divergence_threshold) {
            let time = t + h;
            warn!(
                "state exploded at step {} (t = {}), max |x| = {:e}; stopping early",
                steps_taken,
                time,
                state.max_abs()
            );
            status = RunStatus::Diverged {
                step: steps_taken,
                time,
            };
            break;
        }
    }

    info!(
        "simulation finished after {} steps with {} points",
        steps_taken,
        trajectory.len()
    );

    Ok(SimulationReport {
        trajectory,
        status,
        steps_taken,
    })
}
