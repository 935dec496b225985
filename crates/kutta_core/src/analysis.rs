use crate::{
    simulation::{RunStatus, SimulationSettings, Trajectory, MAX_PREALLOCATED_POINTS},
    solvers::{euler_step, rk4_step},
    state::StateVector,
    systems::Decay,
    traits::{DynamicalSystem, Steppable},
};
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// One line of the Euler / RK4 / exact comparison for exponential decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayRow {
    pub t: f64,
    pub euler: f64,
    pub rk4: f64,
    pub exact: f64,
}

impl DecayRow {
    pub fn euler_error(&self) -> f64 {
        (self.euler - self.exact).abs()
    }

    pub fn rk4_error(&self) -> f64 {
        (self.rk4 - self.exact).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayComparison {
    pub step_size: f64,
    /// Row `i` holds both approximations after `i` steps, so there are `steps + 1` rows.
    pub rows: Vec<DecayRow>,
}

impl DecayComparison {
    pub fn final_row(&self) -> Option<&DecayRow> {
        self.rows.last()
    }
}

/// Integrates dx/dt = -rate * x with Euler and RK4 side by side.
pub fn compare_decay(
    decay: &Decay,
    x0: f64,
    step_size: f64,
    steps: usize,
) -> Result<DecayComparison> {
    if !step_size.is_finite() || step_size <= 0.0 {
        bail!("Step size must be positive and finite.");
    }
    if !x0.is_finite() {
        bail!("Initial value must be finite.");
    }

    let f = |x: f64| decay.derivative(x);
    let mut rows = Vec::with_capacity(steps.saturating_add(1).min(MAX_PREALLOCATED_POINTS));
    let mut x_euler = x0;
    let mut x_rk4 = x0;

    for i in 0..=steps {
        let t = i as f64 * step_size;
        rows.push(DecayRow {
            t,
            euler: x_euler,
            rk4: x_rk4,
            exact: decay.exact(x0, t),
        });
        x_euler = euler_step(f, x_euler, step_size);
        x_rk4 = rk4_step(f, x_rk4, step_size);
    }

    Ok(DecayComparison { step_size, rows })
}

/// Two nearby trajectories advanced in lockstep, with their separation over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationReport {
    pub first: Trajectory,
    pub second: Trajectory,
    pub times: Vec<f64>,
    pub distances: Vec<f64>,
    pub status: RunStatus,
    pub steps_taken: usize,
}

impl SeparationReport {
    pub fn points(&self) -> usize {
        self.distances.len()
    }

    pub fn final_distance(&self) -> Option<f64> {
        self.distances.last().copied()
    }
}

/// Advances two independently initialised states of the same system with the
/// same method and step size, recording the distance between them.
///
/// Recording, warm-up discard and the divergence guard follow
/// [`crate::simulation::simulate`]; if either state leaves the guard's bounds
/// the comparison stops with [`RunStatus::Diverged`].
pub fn compare_trajectories<S>(
    system: &S,
    first_initial: &[f64],
    second_initial: &[f64],
    settings: &SimulationSettings,
) -> Result<SeparationReport>
where
    S: DynamicalSystem<f64>,
{
    settings.validate()?;
    let dim = system.dimension();
    if dim == 0 {
        bail!("System has zero dimension.");
    }
    if first_initial.len() != dim || second_initial.len() != dim {
        bail!(
            "Initial state dimension mismatch. Expected {}, got {} and {}.",
            dim,
            first_initial.len(),
            second_initial.len()
        );
    }

    let h = settings.step_size;
    let capacity = settings.initial_capacity();
    let mut first = Trajectory::with_capacity(capacity);
    let mut second = Trajectory::with_capacity(capacity);
    let mut times = Vec::with_capacity(capacity);
    let mut distances = Vec::with_capacity(capacity);
    let mut a = StateVector::from_slice(first_initial);
    let mut b = StateVector::from_slice(second_initial);
    let mut status = RunStatus::Completed;
    let mut steps_taken = 0usize;

    debug!(
        "comparing trajectories separated by {:e}",
        a.distance(&b)?
    );

    for i in 0..settings.steps {
        let t = settings.initial_time + i as f64 * h;
        if i >= settings.discard {
            times.push(t);
            distances.push(a.distance(&b)?);
            first.push(t, a.clone());
            second.push(t, b.clone());
        }

        a = settings
            .method
            .step(system, &a, h)
            .with_context(|| {
                format!("Integration of first trajectory failed at step {}.", i + 1)
            })?;
        b = settings
            .method
            .step(system, &b, h)
            .with_context(|| {
                format!("Integration of second trajectory failed at step {}.", i + 1)
            })?;
        steps_taken += 1;

        let threshold = settings.divergence_threshold;
        if !a.is_bounded_by(threshold) || !b.is_bounded_by(threshold) {
            let time = t + h;
            warn!(
                "state exploded at step {} (t = {}); stopping comparison early",
                steps_taken, time
            );
            status = RunStatus::Diverged {
                step: steps_taken,
                time,
            };
            break;
        }
    }

    Ok(SeparationReport {
        first,
        second,
        times,
        distances,
        status,
        steps_taken,
    })
}

/// Least-squares slope of ln(distance) against time.
///
/// For chaotic systems and separations far below the attractor size this
/// estimates the largest Lyapunov exponent. Zero distances are skipped; returns
/// `None` when fewer than two usable samples remain or all times coincide.
pub fn separation_growth_rate(times: &[f64], distances: &[f64]) -> Option<f64> {
    let samples: Vec<(f64, f64)> = times
        .iter()
        .zip(distances)
        .filter(|(_, d)| **d > 0.0 && d.is_finite())
        .map(|(&t, &d)| (t, d.ln()))
        .collect();
    if samples.len() < 2 {
        return None;
    }

    let n = samples.len() as f64;
    let mean_t = samples.iter().map(|(t, _)| t).sum::<f64>() / n;
    let mean_y = samples.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (t, y) in &samples {
        cov += (t - mean_t) * (y - mean_y);
        var += (t - mean_t) * (t - mean_t);
    }
    if var == 0.0 {
        return None;
    }
    Some(cov / var)
}
