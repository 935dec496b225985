use anyhow::{Context, Result};
use kutta_core::simulation::{SimulationSettings, DIVERGENCE_THRESHOLD};
use kutta_core::solvers::Method;
use kutta_core::systems::{Decay, Lorenz};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Run parameters. Every section and field is optional in the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub decay: DecayConfig,
    pub lorenz: LorenzConfig,
    pub butterfly: ButterflyConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecayConfig {
    pub x0: f64,
    pub step_size: f64,
    pub steps: usize,
    pub rate: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            x0: 1.0,
            step_size: 0.1,
            steps: 20,
            rate: 1.0,
        }
    }
}

impl DecayConfig {
    pub fn system(&self) -> Decay {
        Decay::new(self.rate)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LorenzConfig {
    pub initial_state: Vec<f64>,
    pub step_size: f64,
    pub steps: usize,
    pub discard: usize,
    pub method: Method,
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
    pub divergence_threshold: f64,
}

impl Default for LorenzConfig {
    fn default() -> Self {
        let lorenz = Lorenz::default();
        Self {
            initial_state: vec![0.1, 0.0, 0.0],
            step_size: 0.001,
            steps: 40_000,
            discard: 2_000,
            method: Method::Rk4,
            sigma: lorenz.sigma,
            rho: lorenz.rho,
            beta: lorenz.beta,
            divergence_threshold: DIVERGENCE_THRESHOLD,
        }
    }
}

impl LorenzConfig {
    pub fn system(&self) -> Lorenz {
        Lorenz::new(self.sigma, self.rho, self.beta)
    }

    pub fn settings(&self) -> SimulationSettings {
        SimulationSettings {
            discard: self.discard,
            divergence_threshold: self.divergence_threshold,
            ..SimulationSettings::new(self.method, self.step_size, self.steps)
        }
    }
}

/// The butterfly comparison reuses `[lorenz]` for the system and the run;
/// only the perturbation and the discard prefix are its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ButterflyConfig {
    /// Added to the first component of the second trajectory's initial state.
    pub perturbation: f64,
    pub discard: usize,
}

impl Default for ButterflyConfig {
    fn default() -> Self {
        Self {
            perturbation: 1e-9,
            discard: 0,
        }
    }
}

impl ButterflyConfig {
    /// Initial states of the reference and the perturbed trajectory.
    pub fn initial_states(&self, lorenz: &LorenzConfig) -> (Vec<f64>, Vec<f64>) {
        let first = lorenz.initial_state.clone();
        let mut second = first.clone();
        if let Some(x) = second.first_mut() {
            *x += self.perturbation;
        }
        (first, second)
    }

    pub fn settings(&self, lorenz: &LorenzConfig) -> SimulationSettings {
        SimulationSettings {
            discard: self.discard,
            ..lorenz.settings()
        }
    }
}

impl Config {
    /// Loads `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}.", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Unable to parse config file {}.", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
