//! Concrete derivative functions.
//!
//! Each system only supplies `dx/dt`; the steppers in [`crate::solvers`] are
//! responsible for advancing the state.

use crate::traits::{DynamicalSystem, Scalar};
use serde::{Deserialize, Serialize};

/// Exponential decay, dx/dt = -rate * x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decay {
    pub rate: f64,
}

impl Default for Decay {
    fn default() -> Self {
        Self { rate: 1.0 }
    }
}

impl Decay {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// Scalar form of the vector field, suitable for the scalar steppers.
    pub fn derivative(&self, x: f64) -> f64 {
        -self.rate * x
    }

    /// Analytic solution x(t) = x0 * e^(-rate * t).
    pub fn exact(&self, x0: f64, t: f64) -> f64 {
        x0 * (-self.rate * t).exp()
    }
}

impl DynamicalSystem<f64> for Decay {
    fn dimension(&self) -> usize {
        1
    }

    fn apply(&self, x: &[f64], out: &mut [f64]) {
        out[0] = self.derivative(x[0]);
    }
}

/// The Lorenz system with parameters (sigma, rho, beta).
///
/// dx/dt = sigma * (y - x)
/// dy/dt = x * (rho - z) - y
/// dz/dt = x * y - beta * z
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lorenz {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for Lorenz {
    /// The classical chaotic parameters sigma=10, rho=28, beta=8/3.
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

impl Lorenz {
    pub fn new(sigma: f64, rho: f64, beta: f64) -> Self {
        Self { sigma, rho, beta }
    }
}

impl DynamicalSystem<f64> for Lorenz {
    fn dimension(&self) -> usize {
        3
    }

    fn apply(&self, x: &[f64], out: &mut [f64]) {
        let (px, py, pz) = (x[0], x[1], x[2]);
        out[0] = self.sigma * (py - px);
        out[1] = px * (self.rho - pz) - py;
        out[2] = px * py - self.beta * pz;
    }
}

/// Adapts a closure `f(x, out)` of fixed dimension into a [`DynamicalSystem`].
pub struct FnSystem<F> {
    dim: usize,
    f: F,
}

impl<F> FnSystem<F> {
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<T, F> DynamicalSystem<T> for FnSystem<F>
where
    T: Scalar,
    F: Fn(&[T], &mut [T]),
{
    fn dimension(&self) -> usize {
        self.dim
    }

    fn apply(&self, x: &[T], out: &mut [T]) {
        (self.f)(x, out)
    }
}
