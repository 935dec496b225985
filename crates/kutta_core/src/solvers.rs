use crate::error::IntegrationError;
use crate::state::StateVector;
use crate::traits::{DynamicalSystem, Scalar, Steppable};
use serde::{Deserialize, Serialize};

fn two<T: Scalar>() -> T {
    T::one() + T::one()
}

fn six<T: Scalar>() -> T {
    two::<T>() + two::<T>() + two::<T>()
}

/// Explicit Euler step for a scalar ODE: x' = x + h*f(x).
pub fn euler_step<T: Scalar>(f: impl Fn(T) -> T, x: T, h: T) -> T {
    x + h * f(x)
}

/// Classic Runge-Kutta 4th order step for a scalar ODE.
pub fn rk4_step<T: Scalar>(f: impl Fn(T) -> T, x: T, h: T) -> T {
    let half = T::one() / two::<T>();

    // k1 = f(x)
    let k1 = f(x);
    // k2 = f(x + h*k1/2)
    let k2 = f(x + half * h * k1);
    // k3 = f(x + h*k2/2)
    let k3 = f(x + half * h * k2);
    // k4 = f(x + h*k3)
    let k4 = f(x + h * k3);

    // x_next = x + h/6 * (k1 + 2k2 + 2k3 + k4)
    x + (h / six::<T>()) * (k1 + two::<T>() * k2 + two::<T>() * k3 + k4)
}

/// Explicit Euler step for a vector-valued system.
pub fn euler_step_vec<T: Scalar, S: DynamicalSystem<T>>(
    system: &S,
    state: &StateVector<T>,
    h: T,
) -> Result<StateVector<T>, IntegrationError> {
    let k1 = system.evaluate(state)?;
    Ok(state + &(k1 * h))
}

/// Classic Runge-Kutta 4th order step for a vector-valued system.
///
/// Fails with [`IntegrationError::ShapeMismatch`] before evaluating anything if
/// `state` does not have the system's dimension.
pub fn rk4_step_vec<T: Scalar, S: DynamicalSystem<T>>(
    system: &S,
    state: &StateVector<T>,
    h: T,
) -> Result<StateVector<T>, IntegrationError> {
    let half_h = h / two::<T>();

    // k1 = f(y)
    let k1 = system.evaluate(state)?;
    // k2 = f(y + h*k1/2)
    let k2 = system.evaluate(&(state + &(&k1 * half_h)))?;
    // k3 = f(y + h*k2/2)
    let k3 = system.evaluate(&(state + &(&k2 * half_h)))?;
    // k4 = f(y + h*k3)
    let k4 = system.evaluate(&(state + &(&k3 * h)))?;

    // y_next = y + h/6 * (k1 + 2k2 + 2k3 + k4)
    let weighted = k1 + &(k2 * two::<T>()) + &(k3 * two::<T>()) + &k4;
    Ok(state + &(weighted * (h / six::<T>())))
}

/// Forward Euler Solver
#[derive(Debug, Clone, Copy, Default)]
pub struct Euler;

impl<T: Scalar> Steppable<T> for Euler {
    fn step(
        &self,
        system: &impl DynamicalSystem<T>,
        state: &StateVector<T>,
        h: T,
    ) -> Result<StateVector<T>, IntegrationError> {
        euler_step_vec(system, state, h)
    }
}

/// Classic Runge-Kutta 4th Order Solver
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4;

impl<T: Scalar> Steppable<T> for RK4 {
    fn step(
        &self,
        system: &impl DynamicalSystem<T>,
        state: &StateVector<T>,
        h: T,
    ) -> Result<StateVector<T>, IntegrationError> {
        rk4_step_vec(system, state, h)
    }
}

/// Integration method selectable at runtime, e.g. from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Euler,
    #[default]
    Rk4,
}

impl<T: Scalar> Steppable<T> for Method {
    fn step(
        &self,
        system: &impl DynamicalSystem<T>,
        state: &StateVector<T>,
        h: T,
    ) -> Result<StateVector<T>, IntegrationError> {
        match self {
            Method::Euler => Euler.step(system, state, h),
            Method::Rk4 => RK4.step(system, state, h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{euler_step, euler_step_vec, rk4_step, rk4_step_vec, Method};
    use crate::error::IntegrationError;
    use crate::state::StateVector;
    use crate::systems::{Decay, FnSystem, Lorenz};
    use crate::traits::Steppable;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn decay(x: f64) -> f64 {
        -x
    }

    fn zero_field(dim: usize) -> FnSystem<impl Fn(&[f64], &mut [f64])> {
        FnSystem::new(dim, |_x: &[f64], out: &mut [f64]| out.fill(0.0))
    }

    #[test]
    fn euler_step_matches_formula() {
        assert_relative_eq!(euler_step(decay, 1.0, 0.1), 0.9);
        assert_relative_eq!(euler_step(|x: f64| 2.0 * x + 1.0, 3.0, 0.5), 6.5);
    }

    #[test]
    fn rk4_step_matches_taylor_polynomial_for_decay() {
        let h: f64 = 0.1;
        let expected = 1.0 - h + h * h / 2.0 - h.powi(3) / 6.0 + h.powi(4) / 24.0;
        assert_relative_eq!(rk4_step(decay, 1.0, h), expected, epsilon = 1e-14);
    }

    #[test]
    fn rk4_local_error_is_smaller_than_euler() {
        for &h in &[0.5f64, 0.1, 0.01] {
            let exact = (-h).exp();
            let euler_err = (euler_step(decay, 1.0, h) - exact).abs();
            let rk4_err = (rk4_step(decay, 1.0, h) - exact).abs();
            assert!(rk4_err < euler_err, "h={h}: rk4 {rk4_err} vs euler {euler_err}");
        }
    }

    #[test]
    fn both_steppers_converge_as_step_shrinks() {
        let mut previous_euler = f64::INFINITY;
        let mut previous_rk4 = f64::INFINITY;
        for &steps in &[10usize, 20, 40, 80] {
            let h = 1.0 / steps as f64;
            let mut x_euler = 1.0;
            let mut x_rk4 = 1.0;
            for _ in 0..steps {
                x_euler = euler_step(decay, x_euler, h);
                x_rk4 = rk4_step(decay, x_rk4, h);
            }
            let exact = (-1.0f64).exp();
            let euler_err = (x_euler - exact).abs();
            let rk4_err = (x_rk4 - exact).abs();
            assert!(euler_err < previous_euler);
            assert!(rk4_err < previous_rk4);
            previous_euler = euler_err;
            previous_rk4 = rk4_err;
        }
    }

    #[test]
    fn twenty_decay_steps_reach_exact_value_at_two() {
        let h = 0.1;
        let mut x_euler = 1.0;
        let mut x_rk4 = 1.0;
        for _ in 0..20 {
            x_euler = euler_step(decay, x_euler, h);
            x_rk4 = rk4_step(decay, x_rk4, h);
        }
        let exact = (-2.0f64).exp();
        assert_abs_diff_eq!(exact, 0.13534, epsilon = 1e-5);
        assert!((x_rk4 - exact).abs() < 1e-5);
        let euler_err = (x_euler - exact).abs();
        assert!(euler_err < h && euler_err > h / 100.0);
    }

    #[test]
    fn zero_derivative_is_a_fixed_point() {
        for &h in &[1e-3, 0.1, 1.0, 25.0] {
            for &x in &[-3.5, 0.0, 42.0] {
                assert_eq!(euler_step(|_| 0.0, x, h), x);
                assert_eq!(rk4_step(|_| 0.0, x, h), x);
            }
        }
    }

    #[test]
    fn rk4_step_vec_leaves_state_unchanged_under_zero_field() {
        let state = StateVector::from([1.5, -2.0, 1e3, 0.0]);
        let next = rk4_step_vec(&zero_field(4), &state, 0.25).expect("dimensions agree");
        assert_eq!(next, state);
    }

    #[test]
    fn rk4_step_vec_preserves_dimension() {
        for dim in [1usize, 3, 17] {
            let system = FnSystem::new(dim, |x: &[f64], out: &mut [f64]| {
                for (o, v) in out.iter_mut().zip(x) {
                    *o = -v;
                }
            });
            let state = StateVector::new((0..dim).map(|i| i as f64 + 1.0).collect());
            let next = rk4_step_vec(&system, &state, 0.1).expect("dimensions agree");
            assert_eq!(next.len(), dim);
            for i in 0..dim {
                assert_relative_eq!(next[i], rk4_step(decay, state[i], 0.1), epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn rk4_step_vec_matches_scalar_kernel_for_one_dimensional_decay() {
        let system = Decay::default();
        let state = StateVector::from([2.0]);
        let next = rk4_step_vec(&system, &state, 0.2).expect("dimensions agree");
        assert_relative_eq!(next[0], rk4_step(decay, 2.0, 0.2), epsilon = 1e-15);
    }

    #[test]
    fn vector_steppers_reject_shape_mismatch() {
        let lorenz = Lorenz::default();
        let state = StateVector::from([1.0, 2.0]);
        let expected = Err(IntegrationError::ShapeMismatch {
            expected: 3,
            actual: 2,
        });
        assert_eq!(rk4_step_vec(&lorenz, &state, 0.01), expected);
        assert_eq!(euler_step_vec(&lorenz, &state, 0.01), expected);
    }

    #[test]
    fn method_dispatches_to_matching_kernel() {
        let lorenz = Lorenz::default();
        let state = StateVector::from([1.0, 1.0, 1.0]);
        let h = 0.01;
        assert_eq!(
            Method::Rk4.step(&lorenz, &state, h),
            rk4_step_vec(&lorenz, &state, h)
        );
        assert_eq!(
            Method::Euler.step(&lorenz, &state, h),
            euler_step_vec(&lorenz, &state, h)
        );
    }
}
