use crate::error::IntegrationError;
use crate::state::StateVector;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in our dynamical systems.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Represents an autonomous system of ODEs, i.e. the derivative function dx/dt = f(x).
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// x: current state
    /// out: buffer to write dx/dt into
    ///
    /// Both slices have length `dimension()`.
    fn apply(&self, x: &[T], out: &mut [T]);

    /// Evaluates the vector field into a freshly allocated state.
    fn evaluate(&self, x: &StateVector<T>) -> Result<StateVector<T>, IntegrationError> {
        let dim = self.dimension();
        if x.len() != dim {
            return Err(IntegrationError::ShapeMismatch {
                expected: dim,
                actual: x.len(),
            });
        }
        let mut out = StateVector::zeros(dim);
        self.apply(x.as_slice(), out.as_mut_slice());
        Ok(out)
    }
}

/// A trait for solvers that can step a system forward.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size h.
    /// state: current state (left untouched)
    /// h: step size
    ///
    /// Returns the state one step later.
    fn step(
        &self,
        system: &impl DynamicalSystem<T>,
        state: &StateVector<T>,
        h: T,
    ) -> Result<StateVector<T>, IntegrationError>;
}
