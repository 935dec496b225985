pub mod analysis;
pub mod error;
pub mod simulation;
pub mod solvers;
pub mod state;
pub mod systems;
/// The `kutta_core` crate provides the numerical engine for the Kutta CLI.
/// It advances small dynamical systems with fixed-step explicit integrators.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (derivative functions), `Steppable` (Solvers).
/// - **State**: `StateVector`, an owned N-dimensional state with elementwise arithmetic.
/// - **Solvers**: Scalar Euler/RK4 steps, vector Euler/RK4 steps and the `Method` selector.
/// - **Systems**: Exponential decay, the Lorenz system and a closure adapter.
/// - **Simulation**: The fixed-step driver with warm-up discard and a divergence guard.
/// - **Analysis**: Euler vs RK4 decay comparison and two-trajectory separation tracking.
pub mod traits;

pub use error::IntegrationError;
pub use state::StateVector;
