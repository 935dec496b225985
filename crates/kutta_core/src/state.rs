//! Owned state vectors for the vector-valued steppers.
//!
//! `StateVector` is a thin wrapper around `Vec<T>` that supports the handful of
//! linear operations a Runge-Kutta step needs: elementwise addition and
//! subtraction, and multiplication by a scalar. Operands are expected to share a
//! length; the steppers check dimensions against the system before any
//! arithmetic happens.

use crate::error::IntegrationError;
use crate::traits::Scalar;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Index, IndexMut, Mul, Sub};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector<T>(Vec<T>);

impl<T: Scalar> StateVector<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self(values)
    }

    pub fn zeros(dim: usize) -> Self {
        Self(vec![T::zero(); dim])
    }

    pub fn from_slice(values: &[T]) -> Self {
        Self(values.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }

    /// Largest absolute component, or zero for an empty vector.
    /// NaN components are skipped; use [`StateVector::is_bounded_by`] to catch them.
    pub fn max_abs(&self) -> T {
        self.0
            .iter()
            .fold(T::zero(), |acc, value| acc.max(value.abs()))
    }

    /// True when every component is finite and no larger than `threshold` in magnitude.
    pub fn is_bounded_by(&self, threshold: T) -> bool {
        self.0
            .iter()
            .all(|value| value.is_finite() && value.abs() <= threshold)
    }

    pub fn norm(&self) -> T {
        self.0
            .iter()
            .fold(T::zero(), |acc, &value| acc + value * value)
            .sqrt()
    }

    /// Euclidean distance to another state of the same dimension.
    pub fn distance(&self, other: &Self) -> Result<T, IntegrationError> {
        if self.len() != other.len() {
            return Err(IntegrationError::ShapeMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok((self - other).norm())
    }
}

impl<T> From<Vec<T>> for StateVector<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T, const N: usize> From<[T; N]> for StateVector<T> {
    fn from(values: [T; N]) -> Self {
        Self(Vec::from(values))
    }
}

impl<T> Index<usize> for StateVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T> IndexMut<usize> for StateVector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
}

impl<T: Scalar> Add<&StateVector<T>> for &StateVector<T> {
    type Output = StateVector<T>;

    fn add(self, rhs: &StateVector<T>) -> StateVector<T> {
        debug_assert_eq!(self.len(), rhs.len());
        StateVector(self.0.iter().zip(&rhs.0).map(|(&a, &b)| a + b).collect())
    }
}

impl<T: Scalar> Add<&StateVector<T>> for StateVector<T> {
    type Output = StateVector<T>;

    fn add(mut self, rhs: &StateVector<T>) -> StateVector<T> {
        debug_assert_eq!(self.len(), rhs.len());
        for (a, &b) in self.0.iter_mut().zip(&rhs.0) {
            *a = *a + b;
        }
        self
    }
}

impl<T: Scalar> Sub<&StateVector<T>> for &StateVector<T> {
    type Output = StateVector<T>;

    fn sub(self, rhs: &StateVector<T>) -> StateVector<T> {
        debug_assert_eq!(self.len(), rhs.len());
        StateVector(self.0.iter().zip(&rhs.0).map(|(&a, &b)| a - b).collect())
    }
}

impl<T: Scalar> Mul<T> for &StateVector<T> {
    type Output = StateVector<T>;

    fn mul(self, rhs: T) -> StateVector<T> {
        StateVector(self.0.iter().map(|&a| a * rhs).collect())
    }
}

impl<T: Scalar> Mul<T> for StateVector<T> {
    type Output = StateVector<T>;

    fn mul(mut self, rhs: T) -> StateVector<T> {
        for a in self.0.iter_mut() {
            *a = *a * rhs;
        }
        self
    }
}
