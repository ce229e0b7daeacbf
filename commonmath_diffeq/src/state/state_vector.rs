use std::ops::{AddAssign, Deref, DerefMut, MulAssign};

use super::OdeState;

/// A dynamic-sized vector type for use in ODE solvers.
///
/// Unlike `StateArray`, this type supports lengths only known at runtime and stores its data
/// in a `Vec<f64>`. Arithmetic between vectors of different lengths panics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateVector {
    value: Vec<f64>,
}

impl StateVector {
    /// Constructs a new `StateVector` from a `Vec<f64>`.
    pub fn new(value: Vec<f64>) -> Self {
        Self { value }
    }

    /// A vector of `n` zeros.
    pub fn zeros(n: usize) -> Self {
        Self { value: vec![0.0; n] }
    }

    /// Extends a `StateVector` with the content of another.
    pub fn extend(&mut self, other: &Self) {
        self.value.extend_from_slice(&other.value);
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.value
    }
}

impl From<Vec<f64>> for StateVector {
    fn from(value: Vec<f64>) -> Self {
        Self::new(value)
    }
}

impl AddAssign<&Self> for StateVector {
    /// # Panics
    ///
    /// Panics if the vectors have different lengths.
    fn add_assign(&mut self, rhs: &Self) {
        if self.value.len() != rhs.value.len() {
            panic!(
                "state vectors do not have same length ({} vs {})",
                self.value.len(),
                rhs.value.len()
            )
        }
        for (x, r) in self.value.iter_mut().zip(&rhs.value) {
            *x += r;
        }
    }
}

impl MulAssign<f64> for StateVector {
    fn mul_assign(&mut self, rhs: f64) {
        for x in &mut self.value {
            *x *= rhs;
        }
    }
}

impl OdeState for StateVector {
    fn components(&self) -> &[f64] {
        &self.value
    }
}

impl Deref for StateVector {
    type Target = Vec<f64>;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl DerefMut for StateVector {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise_ops() {
        let mut x = StateVector::new(vec![1.0, 2.0]);
        x += &StateVector::new(vec![-4.0, 1.0]);
        x *= 0.5;
        assert_eq!(x.into_inner(), vec![-1.5, 1.5]);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_length_mismatch() {
        let mut x = StateVector::zeros(2);
        x += &StateVector::zeros(3);
    }

    #[test]
    fn test_extend_and_norm() {
        let mut x = StateVector::from(vec![0.5]);
        x.extend(&StateVector::new(vec![-8.0, 2.0]));
        assert_eq!(x.len(), 3);
        assert_eq!(x.max_norm(), 8.0);
        let mut record = Vec::new();
        x.write_record(1.0, &mut record);
        assert_eq!(record, vec!["1", "0.5", "-8", "2"]);
    }
}
