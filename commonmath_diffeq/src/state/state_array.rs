use std::ops::{AddAssign, Deref, DerefMut, MulAssign};

use super::OdeState;

/// A fixed-size array wrapper representing a generic state vector with `N` f64 components.
///
/// Lives entirely on the stack, so the stage buffers of a step need no allocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateArray<const N: usize>([f64; N]);

impl<const N: usize> StateArray<N> {
    /// Constructs a new `StateArray` from an array of `f64`.
    pub fn new(array: [f64; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> Default for StateArray<N> {
    /// Creates a `StateArray` with all elements initialized to zero.
    fn default() -> Self {
        Self([0.0; N])
    }
}

impl<const N: usize> From<[f64; N]> for StateArray<N> {
    fn from(array: [f64; N]) -> Self {
        Self(array)
    }
}

impl<const N: usize> AddAssign<&Self> for StateArray<N> {
    fn add_assign(&mut self, rhs: &Self) {
        for i in 0..N {
            self.0[i] += rhs.0[i];
        }
    }
}

impl<const N: usize> MulAssign<f64> for StateArray<N> {
    fn mul_assign(&mut self, rhs: f64) {
        for i in 0..N {
            self.0[i] *= rhs;
        }
    }
}

impl<const N: usize> OdeState for StateArray<N> {
    fn components(&self) -> &[f64] {
        &self.0
    }
}

impl<const N: usize> Deref for StateArray<N> {
    type Target = [f64; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for StateArray<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise_ops() {
        let mut x = StateArray::new([1.0, -2.0, 3.0]);
        x += &StateArray::new([0.5, 0.5, 0.5]);
        assert_eq!(*x, [1.5, -1.5, 3.5]);
        x *= 2.0;
        assert_eq!(*x, [3.0, -3.0, 7.0]);
        assert_eq!(x.max_norm(), 7.0);
    }

    #[test]
    fn test_non_finite() {
        let mut x = StateArray::from([0.0, 1.0]);
        assert!(x.is_finite());
        x[1] = f64::NAN;
        assert!(!x.is_finite());
        assert!(x.max_norm().is_nan());
    }

    #[test]
    fn test_headers() {
        let x = StateArray::<2>::default();
        assert_eq!(x.headers(), vec!["t", "y[0]", "y[1]"]);
    }
}
