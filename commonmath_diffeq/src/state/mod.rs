//! State types that can be advanced by the integrators.
//!
//! A state is an ordered collection of reals. The integrators only need element-wise addition,
//! scalar multiplication and a read-only view of the components; everything else (norms,
//! finiteness checks, CSV records) is derived from that view.

use std::{
    fmt::Debug,
    ops::{AddAssign, MulAssign},
};

pub mod state_array;
pub mod state_vector;

/// Trait representing an integrable state for use in ODE solvers.
///
/// The scalar `f64` is the one-component special case, so scalar and vector problems share
/// the same solver code.
pub trait OdeState: Clone + Debug + MulAssign<f64> + for<'a> AddAssign<&'a Self> + 'static {
    /// Read-only view of the state components, in order.
    fn components(&self) -> &[f64];

    /// Infinity norm of the state.
    fn max_norm(&self) -> f64 {
        tolerance::max_norm(self.components())
    }

    /// Returns false if any component is NaN or infinite.
    fn is_finite(&self) -> bool {
        self.components().iter().all(|x| f64::is_finite(*x))
    }

    /// Column names used when writing this state to CSV, time first.
    fn headers(&self) -> Vec<String> {
        let mut headers = vec!["t".to_string()];
        for i in 0..self.components().len() {
            headers.push(format!("y[{i}]"));
        }
        headers
    }

    /// Fills `record` with the CSV row for this state at time `t`.
    fn write_record(&self, t: f64, record: &mut Vec<String>) {
        record.clear();
        record.push(t.to_string());
        for x in self.components() {
            record.push(x.to_string());
        }
    }
}

impl OdeState for f64 {
    fn components(&self) -> &[f64] {
        std::slice::from_ref(self)
    }

    fn headers(&self) -> Vec<String> {
        vec!["t".to_string(), "y".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_state() {
        let mut y = -2.5_f64;
        assert_eq!(y.components(), &[-2.5]);
        assert_eq!(y.max_norm(), 2.5);
        assert!(OdeState::is_finite(&y));

        y += &1.0;
        y *= 2.0;
        assert_eq!(y, -3.0);

        assert!(!OdeState::is_finite(&f64::NAN));
        assert!(!OdeState::is_finite(&f64::INFINITY));
    }

    #[test]
    fn test_scalar_record() {
        let y = 1.5_f64;
        assert_eq!(y.headers(), vec!["t", "y"]);
        let mut record = vec!["stale".to_string()];
        y.write_record(0.25, &mut record);
        assert_eq!(record, vec!["0.25", "1.5"]);
    }

    #[test]
    fn test_finite_check_through_trait() {
        // the trait method must not resolve back to itself for `&f64` components
        let y = 4.0_f64;
        assert!(y.is_finite());
        assert!(OdeState::is_finite(&y));
        assert!(!OdeState::is_finite(&f64::NEG_INFINITY));
        assert!(!OdeState::is_finite(&-f64::NAN));
    }
}
