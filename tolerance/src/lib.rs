use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ToleranceErrors {
    #[error("tolerance must be greater than zero, got {0}")]
    NonPositive(f64),
    #[error("tolerance must be finite, got {0}")]
    NotFinite(f64),
}

/// Local error tolerance used by the adaptive integrators.
///
/// The allowed error for a step scales with the magnitude of the state, but never falls below
/// the tolerance itself: `allowed = tol * max(|y|, 1)`. Near zero this acts as an absolute
/// tolerance, far from zero as a relative one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorTolerance(f64);

impl Default for ErrorTolerance {
    fn default() -> Self {
        Self(1e-6)
    }
}

impl ErrorTolerance {
    pub fn new(tol: f64) -> Result<Self, ToleranceErrors> {
        if tol.is_nan() || tol.is_infinite() {
            return Err(ToleranceErrors::NotFinite(tol));
        }
        if tol <= 0.0 {
            return Err(ToleranceErrors::NonPositive(tol));
        }
        Ok(Self(tol))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Largest error accepted for a step taken from a state with max-norm `y_norm`.
    pub fn allowed(&self, y_norm: f64) -> f64 {
        allowed_error(self.0, y_norm)
    }

    pub fn check_error(&self, error: f64, y_norm: f64) -> bool {
        check_error(error, y_norm, self.0)
    }
}

pub fn allowed_error(tol: f64, y_norm: f64) -> f64 {
    tol * y_norm.max(1.0)
}

/// Returns true when `error` is within the allowed error. A NaN error never passes.
pub fn check_error(error: f64, y_norm: f64, tol: f64) -> bool {
    error <= allowed_error(tol, y_norm)
}

/// Infinity norm of `values`. Any NaN component makes the result NaN, and an empty slice has
/// norm zero.
pub fn max_norm(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |norm: f64, v| {
        let a = v.abs();
        if a.is_nan() || a > norm { a } else { norm }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rejects_bad_tolerances() {
        assert_eq!(ErrorTolerance::new(0.0), Err(ToleranceErrors::NonPositive(0.0)));
        assert_eq!(ErrorTolerance::new(-1e-6), Err(ToleranceErrors::NonPositive(-1e-6)));
        assert!(matches!(ErrorTolerance::new(f64::NAN), Err(ToleranceErrors::NotFinite(_))));
        assert!(matches!(
            ErrorTolerance::new(f64::INFINITY),
            Err(ToleranceErrors::NotFinite(_))
        ));
        assert!(ErrorTolerance::new(1e-12).is_ok());
    }

    #[test]
    fn test_allowed_error_floor() {
        let tol = ErrorTolerance::new(1e-6).unwrap();
        // small states are held to the absolute tolerance
        assert_abs_diff_eq!(tol.allowed(0.0), 1e-6);
        assert_abs_diff_eq!(tol.allowed(0.5), 1e-6);
        // large states scale it
        assert_abs_diff_eq!(tol.allowed(1e3), 1e-3, epsilon = 1e-15);
    }

    #[test]
    fn test_check_error() {
        let tol = ErrorTolerance::new(1e-8).unwrap();
        assert!(tol.check_error(1e-8, 0.0));
        assert!(!tol.check_error(1.1e-8, 0.0));
        assert!(tol.check_error(1.5e-8, 2.0));
        assert!(!tol.check_error(f64::NAN, 1.0));
    }

    #[test]
    fn test_max_norm() {
        assert_eq!(max_norm(&[]), 0.0);
        assert_eq!(max_norm(&[1.0, -3.0, 2.0]), 3.0);
        assert!(max_norm(&[1.0, f64::NAN, 2.0]).is_nan());
        assert!(max_norm(&[f64::NAN, 5.0]).is_nan());
        assert_eq!(max_norm(&[f64::NEG_INFINITY, 1.0]), f64::INFINITY);
    }
}
