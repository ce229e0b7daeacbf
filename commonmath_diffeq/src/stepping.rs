use serde::{Deserialize, Serialize};
use tolerance::ErrorTolerance;

use crate::{IntegrationError, tableau::EPS};

/// Adaptive step size controller for the embedded 4(5) pair.
///
/// After every trial step the next step is
/// `min((allowed / (error + EPS))^exponent * h, max_growth * h)`, whether the trial was
/// accepted or not. A proposed step below `min_dt` aborts the run.
///
/// Can be deserialized from RON; missing fields keep their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveStepControl {
    /// Local error tolerance, see [`ErrorTolerance`].
    pub tolerance: f64,
    /// Exponent applied to the error ratio, 1 / (order + 1) of the lower order solution.
    pub exponent: f64,
    /// Largest factor a step may grow by.
    pub max_growth: f64,
    /// Smallest step the controller may propose.
    pub min_dt: f64,
    /// Fraction of the time span used as the first trial step.
    pub initial_fraction: f64,
}

impl Default for AdaptiveStepControl {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            exponent: 0.2,
            max_growth: 4.0,
            min_dt: 16.0 * EPS,
            initial_fraction: 0.01,
        }
    }
}

impl AdaptiveStepControl {
    pub fn new(tolerance: f64) -> Self {
        Self::default().with_tolerance(tolerance)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_growth(mut self, max_growth: f64) -> Self {
        self.max_growth = max_growth;
        self
    }

    pub fn with_min_dt(mut self, min_dt: f64) -> Self {
        self.min_dt = min_dt;
        self
    }

    pub fn with_initial_fraction(mut self, initial_fraction: f64) -> Self {
        self.initial_fraction = initial_fraction;
        self
    }

    /// Parses a controller from RON text and validates it.
    pub fn from_ron_str(s: &str) -> Result<Self, IntegrationError> {
        let control: Self = ron::from_str(s)?;
        control.validate()?;
        Ok(control)
    }

    /// Checks every field, returning the validated tolerance.
    pub fn validate(&self) -> Result<ErrorTolerance, IntegrationError> {
        let tolerance = ErrorTolerance::new(self.tolerance)?;
        let positive = |field: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(IntegrationError::InvalidStepControl { field, value })
            }
        };
        positive("exponent", self.exponent)?;
        positive("min_dt", self.min_dt)?;
        positive("initial_fraction", self.initial_fraction)?;
        if !(self.max_growth.is_finite() && self.max_growth > 1.0) {
            return Err(IntegrationError::InvalidStepControl {
                field: "max_growth",
                value: self.max_growth,
            });
        }
        if self.initial_fraction > 1.0 {
            return Err(IntegrationError::InvalidStepControl {
                field: "initial_fraction",
                value: self.initial_fraction,
            });
        }
        Ok(tolerance)
    }

    /// First trial step for the time span.
    pub fn initial_step(&self, tspan: (f64, f64)) -> f64 {
        (tspan.1 - tspan.0) * self.initial_fraction
    }

    /// Computes the next step size from the current step, its error estimate and the allowed
    /// error.
    pub fn next_step(&self, h: f64, error: f64, allowed: f64) -> f64 {
        let delta = (allowed / (error + EPS)).powf(self.exponent);
        (delta * h).min(self.max_growth * h)
    }

    pub fn is_underflow(&self, h: f64) -> bool {
        h < self.min_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let control = AdaptiveStepControl::default();
        assert_eq!(control.min_dt, 16.0 * 2.2204e-16);
        assert_eq!(control.initial_step((0.0, 2.0)), 0.02);
        assert!(control.validate().is_ok());
    }

    #[test]
    fn test_growth_is_capped() {
        let control = AdaptiveStepControl::new(1e-6);
        // zero error would give an enormous factor
        assert_eq!(control.next_step(0.1, 0.0, 1e-6), 0.4);
    }

    #[test]
    fn test_shrinks_on_large_error() {
        let control = AdaptiveStepControl::new(1e-6);
        let h = control.next_step(0.1, 32e-6, 1e-6);
        // (1 / 32)^0.2 = 0.5
        assert_relative_eq!(h, 0.05, max_relative = 1e-9);
        assert!(!control.is_underflow(h));
        assert!(control.is_underflow(control.next_step(1e-14, 1.0, 1e-6)));
    }

    #[test]
    fn test_invalid_control() {
        assert!(matches!(
            AdaptiveStepControl::new(0.0).validate(),
            Err(IntegrationError::InvalidTolerance(_))
        ));
        assert!(matches!(
            AdaptiveStepControl::default().with_max_growth(1.0).validate(),
            Err(IntegrationError::InvalidStepControl { field: "max_growth", .. })
        ));
        assert!(matches!(
            AdaptiveStepControl::default().with_initial_fraction(2.0).validate(),
            Err(IntegrationError::InvalidStepControl { field: "initial_fraction", .. })
        ));
        assert!(matches!(
            AdaptiveStepControl::default().with_min_dt(f64::NAN).validate(),
            Err(IntegrationError::InvalidStepControl { field: "min_dt", .. })
        ));
    }

    #[test]
    fn test_from_ron() {
        let control = AdaptiveStepControl::from_ron_str("(tolerance: 1e-9, max_growth: 2.0)").unwrap();
        assert_eq!(control.tolerance, 1e-9);
        assert_eq!(control.max_growth, 2.0);
        assert_eq!(control.exponent, 0.2);

        assert!(matches!(
            AdaptiveStepControl::from_ron_str("(tolerance: -1.0)"),
            Err(IntegrationError::InvalidTolerance(_))
        ));
        assert!(matches!(
            AdaptiveStepControl::from_ron_str("(tolerance: "),
            Err(IntegrationError::Config(_))
        ));
    }
}
