//! Adaptive Runge-Kutta-Fehlberg 4(5) integration of ordinary differential equations.
//!
//! ```
//! use commonmath_diffeq::integrate_rkf45;
//!
//! // y' = y, y(0) = 1
//! let solution = integrate_rkf45((0.0, 1.0), 1.0, 1e-8, |_t, y: &f64| *y).unwrap();
//! let (t, y) = solution.last().unwrap();
//! assert_eq!(t, 1.0);
//! assert!((y - std::f64::consts::E).abs() < 1e-6);
//! ```

use std::{error::Error, marker::PhantomData};

use thiserror::Error;
use tolerance::ToleranceErrors;

pub mod rk;
pub mod saving;
pub mod state;
pub mod stepping;
pub mod tableau;

use rk::RungeKuttaFehlberg;
use saving::{ResultStorage, SaveMethod, Solution};
use state::OdeState;
use stepping::AdaptiveStepControl;

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("step size {h:e} fell below its minimum allowable value at t = {t}")]
    StepSizeUnderflow { t: f64, h: f64 },
    #[error("InvalidTolerance: {0}")]
    InvalidTolerance(#[from] ToleranceErrors),
    #[error("invalid time span [{start}, {end}]")]
    InvalidTimeSpan { start: f64, end: f64 },
    #[error("invalid step control {field}: {value}")]
    InvalidStepControl { field: &'static str, value: f64 },
    #[error("non-finite state or error estimate at t = {t}")]
    NonFiniteState { t: f64 },
    #[error("model error: {0}")]
    Model(#[source] Box<dyn Error + Send + Sync>),
    #[error("config error: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Trait for defining a dynamical system model that can be numerically integrated.
///
/// Types implementing this trait must define how to compute the derivative (or RHS function)
/// of the ODE at a given time and state. `derivative` arrives shaped like the initial state.
/// The integrator assumes the derivative depends only on `t` and `state`.
pub trait OdeModel {
    type State: OdeState;
    /// Compute the derivative at time `t` and state `state`, storing the result in `derivative`.
    fn f(
        &mut self,
        t: f64,
        state: &Self::State,
        derivative: &mut Self::State,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Adapts a closure `f(t, y) -> dy` to [`OdeModel`].
pub struct FnModel<State, F> {
    f: F,
    _state: PhantomData<fn(&State) -> State>,
}

impl<State, F> FnModel<State, F>
where
    State: OdeState,
    F: FnMut(f64, &State) -> State,
{
    pub fn new(f: F) -> Self {
        Self { f, _state: PhantomData }
    }
}

impl<State, F> OdeModel for FnModel<State, F>
where
    State: OdeState,
    F: FnMut(f64, &State) -> State,
{
    type State = State;

    fn f(
        &mut self,
        t: f64,
        state: &State,
        derivative: &mut State,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        *derivative = (self.f)(t, state);
        Ok(())
    }
}

/// Container for an ODE problem: the model plus how its results are stored.
pub struct OdeProblem<Model: OdeModel> {
    model: Model,
}

impl<Model: OdeModel> OdeProblem<Model> {
    pub fn new(model: Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    /// Solves the problem over `tspan` with the RKF45 integrator.
    ///
    /// Samples go where `save_method` says; only `SaveMethod::Memory` fills the returned
    /// solution's `t` and `y`.
    pub fn solve_adaptive(
        &mut self,
        x0: &Model::State,
        tspan: (f64, f64),
        step_control: &AdaptiveStepControl,
        save_method: &SaveMethod,
    ) -> Result<Solution<Model::State>, IntegrationError> {
        let mut result = ResultStorage::new(save_method)?;
        let mut solver = RungeKuttaFehlberg::new();
        let outcome = solver.solve_adaptive(&mut self.model, x0, tspan, step_control, &mut result);
        // keep whatever was streamed before a failure, reporting the run's own error first
        let flushed = result.flush();
        outcome?;
        flushed?;
        Ok(Solution::new(result, solver.stats()))
    }
}

/// Integrates `dy/dt = derivative(t, y)` from `y0` over `tspan` with the given tolerance.
///
/// Works for scalar (`f64`) and vector (`StateArray`, `StateVector`) states alike. Returns
/// every accepted sample, starting with `(tspan.0, y0)` and ending at `tspan.1`.
pub fn integrate_rkf45<State, F>(
    tspan: (f64, f64),
    y0: State,
    tolerance: f64,
    derivative: F,
) -> Result<Solution<State>, IntegrationError>
where
    State: OdeState,
    F: FnMut(f64, &State) -> State,
{
    OdeProblem::new(FnModel::new(derivative)).solve_adaptive(
        &y0,
        tspan,
        &AdaptiveStepControl::new(tolerance),
        &SaveMethod::Memory,
    )
}
