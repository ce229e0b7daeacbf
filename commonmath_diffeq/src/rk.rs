use std::array;

use crate::{
    IntegrationError, OdeModel,
    saving::ResultStorage,
    state::OdeState,
    stepping::AdaptiveStepControl,
    tableau::ButcherTableau,
};

/// Counters collected over one integration run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Total number of derivative evaluations.
    pub fn_evals: u64,
    pub accepted_steps: u64,
    pub rejected_steps: u64,
}

/// Result of a single trial step.
#[derive(Clone, Debug)]
pub struct TrialStep<State> {
    /// 5th order solution at `t + h`.
    pub y: State,
    /// Max-norm of the local error estimate.
    pub error: f64,
}

/// Runge-Kutta-Fehlberg 4(5) integrator with embedded error control.
pub struct RungeKuttaFehlberg {
    tableau: ButcherTableau<6>,
    cdiff: [f64; 6],
    stats: Stats,
}

impl Default for RungeKuttaFehlberg {
    fn default() -> Self {
        Self::new()
    }
}

impl RungeKuttaFehlberg {
    pub fn new() -> Self {
        let tableau = ButcherTableau::<6>::FEHLBERG45;
        Self { cdiff: tableau.cdiff(), tableau, stats: Stats::default() }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Takes one trial step of size `h` from `(t, x)`.
    ///
    /// The model is evaluated exactly six times, in stage order. Stage buffers are local to
    /// the call.
    pub fn step<Model: OdeModel>(
        &mut self,
        model: &mut Model,
        t: f64,
        x: &Model::State,
        h: f64,
    ) -> Result<TrialStep<Model::State>, IntegrationError> {
        let a = &self.tableau.a;
        let b = &self.tableau.b;

        let mut k: [Model::State; 6] = array::from_fn(|_| x.clone());
        let mut state = x.clone();
        let mut scaled = x.clone();

        self.stats.fn_evals += 1;
        model.f(t + a[0] * h, x, &mut k[0]).map_err(IntegrationError::Model)?;

        for s in 1..6 {
            // x + h * sum(b[s][i] * k[i])
            weighted_sum(&mut state, &mut scaled, &b[s][..s], &k);
            state *= h;
            state += x;

            self.stats.fn_evals += 1;
            model.f(t + a[s] * h, &state, &mut k[s]).map_err(IntegrationError::Model)?;
        }

        // the error estimate comes straight from the weight differences
        weighted_sum(&mut state, &mut scaled, &self.cdiff, &k);
        state *= h;
        let error = state.max_norm();

        let mut y = state;
        weighted_sum(&mut y, &mut scaled, &self.tableau.c5, &k);
        y *= h;
        y += x;

        Ok(TrialStep { y, error })
    }

    /// Integrates from `x0` over `tspan`, saving every accepted sample to `result`.
    ///
    /// The initial condition is saved first. On failure the samples accepted so far stay in
    /// `result` and the error is returned.
    pub fn solve_adaptive<Model: OdeModel>(
        &mut self,
        model: &mut Model,
        x0: &Model::State,
        tspan: (f64, f64),
        control: &AdaptiveStepControl,
        result: &mut ResultStorage<Model::State>,
    ) -> Result<(), IntegrationError> {
        let tolerance = control.validate()?;
        let (t0, tf) = tspan;
        if !(t0.is_finite() && tf.is_finite()) || tf < t0 {
            return Err(IntegrationError::InvalidTimeSpan { start: t0, end: tf });
        }
        if !x0.is_finite() {
            return Err(IntegrationError::NonFiniteState { t: t0 });
        }

        let mut t = t0;
        let mut y = x0.clone();
        let mut h = control.initial_step(tspan);
        result.save(t, &y)?;

        log::debug!("rkf45: integrating over [{t0}, {tf}], tol = {}, h0 = {h:e}", tolerance.value());

        while t < tf {
            let trial = self.step(model, t, &y, h)?;
            if !trial.error.is_finite() {
                log::warn!("rkf45: non-finite error estimate at t = {t}, h = {h:e}");
                return Err(IntegrationError::NonFiniteState { t });
            }

            let allowed = tolerance.allowed(y.max_norm());
            let accepted = tolerance.check_error(trial.error, y.max_norm());

            if accepted {
                let t_next = if h >= tf - t { tf } else { t + h };
                if t_next <= t {
                    log::warn!("rkf45: step {h:e} no longer advances t = {t}");
                    return Err(IntegrationError::StepSizeUnderflow { t, h });
                }
                if !trial.y.is_finite() {
                    log::warn!("rkf45: non-finite state at t = {t_next}");
                    return Err(IntegrationError::NonFiniteState { t: t_next });
                }
                t = t_next;
                y = trial.y;
                self.stats.accepted_steps += 1;
                result.save(t, &y)?;
                if t >= tf {
                    break;
                }
            } else {
                self.stats.rejected_steps += 1;
                log::trace!(
                    "rkf45: rejected step at t = {t}, h = {h:e}, error = {:e} > {allowed:e}",
                    trial.error
                );
            }

            let h_next = control.next_step(h, trial.error, allowed);
            if control.is_underflow(h_next) {
                log::warn!("rkf45: step size {h_next:e} fell below minimum at t = {t}");
                return Err(IntegrationError::StepSizeUnderflow { t, h: h_next });
            }
            // only an accepted step can leave h longer than the remaining span
            h = if accepted { h_next.min(tf - t) } else { h_next };
        }

        log::debug!(
            "rkf45: completed at t = {t} after {} accepted, {} rejected steps ({} evaluations)",
            self.stats.accepted_steps,
            self.stats.rejected_steps,
            self.stats.fn_evals
        );
        Ok(())
    }
}

/// Overwrites `sum` with `sum(weights[i] * k[i])`, using `scaled` as scratch.
fn weighted_sum<State: OdeState>(
    sum: &mut State,
    scaled: &mut State,
    weights: &[f64],
    k: &[State],
) {
    sum.clone_from(&k[0]);
    *sum *= weights[0];
    for (w, ki) in weights.iter().zip(k).skip(1) {
        scaled.clone_from(ki);
        *scaled *= *w;
        *sum += &*scaled;
    }
}
