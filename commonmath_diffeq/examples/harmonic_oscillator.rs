use std::{error::Error, path::PathBuf};

use commonmath_diffeq::{
    OdeModel, OdeProblem,
    saving::SaveMethod,
    state::state_array::StateArray,
    stepping::AdaptiveStepControl,
};

const CONTROL: &str = "(
    tolerance: 1e-9,
    max_growth: 4.0,
)";

#[derive(Debug)]
struct HarmonicOscillator {
    omega: f64,
}

impl OdeModel for HarmonicOscillator {
    type State = StateArray<2>;

    fn f(
        &mut self,
        _t: f64,
        y: &StateArray<2>,
        dy: &mut StateArray<2>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        dy[0] = y[1];
        dy[1] = -self.omega * self.omega * y[0];
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let control = AdaptiveStepControl::from_ron_str(CONTROL)?;
    let mut problem = OdeProblem::new(HarmonicOscillator { omega: 1.0 });
    let x0 = StateArray::new([1.0, 0.0]);
    let tspan = (0.0, 4.0 * std::f64::consts::PI);

    let solution = problem.solve_adaptive(&x0, tspan, &control, &SaveMethod::Memory)?;
    let (t, y) = solution.last().ok_or("no samples")?;
    log::info!(
        "x({t:.6}) = {:.10}, v = {:.10}, {} steps",
        y[0],
        y[1],
        solution.stats.accepted_steps
    );

    let path = std::env::temp_dir().join("harmonic_oscillator.csv");
    solution.write_csv(&path)?;
    log::info!("wrote {} samples to {}", solution.len(), path.display());

    // the same run streamed straight to disk
    let streamed: PathBuf = std::env::temp_dir().join("harmonic_oscillator_streamed.csv");
    problem.solve_adaptive(&x0, tspan, &control, &SaveMethod::File(streamed.clone()))?;
    log::info!("streamed samples to {}", streamed.display());

    Ok(())
}
