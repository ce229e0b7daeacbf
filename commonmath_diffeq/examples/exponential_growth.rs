use std::time::Instant;

use commonmath_diffeq::integrate_rkf45;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    for tol in [1e-4, 1e-6, 1e-8, 1e-10] {
        let start = Instant::now();
        let solution = match integrate_rkf45((0.0, 1.0), 1.0, tol, |_t, y: &f64| *y) {
            Ok(solution) => solution,
            Err(e) => {
                log::error!("tol {tol:e}: {e}");
                continue;
            }
        };
        let elapsed = start.elapsed();

        if let Some((t, y)) = solution.last() {
            log::info!(
                "tol {tol:e}: y({t}) = {y:.12}, error {:+.3e}, {} steps ({} rejected) in {elapsed:?}",
                y - std::f64::consts::E,
                solution.stats.accepted_steps,
                solution.stats.rejected_steps,
            );
        }
    }
}
