/// Machine epsilon used by the step controller. Slightly coarser than `f64::EPSILON`.
pub const EPS: f64 = 2.2204e-16;

/// Coefficients of an embedded Runge-Kutta pair.
///
/// `a` holds the stage time offsets, `b` the lower-triangular stage coupling, and `c4` / `c5`
/// the weights of the lower and higher order solutions.
#[derive(Clone, Copy, Debug)]
pub struct ButcherTableau<const STAGES: usize> {
    pub a: [f64; STAGES],
    pub b: [[f64; STAGES]; STAGES],
    pub c4: [f64; STAGES],
    pub c5: [f64; STAGES],
}

impl<const STAGES: usize> ButcherTableau<STAGES> {
    /// Weights that map the stage derivatives directly onto the local error estimate.
    pub fn cdiff(&self) -> [f64; STAGES] {
        let mut cdiff = [0.0; STAGES];
        for s in 0..STAGES {
            cdiff[s] = self.c4[s] - self.c5[s];
        }
        cdiff
    }
}

impl ButcherTableau<6> {
    // usage is ButcherTableau::<6>::FEHLBERG45
    pub const FEHLBERG45: Self = Self {
        a: [0., 1. / 4., 3. / 8., 12. / 13., 1., 1. / 2.],
        b: [
            [0., 0., 0., 0., 0., 0.],
            [1. / 4., 0., 0., 0., 0., 0.],
            [3. / 32., 9. / 32., 0., 0., 0., 0.],
            [1932. / 2197., -7200. / 2197., 7296. / 2197., 0., 0., 0.],
            [439. / 216., -8., 3680. / 513., -845. / 4104., 0., 0.],
            [
                -8. / 27.,
                2.,
                -3544. / 2565.,
                1859. / 4104.,
                -11. / 40.,
                0.,
            ],
        ],
        c4: [25. / 216., 0., 1408. / 2565., 2197. / 4104., -1. / 5., 0.],
        c5: [
            16. / 135.,
            0.,
            6656. / 12825.,
            28561. / 56430.,
            -9. / 50.,
            2. / 55.,
        ],
    };
}
