//! Cash–Karp embedded Runge–Kutta 4(5) stepper.
//!
//! Six right-hand-side evaluations per step produce a fifth-order
//! solution and the difference to the embedded fourth-order solution,
//! which serves as the local error estimate. The first stage reuses a
//! caller-supplied derivative at the start of the step.

use sylva_core::OdeTarget;

const A2: f64 = 1.0 / 5.0;
const A3: f64 = 3.0 / 10.0;
const A4: f64 = 3.0 / 5.0;
const A5: f64 = 1.0;
const A6: f64 = 7.0 / 8.0;

const B21: f64 = 1.0 / 5.0;
const B31: f64 = 3.0 / 40.0;
const B32: f64 = 9.0 / 40.0;
const B41: f64 = 3.0 / 10.0;
const B42: f64 = -9.0 / 10.0;
const B43: f64 = 6.0 / 5.0;
const B51: f64 = -11.0 / 54.0;
const B52: f64 = 5.0 / 2.0;
const B53: f64 = -70.0 / 27.0;
const B54: f64 = 35.0 / 27.0;
const B61: f64 = 1631.0 / 55296.0;
const B62: f64 = 175.0 / 512.0;
const B63: f64 = 575.0 / 13824.0;
const B64: f64 = 44275.0 / 110592.0;
const B65: f64 = 253.0 / 4096.0;

// Fifth-order weights (the advancing solution).
const C1: f64 = 37.0 / 378.0;
const C3: f64 = 250.0 / 621.0;
const C4: f64 = 125.0 / 594.0;
const C6: f64 = 512.0 / 1771.0;

// Fifth minus fourth order weights (the error estimate).
const E1: f64 = C1 - 2825.0 / 27648.0;
const E3: f64 = C3 - 18575.0 / 48384.0;
const E4: f64 = C4 - 13525.0 / 55296.0;
const E5: f64 = -277.0 / 14336.0;
const E6: f64 = C6 - 1.0 / 4.0;

/// Stage buffers for the Cash–Karp pair, sized to the current state.
#[derive(Clone, Debug, Default)]
pub struct CashKarp {
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    k5: Vec<f64>,
    k6: Vec<f64>,
    y_tmp: Vec<f64>,
}

impl CashKarp {
    /// Order used by the step-size controller.
    pub const ORDER: u32 = 4;

    /// Right-hand-side evaluations per step, counting the supplied first stage.
    pub const STAGES: u64 = 6;

    /// Empty stepper; buffers grow on first use.
    pub fn new() -> Self {
        Self::default()
    }

    fn resize(&mut self, n: usize) {
        for buf in [
            &mut self.k2,
            &mut self.k3,
            &mut self.k4,
            &mut self.k5,
            &mut self.k6,
            &mut self.y_tmp,
        ] {
            buf.resize(n, 0.0);
        }
    }

    /// Take one step of size `h` from `(t, y)` with `k1 = f(t, y)`.
    ///
    /// Writes the fifth-order solution into `y_out` and the local error
    /// estimate into `y_err`. Evaluates the target five times; the
    /// target is left holding whatever state the last stage unpacked.
    #[allow(clippy::too_many_arguments)]
    pub fn apply<T: OdeTarget + ?Sized>(
        &mut self,
        target: &mut T,
        t: f64,
        h: f64,
        y: &[f64],
        k1: &[f64],
        y_out: &mut [f64],
        y_err: &mut [f64],
    ) {
        let n = y.len();
        debug_assert_eq!(k1.len(), n);
        debug_assert_eq!(y_out.len(), n);
        debug_assert_eq!(y_err.len(), n);
        self.resize(n);

        for i in 0..n {
            self.y_tmp[i] = y[i] + h * B21 * k1[i];
        }
        target.derivs(t + A2 * h, &self.y_tmp, &mut self.k2);

        for i in 0..n {
            self.y_tmp[i] = y[i] + h * (B31 * k1[i] + B32 * self.k2[i]);
        }
        target.derivs(t + A3 * h, &self.y_tmp, &mut self.k3);

        for i in 0..n {
            self.y_tmp[i] = y[i] + h * (B41 * k1[i] + B42 * self.k2[i] + B43 * self.k3[i]);
        }
        target.derivs(t + A4 * h, &self.y_tmp, &mut self.k4);

        for i in 0..n {
            self.y_tmp[i] = y[i]
                + h * (B51 * k1[i] + B52 * self.k2[i] + B53 * self.k3[i] + B54 * self.k4[i]);
        }
        target.derivs(t + A5 * h, &self.y_tmp, &mut self.k5);

        for i in 0..n {
            self.y_tmp[i] = y[i]
                + h * (B61 * k1[i]
                    + B62 * self.k2[i]
                    + B63 * self.k3[i]
                    + B64 * self.k4[i]
                    + B65 * self.k5[i]);
        }
        target.derivs(t + A6 * h, &self.y_tmp, &mut self.k6);

        for i in 0..n {
            y_out[i] = y[i] + h * (C1 * k1[i] + C3 * self.k3[i] + C4 * self.k4[i] + C6 * self.k6[i]);
            y_err[i] = h
                * (E1 * k1[i]
                    + E3 * self.k3[i]
                    + E4 * self.k4[i]
                    + E5 * self.k5[i]
                    + E6 * self.k6[i]);
        }
    }
}
