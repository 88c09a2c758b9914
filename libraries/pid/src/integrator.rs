// Integration schemes for the accumulated error term

/// Folds one more error sample into the running error sum.
///
/// The controller calls `accumulate` exactly once per control step with the
/// time step that is active for that step. Implementations that carry their
/// own history must clear it in `reset`.
pub trait Integrator {
    fn accumulate(&mut self, error: f64, error_sum: f64, time_step: f64) -> f64;

    fn reset(&mut self) {}
}

/// Rectangular integration: `sum + error * dt`. No clamping.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Euler;

impl Integrator for Euler {
    fn accumulate(&mut self, error: f64, error_sum: f64, time_step: f64) -> f64 {
        error_sum + error * time_step
    }
}

/// Trapezoidal integration over the previous and current error samples.
///
/// The first sample after construction or reset has no predecessor and is
/// integrated as a rectangle.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Trapezoidal {
    previous: Option<f64>,
}

impl Integrator for Trapezoidal {
    fn accumulate(&mut self, error: f64, error_sum: f64, time_step: f64) -> f64 {
        let previous = self.previous.replace(error).unwrap_or(error);
        error_sum + 0.5 * (error + previous) * time_step
    }

    fn reset(&mut self) {
        self.previous = None;
    }
}

impl<F> Integrator for F
where
    F: FnMut(f64, f64, f64) -> f64,
{
    fn accumulate(&mut self, error: f64, error_sum: f64, time_step: f64) -> f64 {
        self(error, error_sum, time_step)
    }
}
