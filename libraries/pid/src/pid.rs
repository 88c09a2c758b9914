// Discrete-time PID controller with a pluggable integration step
use thiserror::Error;

use crate::integrator::{Euler, Integrator};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PIDError {
    #[error("Invalid gain configuration: {0}")]
    InvalidGain(String),

    #[error("Invalid time step: {0} s must be positive and finite")]
    InvalidTimeStep(f64),
}

/// A strictly positive, finite control period in seconds.
///
/// The reciprocal is cached because the derivative term divides by the step
/// on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    seconds: f64,
    inverse: f64,
}

impl TimeStep {
    pub fn new(seconds: f64) -> Result<Self, PIDError> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(PIDError::InvalidTimeStep(seconds));
        }

        Ok(Self {
            seconds,
            inverse: 1.0 / seconds,
        })
    }

    /// Time step for a loop running at `hz` updates per second.
    pub fn from_hz(hz: f64) -> Result<Self, PIDError> {
        Self::new(1.0 / hz)
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn inverse(&self) -> f64 {
        self.inverse
    }
}

#[derive(Debug)]
pub struct PID<I = Euler> {
    kp: f64,
    ki: f64,
    kd: f64,

    time_step: TimeStep,
    error_sum: f64,
    last_error: f64,
    first_run: bool,
    output: f64,

    integrator: I,
}

impl PID<Euler> {
    /// Create a controller with all gains at zero and plain Euler integration.
    pub fn new(time_step: TimeStep) -> Self {
        Self::with_integrator(time_step, Euler)
    }
}

impl<I: Integrator> PID<I> {
    /// Create a controller that accumulates its error sum with `integrator`.
    ///
    /// Gains start at zero. There is no integral clamping and no output limit:
    /// the error sum grows for as long as the error persists and is only
    /// cleared by [`PID::reset`].
    pub fn with_integrator(time_step: TimeStep, integrator: I) -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            time_step,
            error_sum: 0.0,
            last_error: 0.0,
            first_run: true,
            output: 0.0,
            integrator,
        }
    }

    /// Set all three gains at once, consuming the controller.
    ///
    /// # Arguments
    ///
    /// * `kp` - Proportional gain
    /// * `ki` - Integral gain
    /// * `kd` - Derivative gain
    pub fn with_gains(mut self, kp: f64, ki: f64, kd: f64) -> Result<Self, PIDError> {
        self.set_kp(kp)?.set_ki(ki)?.set_kd(kd)?;
        Ok(self)
    }

    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn ki(&self) -> f64 {
        self.ki
    }

    pub fn kd(&self) -> f64 {
        self.kd
    }

    pub fn time_step(&self) -> TimeStep {
        self.time_step
    }

    pub fn error_sum(&self) -> f64 {
        self.error_sum
    }

    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    /// Output of the most recent control step.
    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn set_kp(&mut self, kp: f64) -> Result<&mut Self, PIDError> {
        if !kp.is_finite() {
            return Err(PIDError::InvalidGain(format!("kp value {kp} is not a valid number")));
        }

        self.kp = kp;
        Ok(self)
    }

    pub fn set_ki(&mut self, ki: f64) -> Result<&mut Self, PIDError> {
        if !ki.is_finite() {
            return Err(PIDError::InvalidGain(format!("ki value {ki} is not a valid number")));
        }

        self.ki = ki;
        Ok(self)
    }

    pub fn set_kd(&mut self, kd: f64) -> Result<&mut Self, PIDError> {
        if !kd.is_finite() {
            return Err(PIDError::InvalidGain(format!("kd value {kd} is not a valid number")));
        }

        self.kd = kd;
        Ok(self)
    }

    pub fn set_time_step(&mut self, time_step: TimeStep) {
        if time_step != self.time_step {
            self.time_step = time_step;
        }
    }

    /// Run one control step on `error` and return the new output.
    ///
    /// Not idempotent: every call integrates the error again and moves the
    /// derivative reference forward.
    pub fn control(&mut self, error: f64) -> f64 {
        let derivative = if self.first_run {
            self.first_run = false;
            0.0
        } else {
            (error - self.last_error) * self.time_step.inverse()
        };

        self.error_sum = self
            .integrator
            .accumulate(error, self.error_sum, self.time_step.seconds());
        self.last_error = error;

        self.output = self.kp * error + self.ki * self.error_sum + self.kd * derivative;
        self.output
    }

    /// Switch to `time_step` (if it differs from the current one), then run
    /// one control step.
    pub fn control_with_step(&mut self, error: f64, time_step: TimeStep) -> f64 {
        self.set_time_step(time_step);
        self.control(error)
    }

    /// Clear the error history. Gains and time step are kept.
    pub fn reset(&mut self) {
        self.error_sum = 0.0;
        self.last_error = 0.0;
        self.first_run = true;
        self.integrator.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trapezoidal;

    fn step(seconds: f64) -> TimeStep {
        TimeStep::new(seconds).expect("Valid time step")
    }

    fn pid(kp: f64, ki: f64, kd: f64, seconds: f64) -> PID {
        PID::new(step(seconds))
            .with_gains(kp, ki, kd)
            .expect("Valid gains should not cause an error")
    }

    #[test]
    fn test_proportional_only() {
        let mut pid = pid(1.0, 0.0, 0.0, 1.0 / 6.0);
        assert_eq!(pid.control(30.0), 30.0);
        assert_eq!(pid.control(30.0), 30.0, "Pure P should ignore history");
        assert_eq!(pid.output(), 30.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = pid(0.0, 1.0, 0.0, 1.0);
        assert_eq!(pid.control(5.0), 5.0);
        assert_eq!(pid.control(5.0), 10.0);
        assert_eq!(pid.error_sum(), 10.0);
    }

    #[test]
    fn test_derivative_suppressed_on_first_run() {
        let mut pid = pid(0.0, 0.0, 1.0, 1.0);
        assert_eq!(pid.control(5.0), 0.0);
        assert_eq!(pid.control(8.0), 3.0);
    }

    #[test]
    fn test_derivative_suppressed_after_reset() {
        let mut pid = pid(0.0, 0.0, 1.0, 0.1);
        pid.control(1.0);
        pid.control(-4.0);
        pid.reset();

        assert!(pid.is_first_run());
        assert_eq!(pid.control(1000.0), 0.0, "No derivative kick after reset");
    }

    #[test]
    fn test_not_idempotent() {
        let mut pid = pid(1.0, 1.0, 1.0, 0.5);
        let first = pid.control(2.0);
        let second = pid.control(2.0);
        // first: 2 + 1*1 + 0, second: 2 + 1*2 + 0
        assert_eq!(first, 3.0);
        assert_eq!(second, 4.0);
    }

    #[test]
    fn test_reset_keeps_gains_and_step() {
        let mut pid = pid(2.0, 0.5, 0.1, 0.25);
        pid.control(3.0);
        pid.control(1.0);
        pid.reset();

        assert_eq!(pid.error_sum(), 0.0);
        assert_eq!(pid.last_error(), 0.0);
        assert_eq!(pid.kp(), 2.0);
        assert_eq!(pid.ki(), 0.5);
        assert_eq!(pid.kd(), 0.1);
        assert_eq!(pid.time_step().seconds(), 0.25);
    }

    #[test]
    fn test_control_with_step_updates_step() {
        let mut pid = pid(0.0, 1.0, 1.0, 1.0);
        pid.control(2.0);

        // integral: 2*1 + 4*0.5 = 4, derivative: (4-2)/0.5 = 4
        let output = pid.control_with_step(4.0, step(0.5));
        assert!((output - 8.0).abs() < 1e-12, "Expected 8.0, got {}", output);
        assert_eq!(pid.time_step().seconds(), 0.5);
        assert_eq!(pid.time_step().inverse(), 2.0);
    }

    #[test]
    fn test_integral_is_not_clamped() {
        let mut pid = pid(0.0, 1.0, 0.0, 1.0);
        for _ in 0..1000 {
            pid.control(100.0);
        }
        assert_eq!(pid.error_sum(), 100_000.0);
    }

    #[test]
    fn test_custom_integrator() {
        let mut pid = PID::with_integrator(step(1.0), Trapezoidal::default())
            .with_gains(0.0, 1.0, 0.0)
            .expect("Valid gains should not cause an error");
        assert_eq!(pid.control(2.0), 2.0);
        assert_eq!(pid.control(4.0), 5.0);

        pid.reset();
        assert_eq!(pid.control(4.0), 4.0, "Integrator history should clear on reset");

        let mut leaky = PID::with_integrator(step(1.0), |e: f64, sum: f64, dt: f64| 0.5 * sum + e * dt)
            .with_gains(0.0, 1.0, 0.0)
            .expect("Valid gains should not cause an error");
        assert_eq!(leaky.control(4.0), 4.0);
        assert_eq!(leaky.control(4.0), 6.0);
    }

    #[test]
    fn test_invalid_time_step() {
        assert_eq!(TimeStep::new(0.0), Err(PIDError::InvalidTimeStep(0.0)));
        assert!(TimeStep::new(-0.1).is_err());
        assert!(TimeStep::new(f64::NAN).is_err());
        assert!(TimeStep::new(f64::INFINITY).is_err());
        assert!(TimeStep::from_hz(0.0).is_err(), "Zero rate gives an infinite step");

        let six_hz = TimeStep::from_hz(6.0).expect("Valid rate");
        assert!((six_hz.seconds() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_gains() {
        let mut pid = pid(1.0, 0.0, 0.0, 1.0);
        assert!(pid.set_kp(f64::NAN).is_err(), "NaN kp should cause an error");
        assert!(pid.set_ki(f64::INFINITY).is_err(), "Infinite ki should cause an error");
        assert!(pid.set_kd(f64::NEG_INFINITY).is_err());
        assert_eq!(pid.kp(), 1.0, "kp should remain unchanged after failed set");

        pid.set_kp(0.5)
            .expect("Valid kp should not cause an error")
            .set_kd(0.2)
            .expect("Valid kd should not cause an error");
        assert_eq!(pid.kp(), 0.5);
        assert_eq!(pid.kd(), 0.2);
    }
}
