use angle::{invert, normalize_error};
use pid::{Euler, Integrator, TimeStep, PID};

use crate::{ActuatorHandle, Board, Diagnostic};

/// Whether an actuator name marks it as mounted the other way round.
/// Matching is case-insensitive.
pub fn is_inverted(name: &str, marker: &str) -> bool {
    !marker.is_empty() && name.to_lowercase().contains(&marker.to_lowercase())
}

/// One actuator under closed-loop control, with its own controller history.
#[derive(Debug)]
pub struct ControlledAxis<I = Euler> {
    name: String,
    handle: ActuatorHandle,
    inverted: bool,
    pid: PID<I>,

    measured: f64,
    velocity: f32,
}

impl<I: Integrator> ControlledAxis<I> {
    pub fn new(name: String, handle: ActuatorHandle, inverted: bool, pid: PID<I>) -> Self {
        ControlledAxis {
            name,
            handle,
            inverted,
            pid,
            measured: 0.0,
            velocity: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ActuatorHandle {
        self.handle
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn pid(&self) -> &PID<I> {
        &self.pid
    }

    pub fn pid_mut(&mut self) -> &mut PID<I> {
        &mut self.pid
    }

    /// Angle read during the last control step, in radians.
    pub fn measured(&self) -> f64 {
        self.measured
    }

    /// Velocity commanded during the last control step, in rpm.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Read the actuator, run one controller step toward `desired` and
    /// command the result as the actuator's target velocity.
    ///
    /// Returns `None` without touching the controller if the actuator has
    /// disappeared from the board.
    pub fn control<B>(
        &mut self,
        board: &mut B,
        desired: f64,
        time_step: Option<TimeStep>,
    ) -> Option<Diagnostic>
    where
        B: Board + ?Sized,
    {
        let actuator = board.actuator(self.handle)?;

        let measured = actuator.angle();
        let error = normalize_error(desired, measured, self.inverted);
        let output = match time_step {
            Some(step) => self.pid.control_with_step(error, step),
            None => self.pid.control(error),
        };

        self.measured = measured;
        self.velocity = output as f32;
        actuator.set_target_velocity(self.velocity);

        Some(Diagnostic {
            axis: self.name.clone(),
            measured,
            target: if self.inverted { invert(desired) } else { desired },
            error,
            output,
        })
    }
}
