use core::fmt;

use log::{debug, warn};
use pid::{Euler, Integrator, TimeStep, PID};

use crate::axis::is_inverted;
use crate::{ActuatorHandle, Board, ControlledAxis, Diagnostic, ServoError, Setpoint, UpdateSource};

/// Which actuators a [`Vehicle`] servos.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Every actuator in a named group.
    Group(String),
    /// A single named actuator.
    Single(String),
}

impl Target {
    pub const DEFAULT_GROUP: &'static str = "Rotors PID";
    pub const DEFAULT_SINGLE: &'static str = "Rotor";

    /// The conventional single actuator, named [`Target::DEFAULT_SINGLE`].
    pub fn single_default() -> Self {
        Target::Single(Self::DEFAULT_SINGLE.to_owned())
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::Group(Self::DEFAULT_GROUP.to_owned())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Group(name) => write!(f, "group '{name}'"),
            Target::Single(name) => write!(f, "actuator '{name}'"),
        }
    }
}

/// What happens to controller history when the operator sends a new setpoint.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetpointPolicy {
    /// Keep integral and derivative history across setpoint changes.
    #[default]
    Keep,
    /// Reset every axis controller when a new setpoint is accepted.
    ResetOnChange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for Gains {
    fn default() -> Self {
        Gains {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleConfig {
    pub target: Target,
    pub gains: Gains,
    /// Control period in seconds.
    pub time_step: f64,
    pub setpoint_policy: SetpointPolicy,
    /// Run a control pass as soon as a new setpoint is accepted, without
    /// waiting for the next periodic tick.
    pub command_pass: bool,
    /// Actuators whose name contains this (case-insensitive) track the
    /// mirrored setpoint.
    pub inversion_marker: String,
    /// Desired angle in radians until the first command arrives.
    pub initial_setpoint: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        VehicleConfig {
            target: Target::default(),
            gains: Gains::default(),
            time_step: 1.0 / 6.0,
            setpoint_policy: SetpointPolicy::default(),
            command_pass: true,
            inversion_marker: "inv".to_owned(),
            initial_setpoint: 0.0,
        }
    }
}

impl VehicleConfig {
    /// Servo a single named actuator. Setpoint changes are picked up on the
    /// next periodic tick.
    pub fn single(name: &str) -> Self {
        VehicleConfig {
            target: Target::Single(name.to_owned()),
            command_pass: false,
            ..Default::default()
        }
    }

    pub fn group(name: &str) -> Self {
        VehicleConfig {
            target: Target::Group(name.to_owned()),
            ..Default::default()
        }
    }
}

/// Servos a set of actuators toward a shared setpoint.
///
/// Each axis owns its controller, so integral and derivative history never
/// leak between actuators.
pub struct Vehicle<I = Euler> {
    config: VehicleConfig,
    axes: Vec<ControlledAxis<I>>,
    setpoint: Setpoint,
    missing: Option<ServoError>,
}

impl Vehicle<Euler> {
    pub fn new<B>(board: &mut B, config: VehicleConfig) -> Result<Self, ServoError>
    where
        B: Board + ?Sized,
    {
        Self::with_integrator(board, config, Euler)
    }
}

impl<I: Integrator + Clone> Vehicle<I> {
    /// Discover the configured actuators on `board` and give each one its
    /// own controller built around a copy of `integrator`.
    ///
    /// Invalid gains or time step are an error. A missing group or actuator
    /// is not: it is logged, and every later tick reports it instead of
    /// commanding anything.
    pub fn with_integrator<B>(
        board: &mut B,
        config: VehicleConfig,
        integrator: I,
    ) -> Result<Self, ServoError>
    where
        B: Board + ?Sized,
    {
        let time_step = TimeStep::new(config.time_step)?;
        let Gains { kp, ki, kd } = config.gains;

        let (found, missing) = match discover(board, &config.target, &config.inversion_marker) {
            Ok(found) => (found, None),
            Err(err) => {
                warn!("{} on board {}: {err}", config.target, board.name());
                (Vec::new(), Some(err))
            }
        };

        let mut axes = Vec::with_capacity(found.len());
        for (name, handle, inverted) in found {
            debug!("Servoing '{name}' (handle {handle}, inverted: {inverted})");
            let pid = PID::with_integrator(time_step, integrator.clone()).with_gains(kp, ki, kd)?;
            axes.push(ControlledAxis::new(name, handle, inverted, pid));
        }

        Ok(Vehicle {
            setpoint: Setpoint::new(config.initial_setpoint),
            config,
            axes,
            missing,
        })
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn axes(&self) -> &[ControlledAxis<I>] {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&ControlledAxis<I>> {
        self.axes.iter().find(|axis| axis.name() == name)
    }

    pub fn axis_mut(&mut self, name: &str) -> Option<&mut ControlledAxis<I>> {
        self.axes.iter_mut().find(|axis| axis.name() == name)
    }

    pub fn setpoint(&self) -> &Setpoint {
        &self.setpoint
    }

    pub fn setpoint_mut(&mut self) -> &mut Setpoint {
        &mut self.setpoint
    }

    /// Apply an operator command as the new global setpoint.
    ///
    /// Returns whether it was accepted. Commands that do not parse are
    /// dropped and the previous setpoint stays in force.
    pub fn update_setpoint(&mut self, command: &str) -> bool {
        if !self.setpoint.update_from_command(command) {
            if !command.trim().is_empty() {
                debug!("Ignoring command {command:?}: not a number");
            }
            return false;
        }

        debug!("New setpoint: {:.4} rad", self.setpoint.global());
        if self.config.setpoint_policy == SetpointPolicy::ResetOnChange {
            self.reset_controllers();
        }
        true
    }

    /// Clear the integral and derivative history of every axis.
    pub fn reset_controllers(&mut self) {
        for axis in self.axes.iter_mut() {
            axis.pid_mut().reset();
        }
    }

    /// Entry point for one invocation from the host.
    ///
    /// `command` may be empty. A control pass runs at most once per call:
    /// on a periodic tick, or when `command` carried a new setpoint and
    /// `command_pass` is enabled.
    pub fn tick<B>(
        &mut self,
        board: &mut B,
        command: &str,
        source: UpdateSource,
    ) -> Result<Vec<Diagnostic>, ServoError>
    where
        B: Board + ?Sized,
    {
        self.run(board, command, source, None)
    }

    /// Like [`Vehicle::tick`], but every controller switches to `time_step`
    /// first, for hosts whose tick interval varies.
    pub fn tick_with_step<B>(
        &mut self,
        board: &mut B,
        command: &str,
        source: UpdateSource,
        time_step: TimeStep,
    ) -> Result<Vec<Diagnostic>, ServoError>
    where
        B: Board + ?Sized,
    {
        self.run(board, command, source, Some(time_step))
    }

    /// Run one controller step on every axis, regardless of update source.
    pub fn control_pass<B>(&mut self, board: &mut B) -> Result<Vec<Diagnostic>, ServoError>
    where
        B: Board + ?Sized,
    {
        self.ensure_axes()?;
        Ok(self.pass(board, None))
    }

    fn run<B>(
        &mut self,
        board: &mut B,
        command: &str,
        source: UpdateSource,
        time_step: Option<TimeStep>,
    ) -> Result<Vec<Diagnostic>, ServoError>
    where
        B: Board + ?Sized,
    {
        self.ensure_axes()?;

        let accepted = self.update_setpoint(command);
        if source.contains(UpdateSource::PERIODIC) || (accepted && self.config.command_pass) {
            Ok(self.pass(board, time_step))
        } else {
            Ok(Vec::new())
        }
    }

    fn ensure_axes(&self) -> Result<(), ServoError> {
        if !self.axes.is_empty() {
            return Ok(());
        }

        Err(self
            .missing
            .clone()
            .unwrap_or_else(|| ServoError::NoActuators(self.config.target.to_string())))
    }

    fn pass<B>(&mut self, board: &mut B, time_step: Option<TimeStep>) -> Vec<Diagnostic>
    where
        B: Board + ?Sized,
    {
        let mut diagnostics = Vec::with_capacity(self.axes.len());
        for axis in self.axes.iter_mut() {
            let desired = self.setpoint.for_axis(axis.name());
            match axis.control(board, desired, time_step) {
                Some(diag) => {
                    debug!("{diag}");
                    diagnostics.push(diag);
                }
                None => warn!("Actuator '{}' is no longer on the board, skipping", axis.name()),
            }
        }
        diagnostics
    }
}

/// Resolve `target` to `(name, handle, inverted)` triples.
fn discover<B>(
    board: &mut B,
    target: &Target,
    marker: &str,
) -> Result<Vec<(String, ActuatorHandle, bool)>, ServoError>
where
    B: Board + ?Sized,
{
    let handles = match target {
        Target::Group(name) => board
            .group(name)
            .ok_or_else(|| ServoError::GroupNotFound(name.clone()))?,
        Target::Single(name) => vec![board
            .find(name)
            .ok_or_else(|| ServoError::ActuatorNotFound(name.clone()))?],
    };

    let mut found = Vec::with_capacity(handles.len());
    for handle in handles {
        if let Some(actuator) = board.actuator(handle) {
            let name = actuator.name().to_owned();
            let inverted = is_inverted(&name, marker);
            found.push((name, handle, inverted));
        }
    }
    Ok(found)
}
