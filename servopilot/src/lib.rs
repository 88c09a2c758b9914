mod axis;
mod board;
mod control;
mod error;
mod setpoint;
mod vehicle;

pub use axis::{is_inverted, ControlledAxis};
pub use board::{Actuator, ActuatorHandle, Board};
pub use control::{Diagnostic, UpdateSource};
pub use error::ServoError;
pub use setpoint::{parse_command, Setpoint};
pub use vehicle::{Gains, SetpointPolicy, Target, Vehicle, VehicleConfig};

pub use angle::{degrees_to_radians, radians_to_degrees};
pub use pid::{TimeStep, PID};
