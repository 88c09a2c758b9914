/// Index of an actuator on a [`Board`]. Stable for the lifetime of the board.
pub type ActuatorHandle = usize;

/// A rotor or hinge whose target velocity we command.
pub trait Actuator {
    fn name(&self) -> &str;

    /// Current angle in radians, within one turn.
    fn angle(&self) -> f64;

    fn set_target_velocity(&mut self, rpm: f32);
}

/// The host platform the servo loop runs on.
///
/// Lookups may legitimately come back empty: the operator may not have
/// built the group or named the actuator yet.
pub trait Board {
    fn name(&self) -> &str;

    /// Actuators in the group called `name`, in the board's order.
    fn group(&self, name: &str) -> Option<Vec<ActuatorHandle>>;

    /// The actuator called `name`.
    fn find(&self, name: &str) -> Option<ActuatorHandle>;

    fn actuator(&mut self, handle: ActuatorHandle) -> Option<&mut dyn Actuator>;
}
