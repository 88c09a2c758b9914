use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServoError {
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("No actuator named '{0}'")]
    ActuatorNotFound(String),

    #[error("No actuators found in {0}")]
    NoActuators(String),

    #[error("Controller configuration: {0}")]
    Pid(#[from] pid::PIDError),
}
