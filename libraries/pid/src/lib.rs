mod integrator;
mod pid;

pub use integrator::{Euler, Integrator, Trapezoidal};
pub use pid::{PIDError, TimeStep, PID};
