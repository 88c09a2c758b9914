use std::collections::BTreeMap;
use std::f64::consts::TAU;

use servopilot::{Actuator, ActuatorHandle, Board};

/// A rotor that turns at exactly the commanded velocity.
#[derive(Debug, Clone)]
pub struct SimRotor {
    name: String,
    angle: f64,
    velocity_rpm: f32,
}

impl SimRotor {
    pub fn new(name: &str, angle: f64) -> Self {
        SimRotor {
            name: name.to_owned(),
            angle: angle.rem_euclid(TAU),
            velocity_rpm: 0.0,
        }
    }

    pub fn velocity_rpm(&self) -> f32 {
        self.velocity_rpm
    }

    /// Advance by `dt` seconds, keeping the angle in [0, 2π).
    pub fn step(&mut self, dt: f64) {
        let rad_per_s = self.velocity_rpm as f64 * TAU / 60.0;
        self.angle = (self.angle + rad_per_s * dt).rem_euclid(TAU);
    }
}

impl Actuator for SimRotor {
    fn name(&self) -> &str {
        &self.name
    }

    fn angle(&self) -> f64 {
        self.angle
    }

    fn set_target_velocity(&mut self, rpm: f32) {
        self.velocity_rpm = rpm;
    }
}

#[derive(Default)]
pub struct SimBoard {
    rotors: Vec<SimRotor>,
    groups: BTreeMap<String, Vec<ActuatorHandle>>,
}

impl SimBoard {
    pub fn new() -> Self {
        SimBoard {
            rotors: Vec::new(),
            groups: BTreeMap::new(),
        }
    }

    /// Add a rotor, optionally as a member of `group`.
    pub fn add_rotor(&mut self, rotor: SimRotor, group: Option<&str>) -> ActuatorHandle {
        let handle = self.rotors.len();
        self.rotors.push(rotor);
        if let Some(group) = group {
            self.groups.entry(group.to_owned()).or_default().push(handle);
        }
        handle
    }

    pub fn rotors(&self) -> &[SimRotor] {
        &self.rotors
    }

    pub fn step(&mut self, dt: f64) {
        for rotor in self.rotors.iter_mut() {
            rotor.step(dt);
        }
    }
}

impl Board for SimBoard {
    fn name(&self) -> &str {
        "SITL"
    }

    fn group(&self, name: &str) -> Option<Vec<ActuatorHandle>> {
        self.groups.get(name).cloned()
    }

    fn find(&self, name: &str) -> Option<ActuatorHandle> {
        self.rotors.iter().position(|rotor| rotor.name == name)
    }

    fn actuator(&mut self, handle: ActuatorHandle) -> Option<&mut dyn Actuator> {
        self.rotors
            .get_mut(handle)
            .map(|rotor| rotor as &mut dyn Actuator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotor_integrates_velocity() {
        let mut rotor = SimRotor::new("Rotor", 0.0);
        rotor.set_target_velocity(60.0);
        rotor.step(0.25);
        assert!((rotor.angle() - TAU / 4.0).abs() < 1e-9);

        rotor.set_target_velocity(-60.0);
        rotor.step(0.5);
        assert!((rotor.angle() - 3.0 * TAU / 4.0).abs() < 1e-9, "Angle wraps into [0, 2π)");
    }

    #[test]
    fn test_group_lookup() {
        let mut board = SimBoard::new();
        board.add_rotor(SimRotor::new("Rotor 1", 0.0), Some("Rotors PID"));
        board.add_rotor(SimRotor::new("Hinge", 0.0), None);
        board.add_rotor(SimRotor::new("Rotor 2 inv", 0.0), Some("Rotors PID"));

        assert_eq!(board.group("Rotors PID"), Some(vec![0, 2]));
        assert_eq!(board.group("Pistons"), None);
        assert_eq!(board.find("Hinge"), Some(1));
        assert!(board.actuator(3).is_none());
    }
}
