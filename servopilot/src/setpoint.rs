use std::collections::BTreeMap;

use angle::{degrees_to_radians, reduce};

/// Parse an operator command as an angle in degrees and return it in
/// radians, reduced to [0, 2π).
///
/// Surrounding whitespace is ignored. Anything that is not a finite number
/// yields `None`.
pub fn parse_command(command: &str) -> Option<f64> {
    let degrees: f64 = command.trim().parse().ok()?;
    degrees
        .is_finite()
        .then(|| reduce(degrees_to_radians(degrees)))
}

/// Desired angles, in radians within [0, 2π), before any per-axis inversion.
///
/// The global value applies to every axis without an override. It persists
/// across ticks until a new command replaces it.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Setpoint {
    global: f64,
    overrides: BTreeMap<String, f64>,
}

impl Setpoint {
    pub fn new(global: f64) -> Self {
        Setpoint {
            global: reduce(global),
            overrides: BTreeMap::new(),
        }
    }

    pub fn global(&self) -> f64 {
        self.global
    }

    pub fn set_global(&mut self, radians: f64) {
        self.global = reduce(radians);
    }

    /// Apply a command string. Returns whether the setpoint was replaced.
    /// An empty or unparsable command leaves the current value alone.
    pub fn update_from_command(&mut self, command: &str) -> bool {
        match parse_command(command) {
            Some(radians) => {
                self.global = radians;
                true
            }
            None => false,
        }
    }

    pub fn set_axis(&mut self, axis: &str, radians: f64) {
        self.overrides.insert(axis.to_owned(), reduce(radians));
    }

    pub fn clear_axis(&mut self, axis: &str) -> Option<f64> {
        self.overrides.remove(axis)
    }

    /// Desired angle for `axis`: its override if one is set, else the global value.
    pub fn for_axis(&self, axis: &str) -> f64 {
        self.overrides.get(axis).copied().unwrap_or(self.global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    #[test]
    fn test_parse_command() {
        let quarter = parse_command("90").expect("Valid angle");
        assert!((quarter - FRAC_PI_2).abs() < 1e-12);
        assert!(parse_command("  -45.5\n").is_some());
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("ninety"), None);
        assert_eq!(parse_command("NaN"), None);
        assert_eq!(parse_command("inf"), None);
    }

    #[test]
    fn test_command_reduced_to_one_turn() {
        let ten = degrees_to_radians(10.0);
        assert!(parse_command("720").is_some_and(|r| r.abs() < 1e-12));
        assert!(parse_command("370").is_some_and(|r| (r - ten).abs() < 1e-12));
        assert!(parse_command("-350").is_some_and(|r| (r - ten).abs() < 1e-12));

        let mut setpoint = Setpoint::new(-FRAC_PI_2);
        assert!((setpoint.global() - 3.0 * FRAC_PI_2).abs() < 1e-12);
        setpoint.set_axis("Rotor 2", 5.0 * FRAC_PI_2);
        assert!((setpoint.for_axis("Rotor 2") - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_bad_command_keeps_setpoint() {
        let mut setpoint = Setpoint::new(1.0);
        assert!(!setpoint.update_from_command("abc"));
        assert!(!setpoint.update_from_command(""));
        assert_eq!(setpoint.global(), 1.0);

        assert!(setpoint.update_from_command("180"));
        assert!((setpoint.global() - core::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_axis_override() {
        let mut setpoint = Setpoint::new(0.5);
        setpoint.set_axis("Rotor 2", 1.5);
        assert_eq!(setpoint.for_axis("Rotor 1"), 0.5);
        assert_eq!(setpoint.for_axis("Rotor 2"), 1.5);

        setpoint.update_from_command("0");
        assert_eq!(setpoint.for_axis("Rotor 2"), 1.5, "Override survives global updates");

        assert_eq!(setpoint.clear_axis("Rotor 2"), Some(1.5));
        assert_eq!(setpoint.for_axis("Rotor 2"), 0.0);
    }
}
