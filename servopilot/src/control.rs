use core::fmt;
use core::ops::BitOr;

use angle::radians_to_degrees;

/// Why the host invoked the servo loop. Flags may be combined.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSource(u8);

impl UpdateSource {
    pub const NONE: UpdateSource = UpdateSource(0);
    /// Scheduled tick from the host's fixed-rate timer.
    pub const PERIODIC: UpdateSource = UpdateSource(1 << 0);
    /// On-demand run, e.g. the operator sent a command.
    pub const TRIGGER: UpdateSource = UpdateSource(1 << 1);

    pub fn contains(self, other: UpdateSource) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }
}

impl BitOr for UpdateSource {
    type Output = UpdateSource;

    fn bitor(self, rhs: UpdateSource) -> UpdateSource {
        UpdateSource(self.0 | rhs.0)
    }
}

/// What one axis saw and did during a control pass. Angles in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub axis: String,
    pub measured: f64,
    pub target: f64,
    pub error: f64,
    pub output: f64,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rotor '{}': Current Angle: {:.2}, Desired Angle: {:.2}, Error: {:.2}, Velocity: {:.2} rpm",
            self.axis,
            radians_to_degrees(self.measured),
            radians_to_degrees(self.target),
            radians_to_degrees(self.error),
            self.output
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_source_flags() {
        let both = UpdateSource::PERIODIC | UpdateSource::TRIGGER;
        assert!(both.contains(UpdateSource::PERIODIC));
        assert!(both.contains(UpdateSource::TRIGGER));
        assert!(!UpdateSource::TRIGGER.contains(UpdateSource::PERIODIC));
        assert!(!UpdateSource::PERIODIC.contains(UpdateSource::NONE));
        assert_eq!(UpdateSource::default(), UpdateSource::NONE);
    }

    #[test]
    fn test_diagnostic_display_in_degrees() {
        let diag = Diagnostic {
            axis: "Rotor inv".to_owned(),
            measured: core::f64::consts::FRAC_PI_2,
            target: core::f64::consts::PI,
            error: core::f64::consts::FRAC_PI_2,
            output: 1.5,
        };
        assert_eq!(
            diag.to_string(),
            "Rotor 'Rotor inv': Current Angle: 90.00, Desired Angle: 180.00, Error: 90.00, Velocity: 1.50 rpm"
        );
    }
}
