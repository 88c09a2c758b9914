use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;
use servopilot::{degrees_to_radians, Gains, SetpointPolicy, Target, VehicleConfig};

use crate::board::{SimBoard, SimRotor};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetConfig {
    Group(String),
    Single(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RotorConfig {
    pub name: String,
    /// Initial angle in degrees.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitlConfig {
    pub target: TargetConfig,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub tick_hz: f64,
    /// Run the plant this many times per control tick.
    pub substeps: u32,
    pub reset_on_setpoint: bool,
    /// Initial setpoint in degrees.
    pub setpoint: f64,
    /// Stop after this many periodic ticks. Runs until stdin closes if unset.
    pub max_ticks: Option<u64>,
    pub rotors: Vec<RotorConfig>,
}

impl Default for SitlConfig {
    fn default() -> Self {
        let group = Target::DEFAULT_GROUP.to_owned();
        SitlConfig {
            target: TargetConfig::Group(group.clone()),
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            tick_hz: 6.0,
            substeps: 10,
            reset_on_setpoint: false,
            setpoint: 0.0,
            max_ticks: None,
            rotors: vec![
                RotorConfig {
                    name: "Rotor Left".to_owned(),
                    angle: 0.0,
                    group: Some(group.clone()),
                },
                RotorConfig {
                    name: "Rotor Right Inv".to_owned(),
                    angle: 0.0,
                    group: Some(group),
                },
            ],
        }
    }
}

impl SitlConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Scheduler period for `tick_hz`. The timer cannot run a zero period,
    /// so rates too fast to represent as a `Duration` are rejected.
    pub fn period(&self) -> anyhow::Result<Duration> {
        let seconds = 1.0 / self.tick_hz;
        if !seconds.is_finite() || seconds <= 0.0 {
            bail!("tick_hz {} must be positive and finite", self.tick_hz);
        }

        let period = Duration::from_secs_f64(seconds);
        if period.is_zero() {
            bail!("tick_hz {} is too fast for the scheduler", self.tick_hz);
        }
        Ok(period)
    }

    pub fn vehicle_config(&self) -> VehicleConfig {
        let base = match &self.target {
            TargetConfig::Group(name) => VehicleConfig::group(name),
            TargetConfig::Single(name) => VehicleConfig::single(name),
        };

        VehicleConfig {
            gains: Gains {
                kp: self.kp,
                ki: self.ki,
                kd: self.kd,
            },
            time_step: 1.0 / self.tick_hz,
            setpoint_policy: if self.reset_on_setpoint {
                SetpointPolicy::ResetOnChange
            } else {
                SetpointPolicy::Keep
            },
            initial_setpoint: degrees_to_radians(self.setpoint),
            ..base
        }
    }

    pub fn build_board(&self) -> SimBoard {
        let mut board = SimBoard::new();
        for rotor in &self.rotors {
            board.add_rotor(
                SimRotor::new(&rotor.name, degrees_to_radians(rotor.angle)),
                rotor.group.as_deref(),
            );
        }
        board
    }
}
