//! Configuration for the base motion controller
//!
//! Loads configuration from a TOML file: drivetrain geometry, power limits,
//! default PD gains and the control-loop timing shared by both loops.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level controller configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriveConfig {
    pub geometry: GeometryConfig,
    pub limits: LimitsConfig,
    pub gains: GainsConfig,
    pub control: ControlConfig,
    pub ports: PortsConfig,
    pub logging: LoggingConfig,
}

/// Drivetrain geometry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeometryConfig {
    /// Calibration constant: inches of travel per encoder degree
    ///
    /// Measured from wheel circumference (circumference / 360). Used for
    /// converting commanded distances to encoder-degree targets.
    pub inches_per_degree: f64,

    /// Distance between the left and right wheel contact lines (inches)
    ///
    /// Converts a rotation angle into differential wheel travel:
    /// `arc = angle_rad * track_width`.
    pub track_width: f64,
}

/// Power limits applied by the power shaping loop
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Absolute power ceiling when no explicit cap is set
    pub max_power: f64,

    /// Maximum change in applied power per control tick (slew-rate limit)
    pub ramp_step: f64,
}

/// A proportional/derivative gain pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Gains {
    /// Proportional gain on encoder error
    pub kp: f64,
    /// Derivative gain on per-tick error change
    pub kd: f64,
}

/// Default gain pairs used when a command does not supply its own
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GainsConfig {
    /// Default gains for straight-line moves
    pub drive: Gains,
    /// Default gains for in-place turns
    pub turn: Gains,
}

/// Control-loop timing and arrival detection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Fixed tick period for both control loops (milliseconds)
    pub period_ms: u64,

    /// Default arrival tolerance for blocking waits (encoder degrees)
    pub arrival_tolerance: f64,
}

/// Hardware port map
///
/// The limit switch and color sensor are part of the robot configuration but
/// unused by this controller; they are carried here for the host that builds
/// the hardware drivers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortsConfig {
    pub front_left: u8,
    pub back_left: u8,
    pub front_right: u8,
    pub back_right: u8,
    pub encoder_left: u8,
    pub encoder_right: u8,
    pub limit_switch: u8,
    pub color_sensor: u8,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout, stderr, or file path)
    pub output: String,
}

impl DriveConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DriveConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl ControlConfig {
    /// Tick period as a [`Duration`]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Default for DriveConfig {
    /// Defaults calibrated for a four-motor base with 4" wheels
    fn default() -> Self {
        Self {
            geometry: GeometryConfig {
                inches_per_degree: 0.0349, // 4" wheel: pi * 4 / 360
                track_width: 11.5,
            },
            limits: LimitsConfig {
                max_power: 127.0,
                ramp_step: 9.0,
            },
            gains: GainsConfig {
                drive: Gains { kp: 0.5, kd: 1.0 },
                turn: Gains { kp: 0.6, kd: 1.3 },
            },
            control: ControlConfig {
                period_ms: 20,
                arrival_tolerance: 10.0,
            },
            ports: PortsConfig {
                front_left: 19,
                back_left: 1,
                front_right: 20,
                back_right: 10,
                encoder_left: 1,
                encoder_right: 3,
                limit_switch: 5,
                color_sensor: 6,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                output: "stdout".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriveConfig::default();
        assert_eq!(config.control.period_ms, 20);
        assert_eq!(config.control.period(), Duration::from_millis(20));
        assert_eq!(config.limits.max_power, 127.0);
        assert!(config.geometry.inches_per_degree > 0.0);
        assert!(config.geometry.track_width > 0.0);
    }

    #[test]
    fn test_toml_serialization() {
        let config = DriveConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        // Should contain all sections
        assert!(toml_string.contains("[geometry]"));
        assert!(toml_string.contains("[limits]"));
        assert!(toml_string.contains("[gains.drive]"));
        assert!(toml_string.contains("[gains.turn]"));
        assert!(toml_string.contains("[control]"));
        assert!(toml_string.contains("[ports]"));
        assert!(toml_string.contains("[logging]"));

        // Should contain key values
        assert!(toml_string.contains("max_power = 127.0"));
        assert!(toml_string.contains("period_ms = 20"));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[geometry]
inches_per_degree = 0.024
track_width = 12.0

[limits]
max_power = 100.0
ramp_step = 15.0

[gains.drive]
kp = 0.4
kd = 0.9

[gains.turn]
kp = 0.7
kd = 1.4

[control]
period_ms = 10
arrival_tolerance = 5.0

[ports]
front_left = 1
back_left = 2
front_right = 3
back_right = 4
encoder_left = 5
encoder_right = 6
limit_switch = 7
color_sensor = 8

[logging]
level = "debug"
output = "stderr"
"#;

        let config: DriveConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.geometry.track_width, 12.0);
        assert_eq!(config.limits.ramp_step, 15.0);
        assert_eq!(config.gains.drive.kp, 0.4);
        assert_eq!(config.gains.turn.kd, 1.4);
        assert_eq!(config.control.period_ms, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = std::env::temp_dir().join("gati-base-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("drive.toml");

        let config = DriveConfig::default();
        config.to_file(&path).unwrap();

        let loaded = DriveConfig::from_file(&path).unwrap();
        assert_eq!(loaded.geometry.track_width, config.geometry.track_width);
        assert_eq!(loaded.gains.drive.kp, config.gains.drive.kp);
        assert_eq!(loaded.ports.front_left, config.ports.front_left);

        fs::remove_file(&path).ok();
    }
}
