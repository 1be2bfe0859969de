//! Compiled-in robot configuration
//!
//! One robot, one wiring: the configuration is a constant. Boards with
//! different wiring or gains edit here and rebuild.

use ichnos_core::config::RobotConfig;
use ichnos_drivers::sensor::ColorReading;

/// Calibrated colour of the line marking, as this sensor sees it under
/// the robot's own lighting. Re-measure after changing ride height.
pub const LINE_COLOR: ColorReading = ColorReading {
    clear: 0,
    red: 750,
    green: 80,
    blue: 120,
};

/// Scales raw colour distance down to the steering law's error range
pub const ERROR_DIVISOR: i32 = 100;

/// Sensor acquisition period in milliseconds
pub const SENSOR_PERIOD_MS: u64 = 100;

/// The robot's full configuration
pub fn robot_config() -> RobotConfig {
    RobotConfig::default()
}
