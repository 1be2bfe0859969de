//! Configuration type definitions
//!
//! Typed configuration for a complete robot: wiring, drive profile,
//! chassis geometry and the steering law. The firmware compiles its
//! configuration in; these types exist so every constant lives in one
//! validated place instead of being scattered through task code.

pub mod hardware;
pub mod types;

pub use hardware::{HardwareConfig, MotorPins, PinNumbering, SensorPins};
pub use types::{
    ChassisGeometry, DriveProfile, RobotConfig, StageMode, SteeringConfig, SteeringLaw,
};
