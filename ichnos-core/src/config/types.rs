//! Drive, geometry and steering configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::sequence::{StageSet, FULL_STEP, HALF_STEP, WAVE_STEP};
use crate::motion::timing::{DEFAULT_RPM, DEFAULT_STEPS_PER_REV};
use crate::steering::{PidConfig, ThresholdConfig};

use super::hardware::HardwareConfig;

/// Which drive sequence the wheels run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StageMode {
    /// Two coils per stage, full torque
    Full,
    /// Doubled resolution, smoother motion
    #[default]
    Half,
    /// One coil per stage, lowest current
    Wave,
}

impl StageMode {
    /// The template stage table for this mode
    pub fn stage_set(self) -> &'static StageSet<'static> {
        match self {
            StageMode::Full => &FULL_STEP,
            StageMode::Half => &HALF_STEP,
            StageMode::Wave => &WAVE_STEP,
        }
    }
}

/// How the wheels are driven
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriveProfile {
    /// Drive sequence
    pub mode: StageMode,
    /// Wheel speed
    pub rpm: u16,
    /// Logical steps per output-shaft revolution
    pub steps_per_rev: u16,
}

impl Default for DriveProfile {
    fn default() -> Self {
        Self {
            mode: StageMode::default(),
            rpm: DEFAULT_RPM,
            steps_per_rev: DEFAULT_STEPS_PER_REV,
        }
    }
}

/// Physical chassis dimensions for distance and angle conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChassisGeometry {
    /// Wheel radius in millimetres
    pub wheel_radius_mm: u16,
    /// Half the wheel track: the radius a spin turn sweeps
    pub turning_radius_mm: u16,
}

impl Default for ChassisGeometry {
    fn default() -> Self {
        Self {
            wheel_radius_mm: 100,
            turning_radius_mm: 200,
        }
    }
}

/// Which steering law runs, with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SteeringLaw {
    /// PID on a signed centre-offset error
    Pid(PidConfig),
    /// Hysteresis on an unsigned colour-distance error
    Threshold(ThresholdConfig),
}

impl Default for SteeringLaw {
    fn default() -> Self {
        SteeringLaw::Threshold(ThresholdConfig::default())
    }
}

/// Steering loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SteeringConfig {
    /// Active control law
    pub law: SteeringLaw,
    /// Control cycle period in milliseconds
    pub cycle_ms: u32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            law: SteeringLaw::default(),
            cycle_ms: 100,
        }
    }
}

/// Everything one robot needs to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobotConfig {
    /// Wiring
    pub hardware: HardwareConfig,
    /// Drive profile
    pub drive: DriveProfile,
    /// Chassis dimensions
    pub geometry: ChassisGeometry,
    /// Steering loop
    pub steering: SteeringConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::timing::stage_delay_us;

    #[test]
    fn test_stage_mode_tables() {
        assert_eq!(StageMode::Full.stage_set().len(), 4);
        assert_eq!(StageMode::Half.stage_set().len(), 8);
        assert_eq!(StageMode::Wave.stage_set().len(), 4);
        assert_eq!(StageMode::Half.stage_set().stages_per_step(), 2);
    }

    #[test]
    fn test_default_profile_is_drivable() {
        // The shipped defaults must produce a legal stage delay.
        let profile = DriveProfile::default();
        let delay = stage_delay_us(
            profile.mode.stage_set(),
            profile.rpm,
            profile.steps_per_rev,
        );
        assert!(delay.is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = RobotConfig::default();
        assert_eq!(config.steering.cycle_ms, 100);
        assert!(matches!(config.steering.law, SteeringLaw::Threshold(_)));
    }
}
