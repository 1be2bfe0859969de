//! Hardware wiring configuration
//!
//! Pin numbers here are meaningless until resolved against the chosen
//! numbering scheme; the chip HAL owns that mapping and the claim
//! bookkeeping.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pin numbering scheme for every pin number in the configuration.
///
/// Exactly one scheme is in force per robot; it is fixed when the pin
/// bank is created, before any pin is claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinNumbering {
    /// Chip GPIO numbers
    #[default]
    Gpio,
    /// Physical positions on the board's 40-pin header
    Header,
}

/// The four driver inputs of one stepper, in coil order.
///
/// Order is load-bearing: stage levels map onto these positions 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorPins(pub [u8; 4]);

/// I2C wiring for the line sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorPins {
    /// I2C data pin
    pub sda: u8,
    /// I2C clock pin
    pub scl: u8,
}

/// Complete wiring of one robot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HardwareConfig {
    /// Numbering scheme every pin number below is expressed in
    pub numbering: PinNumbering,
    /// Left wheel driver inputs
    pub left_motor: MotorPins,
    /// Right wheel driver inputs
    pub right_motor: MotorPins,
    /// Line sensor bus
    pub sensor: SensorPins,
    /// Emergency-stop button (active low)
    pub estop_pin: u8,
    /// Status LED
    pub led_pin: u8,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            numbering: PinNumbering::Gpio,
            left_motor: MotorPins([2, 3, 4, 5]),
            right_motor: MotorPins([6, 7, 8, 9]),
            sensor: SensorPins { sda: 20, scl: 21 },
            estop_pin: 22,
            led_pin: 25,
        }
    }
}
