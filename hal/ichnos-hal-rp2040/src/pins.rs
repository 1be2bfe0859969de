//! Runtime pin claiming under a configured numbering scheme
//!
//! Configuration names pins either by RP2040 GPIO number or by the
//! position on the Pico's 40-pin header; the scheme is fixed once when
//! the bank is built. Every claim is tracked, so two consumers naming
//! the same pin (for example a pin listed in both motor quadruples) is
//! caught before any hardware is touched.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::peripherals::{I2C0, PIN_20, PIN_21};
use embassy_rp::{Peri, Peripherals};

use ichnos_core::config::{MotorPins, PinNumbering};

use crate::gpio::RpOutput;

/// Number of claimable GPIOs on the RP2040
const GPIO_COUNT: usize = 30;

/// GPIOs routed to the sensor bus at board level, never claimable
const BUS_PINS: [u8; 2] = [20, 21];

/// Pico 40-pin header position to GPIO number. Power, ground and RUN
/// positions carry no GPIO.
const HEADER_TO_GPIO: [Option<u8>; 41] = [
    None,           // positions are 1-based
    Some(0),        // 1
    Some(1),        // 2
    None,           // 3  GND
    Some(2),        // 4
    Some(3),        // 5
    Some(4),        // 6
    Some(5),        // 7
    None,           // 8  GND
    Some(6),        // 9
    Some(7),        // 10
    Some(8),        // 11
    Some(9),        // 12
    None,           // 13 GND
    Some(10),       // 14
    Some(11),       // 15
    Some(12),       // 16
    Some(13),       // 17
    None,           // 18 GND
    Some(14),       // 19
    Some(15),       // 20
    Some(16),       // 21
    Some(17),       // 22
    None,           // 23 GND
    Some(18),       // 24
    Some(19),       // 25
    Some(20),       // 26
    Some(21),       // 27
    None,           // 28 GND
    Some(22),       // 29
    None,           // 30 RUN
    Some(26),       // 31
    Some(27),       // 32
    None,           // 33 GND
    Some(28),       // 34
    None,           // 35 ADC_VREF
    None,           // 36 3V3
    None,           // 37 3V3_EN
    None,           // 38 GND
    None,           // 39 VSYS
    None,           // 40 VBUS
];

/// Error when claiming a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Number does not name a claimable GPIO under the active scheme
    InvalidPin,
    /// Pin is routed to a system bus and cannot be claimed
    Reserved,
    /// Pin was already claimed
    AlreadyTaken,
}

/// Non-GPIO peripherals handed back when the bank is built
pub struct SystemPeripherals {
    /// Sensor bus controller
    pub i2c0: Peri<'static, I2C0>,
    /// Sensor bus data pin (board-routed)
    pub i2c_sda: Peri<'static, PIN_20>,
    /// Sensor bus clock pin (board-routed)
    pub i2c_scl: Peri<'static, PIN_21>,
}

/// Pin bank holding every claimable GPIO
///
/// Built exactly once, from the peripherals singleton, with the
/// numbering scheme all later claims are resolved through.
pub struct PinBank {
    numbering: PinNumbering,
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Consume the peripherals into a pin bank plus the non-GPIO
    /// peripherals the firmware still needs.
    pub fn split(p: Peripherals, numbering: PinNumbering) -> (Self, SystemPeripherals) {
        let bank = Self {
            numbering,
            pins: [
                Some(p.PIN_0.into()),
                Some(p.PIN_1.into()),
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                None, // GPIO 20: sensor bus SDA
                None, // GPIO 21: sensor bus SCL
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };
        let system = SystemPeripherals {
            i2c0: p.I2C0,
            i2c_sda: p.PIN_20,
            i2c_scl: p.PIN_21,
        };
        (bank, system)
    }

    /// The numbering scheme this bank resolves claims through
    pub fn numbering(&self) -> PinNumbering {
        self.numbering
    }

    /// Resolve a configured pin number to a GPIO number
    pub fn resolve(&self, pin: u8) -> Result<u8, PinError> {
        let gpio = match self.numbering {
            PinNumbering::Gpio => pin,
            PinNumbering::Header => HEADER_TO_GPIO
                .get(pin as usize)
                .copied()
                .flatten()
                .ok_or(PinError::InvalidPin)?,
        };
        if (gpio as usize) < GPIO_COUNT {
            Ok(gpio)
        } else {
            Err(PinError::InvalidPin)
        }
    }

    fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        let gpio = self.resolve(pin)?;
        match self.pins[gpio as usize].take() {
            Some(p) => Ok(p),
            None if BUS_PINS.contains(&gpio) => Err(PinError::Reserved),
            None => Err(PinError::AlreadyTaken),
        }
    }

    /// True when the pin could still be claimed
    pub fn is_available(&self, pin: u8) -> bool {
        match self.resolve(pin) {
            Ok(gpio) => self.pins[gpio as usize].is_some(),
            Err(_) => false,
        }
    }

    /// Claim a pin as an output, driven low
    pub fn claim_output(&mut self, pin: u8) -> Result<RpOutput, PinError> {
        let p = self.take(pin)?;
        Ok(RpOutput::new(Output::new(p, Level::Low)))
    }

    /// Claim a pin as an input with the given pull
    pub fn claim_input(&mut self, pin: u8, pull: Pull) -> Result<Input<'static>, PinError> {
        let p = self.take(pin)?;
        Ok(Input::new(p, pull))
    }

    /// Claim a motor's four driver inputs, in coil order, all low.
    ///
    /// A number repeated inside the quadruple, or already claimed by
    /// another motor, fails the whole claim.
    pub fn claim_motor(&mut self, pins: &MotorPins) -> Result<[RpOutput; 4], PinError> {
        let [a, b, c, d] = pins.0;
        Ok([
            self.claim_output(a)?,
            self.claim_output(b)?,
            self.claim_output(c)?,
            self.claim_output(d)?,
        ])
    }
}
