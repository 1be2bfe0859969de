//! RP2040 implementation of the Ichnos HAL
//!
//! Provides the pin bank (runtime pin claiming under a configured
//! numbering scheme) and the output-pin wrapper the driver crate is
//! generic over.

#![no_std]

pub mod gpio;
pub mod pins;

pub use gpio::RpOutput;
pub use pins::{PinBank, PinError, SystemPeripherals};
