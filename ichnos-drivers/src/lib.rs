//! Hardware driver implementations
//!
//! Concrete drivers for the robot's peripherals, generic over the
//! traits in ichnos-hal:
//!
//! - Stepper motors (phase-continuous stepping, synchronized and
//!   concurrent multi-motor dispatch)
//! - Two-wheel chassis (differential drive, distance/angle moves)
//! - APDS9960 colour sensor (line detection)
//! - Status LED

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod chassis;
pub mod indicator;
pub mod sensor;
pub mod stepper;
