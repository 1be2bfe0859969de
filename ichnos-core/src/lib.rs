//! Board-agnostic core logic for the line-follower robot
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Stage sequences and the phase-continuous sequence generator
//! - Stage timing (RPM to per-stage delay)
//! - Steering control laws (PID, threshold/hysteresis)
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod motion;
pub mod steering;
