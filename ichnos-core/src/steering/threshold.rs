//! Threshold steering law
//!
//! Hysteresis correction for an unsigned colour-distance error, riding
//! one edge of the line: a high error means the sensor has drifted off
//! the marking and the robot eases back; a low error means it is too
//! far onto the marking and it eases away. Between the thresholds the
//! previous weight holds, which keeps the robot from hunting.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{SteeringStrategy, WheelCommand};

/// Threshold law configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdConfig {
    /// Error above which the robot eases toward the marking
    pub high_threshold: i32,
    /// Error below which the robot eases away from the marking
    pub low_threshold: i32,
    /// Weight removed per cycle when easing right
    pub right_turn_weight: i32,
    /// Weight added per cycle when easing left
    pub left_turn_weight: i32,
    /// Step weight of a straight cycle
    pub base_steps: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            high_threshold: 30,
            low_threshold: 15,
            right_turn_weight: 1,
            left_turn_weight: 4,
            base_steps: 4,
        }
    }
}

impl ThresholdConfig {
    /// Lowest permitted step weight (70% of base)
    pub fn low_limit(&self) -> i32 {
        self.base_steps * 7 / 10
    }

    /// Highest permitted step weight (130% of base)
    pub fn high_limit(&self) -> i32 {
        self.base_steps * 13 / 10
    }
}

/// Threshold steering law state
#[derive(Debug, Clone)]
pub struct ThresholdSteering {
    config: ThresholdConfig,
    weight: i32,
}

impl ThresholdSteering {
    /// Create a threshold law from its configuration
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            weight: config.base_steps,
            config,
        }
    }
}

impl Default for ThresholdSteering {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

impl SteeringStrategy for ThresholdSteering {
    fn command(&mut self, error: i32) -> WheelCommand {
        let cfg = &self.config;

        if error > cfg.high_threshold {
            self.weight -= cfg.right_turn_weight;
        } else if error < cfg.low_threshold {
            self.weight += cfg.left_turn_weight;
        }
        self.weight = self.weight.clamp(cfg.low_limit(), cfg.high_limit());

        // The wheel pair always sums to twice the base weight, so the
        // robot's ground speed stays constant while it corrects.
        WheelCommand {
            left: self.weight,
            right: 2 * cfg.base_steps - self.weight,
        }
    }

    fn reset(&mut self) {
        self.weight = self.config.base_steps;
    }
}
