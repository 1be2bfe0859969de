//! Steering control laws
//!
//! Once per control cycle the firmware reads one scalar error from the
//! line sensor and maps it to a signed step count per wheel. Two laws
//! are provided: a PID law for signed centre-offset errors and a
//! threshold/hysteresis law for unsigned colour-distance errors. Both
//! are pure integer math so they run identically on the host test
//! suite and the FPU-less target.

pub mod pid;
pub mod threshold;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use pid::{PidConfig, PidGains, PidSteering};
pub use threshold::{ThresholdConfig, ThresholdSteering};

/// Signed step counts for one control cycle, one per wheel.
///
/// Sign selects the wheel's direction, magnitude the step count; the
/// chassis layer owns the sign-to-direction mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WheelCommand {
    /// Left wheel steps (positive = forward)
    pub left: i32,
    /// Right wheel steps (positive = forward)
    pub right: i32,
}

impl WheelCommand {
    /// Both wheels stationary
    pub const STOP: WheelCommand = WheelCommand { left: 0, right: 0 };

    /// Clamp both wheels into the configured safe range
    pub fn clamped(self, limit: i32) -> Self {
        let limit = limit.abs();
        Self {
            left: self.left.clamp(-limit, limit),
            right: self.right.clamp(-limit, limit),
        }
    }

    /// True when neither wheel would move
    pub fn is_stop(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

/// A steering law: error signal in, wheel steps out
pub trait SteeringStrategy {
    /// Compute the next cycle's wheel command from one error reading
    fn command(&mut self, error: i32) -> WheelCommand;

    /// Forget accumulated state (integral, hysteresis position)
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        let cmd = WheelCommand { left: 100, right: -7 };
        let clamped = cmd.clamped(16);
        assert_eq!(clamped, WheelCommand { left: 16, right: -7 });
        // A negative limit means the same range as its magnitude.
        assert_eq!(cmd.clamped(-16), clamped);
    }

    #[test]
    fn test_stop() {
        assert!(WheelCommand::STOP.is_stop());
        assert!(!WheelCommand { left: 0, right: 1 }.is_stop());
    }
}
