//! PID steering law
//!
//! Proportional-integral-derivative correction for a signed line-offset
//! error. Gains are stored as integer milli-units (value × 1000) so the
//! whole law is integer arithmetic.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{SteeringStrategy, WheelCommand};

/// PID coefficients in milli-units (value × 1000)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidGains {
    /// Proportional gain × 1000
    pub kp_x1000: i32,
    /// Integral gain × 1000
    pub ki_x1000: i32,
    /// Derivative gain × 1000
    pub kd_x1000: i32,
}

impl PidGains {
    /// Gains from milli-unit integers (Kp=0.01 is `kp_x1000 = 10`)
    pub const fn from_scaled_1000(kp_x1000: i32, ki_x1000: i32, kd_x1000: i32) -> Self {
        Self {
            kp_x1000,
            ki_x1000,
            kd_x1000,
        }
    }

    /// True when any coefficient is non-zero
    pub fn is_configured(&self) -> bool {
        self.kp_x1000 != 0 || self.ki_x1000 != 0 || self.kd_x1000 != 0
    }
}

impl Default for PidGains {
    fn default() -> Self {
        // Kp=0.01, Ki=0.001, Kd=0.001
        Self::from_scaled_1000(10, 1, 1)
    }
}

/// PID steering configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidConfig {
    /// Gain coefficients
    pub gains: PidGains,
    /// Straight-line move weight per cycle, before the quantum scale
    pub base_weight: i32,
    /// Steps per unit of move weight
    pub step_quantum: i32,
    /// Integral accumulator clamp (anti-windup)
    pub integral_limit: i32,
    /// Clamp on the per-wheel step output
    pub output_limit: i32,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            gains: PidGains::default(),
            base_weight: 2,
            step_quantum: 4,
            integral_limit: 2000,
            output_limit: 32,
        }
    }
}

/// PID steering law state
///
/// A positive error (line right of centre) speeds the left wheel and
/// slows the right one, turning the robot toward the line.
#[derive(Debug, Clone)]
pub struct PidSteering {
    config: PidConfig,
    integral: i32,
    prev_error: i32,
}

impl PidSteering {
    /// Create a PID law from its configuration
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            integral: 0,
            prev_error: 0,
        }
    }

    /// Current gain coefficients
    pub fn gains(&self) -> &PidGains {
        &self.config.gains
    }

    /// Replace the gains, discarding accumulated state
    pub fn set_gains(&mut self, gains: PidGains) {
        self.config.gains = gains;
        self.reset();
    }
}

impl Default for PidSteering {
    fn default() -> Self {
        Self::new(PidConfig::default())
    }
}

impl SteeringStrategy for PidSteering {
    fn command(&mut self, error: i32) -> WheelCommand {
        let cfg = &self.config;

        // Integral with anti-windup clamp
        let limit = cfg.integral_limit.abs();
        self.integral = (self.integral + error).clamp(-limit, limit);

        let p = error * cfg.gains.kp_x1000;
        let i = self.integral * cfg.gains.ki_x1000;
        let d = (error - self.prev_error) * cfg.gains.kd_x1000;
        self.prev_error = error;

        let correction = (p + i + d) / 1000;

        WheelCommand {
            left: (cfg.base_weight + correction) * cfg.step_quantum,
            right: (cfg.base_weight - correction) * cfg.step_quantum,
        }
        .clamped(cfg.output_limit)
    }

    fn reset(&mut self) {
        self.integral = 0;
        self.prev_error = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p_only(kp_x1000: i32) -> PidSteering {
        PidSteering::new(PidConfig {
            gains: PidGains::from_scaled_1000(kp_x1000, 0, 0),
            ..PidConfig::default()
        })
    }

    #[test]
    fn test_zero_error_drives_straight() {
        let mut law = PidSteering::default();
        let cmd = law.command(0);
        assert_eq!(cmd.left, cmd.right);
        assert!(cmd.left > 0);
    }

    #[test]
    fn test_proportional_response() {
        // Kp=1.0: a +3 error shifts three weights of steps between the
        // wheels.
        let mut law = p_only(1000);
        let cmd = law.command(3);
        assert_eq!(cmd, WheelCommand { left: 20, right: -4 });
    }

    #[test]
    fn test_output_clamped() {
        let mut law = p_only(1000);
        let cmd = law.command(1000);
        assert_eq!(cmd.left, law.config.output_limit);
        assert_eq!(cmd.right, -law.config.output_limit);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut law = PidSteering::new(PidConfig {
            gains: PidGains::from_scaled_1000(0, 1000, 0),
            ..PidConfig::default()
        });
        // Repeated small errors grow the correction.
        let first = law.command(1);
        let second = law.command(1);
        assert!(second.left > first.left);
    }

    #[test]
    fn test_integral_windup_clamped() {
        let mut law = PidSteering::new(PidConfig {
            gains: PidGains::from_scaled_1000(0, 1000, 0),
            integral_limit: 5,
            output_limit: 1000,
            ..PidConfig::default()
        });
        for _ in 0..100 {
            law.command(50);
        }
        // Accumulator is pinned at the limit, not 100 * 50.
        assert_eq!(law.integral, 5);
    }

    #[test]
    fn test_derivative_reacts_to_change() {
        let mut law = PidSteering::new(PidConfig {
            gains: PidGains::from_scaled_1000(0, 0, 1000),
            ..PidConfig::default()
        });
        let jump = law.command(10);
        // Constant error: derivative contribution collapses to zero.
        let steady = law.command(10);
        assert!(jump.left > steady.left);
        assert_eq!(steady.left, steady.right);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut law = PidSteering::default();
        law.command(40);
        law.command(40);
        law.reset();
        assert_eq!(law.integral, 0);
        assert_eq!(law.prev_error, 0);
    }

    #[test]
    fn test_default_gains_configured() {
        assert!(PidGains::default().is_configured());
        assert!(!PidGains::from_scaled_1000(0, 0, 0).is_configured());
    }
}
