//! Stage timing: rotational speed to per-stage delay
//!
//! The 28BYJ-48 class of geared steppers misses steps when driven
//! faster than roughly one stage per 1.5 ms, so every delay derived
//! here is checked against that floor. Exceeding it is a configuration
//! fault of the requesting call, not something to retry.

use super::sequence::StageSet;

/// Hardware floor for the pause between stages, in microseconds
pub const MINIMUM_STAGE_DELAY_US: u64 = 1500;

/// Default rotational speed
pub const DEFAULT_RPM: u16 = 60;

/// Logical steps per output-shaft revolution for the stock motors
pub const DEFAULT_STEPS_PER_REV: u16 = 200;

/// Timing faults. Fatal to the single step call that produced them;
/// sibling motors in the same dispatch are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// Requested speed is zero
    ZeroRpm,
    /// Motor has no declared step resolution
    ZeroStepsPerRevolution,
    /// Requested speed needs a shorter pause than the hardware allows
    DelayBelowMinimum {
        /// Delay the request works out to
        delay_us: u64,
        /// Hardware floor
        minimum_us: u64,
    },
}

/// Per-stage delay for a target speed, in microseconds.
///
/// One revolution is `steps_per_rev` logical steps of
/// `stages_per_step` stages each, so:
///
/// ```text
/// delay = 60_000_000 µs / (rpm * steps_per_rev * stages_per_step)
/// ```
pub fn stage_delay_us(
    set: &StageSet<'_>,
    rpm: u16,
    steps_per_rev: u16,
) -> Result<u64, TimingError> {
    if rpm == 0 {
        return Err(TimingError::ZeroRpm);
    }
    if steps_per_rev == 0 {
        return Err(TimingError::ZeroStepsPerRevolution);
    }
    let stages_per_rev =
        rpm as u64 * steps_per_rev as u64 * set.stages_per_step().max(1) as u64;
    let delay_us = 60_000_000 / stages_per_rev;
    check_delay(delay_us)?;
    Ok(delay_us)
}

/// Validate a raw per-stage delay against the hardware floor
pub fn check_delay(delay_us: u64) -> Result<(), TimingError> {
    if delay_us < MINIMUM_STAGE_DELAY_US {
        return Err(TimingError::DelayBelowMinimum {
            delay_us,
            minimum_us: MINIMUM_STAGE_DELAY_US,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::sequence::{FULL_STEP, HALF_STEP};

    #[test]
    fn test_known_delays() {
        // 60 RPM, 200 steps/rev, full-step: 5 ms per stage.
        assert_eq!(stage_delay_us(&FULL_STEP, 60, 200), Ok(5000));
        // Half-step doubles the stage rate.
        assert_eq!(stage_delay_us(&HALF_STEP, 60, 200), Ok(2500));
    }

    #[test]
    fn test_delay_decreases_with_rpm() {
        let mut previous = u64::MAX;
        for rpm in 1..=100u16 {
            let delay = stage_delay_us(&HALF_STEP, rpm, 200).unwrap();
            assert!(delay < previous, "delay must shrink as rpm grows");
            previous = delay;
        }
    }

    #[test]
    fn test_floor_enforced() {
        // 300 RPM full-step works out to 1 ms, under the 1.5 ms floor.
        assert_eq!(
            stage_delay_us(&FULL_STEP, 300, 200),
            Err(TimingError::DelayBelowMinimum {
                delay_us: 1000,
                minimum_us: MINIMUM_STAGE_DELAY_US,
            })
        );
        // The fastest permissible full-step rate still passes.
        assert_eq!(stage_delay_us(&FULL_STEP, 200, 200), Ok(1500));
    }

    #[test]
    fn test_zero_inputs_rejected() {
        assert_eq!(stage_delay_us(&FULL_STEP, 0, 200), Err(TimingError::ZeroRpm));
        assert_eq!(
            stage_delay_us(&FULL_STEP, 60, 0),
            Err(TimingError::ZeroStepsPerRevolution)
        );
    }

    #[test]
    fn test_check_delay() {
        assert!(check_delay(MINIMUM_STAGE_DELAY_US).is_ok());
        assert!(check_delay(MINIMUM_STAGE_DELAY_US - 1).is_err());
    }
}
