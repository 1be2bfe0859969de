//! Stepper motor driver
//!
//! Drives four-wire steppers by walking their coil inputs through the
//! stage streams produced by the core sequence generator. Three levels
//! of operation:
//!
//! - [`emit`] / [`emit_synchronized`]: output a pre-built stage stream
//!   to one motor, or one stream per motor in lockstep (every motor's
//!   stage k is written before any motor's stage k+1).
//! - [`step_motor`]: one motor, one request. Normalizes the signed
//!   step count, derives the delay from the requested speed, then
//!   plans with phase continuity and emits.
//! - [`step_all`] / [`step_synchronized`]: multi-motor dispatch.
//!   `step_all` runs one concurrent unit per motor and joins them all,
//!   isolating per-motor failures; `step_synchronized` plans equal
//!   stage counts and emits them in lockstep.
//!
//! A [`HaltFlag`] is polled once per stage, so an abort takes effect
//! mid-move; the aborting motor is de-energized before the error is
//! returned.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::join::join_array;
use embassy_time::{Duration, Timer};

use ichnos_core::motion::sequence::{self, SequenceError, Stage, StagePlan, StageSet};
use ichnos_core::motion::timing::{self, TimingError};
use ichnos_core::motion::{Direction, Phase};
use ichnos_hal::gpio::OutputPin;

/// Cooperative abort flag shared between the control tasks and every
/// in-flight emit loop.
pub struct HaltFlag(AtomicBool);

impl HaltFlag {
    /// A flag that is not raised
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Raise the flag; every emit loop stops at its next stage boundary
    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Lower the flag again (after the fault is handled)
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    /// True once raised
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for HaltFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Synchronized-emit input mismatches. Always the caller's inputs to
/// fix; streams are never silently truncated to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncError {
    /// Motor and stream counts differ
    MotorCount {
        /// Motors supplied
        motors: usize,
        /// Streams supplied
        plans: usize,
    },
    /// Streams are not all the same length
    StageCount {
        /// Length of the first stream
        expected: usize,
        /// Conflicting length
        found: usize,
    },
}

/// Failure of a single step operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepError {
    /// Template misconfiguration
    Sequence(SequenceError),
    /// Requested speed cannot be actuated
    Timing(TimingError),
    /// Synchronized input mismatch
    Sync(SyncError),
    /// Aborted by the halt flag; the motor was de-energized
    Halted,
}

impl From<SequenceError> for StepError {
    fn from(e: SequenceError) -> Self {
        StepError::Sequence(e)
    }
}

impl From<TimingError> for StepError {
    fn from(e: TimingError) -> Self {
        StepError::Timing(e)
    }
}

impl From<SyncError> for StepError {
    fn from(e: SyncError) -> Self {
        StepError::Sync(e)
    }
}

/// A four-wire stepper motor
///
/// Owns its four driver-input pins (coil order) and the phase state
/// that lets consecutive moves continue mid-cycle. Construction drives
/// every coil low.
pub struct Motor<P: OutputPin> {
    pins: [P; 4],
    phase: Phase,
    steps_per_rev: u16,
}

impl<P: OutputPin> Motor<P> {
    /// Take ownership of four claimed output pins, in coil order
    pub fn new(pins: [P; 4], steps_per_rev: u16) -> Self {
        let mut motor = Self {
            pins,
            phase: Phase::UNSTEPPED,
            steps_per_rev,
        };
        motor.unlock();
        motor
    }

    /// Where the motor stopped within its stage cycle
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Logical steps per output-shaft revolution
    pub fn steps_per_rev(&self) -> u16 {
        self.steps_per_rev
    }

    /// Write one stage's four levels to the coil pins, in order
    pub fn apply_stage(&mut self, stage: Stage) {
        for (pin, level) in self.pins.iter_mut().zip(stage.levels()) {
            pin.set_level(level);
        }
    }

    /// Energize opposing coils to hold the rotor. Dissipates
    /// continuously; do not leave applied.
    pub fn lock(&mut self) {
        self.apply_stage(Stage::HOLD);
    }

    /// Release every coil (the reserved all-zero stage)
    pub fn unlock(&mut self) {
        self.apply_stage(Stage::OFF);
    }
}

/// One requested move: a signed, possibly fractional step count at a
/// given speed, using a given drive sequence.
#[derive(Debug, Clone, Copy)]
pub struct StepRequest<'a> {
    /// Logical steps; negative reverses the direction
    pub steps: f32,
    /// Rotation direction for positive step counts
    pub direction: Direction,
    /// Drive sequence template
    pub sequence: &'a StageSet<'a>,
    /// Wheel speed
    pub rpm: u16,
}

impl<'a> StepRequest<'a> {
    /// Fold a negative step count into the direction.
    ///
    /// Works on this call's own copy of the direction; nothing shared
    /// is flipped.
    pub fn normalized(&self) -> (f32, Direction) {
        if self.steps < 0.0 {
            (-self.steps, self.direction.opposite())
        } else {
            (self.steps, self.direction)
        }
    }
}

/// Run one motor through one request.
///
/// A zero step count is accepted and does nothing. Fractional stage
/// totals round to nearest with a warning. The motor's phase is
/// carried forward so the next request continues mid-cycle.
pub async fn step_motor<P: OutputPin>(
    motor: &mut Motor<P>,
    request: &StepRequest<'_>,
    halt: &HaltFlag,
) -> Result<(), StepError> {
    let delay_us = timing::stage_delay_us(request.sequence, request.rpm, motor.steps_per_rev)?;

    let (steps, direction) = request.normalized();
    let (total, misaligned) = sequence::stage_total(request.sequence, steps);
    if misaligned {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "step count {} is not a whole number of stages, rounding to {}",
            steps,
            total
        );
    }
    if total == 0 {
        return Ok(());
    }

    let (plan, next) = sequence::plan(request.sequence, total, direction, motor.phase)?;
    motor.phase = next;
    emit(motor, plan, delay_us, halt).await
}

/// Output one stage stream to one motor.
///
/// Each stage is written to all four pins, then the stage delay
/// elapses. Pins are left at the last commanded levels; callers wanting
/// the coils released issue [`Motor::unlock`] explicitly.
pub async fn emit<P: OutputPin>(
    motor: &mut Motor<P>,
    plan: StagePlan<'_>,
    delay_us: u64,
    halt: &HaltFlag,
) -> Result<(), StepError> {
    timing::check_delay(delay_us)?;
    let delay = Duration::from_micros(delay_us);

    for stage in plan {
        if halt.is_raised() {
            motor.unlock();
            return Err(StepError::Halted);
        }
        motor.apply_stage(stage);
        Timer::after(delay).await;
    }
    Ok(())
}

/// Validate inputs for synchronized emission: one stream per motor,
/// all streams the same length. Returns the shared length.
pub fn check_synchronized(
    motor_count: usize,
    plans: &[StagePlan<'_>],
) -> Result<usize, SyncError> {
    if motor_count != plans.len() {
        return Err(SyncError::MotorCount {
            motors: motor_count,
            plans: plans.len(),
        });
    }
    let expected = plans.first().map(|p| p.len()).unwrap_or(0);
    for plan in plans {
        if plan.len() != expected {
            return Err(SyncError::StageCount {
                expected,
                found: plan.len(),
            });
        }
    }
    Ok(expected)
}

/// Output one stage stream per motor in lockstep.
///
/// For each shared stage index, every motor's pins are written before
/// the single shared delay elapses, so at any instant between
/// transitions all motors sit on self-consistent stages. That balance
/// is what keeps two wheels on one chassis from fighting each other.
pub async fn emit_synchronized<P: OutputPin>(
    motors: &mut [&mut Motor<P>],
    plans: &mut [StagePlan<'_>],
    delay_us: u64,
    halt: &HaltFlag,
) -> Result<(), StepError> {
    timing::check_delay(delay_us)?;
    let total = check_synchronized(motors.len(), plans)?;
    let delay = Duration::from_micros(delay_us);

    for _ in 0..total {
        if halt.is_raised() {
            for motor in motors.iter_mut() {
                motor.unlock();
            }
            return Err(StepError::Halted);
        }
        for (motor, plan) in motors.iter_mut().zip(plans.iter_mut()) {
            if let Some(stage) = plan.next() {
                motor.apply_stage(stage);
            }
        }
        Timer::after(delay).await;
    }
    Ok(())
}

/// One motor's share of a concurrent dispatch
pub struct StepJob<'a, P: OutputPin> {
    /// The motor to move
    pub motor: &'a mut Motor<P>,
    /// Its requested move
    pub request: StepRequest<'a>,
}

/// Run every job concurrently and wait for all of them.
///
/// Each motor gets its own unit of execution; the call returns once
/// every unit has finished. Failures are collected per motor: one
/// motor's timing fault neither stops nor rolls back its siblings,
/// since a physical motor cannot be un-stepped.
pub async fn step_all<P: OutputPin, const N: usize>(
    jobs: [StepJob<'_, P>; N],
    halt: &HaltFlag,
) -> [Result<(), StepError>; N] {
    join_array(jobs.map(|job| async move { step_motor(job.motor, &job.request, halt).await }))
        .await
}

/// Plan equal-length moves for several motors and emit them in
/// lockstep.
///
/// All motors share one sequence and speed; the shared stage delay is
/// the slowest any of the motors requires. Moves that plan to unequal
/// stage totals are rejected rather than truncated.
pub async fn step_synchronized<P: OutputPin, const N: usize>(
    motors: &mut [&mut Motor<P>; N],
    moves: [(f32, Direction); N],
    set: &StageSet<'_>,
    rpm: u16,
    halt: &HaltFlag,
) -> Result<(), StepError> {
    let mut delay_us = 0u64;
    for motor in motors.iter() {
        delay_us = delay_us.max(timing::stage_delay_us(set, rpm, motor.steps_per_rev)?);
    }

    // A zero-length dry run validates the template up front and seeds
    // the plan slots, so the fill loop below can only fail on a
    // genuine per-move problem.
    let (empty_plan, _) =
        sequence::plan(set, 0, Direction::Clockwise, Phase::UNSTEPPED)?;
    let mut plans: [StagePlan<'_>; N] = core::array::from_fn(|_| empty_plan.clone());

    for (i, (steps, direction)) in moves.into_iter().enumerate() {
        let request = StepRequest {
            steps,
            direction,
            sequence: set,
            rpm,
        };
        let (steps, direction) = request.normalized();
        let (total, misaligned) = sequence::stage_total(set, steps);
        if misaligned {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "step count {} is not a whole number of stages, rounding to {}",
                steps,
                total
            );
        }
        let (plan, next) = sequence::plan(set, total, direction, motors[i].phase)?;
        motors[i].phase = next;
        plans[i] = plan;
    }

    emit_synchronized(motors, &mut plans, delay_us, halt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ichnos_core::motion::sequence::{FULL_STEP, HALF_STEP};
    use std::vec::Vec;

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
    }

    impl MockPin {
        fn new() -> Self {
            Self { high: true } // constructor must drive it low
        }
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    fn mock_motor() -> Motor<MockPin> {
        Motor::new(
            [MockPin::new(), MockPin::new(), MockPin::new(), MockPin::new()],
            200,
        )
    }

    fn levels<P: OutputPin>(motor: &Motor<P>) -> [bool; 4] {
        [
            motor.pins[0].is_set_high(),
            motor.pins[1].is_set_high(),
            motor.pins[2].is_set_high(),
            motor.pins[3].is_set_high(),
        ]
    }

    #[test]
    fn test_new_motor_is_deenergized() {
        let motor = mock_motor();
        assert_eq!(levels(&motor), [false; 4]);
        assert!(motor.phase().is_unstepped());
    }

    #[test]
    fn test_apply_stage_maps_levels_in_pin_order() {
        let mut motor = mock_motor();
        motor.apply_stage(Stage([true, false, true, false]));
        assert_eq!(levels(&motor), [true, false, true, false]);
    }

    #[test]
    fn test_lock_and_unlock_stages() {
        let mut motor = mock_motor();
        motor.lock();
        assert_eq!(levels(&motor), Stage::HOLD.levels());
        motor.unlock();
        assert_eq!(levels(&motor), Stage::OFF.levels());
    }

    #[test]
    fn test_negative_steps_normalize_to_opposite_direction() {
        let backwards = StepRequest {
            steps: -5.0,
            direction: Direction::Clockwise,
            sequence: &HALF_STEP,
            rpm: 60,
        };
        let forwards = StepRequest {
            steps: 5.0,
            direction: Direction::CounterClockwise,
            sequence: &HALF_STEP,
            rpm: 60,
        };
        assert_eq!(backwards.normalized(), forwards.normalized());

        // The normalized requests plan identical pin output.
        let (total_a, _) = sequence::stage_total(&HALF_STEP, backwards.normalized().0);
        let (plan_a, _) = sequence::plan(
            &HALF_STEP,
            total_a,
            backwards.normalized().1,
            Phase::UNSTEPPED,
        )
        .unwrap();
        let (plan_b, _) = sequence::plan(
            &HALF_STEP,
            total_a,
            forwards.normalized().1,
            Phase::UNSTEPPED,
        )
        .unwrap();
        assert_eq!(plan_a.collect::<Vec<_>>(), plan_b.collect::<Vec<_>>());
    }

    #[test]
    fn test_check_synchronized_accepts_equal_lengths() {
        let (plan_a, _) =
            sequence::plan(&HALF_STEP, 8, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
        let (plan_b, _) =
            sequence::plan(&HALF_STEP, 8, Direction::CounterClockwise, Phase::UNSTEPPED)
                .unwrap();
        assert_eq!(check_synchronized(2, &[plan_a, plan_b]), Ok(8));
    }

    #[test]
    fn test_check_synchronized_rejects_arity_mismatch() {
        let (plan_a, _) =
            sequence::plan(&HALF_STEP, 8, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
        assert_eq!(
            check_synchronized(2, &[plan_a]),
            Err(SyncError::MotorCount {
                motors: 2,
                plans: 1
            })
        );
    }

    #[test]
    fn test_check_synchronized_rejects_unequal_lengths() {
        let (plan_a, _) =
            sequence::plan(&HALF_STEP, 8, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
        let (plan_b, _) =
            sequence::plan(&FULL_STEP, 6, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
        assert_eq!(
            check_synchronized(2, &[plan_a, plan_b]),
            Err(SyncError::StageCount {
                expected: 8,
                found: 6
            })
        );
    }

    #[test]
    fn test_halt_flag() {
        let halt = HaltFlag::new();
        assert!(!halt.is_raised());
        halt.raise();
        assert!(halt.is_raised());
        halt.clear();
        assert!(!halt.is_raised());
    }
}
