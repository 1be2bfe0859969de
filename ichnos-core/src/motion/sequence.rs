//! Stage sequences and the phase-continuous sequence generator
//!
//! A stepper motor is driven by walking its four coil inputs through an
//! ordered table of "stages" (one 4-bit pin pattern per delay interval).
//! [`plan`] turns a template table, a requested stage count, a direction
//! and the motor's prior phase into a lazy, exactly-sized stream of
//! stages that continues seamlessly from wherever the motor stopped.
//!
//! Continuity matters: a control loop issuing short corrections every
//! cycle would otherwise restart every move at table entry 0, skipping
//! or momentarily reversing a physical coil phase and stalling the
//! rotor.

use super::Direction;

#[allow(unused_imports)]
use micromath::F32Ext;

/// One coil drive pattern: four binary pin levels held for one delay
/// interval. Levels map 1:1 onto a motor's pins in construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stage(pub [bool; 4]);

impl Stage {
    /// All coils released
    pub const OFF: Stage = Stage([false, false, false, false]);

    /// Opposing coils energized to hold the rotor in place
    pub const HOLD: Stage = Stage([true, false, false, true]);

    /// Pin levels in pin order
    pub fn levels(&self) -> [bool; 4] {
        self.0
    }
}

const H: bool = true;
const L: bool = false;

/// Full-step drive: two coils on at every stage, one stage per step
pub const FULL_STEP: StageSet<'static> = StageSet::new(
    &[
        Stage([H, L, L, H]),
        Stage([H, H, L, L]),
        Stage([L, H, H, L]),
        Stage([L, L, H, H]),
    ],
    1,
);

/// Half-step drive: alternates one and two coils, two stages per step
pub const HALF_STEP: StageSet<'static> = StageSet::new(
    &[
        Stage([H, L, L, H]),
        Stage([H, L, L, L]),
        Stage([H, H, L, L]),
        Stage([L, H, L, L]),
        Stage([L, H, H, L]),
        Stage([L, L, H, L]),
        Stage([L, L, H, H]),
        Stage([L, L, L, H]),
    ],
    2,
);

/// Wave drive: a single coil at a time, one stage per step
pub const WAVE_STEP: StageSet<'static> = StageSet::new(&[
    Stage([H, L, L, L]),
    Stage([L, H, L, L]),
    Stage([L, L, H, L]),
    Stage([L, L, L, H]),
], 1);

/// An immutable template sequence: an ordered stage table plus the
/// number of stages that make up one logical motor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StageSet<'a> {
    stages: &'a [Stage],
    stages_per_step: u8,
}

impl<'a> StageSet<'a> {
    /// Create a template from a stage table.
    ///
    /// `stages_per_step` must be at least 1; [`plan`] and
    /// [`stage_total`] reject violations.
    pub const fn new(stages: &'a [Stage], stages_per_step: u8) -> Self {
        Self {
            stages,
            stages_per_step,
        }
    }

    /// Number of stages in one electrical cycle
    pub fn len(&self) -> u32 {
        self.stages.len() as u32
    }

    /// True for a zero-length template (always a configuration error)
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stages composing one logical step (2 for half-step drives)
    pub fn stages_per_step(&self) -> u8 {
        self.stages_per_step
    }

    /// The raw stage table
    pub fn stages(&self) -> &'a [Stage] {
        self.stages
    }
}

/// Where a motor stopped within its stage cycle.
///
/// `index` is the last physically emitted stage (in clockwise table
/// order); `length` is the template length that index was computed
/// against, so a later call with a different template can rescale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Phase {
    index: i32,
    length: u32,
}

impl Phase {
    /// A motor that has never stepped
    pub const UNSTEPPED: Phase = Phase {
        index: -1,
        length: 0,
    };

    /// Resume from a known stage index and template length
    pub fn at(index: i32, length: u32) -> Self {
        Self { index, length }
    }

    /// True until the first non-empty move is planned
    pub fn is_unstepped(&self) -> bool {
        self.index < 0 || self.length == 0
    }

    /// Last emitted stage index, -1 if never stepped
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Template length the index was computed against
    pub fn length(&self) -> u32 {
        self.length
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::UNSTEPPED
    }
}

/// Template errors. Both are configuration mistakes: fatal at setup,
/// never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// The stage table is empty
    EmptyTemplate,
    /// `stages_per_step` is zero
    ZeroStagesPerStep,
}

/// A concrete, exactly-sized stream of stages for one move.
///
/// The plan is computed lazily: each `next()` resolves one table index,
/// so a move of any length costs no memory. Cloning a plan replays it
/// from its current position.
#[derive(Debug, Clone)]
pub struct StagePlan<'a> {
    stages: &'a [Stage],
    direction: Direction,
    cursor: u32,
    remaining: u32,
}

impl<'a> Iterator for StagePlan<'a> {
    type Item = Stage;

    fn next(&mut self) -> Option<Stage> {
        if self.remaining == 0 {
            return None;
        }
        let len = self.stages.len() as u32;
        // The cursor walks the oriented (direction-adjusted) table; map
        // it back onto the clockwise table the slice actually stores.
        let physical = match self.direction {
            Direction::Clockwise => self.cursor,
            Direction::CounterClockwise => len - 1 - self.cursor,
        };
        self.cursor = (self.cursor + 1) % len;
        self.remaining -= 1;
        Some(self.stages[physical as usize])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl<'a> ExactSizeIterator for StagePlan<'a> {}

/// Generate the concrete stage stream for one move and the phase the
/// motor will be in afterwards.
///
/// The stream continues from `phase`: the first emitted stage is one
/// past the motor's previous stopping point in the requested direction
/// (rescaled if the template length changed). A fresh motor starts at
/// the oriented table's first entry.
///
/// `total_stages == 0` is a no-op: the plan is empty and the phase is
/// returned unchanged.
pub fn plan<'a>(
    set: &StageSet<'a>,
    total_stages: u32,
    direction: Direction,
    phase: Phase,
) -> Result<(StagePlan<'a>, Phase), SequenceError> {
    if set.stages_per_step == 0 {
        return Err(SequenceError::ZeroStagesPerStep);
    }
    let len = set.len();
    if len == 0 {
        return Err(SequenceError::EmptyTemplate);
    }
    if total_stages == 0 {
        let empty = StagePlan {
            stages: set.stages,
            direction,
            cursor: 0,
            remaining: 0,
        };
        return Ok((empty, phase));
    }

    // Prior index rescaled onto this template's length. None for a
    // motor that has never stepped.
    let scaled = if phase.is_unstepped() {
        None
    } else {
        Some(len * phase.index as u32 / phase.length)
    };

    // Continue one stage past the previous stop, in oriented-table
    // coordinates. A counter-clockwise continuation mirrors the index.
    let start = match scaled {
        None => 0,
        Some(s) => match direction {
            Direction::Clockwise => (s + 1) % len,
            Direction::CounterClockwise => (len - s) % len,
        },
    };

    let remainder = total_stages % len;
    // Index the advance is measured from. A fresh clockwise move acts
    // as if stopped one stage before the table (-1); a fresh
    // counter-clockwise move starts at the table's physical end, which
    // is one stage below index 0.
    let base = match scaled {
        None => match direction {
            Direction::Clockwise => -1i64,
            Direction::CounterClockwise => 0i64,
        },
        Some(s) => s as i64,
    };
    let next_index =
        (base + remainder as i64 * direction.signum() as i64).rem_euclid(len as i64) as i32;

    let plan = StagePlan {
        stages: set.stages,
        direction,
        cursor: start,
        remaining: total_stages,
    };
    let next = Phase {
        index: next_index,
        length: len,
    };
    Ok((plan, next))
}

/// Convert a (possibly fractional) logical step count into a stage
/// count.
///
/// Fractional counts arise upstream from distance and angle
/// conversions. The result rounds to the nearest whole stage; the
/// returned flag is true when rounding actually moved the value, which
/// callers surface as a non-fatal mis-alignment warning.
pub fn stage_total(set: &StageSet<'_>, steps: f32) -> (u32, bool) {
    let exact = steps * set.stages_per_step as f32;
    let rounded = exact.round();
    (rounded as u32, exact != rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::vec::Vec;

    fn collect(plan: StagePlan<'_>) -> Vec<Stage> {
        plan.collect()
    }

    #[test]
    fn test_plan_length_is_exact() {
        for set in [&FULL_STEP, &HALF_STEP, &WAVE_STEP] {
            for total in [0u32, 1, 3, 4, 7, 8, 16, 100] {
                let (plan, _) =
                    plan(set, total, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
                assert_eq!(plan.len(), total as usize);
                assert_eq!(collect(plan).len(), total as usize);
            }
        }
    }

    #[test]
    fn test_fresh_half_step_scenario() {
        // 4 logical steps on the half-step table is exactly one
        // electrical cycle: 8 stages, in table order, ending on index 7.
        let (total, misaligned) = stage_total(&HALF_STEP, 4.0);
        assert_eq!(total, 8);
        assert!(!misaligned);

        let (plan, next) =
            plan(&HALF_STEP, total, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
        let stages = collect(plan);
        assert_eq!(stages, HALF_STEP.stages());
        assert_eq!(next.index(), 7);
        assert_eq!(next.length(), 8);
    }

    #[test]
    fn test_zero_stages_is_noop() {
        let phase = Phase::at(5, 8);
        let (plan, next) = plan(&HALF_STEP, 0, Direction::Clockwise, phase).unwrap();
        assert_eq!(plan.len(), 0);
        assert_eq!(collect(plan), Vec::new());
        assert_eq!(next, phase);
    }

    #[test]
    fn test_empty_template_rejected() {
        let empty = StageSet::new(&[], 1);
        assert_eq!(
            plan(&empty, 4, Direction::Clockwise, Phase::UNSTEPPED),
            Err(SequenceError::EmptyTemplate)
        );
    }

    #[test]
    fn test_zero_stages_per_step_rejected() {
        let bad = StageSet::new(FULL_STEP.stages(), 0);
        assert_eq!(
            plan(&bad, 4, Direction::Clockwise, Phase::UNSTEPPED),
            Err(SequenceError::ZeroStagesPerStep)
        );
    }

    #[test]
    fn test_counter_clockwise_walks_table_backwards() {
        let (plan_ccw, next) = plan(
            &HALF_STEP,
            8,
            Direction::CounterClockwise,
            Phase::UNSTEPPED,
        )
        .unwrap();
        let mut expected: Vec<Stage> = HALF_STEP.stages().to_vec();
        expected.reverse();
        assert_eq!(collect(plan_ccw), expected);
        // One full backwards cycle ends on the table's first entry.
        assert_eq!(next.index(), 0);
    }

    #[test]
    fn test_full_cycle_direction_symmetry() {
        // Whole electrical cycles traverse the same physical stages in
        // opposite order regardless of direction.
        for set in [&FULL_STEP, &HALF_STEP, &WAVE_STEP] {
            let total = set.len() * 2;
            let (cw, _) = plan(set, total, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
            let (ccw, _) =
                plan(set, total, Direction::CounterClockwise, Phase::UNSTEPPED).unwrap();
            let mut cw_stages = collect(cw);
            cw_stages.reverse();
            assert_eq!(cw_stages, collect(ccw));
        }
    }

    #[test]
    fn test_phase_continuity_split_moves() {
        for direction in [Direction::Clockwise, Direction::CounterClockwise] {
            let (first, mid) = plan(&HALF_STEP, 5, direction, Phase::UNSTEPPED).unwrap();
            let (second, end_split) = plan(&HALF_STEP, 7, direction, mid).unwrap();
            let mut split: Vec<Stage> = collect(first);
            split.extend(collect(second));

            let (whole, end_whole) =
                plan(&HALF_STEP, 12, direction, Phase::UNSTEPPED).unwrap();
            assert_eq!(split, collect(whole));
            assert_eq!(end_split, end_whole);
        }
    }

    #[test]
    fn test_continuation_starts_one_past_previous_stop() {
        let (first, mid) = plan(&HALF_STEP, 3, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
        // Fresh start emits table entries 0, 1, 2.
        assert_eq!(collect(first), HALF_STEP.stages()[..3].to_vec());
        assert_eq!(mid.index(), 2);

        let (second, _) = plan(&HALF_STEP, 2, Direction::Clockwise, mid).unwrap();
        assert_eq!(collect(second), HALF_STEP.stages()[3..5].to_vec());
    }

    #[test]
    fn test_direction_reversal_revisits_last_neighbor() {
        // After stopping on stage 2, a counter-clockwise move resumes
        // at stage 1: the next physical stage backwards.
        let (_, mid) = plan(&HALF_STEP, 3, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
        assert_eq!(mid.index(), 2);
        let (back, next) = plan(&HALF_STEP, 1, Direction::CounterClockwise, mid).unwrap();
        assert_eq!(collect(back), HALF_STEP.stages()[1..2].to_vec());
        assert_eq!(next.index(), 1);
    }

    #[test]
    fn test_index_rescales_across_template_lengths() {
        // Stop on half-step index 2 (of 8), then continue full-step:
        // 2/8 scales to 1/4, so the move resumes at full-step entry 2.
        let (_, mid) = plan(&HALF_STEP, 3, Direction::Clockwise, Phase::UNSTEPPED).unwrap();
        assert_eq!((mid.index(), mid.length()), (2, 8));

        let (next_plan, next) = plan(&FULL_STEP, 1, Direction::Clockwise, mid).unwrap();
        assert_eq!(collect(next_plan), FULL_STEP.stages()[2..3].to_vec());
        assert_eq!((next.index(), next.length()), (2, 4));
    }

    #[test]
    fn test_stage_total_rounds_and_flags() {
        // Whole steps on a half-step table: exact.
        assert_eq!(stage_total(&HALF_STEP, 4.0), (8, false));
        // Half a step is still a whole stage count here.
        assert_eq!(stage_total(&HALF_STEP, 2.5), (5, false));
        // A fractional stage count rounds to nearest and is flagged.
        assert_eq!(stage_total(&FULL_STEP, 2.4), (2, true));
        assert_eq!(stage_total(&FULL_STEP, 2.6), (3, true));
        assert_eq!(stage_total(&WAVE_STEP, 0.0), (0, false));
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Clockwise),
            Just(Direction::CounterClockwise)
        ]
    }

    fn any_set() -> impl Strategy<Value = &'static StageSet<'static>> {
        prop_oneof![Just(&FULL_STEP), Just(&HALF_STEP), Just(&WAVE_STEP)]
    }

    proptest! {
        #[test]
        fn prop_plan_emits_exactly_requested(
            set in any_set(),
            total in 0u32..1000,
            direction in any_direction(),
        ) {
            let (plan, _) = plan(set, total, direction, Phase::UNSTEPPED).unwrap();
            prop_assert_eq!(plan.count(), total as usize);
        }

        #[test]
        fn prop_next_phase_in_range(
            set in any_set(),
            total in 1u32..1000,
            direction in any_direction(),
            index in 0i32..8,
        ) {
            let prior = Phase::at(index % set.len() as i32, set.len());
            let (_, next) = plan(set, total, direction, prior).unwrap();
            prop_assert!(next.index() >= 0);
            prop_assert!((next.index() as u32) < set.len());
            prop_assert_eq!(next.length(), set.len());
        }

        #[test]
        fn prop_split_equals_whole(
            set in any_set(),
            a in 0u32..500,
            b in 0u32..500,
            direction in any_direction(),
        ) {
            let (first, mid) = plan(set, a, direction, Phase::UNSTEPPED).unwrap();
            let (second, end_split) = plan(set, b, direction, mid).unwrap();
            let split: Vec<Stage> = first.chain(second).collect();

            let (whole, end_whole) = plan(set, a + b, direction, Phase::UNSTEPPED).unwrap();
            prop_assert_eq!(split, whole.collect::<Vec<_>>());
            // A zero-stage second move leaves the phase alone, which the
            // whole-move phase already equals.
            prop_assert_eq!(end_split, end_whole);
        }
    }
}
