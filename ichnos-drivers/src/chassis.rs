//! Two-wheel differential chassis
//!
//! Wraps the left and right wheel motors behind robot-level moves. The
//! motors face opposite directions on the chassis, so "forward" is
//! clockwise on the left wheel and counter-clockwise on the right;
//! spin turns run both wheels the same way.

use ichnos_core::config::{ChassisGeometry, DriveProfile};
use ichnos_core::motion::Direction;
use ichnos_core::steering::WheelCommand;
use ichnos_hal::gpio::OutputPin;

use crate::stepper::{
    step_all, step_synchronized, HaltFlag, Motor, StepError, StepJob, StepRequest,
};

/// Left wheel forward direction
const LEFT_FORWARD: Direction = Direction::Clockwise;
/// Right wheel forward direction (mirrored mounting)
const RIGHT_FORWARD: Direction = Direction::CounterClockwise;

/// A dual-stepper differential drive
pub struct Chassis<P: OutputPin> {
    left: Motor<P>,
    right: Motor<P>,
    profile: DriveProfile,
    geometry: ChassisGeometry,
}

impl<P: OutputPin> Chassis<P> {
    /// Assemble a chassis from its two wheel motors
    pub fn new(
        left: Motor<P>,
        right: Motor<P>,
        profile: DriveProfile,
        geometry: ChassisGeometry,
    ) -> Self {
        Self {
            left,
            right,
            profile,
            geometry,
        }
    }

    /// The active drive profile
    pub fn profile(&self) -> &DriveProfile {
        &self.profile
    }

    /// Wheel steps equivalent to a ground distance
    pub fn distance_to_steps(&self, distance_mm: f32) -> f32 {
        let wheel_radians = distance_mm / self.geometry.wheel_radius_mm as f32;
        wheel_radians * self.profile.steps_per_rev as f32 / (2.0 * core::f32::consts::PI)
    }

    /// Wheel steps equivalent to a spin turn
    pub fn degrees_to_steps(&self, degrees: f32) -> f32 {
        let arc_mm = self.geometry.turning_radius_mm as f32 * degrees
            / self.geometry.wheel_radius_mm as f32;
        arc_mm * self.profile.steps_per_rev as f32 / 360.0
    }

    /// The per-wheel step jobs for one differential command.
    ///
    /// Signed counts ride the wheels' forward directions; the stepper
    /// layer folds negatives into the opposite direction.
    pub fn wheel_jobs(&mut self, command: WheelCommand) -> [StepJob<'_, P>; 2] {
        let sequence = self.profile.mode.stage_set();
        let rpm = self.profile.rpm;
        [
            StepJob {
                motor: &mut self.left,
                request: StepRequest {
                    steps: command.left as f32,
                    direction: LEFT_FORWARD,
                    sequence,
                    rpm,
                },
            },
            StepJob {
                motor: &mut self.right,
                request: StepRequest {
                    steps: command.right as f32,
                    direction: RIGHT_FORWARD,
                    sequence,
                    rpm,
                },
            },
        ]
    }

    /// Drive one differential command, both wheels concurrently.
    ///
    /// The wheels usually want different step counts here, so each runs
    /// in its own unit of execution; per-wheel failures come back
    /// separately.
    pub async fn drive(
        &mut self,
        command: WheelCommand,
        halt: &HaltFlag,
    ) -> [Result<(), StepError>; 2] {
        if command.is_stop() {
            return [Ok(()), Ok(())];
        }
        step_all(self.wheel_jobs(command), halt).await
    }

    /// Roll straight forward a ground distance, wheels in lockstep
    pub async fn advance(&mut self, distance_mm: f32, halt: &HaltFlag) -> Result<(), StepError> {
        let steps = self.distance_to_steps(distance_mm);
        self.locked_move([(steps, LEFT_FORWARD), (steps, RIGHT_FORWARD)], halt)
            .await
    }

    /// Roll straight backward a ground distance, wheels in lockstep
    pub async fn reverse(&mut self, distance_mm: f32, halt: &HaltFlag) -> Result<(), StepError> {
        let steps = self.distance_to_steps(distance_mm);
        self.locked_move(
            [
                (steps, LEFT_FORWARD.opposite()),
                (steps, RIGHT_FORWARD.opposite()),
            ],
            halt,
        )
        .await
    }

    /// Spin left in place by an angle
    pub async fn turn_left(&mut self, degrees: f32, halt: &HaltFlag) -> Result<(), StepError> {
        let steps = self.degrees_to_steps(degrees);
        self.locked_move(
            [
                (steps, Direction::CounterClockwise),
                (steps, Direction::CounterClockwise),
            ],
            halt,
        )
        .await
    }

    /// Spin right in place by an angle
    pub async fn turn_right(&mut self, degrees: f32, halt: &HaltFlag) -> Result<(), StepError> {
        let steps = self.degrees_to_steps(degrees);
        self.locked_move(
            [
                (steps, Direction::Clockwise),
                (steps, Direction::Clockwise),
            ],
            halt,
        )
        .await
    }

    async fn locked_move(
        &mut self,
        moves: [(f32, Direction); 2],
        halt: &HaltFlag,
    ) -> Result<(), StepError> {
        let set = self.profile.mode.stage_set();
        step_synchronized(
            &mut [&mut self.left, &mut self.right],
            moves,
            set,
            self.profile.rpm,
            halt,
        )
        .await
    }

    /// Hold both wheels against external torque
    pub fn lock(&mut self) {
        self.left.lock();
        self.right.lock();
    }

    /// Release both wheels' coils
    pub fn unlock(&mut self) {
        self.left.unlock();
        self.right.unlock();
    }
}
