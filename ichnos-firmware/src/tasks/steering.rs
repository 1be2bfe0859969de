//! Steering control task
//!
//! The robot's control loop: wait for the next sensor error, map it to
//! a wheel command through the configured law, drive the chassis.
//! Exits when the halt flag is raised, releasing both wheels.

use defmt::*;
use embassy_time::{with_timeout, Duration, Timer};

use ichnos_core::config::{SteeringConfig, SteeringLaw};
use ichnos_core::steering::{PidSteering, SteeringStrategy, ThresholdSteering};
use ichnos_drivers::chassis::Chassis;
use ichnos_drivers::stepper::StepError;
use ichnos_hal_rp2040::RpOutput;

use crate::channels::{HALT, LINE_ERROR};

/// The configured law, concrete so the task needs no allocation
enum Law {
    Pid(PidSteering),
    Threshold(ThresholdSteering),
}

impl Law {
    fn from_config(config: &SteeringConfig) -> Self {
        match config.law {
            SteeringLaw::Pid(c) => Law::Pid(PidSteering::new(c)),
            SteeringLaw::Threshold(c) => Law::Threshold(ThresholdSteering::new(c)),
        }
    }

    fn command(&mut self, error: i32) -> ichnos_core::steering::WheelCommand {
        match self {
            Law::Pid(law) => law.command(error),
            Law::Threshold(law) => law.command(error),
        }
    }
}

/// Steering control loop
#[embassy_executor::task]
pub async fn steering_task(mut chassis: Chassis<RpOutput>, config: SteeringConfig) {
    info!("Steering task started");

    let mut law = Law::from_config(&config);
    let cycle = Duration::from_millis(config.cycle_ms as u64);

    'control: loop {
        if HALT.is_raised() {
            break;
        }

        // Bounded wait so a dead sensor or a mid-wait halt cannot
        // leave the loop parked with energized coils.
        let error = match with_timeout(cycle, LINE_ERROR.wait()).await {
            Ok(error) => error,
            Err(_) => continue,
        };
        let command = law.command(error);
        trace!(
            "error {} -> steps L:{} R:{}",
            error,
            command.left,
            command.right
        );

        for result in chassis.drive(command, &HALT).await {
            match result {
                Ok(()) => {}
                Err(StepError::Halted) => break 'control,
                Err(e) => {
                    // One wheel faulting does not undo the other; log
                    // and let the next cycle correct the course.
                    error!("wheel fault: {:?}", e);
                }
            }
        }

        Timer::after(cycle).await;
    }

    chassis.unlock();
    info!("Steering stopped, wheels released");
}
