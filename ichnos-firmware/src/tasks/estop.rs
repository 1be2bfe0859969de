//! Emergency stop task
//!
//! Arms the stop button and raises the robot-wide halt flag on the
//! first press. Every emit loop observes the flag between stages, so
//! the wheels stop within one stage delay and are de-energized.

use defmt::*;
use embassy_rp::gpio::Input;

use crate::channels::HALT;

/// Wait for the stop button (active low) and halt the robot
#[embassy_executor::task]
pub async fn estop_task(mut button: Input<'static>) {
    info!("Emergency stop armed");

    button.wait_for_falling_edge().await;

    warn!("Emergency stop pressed, halting");
    HALT.raise();
}
