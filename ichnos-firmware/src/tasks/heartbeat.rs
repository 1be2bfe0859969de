//! Heartbeat task
//!
//! Blinks the status LED while the robot runs; a steady light means
//! the robot has halted.

use defmt::*;
use embassy_time::{Duration, Ticker};

use ichnos_drivers::indicator::StatusLed;
use ichnos_hal_rp2040::RpOutput;

use crate::channels::HALT;

/// Blink period in milliseconds
const HEARTBEAT_PERIOD_MS: u64 = 500;

/// Status LED loop
#[embassy_executor::task]
pub async fn heartbeat_task(mut led: StatusLed<RpOutput>) {
    info!("Heartbeat started");

    let mut ticker = Ticker::every(Duration::from_millis(HEARTBEAT_PERIOD_MS));
    loop {
        ticker.next().await;
        if HALT.is_raised() {
            led.on();
            return;
        }
        led.toggle();
    }
}
