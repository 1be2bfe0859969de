//! Line sensor acquisition task
//!
//! Polls the colour sensor at the control period and publishes the
//! scalar steering error. Bus hiccups are logged and skipped; steering
//! simply keeps its previous course until a fresh reading lands.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Timer;

use ichnos_drivers::sensor::Apds9960;

use crate::channels::{HALT, LINE_ERROR};
use crate::config::{ERROR_DIVISOR, LINE_COLOR, SENSOR_PERIOD_MS};

/// The robot's line sensor on the board-routed I2C bus
pub type LineSensor = Apds9960<I2c<'static, I2C0, Async>>;

/// Colour acquisition loop
#[embassy_executor::task]
pub async fn sensor_task(mut sensor: LineSensor) {
    info!("Sensor task started");

    if let Err(e) = sensor.init().await {
        error!("sensor init failed: {:?}", e);
        return;
    }
    info!("Sensor initialized");

    loop {
        if HALT.is_raised() {
            break;
        }

        match sensor.read_color().await {
            Ok(reading) => {
                let error = reading.distance(&LINE_COLOR) / ERROR_DIVISOR;
                trace!(
                    "colour c:{} r:{} g:{} b:{} -> error {}",
                    reading.clear,
                    reading.red,
                    reading.green,
                    reading.blue,
                    error
                );
                LINE_ERROR.signal(error);
            }
            Err(e) => warn!("colour read failed: {:?}", e),
        }

        Timer::after_millis(SENSOR_PERIOD_MS).await;
    }

    info!("Sensor stopped");
}
