//! Ichnos - Line-Following Robot Firmware
//!
//! Main firmware binary for RP2040-based dual-stepper robots. Claims
//! the configured pins, assembles the chassis and spawns the control
//! tasks.
//!
//! Named after the Greek "ichnos" (ἴχνος) meaning "track" - the robot
//! steers to keep a traced line under its colour sensor.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::i2c::{self, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::I2C0;
use {defmt_rtt as _, panic_probe as _};

use ichnos_drivers::chassis::Chassis;
use ichnos_drivers::indicator::StatusLed;
use ichnos_drivers::sensor::Apds9960;
use ichnos_drivers::stepper::Motor;
use ichnos_hal_rp2040::pins::PinBank;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});

/// GPIOs the sensor bus is routed to on this board
const SENSOR_BUS_GPIOS: (u8, u8) = (20, 21);

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ichnos firmware starting...");

    let p = embassy_rp::init(Default::default());
    let robot = config::robot_config();

    // All pin claims resolve through the configured numbering scheme.
    let (mut bank, system) = PinBank::split(p, robot.hardware.numbering);
    info!("Pin bank ready ({:?} numbering)", robot.hardware.numbering);

    // Wheel motors: four driver inputs each, claimed as a unit so a
    // doubly-assigned pin fails loudly here instead of twitching coils
    // later.
    let left = Motor::new(
        bank.claim_motor(&robot.hardware.left_motor).unwrap(),
        robot.drive.steps_per_rev,
    );
    let right = Motor::new(
        bank.claim_motor(&robot.hardware.right_motor).unwrap(),
        robot.drive.steps_per_rev,
    );
    let chassis = Chassis::new(left, right, robot.drive, robot.geometry);
    info!("Chassis assembled");

    let estop = bank
        .claim_input(robot.hardware.estop_pin, Pull::Up)
        .unwrap();
    let led = StatusLed::new(bank.claim_output(robot.hardware.led_pin).unwrap());

    // The sensor bus is routed in copper; the configuration must agree
    // with the board.
    let sda = bank.resolve(robot.hardware.sensor.sda).unwrap();
    let scl = bank.resolve(robot.hardware.sensor.scl).unwrap();
    if (sda, scl) != SENSOR_BUS_GPIOS {
        error!(
            "sensor bus configured on GPIO {}/{}, board routes {}/{}",
            sda, scl, SENSOR_BUS_GPIOS.0, SENSOR_BUS_GPIOS.1
        );
        core::panic!("sensor bus configuration does not match board routing");
    }
    let i2c = i2c::I2c::new_async(
        system.i2c0,
        system.i2c_scl,
        system.i2c_sda,
        Irqs,
        i2c::Config::default(),
    );
    let sensor = Apds9960::new(i2c);
    info!("Sensor bus initialized");

    // Spawn tasks
    spawner.spawn(tasks::sensor_task(sensor)).unwrap();
    spawner
        .spawn(tasks::steering_task(chassis, robot.steering))
        .unwrap();
    spawner.spawn(tasks::estop_task(estop)).unwrap();
    spawner.spawn(tasks::heartbeat_task(led)).unwrap();

    info!("All tasks spawned, robot running");
}
