//! Status LED
//!
//! Any claimed output pin can serve as an indicator.

use ichnos_hal::gpio::OutputPin;

/// A single status LED
pub struct StatusLed<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap a claimed pin; starts dark
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, on: false };
        led.off();
        led
    }

    /// Light the LED
    pub fn on(&mut self) {
        self.pin.set_high();
        self.on = true;
    }

    /// Darken the LED
    pub fn off(&mut self) {
        self.pin.set_low();
        self.on = false;
    }

    /// Flip the LED state
    pub fn toggle(&mut self) {
        if self.on {
            self.off();
        } else {
            self.on();
        }
    }

    /// Current logical state
    pub fn is_on(&self) -> bool {
        self.on
    }
}
