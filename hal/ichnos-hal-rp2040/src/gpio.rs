//! GPIO output wrapper

use embassy_rp::gpio::Output;

/// A claimed RP2040 output pin
///
/// Obtained from [`crate::pins::PinBank::claim_output`]; always starts
/// driven low.
pub struct RpOutput {
    output: Output<'static>,
}

impl RpOutput {
    pub(crate) fn new(output: Output<'static>) -> Self {
        Self { output }
    }
}

impl ichnos_hal::gpio::OutputPin for RpOutput {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high()
    }
}
