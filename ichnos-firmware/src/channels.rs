//! Inter-task communication
//!
//! Static signals and flags shared between the Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use ichnos_drivers::stepper::HaltFlag;

/// Latest steering error from the line sensor (overwrites unread
/// values: steering only ever wants the freshest reading)
pub static LINE_ERROR: Signal<CriticalSectionRawMutex, i32> = Signal::new();

/// Robot-wide abort. Raised by the emergency stop; every emit loop
/// polls it between stages and de-energizes its motors on the way out.
pub static HALT: HaltFlag = HaltFlag::new();
