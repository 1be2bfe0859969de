//! Line sensor drivers

pub mod apds9960;

pub use apds9960::{Apds9960, ColorReading, SensorError};
