//! APDS9960 colour sensor driver
//!
//! Reads the clear/red/green/blue photodiode channels over I2C. The
//! steering loop only needs a scalar "how far off the marking colour
//! am I" error, which [`ColorReading::distance`] provides.

use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;

/// Fixed I2C address of the APDS9960
pub const ADDRESS: u8 = 0x39;

/// Device IDs the driver accepts (die revisions)
const KNOWN_IDS: [u8; 2] = [0xAB, 0x9C];

const REG_ENABLE: u8 = 0x80;
const REG_ATIME: u8 = 0x81;
const REG_CONTROL: u8 = 0x8F;
const REG_ID: u8 = 0x92;
const REG_STATUS: u8 = 0x93;
const REG_CDATAL: u8 = 0x94;

/// ENABLE register: power on
const ENABLE_PON: u8 = 0x01;
/// ENABLE register: ALS (colour) engine on
const ENABLE_AEN: u8 = 0x02;
/// STATUS register: colour data valid
const STATUS_AVALID: u8 = 0x01;

/// 100 ms colour integration (256 - 100 ms / 2.78 ms per count)
const ATIME_100MS: u8 = 220;
/// 1x ALS gain
const AGAIN_1X: u8 = 0x00;

/// One colour acquisition, raw counts per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorReading {
    /// Unfiltered channel
    pub clear: u16,
    /// Red channel
    pub red: u16,
    /// Green channel
    pub green: u16,
    /// Blue channel
    pub blue: u16,
}

impl ColorReading {
    /// Scalar distance from a target colour: the summed absolute
    /// difference of the red, green and blue channels.
    pub fn distance(&self, target: &ColorReading) -> i32 {
        let diff = |a: u16, b: u16| (a as i32 - b as i32).abs();
        diff(self.red, target.red) + diff(self.green, target.green)
            + diff(self.blue, target.blue)
    }
}

/// Sensor faults, parameterized over the bus error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError<E> {
    /// I2C transaction failed
    Bus(E),
    /// The device at the sensor address is not an APDS9960
    UnknownDevice {
        /// ID register contents
        id: u8,
    },
}

/// APDS9960 over an async I2C bus
pub struct Apds9960<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Apds9960<I2C> {
    /// Wrap a bus. Call [`init`](Self::init) before reading.
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Verify the device ID, configure the colour engine and power up
    pub async fn init(&mut self) -> Result<(), SensorError<I2C::Error>> {
        let id = self.read_register(REG_ID).await?;
        if !KNOWN_IDS.contains(&id) {
            return Err(SensorError::UnknownDevice { id });
        }

        // Engines must be configured powered-down
        self.write_register(REG_ENABLE, 0).await?;
        Timer::after_millis(10).await;
        self.write_register(REG_ATIME, ATIME_100MS).await?;
        self.write_register(REG_CONTROL, AGAIN_1X).await?;
        self.write_register(REG_ENABLE, ENABLE_PON).await?;
        Timer::after_millis(10).await;
        self.write_register(REG_ENABLE, ENABLE_PON | ENABLE_AEN)
            .await?;
        Ok(())
    }

    /// True once a colour acquisition has completed
    pub async fn color_ready(&mut self) -> Result<bool, SensorError<I2C::Error>> {
        let status = self.read_register(REG_STATUS).await?;
        Ok(status & STATUS_AVALID != 0)
    }

    /// Read one colour acquisition, waiting for the integration to
    /// finish if necessary
    pub async fn read_color(&mut self) -> Result<ColorReading, SensorError<I2C::Error>> {
        while !self.color_ready().await? {
            Timer::after_millis(5).await;
        }

        // All four channels in one burst, low byte first
        let mut data = [0u8; 8];
        self.i2c
            .write_read(ADDRESS, &[REG_CDATAL], &mut data)
            .await
            .map_err(SensorError::Bus)?;

        Ok(ColorReading {
            clear: u16::from_le_bytes([data[0], data[1]]),
            red: u16::from_le_bytes([data[2], data[3]]),
            green: u16::from_le_bytes([data[4], data[5]]),
            blue: u16::from_le_bytes([data[6], data[7]]),
        })
    }

    async fn read_register(&mut self, register: u8) -> Result<u8, SensorError<I2C::Error>> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[register], &mut value)
            .await
            .map_err(SensorError::Bus)?;
        Ok(value[0])
    }

    async fn write_register(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), SensorError<I2C::Error>> {
        self.i2c
            .write(ADDRESS, &[register, value])
            .await
            .map_err(SensorError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_distance() {
        let on_line = ColorReading {
            clear: 900,
            red: 800,
            green: 100,
            blue: 100,
        };
        let target = ColorReading {
            clear: 0,
            red: 750,
            green: 80,
            blue: 120,
        };
        // Clear channel is excluded from the distance.
        assert_eq!(on_line.distance(&target), 50 + 20 + 20);
        assert_eq!(on_line.distance(&on_line), 0);
        // Symmetric either way round.
        assert_eq!(target.distance(&on_line), on_line.distance(&target));
    }
}
