#![no_std]
//! Driver for HD44780 character LCDs wired to a PCF8574 I2C expander in 4-bit mode, like the
//! common 16x2 and 20x4 "I2C backpack" modules. It requires an I2C instance implementing
//! [`embedded_hal::i2c::I2c`] and an instance to delay execution with
//! [`embedded_hal::delay::DelayNs`]. With the `async` feature the same driver is available for
//! the `embedded-hal-async` traits in [`async_lcd`].
//!
//! Usage:
//! ```ignore
//! use lcd_pcf8574_i2c::{sync_lcd::LcdUninit, Backlight, Config, Geometry};
//!
//! let config = Config::default()
//!     .with_address(0x27) // Address depends on hardware
//!     .with_geometry(Geometry::LCD_20X4);
//!
//! let mut lcd = LcdUninit::new(&mut i2c, &mut delay, config).init()?;
//! lcd.print(1, 0, "Hello")?;
//! lcd.print(2, 3, "world")?;
//! lcd.backlight(Backlight::Off)?;
//! lcd.close();
//! ```
//!
//! Every byte sent to the expander has the layout below. A controller byte is split into two
//! nibbles, high nibble first, and each nibble is latched by pulsing the enable line.
//!
//! | bit | 7..4   | 3         | 2      | 1  | 0  |
//! |-----|--------|-----------|--------|----|----|
//! |     | nibble | backlight | enable | RW | RS |

mod config;
mod error;

pub mod sync_lcd;

#[cfg(feature = "async")]
pub mod async_lcd;

pub use config::{Config, Geometry};
pub use error::Error;

/// Enable strobe line of the expander.
const ENABLE: u8 = 0x04;

/// Wait before and between the writes of an enable strobe, in microseconds.
const STROBE_DELAY_US: u32 = 5;

/// Wait after power on before the controller accepts commands, in milliseconds.
const POWER_ON_DELAY_MS: u32 = 80;

/// Execution time of clear and return home, in milliseconds.
const SETTLE_DELAY_MS: u32 = 2;

/// Power-on sequence: two function-set reset pulses, entry mode left-to-right, display on with
/// cursor off, 4-bit two line mode, clear.
const INIT_SEQUENCE: [u8; 6] = [0x33, 0x32, 0x06, 0x0C, 0x28, Commands::Clear as u8];

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Backlight {
    Off = 0x00,
    On = 0x08,
}

impl From<bool> for Backlight {
    fn from(on: bool) -> Self {
        if on {
            Backlight::On
        } else {
            Backlight::Off
        }
    }
}

/// State of the register-select line: command or character data.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Cmd = 0x00,
    Data = 0x01,
}

enum Commands {
    Clear = 0x01,
    ReturnHome = 0x02,
    DDRAMAddr = 0x80,
}

/// The two expander bytes carrying one controller byte, before strobing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub high: u8,
    pub low: u8,
}

impl Frame {
    /// Splits `value` into nibbles on bits 7..4 and ORs in the mode and backlight bits.
    pub const fn new(value: u8, mode: Mode, backlight: Backlight) -> Self {
        let control = mode as u8 | backlight as u8;
        Self {
            high: control | (value & 0xf0),
            low: control | ((value << 4) & 0xf0),
        }
    }
}
