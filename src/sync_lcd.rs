use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use ufmt_write::uWrite;

use crate::{
    Backlight, Commands, Config, Error, Frame, Geometry, Mode, ENABLE, INIT_SEQUENCE,
    POWER_ON_DELAY_MS, SETTLE_DELAY_MS, STROBE_DELAY_US,
};

/// Display that has been wired up but not initialized yet.
pub struct LcdUninit<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    i2c: &'a mut I,
    delay: &'a mut D,
    config: Config,
}

impl<'a, I, D> LcdUninit<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    /// Takes exclusive use of the bus and the delay until the display is closed.
    pub fn new(i2c: &'a mut I, delay: &'a mut D, config: Config) -> Self {
        Self { i2c, delay, config }
    }

    /// Initializes the hardware.
    ///
    /// Waits for the controller to come out of power on, then sends the reset and mode
    /// commands with the backlight on. The display ends up in 4-bit two line mode, entry left
    /// to right, display on, cursor off and cleared. If the config asks for the backlight to be
    /// off it is switched off afterwards.
    pub fn init(self) -> Result<Lcd<'a, I, D>, Error<I::Error>> {
        let mut lcd = Lcd {
            i2c: self.i2c,
            delay: self.delay,
            config: self.config,
            backlight_state: Backlight::On,
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: init at {=u8:#x}", lcd.config.address);

        lcd.delay.delay_ms(POWER_ON_DELAY_MS);
        for command in INIT_SEQUENCE {
            lcd.command(command)?;
        }
        lcd.delay.delay_ms(SETTLE_DELAY_MS);

        if lcd.config.backlight == Backlight::Off {
            lcd.backlight(Backlight::Off)?;
        }
        Ok(lcd)
    }
}

/// API to write to the LCD.
pub struct Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    i2c: &'a mut I,
    delay: &'a mut D,
    config: Config,
    backlight_state: Backlight,
}

impl<'a, I, D> Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    fn transmit(&mut self, byte: u8) -> Result<(), Error<I::Error>> {
        self.i2c
            .write(self.config.address, &[byte])
            .map_err(Error::Transport)
    }

    /// Latches `frame` by pulsing the enable line.
    fn strobe(&mut self, frame: u8) -> Result<(), Error<I::Error>> {
        self.delay.delay_us(STROBE_DELAY_US);
        self.transmit(frame | ENABLE)?;
        self.delay.delay_us(STROBE_DELAY_US);
        self.transmit(frame & !ENABLE)?;
        self.delay.delay_us(STROBE_DELAY_US);
        Ok(())
    }

    fn send(&mut self, data: u8, mode: Mode) -> Result<(), Error<I::Error>> {
        let frame = Frame::new(data, mode, self.backlight_state);
        self.transmit(frame.high)?;
        self.strobe(frame.high)?;
        self.transmit(frame.low)?;
        self.strobe(frame.low)?;
        Ok(())
    }

    fn command(&mut self, data: u8) -> Result<(), Error<I::Error>> {
        self.send(data, Mode::Cmd)
    }

    /// Switches the backlight. The new state is written to the expander right away and is part
    /// of every following frame.
    pub fn backlight(&mut self, backlight: Backlight) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: backlight {}", backlight);

        self.backlight_state = backlight;
        self.transmit(backlight as u8)
    }

    pub fn backlight_state(&self) -> Backlight {
        self.backlight_state
    }

    pub fn geometry(&self) -> Geometry {
        self.config.geometry
    }

    /// Write string at the current cursor position.
    pub fn write_str(&mut self, data: &str) -> Result<(), Error<I::Error>> {
        for b in data.bytes() {
            self.send(b, Mode::Data)?;
        }
        Ok(())
    }

    /// Write `text` starting at (`row`, `col`). Rows are one-based, columns zero-based.
    ///
    /// Text that would run past the end of the line is rejected before anything is sent. A bus
    /// error stops printing, leaving the characters already sent on the display.
    pub fn print(&mut self, row: u8, col: u8, text: &str) -> Result<(), Error<I::Error>> {
        if text.is_empty() {
            return Ok(());
        }
        self.config.geometry.check_line(col, text.len())?;
        self.set_cursor(row, col)?;
        self.write_str(text)
    }

    /// Clear the display
    pub fn clear(&mut self) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("lcd: clear");

        self.command(Commands::Clear as u8)?;
        self.delay.delay_ms(SETTLE_DELAY_MS);
        Ok(())
    }

    /// Return cursor to upper left corner, i.e. (1, 0).
    pub fn return_home(&mut self) -> Result<(), Error<I::Error>> {
        self.command(Commands::ReturnHome as u8)?;
        self.delay.delay_ms(SETTLE_DELAY_MS);
        Ok(())
    }

    /// Set the cursor to (row, col). Rows are one-based, columns zero-based.
    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Error<I::Error>> {
        let command = self.config.geometry.cursor_command(row, col)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("lcd: cursor ({=u8}, {=u8}) -> {=u8:#x}", row, col, command);

        self.command(command)
    }

    /// Releases the bus and the delay. The display keeps showing its content.
    pub fn close(self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: close {=u8:#x}", self.config.address);
    }
}

impl<'a, I, D> uWrite for Lcd<'a, I, D>
where
    I: I2c,
    D: DelayNs,
{
    type Error = Error<I::Error>;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_str(s)
    }
}
