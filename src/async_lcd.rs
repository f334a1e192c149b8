use embedded_hal_async::{delay::DelayNs, i2c::I2c};

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
    pub fn new(i2c: &'a mut I, delay: &'a mut D, config: Config) -> Self {
        Self { i2c, delay, config }
    }

    /// Initializes the hardware, see [`crate::sync_lcd::LcdUninit::init`].
    pub async fn init(self) -> Result<Lcd<'a, I, D>, Error<I::Error>> {
        let mut lcd = Lcd {
            i2c: self.i2c,
            delay: self.delay,
            config: self.config,
            backlight_state: Backlight::On,
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: init at {=u8:#x}", lcd.config.address);

        lcd.delay.delay_ms(POWER_ON_DELAY_MS).await;
        for command in INIT_SEQUENCE {
            lcd.command(command).await?;
        }
        lcd.delay.delay_ms(SETTLE_DELAY_MS).await;

        if lcd.config.backlight == Backlight::Off {
            lcd.backlight(Backlight::Off).await?;
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
    async fn transmit(&mut self, byte: u8) -> Result<(), Error<I::Error>> {
        self.i2c
            .write(self.config.address, &[byte])
            .await
            .map_err(Error::Transport)
    }

    async fn strobe(&mut self, frame: u8) -> Result<(), Error<I::Error>> {
        self.delay.delay_us(STROBE_DELAY_US).await;
        self.transmit(frame | ENABLE).await?;
        self.delay.delay_us(STROBE_DELAY_US).await;
        self.transmit(frame & !ENABLE).await?;
        self.delay.delay_us(STROBE_DELAY_US).await;
        Ok(())
    }

    async fn send(&mut self, data: u8, mode: Mode) -> Result<(), Error<I::Error>> {
        let frame = Frame::new(data, mode, self.backlight_state);
        self.transmit(frame.high).await?;
        self.strobe(frame.high).await?;
        self.transmit(frame.low).await?;
        self.strobe(frame.low).await?;
        Ok(())
    }

    async fn command(&mut self, data: u8) -> Result<(), Error<I::Error>> {
        self.send(data, Mode::Cmd).await
    }

    pub async fn backlight(&mut self, backlight: Backlight) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: backlight {}", backlight);

        self.backlight_state = backlight;
        self.transmit(backlight as u8).await
    }

    pub fn backlight_state(&self) -> Backlight {
        self.backlight_state
    }

    pub fn geometry(&self) -> Geometry {
        self.config.geometry
    }

    /// Write string at the current cursor position.
    pub async fn write_str(&mut self, data: &str) -> Result<(), Error<I::Error>> {
        for b in data.bytes() {
            self.send(b, Mode::Data).await?;
        }
        Ok(())
    }

    /// Write `text` starting at (`row`, `col`), see [`crate::sync_lcd::Lcd::print`].
    pub async fn print(&mut self, row: u8, col: u8, text: &str) -> Result<(), Error<I::Error>> {
        if text.is_empty() {
            return Ok(());
        }
        self.config.geometry.check_line(col, text.len())?;
        self.set_cursor(row, col).await?;
        self.write_str(text).await
    }

    /// Clear the display
    pub async fn clear(&mut self) -> Result<(), Error<I::Error>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("lcd: clear");

        self.command(Commands::Clear as u8).await?;
        self.delay.delay_ms(SETTLE_DELAY_MS).await;
        Ok(())
    }

    /// Return cursor to upper left corner, i.e. (1, 0).
    pub async fn return_home(&mut self) -> Result<(), Error<I::Error>> {
        self.command(Commands::ReturnHome as u8).await?;
        self.delay.delay_ms(SETTLE_DELAY_MS).await;
        Ok(())
    }

    /// Set the cursor to (row, col). Rows are one-based, columns zero-based.
    pub async fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Error<I::Error>> {
        let command = self.config.geometry.cursor_command(row, col)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("lcd: cursor ({=u8}, {=u8}) -> {=u8:#x}", row, col, command);

        self.command(command).await
    }

    /// Releases the bus and the delay. The display keeps showing its content.
    pub fn close(self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("lcd: close {=u8:#x}", self.config.address);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};
    use embedded_hal_async::i2c::ErrorKind;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = 0x27;

    // Mock futures complete on first poll.
    fn block_on<F: Future>(fut: F) -> F::Output {
        let mut fut = pin!(fut);
        let mut cx = Context::from_waker(Waker::noop());
        loop {
            if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
                return out;
            }
        }
    }

    fn byte(value: u8, control: u8) -> Vec<I2cTransaction> {
        let mut out = Vec::new();
        for nibble in [value & 0xf0, value << 4] {
            let frame = nibble | control;
            out.push(I2cTransaction::write(ADDR, vec![frame]));
            out.push(I2cTransaction::write(ADDR, vec![frame | 0x04]));
            out.push(I2cTransaction::write(ADDR, vec![frame]));
        }
        out
    }

    #[test]
    fn init_then_print() {
        let mut expected: Vec<_> = [0x33, 0x32, 0x06, 0x0C, 0x28, 0x01]
            .into_iter()
            .flat_map(|c| byte(c, 0x08))
            .collect();
        expected.extend(byte(0xD4, 0x08));
        expected.extend(byte(b'o', 0x09));
        expected.extend(byte(b'k', 0x09));

        let mut i2c = I2cMock::new(&expected);
        let mut delay = NoopDelay::new();
        block_on(async {
            let mut lcd = LcdUninit::new(&mut i2c, &mut delay, Config::default())
                .init()
                .await
                .unwrap();
            lcd.print(4, 0, "ok").await.unwrap();
            lcd.close();
        });
        i2c.done();
    }

    #[test]
    fn rejects_before_writing() {
        let expected: [I2cTransaction; 0] = [];
        let mut i2c = I2cMock::new(&expected);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd {
            i2c: &mut i2c,
            delay: &mut delay,
            config: Config::default().with_geometry(Geometry::LCD_16X2),
            backlight_state: Backlight::On,
        };
        assert_eq!(
            block_on(lcd.print(1, 15, "ab")),
            Err(Error::ColOutOfRange)
        );
        assert_eq!(block_on(lcd.set_cursor(5, 0)), Err(Error::RowOutOfRange));
        assert_eq!(block_on(lcd.print(2, 3, "")), Ok(()));
        lcd.close();
        i2c.done();
    }

    #[test]
    fn backlight_is_written_and_kept_in_frames() {
        let mut expected = vec![I2cTransaction::write(ADDR, vec![0b0000_0000])];
        expected.extend(byte(b'x', 0x01));
        expected.push(I2cTransaction::write(ADDR, vec![0b0000_1000]));
        expected.extend(byte(b'x', 0x09));
        let mut i2c = I2cMock::new(&expected);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd {
            i2c: &mut i2c,
            delay: &mut delay,
            config: Config::default(),
            backlight_state: Backlight::On,
        };
        block_on(lcd.backlight(Backlight::Off)).unwrap();
        assert_eq!(lcd.backlight_state(), Backlight::Off);
        block_on(lcd.write_str("x")).unwrap();
        block_on(lcd.backlight(Backlight::On)).unwrap();
        block_on(lcd.write_str("x")).unwrap();
        assert_eq!(lcd.backlight_state(), Backlight::On);
        lcd.close();
        i2c.done();
    }

    #[test]
    fn return_home() {
        let expected = byte(0x02, 0x08);
        let mut i2c = I2cMock::new(&expected);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd {
            i2c: &mut i2c,
            delay: &mut delay,
            config: Config::default(),
            backlight_state: Backlight::On,
        };
        block_on(lcd.return_home()).unwrap();
        lcd.close();
        i2c.done();
    }

    #[test]
    fn transport_error_is_returned() {
        let expected = [I2cTransaction::write(ADDR, vec![0b0000_0000]).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expected);
        let mut delay = NoopDelay::new();
        let mut lcd = Lcd {
            i2c: &mut i2c,
            delay: &mut delay,
            config: Config::default(),
            backlight_state: Backlight::Off,
        };
        assert_eq!(
            block_on(lcd.clear()),
            Err(Error::Transport(ErrorKind::Other))
        );
        lcd.close();
        i2c.done();
    }
}
