use crate::{Backlight, Commands, Error};

/// Rows and columns of the attached module.
///
/// Rows are one-based. The DDRAM offsets of rows 3 and 4 continue rows 1 and 2 right after the
/// last visible column, so they are derived from the column count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    rows: u8,
    cols: u8,
}

impl Geometry {
    pub const LCD_16X2: Geometry = Geometry { rows: 2, cols: 16 };
    pub const LCD_20X2: Geometry = Geometry { rows: 2, cols: 20 };
    pub const LCD_16X4: Geometry = Geometry { rows: 4, cols: 16 };
    pub const LCD_20X4: Geometry = Geometry { rows: 4, cols: 20 };

    /// `None` unless `1 <= rows <= 4` and `1 <= cols <= 40`. Four line modules split a 40 byte
    /// DDRAM line in two, so more than two rows allows at most 20 columns.
    pub const fn new(rows: u8, cols: u8) -> Option<Self> {
        let max_cols = if rows > 2 { 20 } else { 40 };
        if rows == 0 || rows > 4 || cols == 0 || cols > max_cols {
            return None;
        }
        Some(Self { rows, cols })
    }

    pub const fn rows(&self) -> u8 {
        self.rows
    }

    pub const fn cols(&self) -> u8 {
        self.cols
    }

    /// DDRAM address of the first column of `row`.
    pub const fn row_offset(&self, row: u8) -> Option<u8> {
        match row {
            1 => Some(0x00),
            2 => Some(0x40),
            3 => Some(self.cols),
            4 => Some(0x40 + self.cols),
            _ => None,
        }
    }

    /// Set-DDRAM-address command placing the cursor at (`row`, `col`).
    ///
    /// `col` may equal the column count, which addresses the position right after the line.
    pub fn cursor_command<E>(&self, row: u8, col: u8) -> Result<u8, Error<E>> {
        if row < 1 || row > self.rows {
            return Err(Error::RowOutOfRange);
        }
        if col > self.cols {
            return Err(Error::ColOutOfRange);
        }
        let offset = self.row_offset(row).ok_or(Error::RowOutOfRange)?;
        Ok(Commands::DDRAMAddr as u8 | (offset + col))
    }

    /// Checks that `len` characters starting at `col` stay on the line.
    pub(crate) fn check_line<E>(&self, col: u8, len: usize) -> Result<(), Error<E>> {
        if len + usize::from(col) > usize::from(self.cols) {
            return Err(Error::ColOutOfRange);
        }
        Ok(())
    }
}

/// Settings fixed for the lifetime of a driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub(crate) address: u8,
    pub(crate) geometry: Geometry,
    pub(crate) backlight: Backlight,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: 0x27,
            geometry: Geometry::LCD_20X4,
            backlight: Backlight::On,
        }
    }
}

impl Config {
    /// Set I2C address of the expander. Most modules use 0x27 or 0x3f.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Backlight state once `init` has finished.
    pub fn with_backlight(mut self, backlight: Backlight) -> Self {
        self.backlight = backlight;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn backlight(&self) -> Backlight {
        self.backlight
    }
}
