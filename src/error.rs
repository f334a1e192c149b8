use core::fmt;

/// Errors returned by the driver. `E` is the error type of the I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Writing to the expander failed.
    Transport(E),
    /// Row is zero, beyond the configured rows, or has no DDRAM address.
    RowOutOfRange,
    /// Column, plus the text length when printing, is beyond the configured columns.
    ColOutOfRange,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "I2C error: {:?}", e),
            Error::RowOutOfRange => f.write_str("Row out of range"),
            Error::ColOutOfRange => f.write_str("Column out of range"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Error::Transport(_e) => defmt::write!(fmt, "I2C error"),
            Error::RowOutOfRange => defmt::write!(fmt, "Row out of range"),
            Error::ColOutOfRange => defmt::write!(fmt, "Column out of range"),
        }
    }
}
