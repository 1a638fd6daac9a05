//! Implementation of `embedded-io` traits for `SerialDevice`.

use crate::{io::RegisterIo, CancelToken, Error, SerialDevice, SetupError};
use embedded_io::{ErrorKind, ErrorType, Read, ReadReady, Write};

impl embedded_io::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Setup(e) => match e {
                SetupError::NoMatch => ErrorKind::NotFound,
                SetupError::MissingResource(_) | SetupError::InvalidClock(_) => {
                    ErrorKind::InvalidInput
                }
                SetupError::MapFailed => ErrorKind::OutOfMemory,
                SetupError::IrqUnavailable(_) => ErrorKind::AddrInUse,
                SetupError::NodeRegistration => ErrorKind::Other,
            },
            Error::CopyFault => ErrorKind::InvalidInput,
            Error::Interrupted => ErrorKind::Interrupted,
            Error::TimedOut | Error::HardwareTimeout => ErrorKind::TimedOut,
            Error::NoDevice => ErrorKind::NotFound,
        }
    }
}

impl<R: RegisterIo> ErrorType for &SerialDevice<R> {
    type Error = Error;
}

impl<R: RegisterIo> Write for &SerialDevice<R> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        SerialDevice::write(*self, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Every byte has reached the transmit holding register by the time `write` returns.
        Ok(())
    }
}

impl<R: RegisterIo> ReadReady for &SerialDevice<R> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(SerialDevice::read_ready(*self))
    }
}

impl<R: RegisterIo> Read for &SerialDevice<R> {
    /// Blocks until data arrives; the wait can only end early through the configured read
    /// timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        SerialDevice::read(*self, buf, &CancelToken::new())
    }
}
