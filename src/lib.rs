//! Driver core for a CP2102-attached, memory-mapped 16550-compatible UART.
//!
//! The received side is interrupt driven: [`SerialDevice::handle_interrupt`] moves one byte from
//! the receive FIFO into a small ring buffer and wakes any reader blocked in
//! [`SerialDevice::read`]. Writes are streamed straight to the transmit holding register.
//!
//! Device discovery, register mapping, interrupt registration and node registration are provided
//! by the platform through the [`Platform`] trait; [`Driver`] binds devices and owns them.
//!
//! # Example
//!
//! ```
//! # use cp2102_serial::{CancelToken, Error, SerialDevice, UartConfig, io::RegisterIo};
//! # fn example<R: RegisterIo>(registers: R) -> Result<(), Error> {
//! let device = SerialDevice::new(registers, UartConfig::default())?;
//!
//! // Called from the interrupt line.
//! device.handle_interrupt();
//!
//! let mut buffer = [0; 4];
//! let len = device.read(&mut buffer[..], &CancelToken::new())?;
//! device.write(&buffer[..len])?;
//! # Ok(())
//! # }
//! ```

#![deny(unused_must_use, missing_docs)]

pub mod config;
pub mod device;
pub mod driver;
#[cfg(feature = "embedded-io")]
mod embedded_io;
pub mod io;
pub mod platform;
// `derive(N)` generates an undocumented `n` constructor on each register enum.
#[allow(missing_docs)]
pub mod regs;
pub mod ring;
pub mod uart;
pub mod user;

pub use self::config::{compute_divisor, UartConfig, TARGET_BAUD};
pub use self::device::{CancelToken, IrqReturn, SerialDevice};
pub use self::driver::{DeviceId, Driver};
pub use self::platform::{DeviceResource, Platform};
use thiserror::Error;

/// A physical address, as found in a device resource.
pub type PhysAddr = usize;

/// Capacity in bytes of the receive ring and of the transmit staging buffer.
pub const BUF_SIZE: usize = 16;

/// The type returned by driver methods.
pub type Result<T = ()> = core::result::Result<T, Error>;

/// The error type of the UART driver.
#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Bringing up the device failed.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// Copying to or from the caller's memory failed.
    #[error("Bad address while copying caller memory")]
    CopyFault,
    /// A blocked read was cancelled before any data arrived.
    #[error("Read was interrupted")]
    Interrupted,
    /// A blocked read reached its deadline before any data arrived.
    #[error("Read timed out")]
    TimedOut,
    /// The transmit holding register never became empty.
    #[error("Transmitter did not become ready")]
    HardwareTimeout,
    /// The device handle does not refer to a bound device.
    #[error("No such device")]
    NoDevice,
}

/// Errors which prevent a device from being brought up.
#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
pub enum SetupError {
    /// The resource is not compatible with this driver.
    #[error("Device is not compatible with this driver")]
    NoMatch,
    /// The device has no register resource or no interrupt line.
    #[error("Missing {0} resource")]
    MissingResource(&'static str),
    /// The register block could not be mapped.
    #[error("Failed to map registers")]
    MapFailed,
    /// The interrupt line could not be acquired.
    #[error("Failed to acquire interrupt {0}")]
    IrqUnavailable(u32),
    /// The device node could not be registered.
    #[error("Failed to register device node")]
    NodeRegistration,
    /// The clock frequency does not give a usable baud divisor.
    #[error("Invalid UART clock frequency {0} Hz")]
    InvalidClock(u32),
}

const EINTR: i32 = 4;
const EIO: i32 = 5;
const ENOMEM: i32 = 12;
const EFAULT: i32 = 14;
const EBUSY: i32 = 16;
const ENODEV: i32 = 19;
const EINVAL: i32 = 22;
const ETIMEDOUT: i32 = 110;

impl Error {
    /// Returns the negative errno a character device would report for this error.
    pub fn errno(&self) -> i32 {
        -match self {
            Error::Setup(SetupError::NoMatch) => ENODEV,
            Error::Setup(SetupError::MissingResource(_) | SetupError::InvalidClock(_)) => EINVAL,
            Error::Setup(SetupError::MapFailed) => ENOMEM,
            Error::Setup(SetupError::IrqUnavailable(_)) => EBUSY,
            Error::Setup(SetupError::NodeRegistration) => ENOMEM,
            Error::CopyFault => EFAULT,
            Error::Interrupted => EINTR,
            Error::TimedOut => ETIMEDOUT,
            Error::HardwareTimeout => EIO,
            Error::NoDevice => ENODEV,
        }
    }
}
