//! UART configuration.

use crate::{Result, SetupError};
use core::time::Duration;

/// The only baud rate the driver programs.
pub const TARGET_BAUD: u32 = 115_200;

/// Clock frequency used when the device resource doesn't specify one.
pub const DEFAULT_CLOCK_HZ: u32 = 48_000_000;

/// How many times a register write polls for transmit-ready before giving up.
pub const DEFAULT_TX_READY_SPINS: u32 = 100_000;

/// Computes the baud divisor for [`TARGET_BAUD`] from the UART input clock.
///
/// The result truncates, so a clock slower than 16 × 115200 Hz gives 0.
pub const fn compute_divisor(clock_hz: u32) -> u32 {
    clock_hz / 16 / TARGET_BAUD
}

/// Configuration for a single UART instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UartConfig {
    /// Input clock of the UART, in Hz.
    pub clock_frequency: u32,
    /// Upper bound on transmit-ready polls per register write.
    pub tx_ready_spins: u32,
    /// How long a read may block waiting for data, or `None` to wait until cancelled.
    pub read_timeout: Option<Duration>,
    /// Sent once initialization is complete.
    pub banner: &'static str,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            clock_frequency: DEFAULT_CLOCK_HZ,
            tx_ready_spins: DEFAULT_TX_READY_SPINS,
            read_timeout: None,
            banner: "cp2102: uart ready\n",
        }
    }
}

impl UartConfig {
    /// Returns the configuration with the given input clock.
    pub fn with_clock(self, clock_frequency: u32) -> Self {
        Self {
            clock_frequency,
            ..self
        }
    }

    /// Returns the divisor to latch, rejecting clocks which give no usable baud rate.
    pub fn divisor(&self) -> Result<u16> {
        match u16::try_from(compute_divisor(self.clock_frequency)) {
            Ok(divisor) if divisor != 0 => Ok(divisor),
            _ => Err(SetupError::InvalidClock(self.clock_frequency).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn divisor_for_common_clocks() {
        assert_eq!(compute_divisor(3_000_000), 1);
        assert_eq!(compute_divisor(48_000_000), 26);
        assert_eq!(compute_divisor(1_843_200), 1);
    }

    #[test]
    fn zero_clock_is_rejected() {
        let config = UartConfig::default().with_clock(0);
        assert_eq!(
            config.divisor(),
            Err(Error::Setup(SetupError::InvalidClock(0)))
        );
        // Too slow for 115200 baud.
        assert_eq!(
            UartConfig::default().with_clock(1_000_000).divisor(),
            Err(Error::Setup(SetupError::InvalidClock(1_000_000)))
        );
    }

    #[test]
    fn default_divisor() {
        assert_eq!(UartConfig::default().divisor(), Ok(26));
    }
}
