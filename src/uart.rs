//! Register-level protocol of the UART: guarded register writes and the one-shot initialization
//! sequence.

use crate::io::RegisterIo;
use crate::regs::{FifoControl, InterruptEnable, LineControl, LineStatus, Mode, Register};
use crate::{Error, Result};
use log::{debug, error, trace};
use std::thread;

/// A UART register block together with its access protocol.
///
/// Every write first waits for the transmit holding register to be empty, yielding the CPU between
/// polls. The wait is bounded, so an unresponsive device gives [`Error::HardwareTimeout`] rather
/// than hanging the caller.
#[derive(Debug)]
pub struct Uart<R: RegisterIo> {
    io: R,
    tx_ready_spins: u32,
}

impl<R: RegisterIo> Uart<R> {
    /// Wraps a register block, polling at most `tx_ready_spins` times per write.
    pub fn new(io: R, tx_ready_spins: u32) -> Self {
        Self { io, tx_ready_spins }
    }

    /// Reads a register. Reads have no precondition.
    pub fn read(&self, register: Register) -> u32 {
        self.io.read(register.offset())
    }

    /// Reads the line status register.
    pub fn line_status(&self) -> LineStatus {
        LineStatus::from_bits_retain(self.read(Register::LineStatus))
    }

    /// Writes a register once the transmitter is ready.
    pub fn write(&self, register: Register, value: u32) -> Result {
        self.wait_for_transmit_ready()?;
        self.io.write(register.offset(), value);
        Ok(())
    }

    fn wait_for_transmit_ready(&self) -> Result {
        let mut spins = 0;
        while !self.line_status().contains(LineStatus::THR_EMPTY) {
            if spins >= self.tx_ready_spins {
                error!("Transmitter not ready after {} polls", spins);
                return Err(Error::HardwareTimeout);
            }
            spins += 1;
            thread::yield_now();
        }
        Ok(())
    }

    /// Sends a single byte.
    pub fn send(&self, byte: u8) -> Result {
        trace!("tx {:#04x}", byte);
        self.write(Register::Data, byte.into())
    }

    /// Sends bytes one at a time, following every `\n` with a `\r`.
    pub fn send_translated(&self, bytes: &[u8]) -> Result {
        for &byte in bytes {
            self.send(byte)?;
            if byte == b'\n' {
                self.send(b'\r')?;
            }
        }
        Ok(())
    }

    /// Programs the UART for 8 data bits at the given divisor, with the receive interrupt enabled
    /// and both FIFOs cleared, then sends `banner`.
    ///
    /// The order of the register writes matters: the divisor can only be changed while the UART
    /// is disabled and the divisor latch is selected.
    pub fn init(&self, divisor: u16, banner: &str) -> Result {
        debug!("Programming UART with divisor {}", divisor);
        self.write(Register::ModeDefinition, Mode::Disable as u32)?;
        self.write(Register::LineControl, LineControl::DLAB.bits())?;
        self.write(Register::DIVISOR_LOW, u32::from(divisor & 0xff))?;
        self.write(Register::DIVISOR_HIGH, u32::from(divisor >> 8))?;
        self.write(Register::LineControl, LineControl::WLEN8.bits())?;
        self.write(Register::ModeDefinition, Mode::Uart16x as u32)?;
        self.write(Register::InterruptEnable, InterruptEnable::RDI.bits())?;
        self.write(
            Register::FifoControl,
            (FifoControl::CLEAR_RCVR | FifoControl::CLEAR_XMIT).bits(),
        )?;
        self.send_translated(banner.as_bytes())
    }

    /// Masks all UART interrupts.
    pub fn disable_interrupts(&self) -> Result {
        self.write(Register::InterruptEnable, InterruptEnable::empty().bits())
    }
}
