//! A fake UART register block for unit tests.

use super::RegisterIo;
use crate::regs::{FifoControl, LineControl, LineStatus, Register};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// A fake implementation of [`RegisterIo`] which models just enough of a 16550 for the driver.
#[derive(Clone, Debug, Default)]
pub struct FakeUart {
    /// The register contents, shared with the handle returned by [`FakeUart::new`].
    pub state: Arc<Mutex<State>>,
}

impl FakeUart {
    /// Creates a fake UART along with a handle to its state.
    pub fn new() -> (Self, Arc<Mutex<State>>) {
        let state = Arc::new(Mutex::new(State::default()));
        (
            Self {
                state: state.clone(),
            },
            state,
        )
    }
}

impl RegisterIo for FakeUart {
    fn read(&self, offset: usize) -> u32 {
        let mut state = self.state.lock().unwrap();
        let register = Register::from_offset(offset).expect("read from unknown register");
        let dlab = state.line_control.contains(LineControl::DLAB);
        match register {
            Register::Data if dlab => state.divisor_low,
            Register::Data => state.rx.pop_front().map_or(0, u32::from),
            Register::InterruptEnable if dlab => state.divisor_high,
            Register::InterruptEnable => state.interrupt_enable,
            // No interrupt pending.
            Register::FifoControl => 0x01,
            Register::LineControl => state.line_control.bits(),
            Register::ModemControl => state.modem_control,
            Register::LineStatus => {
                state.status_reads += 1;
                state.line_status().bits()
            }
            Register::ModemStatus => 0,
            Register::Scratch => state.scratch,
            Register::ModeDefinition => state.mode,
        }
    }

    fn write(&self, offset: usize, value: u32) {
        let mut state = self.state.lock().unwrap();
        let register = Register::from_offset(offset).expect("write to unknown register");
        state.writes.push((register, value));
        let dlab = state.line_control.contains(LineControl::DLAB);
        match register {
            Register::Data if dlab => state.divisor_low = value,
            Register::Data => {
                assert!(
                    !state.tx_stalled,
                    "wrote to the transmit holding register while it was full"
                );
                state.transmitted.push(value as u8);
            }
            Register::InterruptEnable if dlab => state.divisor_high = value,
            Register::InterruptEnable => state.interrupt_enable = value,
            Register::FifoControl => {
                let fcr = FifoControl::from_bits_retain(value);
                if fcr.contains(FifoControl::CLEAR_RCVR) {
                    state.rx.clear();
                }
                state.fifo_control = value;
            }
            Register::LineControl => state.line_control = LineControl::from_bits_retain(value),
            Register::ModemControl => state.modem_control = value,
            Register::LineStatus | Register::ModemStatus => {}
            Register::Scratch => state.scratch = value,
            Register::ModeDefinition => state.mode = value,
        }
    }
}

/// The register contents of a [`FakeUart`].
#[derive(Debug, Default)]
pub struct State {
    /// Line control register.
    pub line_control: LineControl,
    /// Interrupt enable register.
    pub interrupt_enable: u32,
    /// Last value written to the FIFO control register.
    pub fifo_control: u32,
    /// Modem control register.
    pub modem_control: u32,
    /// Scratch register.
    pub scratch: u32,
    /// Mode definition register.
    pub mode: u32,
    /// Divisor latch, low byte.
    pub divisor_low: u32,
    /// Divisor latch, high byte.
    pub divisor_high: u32,
    /// Bytes waiting in the receive FIFO.
    pub rx: VecDeque<u8>,
    /// Bytes written to the transmit holding register, in order.
    pub transmitted: Vec<u8>,
    /// Every register write, in order.
    pub writes: Vec<(Register, u32)>,
    /// When set, the transmit holding register never reports empty.
    pub tx_stalled: bool,
    /// How many times the line status register has been read.
    pub status_reads: usize,
}

impl State {
    /// Simulates the line delivering bytes into the receive FIFO.
    pub fn receive(&mut self, data: &[u8]) {
        self.rx.extend(data);
    }

    /// Returns the divisor currently latched.
    pub fn divisor(&self) -> u32 {
        (self.divisor_high << 8) | self.divisor_low
    }

    fn line_status(&self) -> LineStatus {
        let mut status = LineStatus::empty();
        if !self.rx.is_empty() {
            status |= LineStatus::DATA_READY;
        }
        if !self.tx_stalled {
            status |= LineStatus::THR_EMPTY | LineStatus::TRANSMITTER_EMPTY;
        }
        status
    }
}
