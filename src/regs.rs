//! Register map of the 16550-compatible UART block.

use bitflags::bitflags;
use enumn::N;

/// Registers are laid out on a 4-byte stride.
pub const REG_SHIFT: usize = 2;

/// The registers of the UART, by index.
///
/// Several registers share an index and are selected by access direction or by the divisor latch
/// access bit in [`LineControl`].
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, N)]
pub enum Register {
    /// Receive buffer (read) / transmit holding (write) / divisor latch low (DLAB set).
    Data = 0,
    /// Interrupt enable / divisor latch high (DLAB set).
    InterruptEnable = 1,
    /// FIFO control (write) / interrupt identification (read).
    FifoControl = 2,
    /// Line control.
    LineControl = 3,
    /// Modem control.
    ModemControl = 4,
    /// Line status.
    LineStatus = 5,
    /// Modem status.
    ModemStatus = 6,
    /// Scratch.
    Scratch = 7,
    /// Mode definition (MDR1).
    ModeDefinition = 8,
}

impl Register {
    /// The low byte of the baud divisor, while [`LineControl::DLAB`] is set.
    pub const DIVISOR_LOW: Self = Self::Data;
    /// The high byte of the baud divisor, while [`LineControl::DLAB`] is set.
    pub const DIVISOR_HIGH: Self = Self::InterruptEnable;

    /// Returns the byte offset of the register from the start of the block.
    pub const fn offset(self) -> usize {
        (self as usize) << REG_SHIFT
    }

    /// Decodes a byte offset back into a register, if it names one.
    pub fn from_offset(offset: usize) -> Option<Self> {
        if offset & ((1 << REG_SHIFT) - 1) != 0 {
            return None;
        }
        u8::try_from(offset >> REG_SHIFT).ok().and_then(Self::n)
    }
}

/// Values of the mode definition register.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, N)]
pub enum Mode {
    /// UART 16x mode.
    Uart16x = 0x0,
    /// Disabled; the only safe state to reconfigure the divisor in.
    Disable = 0x7,
}

bitflags! {
    /// Line status register.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct LineStatus: u32 {
        /// A received byte is waiting in the data register.
        const DATA_READY = 1 << 0;
        /// A received byte was lost because the FIFO was full.
        const OVERRUN_ERROR = 1 << 1;
        /// Parity error.
        const PARITY_ERROR = 1 << 2;
        /// Framing error.
        const FRAMING_ERROR = 1 << 3;
        /// Break condition detected.
        const BREAK_INTERRUPT = 1 << 4;
        /// The transmit holding register can accept another byte.
        const THR_EMPTY = 1 << 5;
        /// Both the holding and shift registers are empty.
        const TRANSMITTER_EMPTY = 1 << 6;
        /// At least one error is queued in the receive FIFO.
        const RX_FIFO_ERROR = 1 << 7;
    }
}

bitflags! {
    /// Line control register.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct LineControl: u32 {
        /// Word length select, low bit.
        const WORD_LENGTH_0 = 1 << 0;
        /// Word length select, high bit.
        const WORD_LENGTH_1 = 1 << 1;
        /// 8 data bits.
        const WLEN8 = Self::WORD_LENGTH_0.bits() | Self::WORD_LENGTH_1.bits();
        /// Two stop bits rather than one.
        const TWO_STOP_BITS = 1 << 2;
        /// Parity enable.
        const PARITY_ENABLE = 1 << 3;
        /// Even rather than odd parity.
        const EVEN_PARITY = 1 << 4;
        /// Stick parity.
        const STICK_PARITY = 1 << 5;
        /// Hold the line in the break state.
        const SET_BREAK = 1 << 6;
        /// Divisor latch access.
        const DLAB = 1 << 7;
    }
}

bitflags! {
    /// Interrupt enable register.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct InterruptEnable: u32 {
        /// Receive data available.
        const RDI = 1 << 0;
        /// Transmit holding register empty.
        const THRI = 1 << 1;
        /// Receiver line status.
        const RLSI = 1 << 2;
        /// Modem status.
        const MSI = 1 << 3;
    }
}

bitflags! {
    /// FIFO control register.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct FifoControl: u32 {
        /// Enable both FIFOs.
        const ENABLE_FIFO = 1 << 0;
        /// Clear the receive FIFO.
        const CLEAR_RCVR = 1 << 1;
        /// Clear the transmit FIFO.
        const CLEAR_XMIT = 1 << 2;
        /// DMA mode select.
        const DMA_SELECT = 1 << 3;
    }
}
