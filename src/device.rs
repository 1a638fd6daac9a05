//! The per-UART device: interrupt-driven receive ring, blocking reads and translated writes.

use crate::config::UartConfig;
use crate::io::RegisterIo;
use crate::regs::{LineStatus, Register};
use crate::ring::RingBuffer;
use crate::uart::Uart;
use crate::user::{UserBuffer, UserBufferMut};
use crate::{Error, Result, BUF_SIZE};
use core::fmt::{self, Write};
use core::time::Duration;
use log::{debug, error, info, trace, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Condvar, Mutex, MutexGuard, PoisonError,
};
use std::time::Instant;

/// How often a blocked reader rechecks its cancel token if nothing wakes it.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Whether an interrupt was raised by this device.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IrqReturn {
    /// The interrupt was not for this device.
    None,
    /// The interrupt was handled.
    Handled,
}

/// Cancels a blocked [`SerialDevice::read`].
///
/// Cloned tokens share their state, so one clone can be handed to the reader and another kept to
/// cancel it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token which has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token as cancelled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Receive side state, guarded by one lock.
#[derive(Debug, Default)]
struct Receiver {
    ring: RingBuffer<BUF_SIZE>,
    /// A reader has peeked bytes it has not yet consumed. Other readers wait until it clears, so
    /// the peeked range is still at the front when it is consumed.
    busy: bool,
}

/// A bound UART.
///
/// The interrupt handler is the only producer into the receive ring and [`read`](Self::read) the
/// only consumer. They share nothing else: the ring is guarded by its own lock and readers are
/// woken through a condition variable. Writes never touch the ring.
#[derive(Debug)]
pub struct SerialDevice<R: RegisterIo> {
    uart: Uart<R>,
    divisor: u16,
    read_timeout: Option<Duration>,
    rx: Mutex<Receiver>,
    rx_ready: Condvar,
    /// Staging buffer for writes, which also serializes writers.
    tx: Mutex<[u8; BUF_SIZE]>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: RegisterIo> SerialDevice<R> {
    /// Creates a device for the given register block and programs the UART.
    ///
    /// Fails without touching the hardware if the configured clock gives no usable divisor.
    pub fn new(io: R, config: UartConfig) -> Result<Self> {
        let divisor = config.divisor().inspect_err(|e| error!("{}", e))?;
        let device = Self {
            uart: Uart::new(io, config.tx_ready_spins),
            divisor,
            read_timeout: config.read_timeout,
            rx: Mutex::new(Receiver::default()),
            rx_ready: Condvar::new(),
            tx: Mutex::new([0; BUF_SIZE]),
        };
        device.uart.init(divisor, config.banner)?;
        info!(
            "UART configured: clock {} Hz, divisor {}",
            config.clock_frequency, divisor
        );
        Ok(device)
    }

    /// The baud divisor latched at initialization.
    pub fn divisor(&self) -> u16 {
        self.divisor
    }

    /// The number of received bytes waiting to be read.
    pub fn pending(&self) -> usize {
        lock(&self.rx).ring.len()
    }

    /// The number of received bytes dropped because the ring was full.
    pub fn overruns(&self) -> u64 {
        lock(&self.rx).ring.overruns()
    }

    /// Returns whether a read would return without blocking.
    pub fn read_ready(&self) -> bool {
        !lock(&self.rx).ring.is_empty()
    }

    /// Handles the receive interrupt.
    ///
    /// Moves exactly one byte from the receive FIFO into the ring and wakes a blocked reader. If
    /// more bytes are pending in hardware the interrupt is expected to fire again.
    pub fn handle_interrupt(&self) -> IrqReturn {
        if !self.uart.line_status().contains(LineStatus::DATA_READY) {
            debug!("Spurious interrupt");
            return IrqReturn::None;
        }
        let byte = self.uart.read(Register::Data) as u8;
        trace!("rx {:#04x}", byte);
        if !lock(&self.rx).ring.push(byte) {
            warn!("Receive ring full, dropped {:#04x}", byte);
        }
        self.rx_ready.notify_all();
        IrqReturn::Handled
    }

    /// Called when the device node is opened.
    pub fn open(&self) -> Result {
        info!("Device open");
        Ok(())
    }

    /// Called when the last handle to the device node is closed.
    pub fn release(&self) -> Result {
        info!("Device close");
        Ok(())
    }

    /// Reads received bytes into `dst`, blocking until at least one is available.
    ///
    /// Returns as many bytes as are queued, up to the length of `dst`. The wait ends with
    /// [`Error::Interrupted`] once `cancel` is cancelled, or with [`Error::TimedOut`] after the
    /// configured read timeout. This also applies while waiting behind another reader. If copying
    /// into `dst` fails the bytes stay queued.
    pub fn read<B: UserBufferMut + ?Sized>(
        &self,
        dst: &mut B,
        cancel: &CancelToken,
    ) -> Result<usize> {
        debug!("Device read of up to {} bytes", dst.len());
        if dst.is_empty() {
            return Ok(0);
        }
        let deadline = self.read_timeout.map(|timeout| Instant::now() + timeout);

        let mut scratch = [0; BUF_SIZE];
        let len = {
            let mut rx = lock(&self.rx);
            while rx.busy || rx.ring.is_empty() {
                if cancel.is_cancelled() {
                    debug!("Read interrupted");
                    return Err(Error::Interrupted);
                }
                let wait = match deadline {
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            debug!("Read timed out");
                            return Err(Error::TimedOut);
                        }
                        (deadline - now).min(CANCEL_POLL_INTERVAL)
                    }
                    None => CANCEL_POLL_INTERVAL,
                };
                rx = self
                    .rx_ready
                    .wait_timeout(rx, wait)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            let want = dst.len().min(BUF_SIZE);
            rx.busy = true;
            rx.ring.peek(&mut scratch[..want])
        };

        let copied = dst.copy_to_user(&scratch[..len]);
        {
            let mut rx = lock(&self.rx);
            if copied.is_ok() {
                rx.ring.consume(len);
            }
            rx.busy = false;
        }
        // Readers queued behind this one wait on the same condition.
        self.rx_ready.notify_all();
        copied.inspect_err(|_| error!("Failed to copy {} bytes to reader", len))?;
        Ok(len)
    }

    /// Wakes every blocked reader so that it rechecks its cancel token.
    pub fn interrupt_readers(&self) {
        self.rx_ready.notify_all();
    }

    /// Sends up to [`BUF_SIZE`] bytes from `src`, returning how many were taken.
    ///
    /// Longer requests are truncated rather than queued. Each `\n` is sent as `\n\r`.
    ///
    /// If the transmitter stalls partway through, the call fails with [`Error::HardwareTimeout`]
    /// even though the bytes before the stall have already been sent.
    pub fn write<B: UserBuffer + ?Sized>(&self, src: &B) -> Result<usize> {
        debug!("Device write of {} bytes", src.len());
        let mut staging = lock(&self.tx);
        let len = src.len().min(BUF_SIZE);
        if len == 0 {
            return Ok(0);
        }
        src.copy_from_user(&mut staging[..len])
            .inspect_err(|_| error!("Failed to copy {} bytes from writer", len))?;
        self.uart.send_translated(&staging[..len])?;
        Ok(len)
    }

    /// Stops the device raising further interrupts.
    pub fn shutdown(&self) -> Result {
        let _staging = lock(&self.tx);
        self.uart.disable_interrupts()
    }
}

impl<R: RegisterIo> Write for &SerialDevice<R> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let _staging = lock(&self.tx);
        self.uart.send_translated(s.as_bytes()).map_err(|e| {
            error!("Error writing to UART: {}", e);
            fmt::Error
        })
    }
}
