//! Raw access to the UART register block.

#[cfg(test)]
pub mod fake;
pub mod mmio;

/// Byte-addressed access to a mapped UART register block.
///
/// Implementations perform a single 32-bit access at the given byte offset, with no protocol of
/// their own. Accesses may come from the interrupt handler and from callers concurrently, so they
/// take `&self`.
pub trait RegisterIo: Send + Sync {
    /// Reads the 32-bit register at the given byte offset.
    fn read(&self, offset: usize) -> u32;

    /// Writes the 32-bit register at the given byte offset.
    fn write(&self, offset: usize, value: u32);
}
