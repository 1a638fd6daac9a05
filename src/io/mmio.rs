//! Memory-mapped register access.

use super::RegisterIo;
use crate::regs::Register;
use core::ptr::NonNull;

/// The register block of a UART mapped into the address space of the program.
#[derive(Debug)]
pub struct MmioRegisters {
    base: NonNull<u32>,
    size: usize,
}

// SAFETY: The registers are only accessed with volatile reads and writes, which the device
// accepts from any thread.
unsafe impl Send for MmioRegisters {}

// SAFETY: `&MmioRegisters` only allows volatile accesses within the mapped region.
unsafe impl Sync for MmioRegisters {}

impl MmioRegisters {
    /// Wraps the register block mapped at `base` with the given size in bytes.
    ///
    /// # Safety
    ///
    /// `base` must point to the mapped registers of a 16550-compatible UART, valid for volatile
    /// 32-bit reads and writes over `size` bytes, for the lifetime of the returned value. Nothing
    /// else may access the block in a way that conflicts with the driver.
    pub unsafe fn new(base: NonNull<u32>, size: usize) -> Self {
        Self { base, size }
    }

    /// Returns the size of the mapped block in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    fn ptr(&self, offset: usize) -> *mut u32 {
        assert!(
            offset + 4 <= self.size && offset % 4 == 0,
            "register offset {offset:#x} outside the mapped block"
        );
        // SAFETY: The offset was just checked to lie inside the mapped block.
        unsafe { self.base.as_ptr().byte_add(offset) }
    }
}

impl RegisterIo for MmioRegisters {
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `ptr` only returns aligned pointers inside the block, which `new` guarantees is
        // mapped.
        unsafe { self.ptr(offset).read_volatile() }
    }

    fn write(&self, offset: usize, value: u32) {
        // SAFETY: As above.
        unsafe { self.ptr(offset).write_volatile(value) }
    }
}

/// The smallest block which holds every register the driver touches.
pub const MIN_BLOCK_SIZE: usize = Register::ModeDefinition.offset() + 4;
