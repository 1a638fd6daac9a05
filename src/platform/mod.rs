//! Services the platform provides to bind a UART: resource mapping, interrupt delivery, device
//! node registration and runtime power management.

#[cfg(test)]
pub mod fake;

use crate::device::IrqReturn;
use crate::io::RegisterIo;
use crate::{PhysAddr, Result};
use std::sync::Arc;

/// A handler the platform invokes, from interrupt context, whenever the line fires.
pub type IrqHandler = Arc<dyn Fn() -> IrqReturn + Send + Sync>;

/// Device tree `compatible` strings this driver binds to.
pub const COMPATIBLE: &[&str] = &["bbb,uart2", "bbb,uart4"];

/// A device discovered by the platform, as described by its device tree node.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeviceResource {
    /// The node's `compatible` string.
    pub compatible: String,
    /// Physical address of the register block, if the node has a memory resource.
    pub base: Option<PhysAddr>,
    /// Size of the register block in bytes.
    pub size: usize,
    /// The interrupt line, if the node has one.
    pub irq: Option<u32>,
    /// The node's `clock-frequency` property, if present. Without it the driver falls back to
    /// the configured clock and logs a warning.
    pub clock_frequency: Option<u32>,
}

impl DeviceResource {
    /// Returns whether this driver can bind to the device.
    pub fn is_compatible(&self) -> bool {
        COMPATIBLE.contains(&self.compatible.as_str())
    }
}

/// The interface which a particular platform must implement.
pub trait Platform {
    /// The register access the platform hands out for a mapped block.
    type Io: RegisterIo + 'static;

    /// Maps `size` bytes of registers at physical address `base`.
    fn map_registers(&self, base: PhysAddr, size: usize) -> Result<Self::Io>;

    /// Arranges for `handler` to be called whenever interrupt `irq` fires.
    fn request_irq(&self, irq: u32, name: &str, handler: IrqHandler) -> Result;

    /// Stops delivering interrupt `irq`. Once this returns the handler is no longer running.
    fn free_irq(&self, irq: u32);

    /// Exposes a byte-stream device node with the given name.
    fn register_node(&self, name: &str) -> Result;

    /// Removes a device node previously registered.
    fn deregister_node(&self, name: &str);

    /// Enables runtime power management for the device at `base`.
    fn pm_enable(&self, _base: PhysAddr) {}

    /// Powers the device at `base` up and keeps it active.
    fn pm_get_sync(&self, _base: PhysAddr) {}

    /// Disables runtime power management for the device at `base`.
    fn pm_disable(&self, _base: PhysAddr) {}
}
