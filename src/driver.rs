//! Binding UARTs discovered by the platform, and tearing them down again.

use crate::config::UartConfig;
use crate::device::SerialDevice;
use crate::io::RegisterIo;
use crate::platform::{DeviceResource, Platform};
use crate::{Error, PhysAddr, Result, SetupError};
use log::{error, info, warn};
use std::sync::Arc;

/// Identifies a device bound by a [`Driver`].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct DeviceId(usize);

/// The name of the device node for a UART whose registers are at `base`.
pub fn node_name(base: PhysAddr) -> String {
    format!("cp2102-{:x}", base)
}

struct Bound<R: RegisterIo> {
    device: Arc<SerialDevice<R>>,
    base: PhysAddr,
    irq: u32,
    node: String,
}

/// Binds compatible UARTs on a platform and owns them until they are removed.
///
/// Dropping the driver removes every device still bound.
pub struct Driver<P: Platform> {
    platform: P,
    config: UartConfig,
    devices: Vec<Option<Bound<P::Io>>>,
}

impl<P: Platform> Driver<P> {
    /// Creates a driver which configures each device it binds with `config`.
    pub fn new(platform: P, config: UartConfig) -> Self {
        Self {
            platform,
            config,
            devices: Vec::new(),
        }
    }

    /// Returns the platform the driver binds devices on.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Binds the device described by `resource`.
    ///
    /// On failure everything done so far is undone, so no half-bound device is left behind.
    pub fn probe(&mut self, resource: &DeviceResource) -> Result<DeviceId> {
        info!("Probing {}", resource.compatible);
        if !resource.is_compatible() {
            return Err(SetupError::NoMatch.into());
        }
        let base = resource
            .base
            .ok_or(SetupError::MissingResource("memory"))?;

        self.platform.pm_enable(base);
        self.platform.pm_get_sync(base);
        let bound = self.bind(base, resource).inspect_err(|e| {
            error!("Failed to bind {}: {}", resource.compatible, e);
            self.platform.pm_disable(base);
        })?;
        info!("Registered {} on irq {}", bound.node, bound.irq);

        let id = match self.devices.iter().position(Option::is_none) {
            Some(index) => {
                self.devices[index] = Some(bound);
                index
            }
            None => {
                self.devices.push(Some(bound));
                self.devices.len() - 1
            }
        };
        Ok(DeviceId(id))
    }

    fn bind(&self, base: PhysAddr, resource: &DeviceResource) -> Result<Bound<P::Io>> {
        let irq = resource
            .irq
            .ok_or(SetupError::MissingResource("interrupt"))?;
        let io = self.platform.map_registers(base, resource.size)?;

        let config = match resource.clock_frequency {
            Some(clock) => self.config.clone().with_clock(clock),
            None => {
                warn!(
                    "No clock-frequency for {:#x}, assuming {} Hz",
                    base, self.config.clock_frequency
                );
                self.config.clone()
            }
        };
        let device = Arc::new(SerialDevice::new(io, config)?);

        let node = node_name(base);
        let handler = device.clone();
        let registered = self
            .platform
            .request_irq(irq, &node, Arc::new(move || handler.handle_interrupt()))
            .and_then(|()| {
                self.platform
                    .register_node(&node)
                    .inspect_err(|_| self.platform.free_irq(irq))
            });
        if let Err(e) = registered {
            if let Err(e) = device.shutdown() {
                warn!("Failed to mask interrupts on {}: {}", node, e);
            }
            return Err(e);
        }

        Ok(Bound {
            device,
            base,
            irq,
            node,
        })
    }

    /// Returns the bound device with the given ID.
    pub fn device(&self, id: DeviceId) -> Result<&Arc<SerialDevice<P::Io>>> {
        self.devices
            .get(id.0)
            .and_then(Option::as_ref)
            .map(|bound| &bound.device)
            .ok_or(Error::NoDevice)
    }

    /// Returns the name of the device node for the given ID.
    pub fn node(&self, id: DeviceId) -> Result<&str> {
        self.devices
            .get(id.0)
            .and_then(Option::as_ref)
            .map(|bound| bound.node.as_str())
            .ok_or(Error::NoDevice)
    }

    /// Returns the IDs of all bound devices.
    pub fn ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices
            .iter()
            .enumerate()
            .filter(|(_, bound)| bound.is_some())
            .map(|(index, _)| DeviceId(index))
    }

    /// Unbinds a device: removes its node, stops its interrupt and masks it in hardware.
    ///
    /// Callers still holding the device can keep using it, but no more data will arrive.
    pub fn remove(&mut self, id: DeviceId) -> Result {
        let bound = self
            .devices
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(Error::NoDevice)?;
        info!("Removing {}", bound.node);

        self.platform.pm_disable(bound.base);
        self.platform.deregister_node(&bound.node);
        self.platform.free_irq(bound.irq);
        if let Err(e) = bound.device.shutdown() {
            warn!("Failed to mask interrupts on {}: {}", bound.node, e);
        }
        Ok(())
    }
}

impl<P: Platform> Drop for Driver<P> {
    fn drop(&mut self) {
        let ids: Vec<_> = self.ids().collect();
        for id in ids {
            // The ID was just listed, so it is bound.
            let _ = self.remove(id);
        }
    }
}
