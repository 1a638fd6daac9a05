//! A fake platform for unit tests.

use super::{IrqHandler, Platform};
use crate::device::IrqReturn;
use crate::io::fake::{FakeUart, State as UartState};
use crate::{Error, PhysAddr, Result, SetupError};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

/// A fake implementation of [`Platform`] which hands out [`FakeUart`]s and records what the
/// driver asked for.
#[derive(Clone, Default)]
pub struct FakePlatform {
    /// What the driver has been given, shared by every clone.
    pub state: Arc<Mutex<State>>,
}

impl FakePlatform {
    /// Simulates interrupt `irq` firing, returning what its handler reported, if one is attached.
    pub fn fire(&self, irq: u32) -> Option<IrqReturn> {
        // Don't hold the lock while the handler runs.
        let handler = self.state.lock().unwrap().irqs.get(&irq).cloned();
        handler.map(|handler| handler())
    }

    /// Returns the state of the UART mapped at `base`, if it has been mapped.
    pub fn uart(&self, base: PhysAddr) -> Option<Arc<Mutex<UartState>>> {
        self.state.lock().unwrap().uarts.get(&base).cloned()
    }

    /// Returns the power state of the device at `base`.
    pub fn power(&self, base: PhysAddr) -> Power {
        self.state
            .lock()
            .unwrap()
            .power
            .get(&base)
            .copied()
            .unwrap_or_default()
    }
}

impl Platform for FakePlatform {
    type Io = FakeUart;

    fn map_registers(&self, base: PhysAddr, _size: usize) -> Result<FakeUart> {
        let mut state = self.state.lock().unwrap();
        if state.fail_map {
            return Err(SetupError::MapFailed.into());
        }
        let (uart, uart_state) = FakeUart::new();
        state.uarts.insert(base, uart_state);
        Ok(uart)
    }

    fn request_irq(&self, irq: u32, name: &str, handler: IrqHandler) -> Result {
        let mut state = self.state.lock().unwrap();
        if state.fail_irq || state.irqs.contains_key(&irq) {
            return Err(SetupError::IrqUnavailable(irq).into());
        }
        state.irqs.insert(irq, handler);
        state.irq_names.insert(irq, name.to_owned());
        Ok(())
    }

    fn free_irq(&self, irq: u32) {
        let mut state = self.state.lock().unwrap();
        state.irqs.remove(&irq);
        state.irq_names.remove(&irq);
    }

    fn register_node(&self, name: &str) -> Result {
        let mut state = self.state.lock().unwrap();
        if state.fail_node || state.nodes.iter().any(|node| node == name) {
            return Err(Error::Setup(SetupError::NodeRegistration));
        }
        state.nodes.push(name.to_owned());
        Ok(())
    }

    fn deregister_node(&self, name: &str) {
        self.state.lock().unwrap().nodes.retain(|node| node != name);
    }

    fn pm_enable(&self, base: PhysAddr) {
        self.state.lock().unwrap().power.entry(base).or_default().enabled = true;
    }

    fn pm_get_sync(&self, base: PhysAddr) {
        self.state.lock().unwrap().power.entry(base).or_default().active = true;
    }

    fn pm_disable(&self, base: PhysAddr) {
        self.state.lock().unwrap().power.insert(base, Power::default());
    }
}

/// Runtime power management state of one device.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Power {
    /// Runtime power management is enabled.
    pub enabled: bool,
    /// The device is held powered up.
    pub active: bool,
}

/// Everything a [`FakePlatform`] has handed out or been asked to do.
#[derive(Default)]
pub struct State {
    /// Register blocks mapped so far, by base address.
    pub uarts: HashMap<PhysAddr, Arc<Mutex<UartState>>>,
    /// Attached interrupt handlers.
    pub irqs: BTreeMap<u32, IrqHandler>,
    /// The name each interrupt was requested under.
    pub irq_names: BTreeMap<u32, String>,
    /// Registered device nodes, in registration order.
    pub nodes: Vec<String>,
    /// Power state per device base address.
    pub power: HashMap<PhysAddr, Power>,
    /// Makes `map_registers` fail.
    pub fail_map: bool,
    /// Makes `request_irq` fail.
    pub fail_irq: bool,
    /// Makes `register_node` fail.
    pub fail_node: bool,
}
