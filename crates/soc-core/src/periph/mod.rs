//! Peripheral capability surface and shared register-block helpers.
//!
//! The composer probes two capabilities: a bus-facing interface (required)
//! and an interrupt line (optional). Both are plain `Option`s resolved once
//! at attach time, so absence is statically checkable rather than a runtime
//! reflection failure.

/// USB device controller register block.
pub mod controller;
/// Endpoint register interfaces (setup, IN, OUT).
pub mod eptri;

pub use controller::DeviceController;
pub use eptri::{InEndpoint, OutEndpoint, SetupInterface};

use crate::bus::BusHandle;
use crate::irq::IrqLine;

/// Byte size of the register window every front-end peripheral occupies.
pub const REGISTER_WINDOW_BYTES: u32 = 0x1000;

/// Capability surface probed by the composer when attaching a peripheral.
///
/// The bus interface is required: returning `None` is a configuration error
/// at attach time. The interrupt line is optional and its absence is not an
/// error — bus-only peripherals are a supported variant.
pub trait Peripheral {
    /// Stable name used for the IRQ namespace and map listings.
    fn name(&self) -> &str;

    /// Byte size of the address window this peripheral decodes.
    fn window(&self) -> u32 {
        REGISTER_WINDOW_BYTES
    }

    /// Bus-facing interface handle, when the peripheral exposes one.
    fn bus_interface(&self) -> Option<BusHandle>;

    /// Interrupt line, when the peripheral is an interrupt source.
    fn irq_line(&self) -> Option<IrqLine> {
        None
    }
}

/// Status/pending/enable event block shared by the front-end peripherals.
///
/// Events latch into `pending` until acknowledged (write-1-to-clear); the
/// attached line is asserted while any enabled event is pending. `status`
/// reads give the raw latched view independent of the enable mask.
#[derive(Debug, Clone)]
pub struct EventRegs {
    pending: u32,
    enable: u32,
    line: IrqLine,
}

impl EventRegs {
    /// Creates an event block driving `line`.
    #[must_use]
    pub const fn new(line: IrqLine) -> Self {
        Self {
            pending: 0,
            enable: 0,
            line,
        }
    }

    /// Latches event bits into the pending register.
    pub fn latch(&mut self, bits: u32) {
        self.pending |= bits;
        self.update_line();
    }

    /// Acknowledges pending bits (write-1-to-clear semantics).
    pub fn acknowledge(&mut self, bits: u32) {
        self.pending &= !bits;
        self.update_line();
    }

    /// Replaces the enable mask.
    pub fn set_enable(&mut self, mask: u32) {
        self.enable = mask;
        self.update_line();
    }

    /// Raw latched event bits, unmasked.
    #[must_use]
    pub const fn pending(&self) -> u32 {
        self.pending
    }

    /// Current enable mask.
    #[must_use]
    pub const fn enable(&self) -> u32 {
        self.enable
    }

    fn update_line(&self) {
        self.line.set(self.pending & self.enable != 0);
    }
}
