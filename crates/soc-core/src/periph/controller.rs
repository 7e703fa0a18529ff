//! USB device controller register block.
//!
//! A shallow model: registers latch host-visible state and the event block
//! drives the interrupt line. Protocol interpretation stays in the external
//! USB core.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::{BusHandle, BusTarget};
use crate::irq::IrqLine;

use super::{EventRegs, Peripheral};

/// `CONNECT` register offset: bit 0 requests device-side pull-up.
pub const CONNECT_OFFSET: u32 = 0x00;
/// `SPEED` register offset: read-only negotiated-speed code.
pub const SPEED_OFFSET: u32 = 0x04;
/// `EV_STATUS` register offset: raw latched event view.
pub const EV_STATUS_OFFSET: u32 = 0x08;
/// `EV_PENDING` register offset: write-1-to-clear latched events.
pub const EV_PENDING_OFFSET: u32 = 0x0C;
/// `EV_ENABLE` register offset: event interrupt mask.
pub const EV_ENABLE_OFFSET: u32 = 0x10;

/// Event bit latched when the host issues a USB bus reset.
pub const EV_BUS_RESET: u32 = 0b01;

/// Speed code reported while operating in high speed.
pub const SPEED_HIGH: u32 = 0;
/// Speed code reported while operating in full speed.
pub const SPEED_FULL: u32 = 1;

#[derive(Debug)]
struct ControllerRegs {
    connect: bool,
    speed_code: u32,
    events: EventRegs,
}

impl BusTarget for ControllerRegs {
    fn read32(&mut self, offset: u32) -> u32 {
        match offset {
            CONNECT_OFFSET => u32::from(self.connect),
            SPEED_OFFSET => self.speed_code,
            EV_STATUS_OFFSET | EV_PENDING_OFFSET => self.events.pending(),
            EV_ENABLE_OFFSET => self.events.enable(),
            _ => 0,
        }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        match offset {
            CONNECT_OFFSET => self.connect = value & 1 != 0,
            EV_PENDING_OFFSET => self.events.acknowledge(value),
            EV_ENABLE_OFFSET => self.events.set_enable(value),
            _ => {}
        }
    }
}

/// USB device controller peripheral.
///
/// Owns the `CONNECT`/`SPEED` latches and a bus-reset event line.
#[derive(Debug)]
pub struct DeviceController {
    regs: Rc<RefCell<ControllerRegs>>,
    irq: IrqLine,
}

impl Default for DeviceController {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceController {
    /// Creates a disconnected controller reporting high speed.
    #[must_use]
    pub fn new() -> Self {
        let irq = IrqLine::new();
        let regs = Rc::new(RefCell::new(ControllerRegs {
            connect: false,
            speed_code: SPEED_HIGH,
            events: EventRegs::new(irq.clone()),
        }));
        Self { regs, irq }
    }

    /// Returns `true` when the host CPU has requested the connect pull-up.
    #[must_use]
    pub fn connect_requested(&self) -> bool {
        self.regs.borrow().connect
    }

    /// Latches a bus-reset event from the external USB core.
    pub fn inject_bus_reset(&self) {
        self.regs.borrow_mut().events.latch(EV_BUS_RESET);
    }

    /// Updates the negotiated-speed code reported through `SPEED`.
    pub fn set_speed_code(&self, code: u32) {
        self.regs.borrow_mut().speed_code = code;
    }
}

impl Peripheral for DeviceController {
    fn name(&self) -> &str {
        "usb_device_controller"
    }

    fn bus_interface(&self) -> Option<BusHandle> {
        Some(BusHandle::new(self.regs.clone()))
    }

    fn irq_line(&self) -> Option<IrqLine> {
        Some(self.irq.clone())
    }
}
