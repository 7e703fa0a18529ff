//! Endpoint register interfaces: setup, IN, and OUT.
//!
//! Each interface is a shallow register block — latches plus an event
//! block driving its interrupt line. FIFO buffering and packet handling
//! live in the external USB core and are out of scope here.

use std::cell::RefCell;
use std::rc::Rc;

use crate::bus::{BusHandle, BusTarget};
use crate::irq::IrqLine;

use super::{EventRegs, Peripheral};

/// `DATA` register offset.
pub const DATA_OFFSET: u32 = 0x00;
/// `EPNO` register offset: endpoint number latch.
pub const EPNO_OFFSET: u32 = 0x04;
/// `RESET` register offset: write-strobe clearing the interface latches.
pub const RESET_OFFSET: u32 = 0x08;
/// `ENABLE` register offset (OUT interface only).
pub const ENABLE_OFFSET: u32 = 0x0C;
/// `EV_STATUS` register offset: raw latched event view.
pub const EV_STATUS_OFFSET: u32 = 0x10;
/// `EV_PENDING` register offset: write-1-to-clear latched events.
pub const EV_PENDING_OFFSET: u32 = 0x14;
/// `EV_ENABLE` register offset: event interrupt mask.
pub const EV_ENABLE_OFFSET: u32 = 0x18;

/// Event bit latched when the interface has completed its transfer.
pub const EV_DONE: u32 = 0b01;

const EPNO_MASK: u32 = 0x0F;

#[derive(Debug)]
struct SetupRegs {
    data: u32,
    epno: u32,
    events: EventRegs,
}

impl BusTarget for SetupRegs {
    fn read32(&mut self, offset: u32) -> u32 {
        match offset {
            DATA_OFFSET => self.data,
            EPNO_OFFSET => self.epno,
            EV_STATUS_OFFSET | EV_PENDING_OFFSET => self.events.pending(),
            EV_ENABLE_OFFSET => self.events.enable(),
            _ => 0,
        }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        match offset {
            RESET_OFFSET => {
                self.data = 0;
                self.epno = 0;
            }
            EV_PENDING_OFFSET => self.events.acknowledge(value),
            EV_ENABLE_OFFSET => self.events.set_enable(value),
            _ => {}
        }
    }
}

/// Setup packet interface peripheral.
///
/// The USB core latches received setup words through [`SetupInterface::deliver`];
/// the host CPU reads them back and acknowledges the done event.
#[derive(Debug)]
pub struct SetupInterface {
    regs: Rc<RefCell<SetupRegs>>,
    irq: IrqLine,
}

impl Default for SetupInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupInterface {
    /// Creates an empty setup interface.
    #[must_use]
    pub fn new() -> Self {
        let irq = IrqLine::new();
        let regs = Rc::new(RefCell::new(SetupRegs {
            data: 0,
            epno: 0,
            events: EventRegs::new(irq.clone()),
        }));
        Self { regs, irq }
    }

    /// Latches a received setup word for endpoint `epno` and raises the
    /// done event.
    pub fn deliver(&self, epno: u32, data: u32) {
        let mut regs = self.regs.borrow_mut();
        regs.epno = epno & EPNO_MASK;
        regs.data = data;
        regs.events.latch(EV_DONE);
    }
}

impl Peripheral for SetupInterface {
    fn name(&self) -> &str {
        "usb_setup"
    }

    fn bus_interface(&self) -> Option<BusHandle> {
        Some(BusHandle::new(self.regs.clone()))
    }

    fn irq_line(&self) -> Option<IrqLine> {
        Some(self.irq.clone())
    }
}

#[derive(Debug)]
struct InRegs {
    staged: u32,
    epno: u32,
    events: EventRegs,
}

impl BusTarget for InRegs {
    fn read32(&mut self, offset: u32) -> u32 {
        match offset {
            EPNO_OFFSET => self.epno,
            EV_STATUS_OFFSET | EV_PENDING_OFFSET => self.events.pending(),
            EV_ENABLE_OFFSET => self.events.enable(),
            _ => 0,
        }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        match offset {
            DATA_OFFSET => self.staged = self.staged.wrapping_add(1),
            EPNO_OFFSET => self.epno = value & EPNO_MASK,
            RESET_OFFSET => self.staged = 0,
            EV_PENDING_OFFSET => self.events.acknowledge(value),
            EV_ENABLE_OFFSET => self.events.set_enable(value),
            _ => {}
        }
    }
}

/// IN endpoint interface peripheral.
///
/// The host CPU stages outgoing words through `DATA`; the USB core drains
/// them and reports completion through [`InEndpoint::complete_transfer`].
#[derive(Debug)]
pub struct InEndpoint {
    regs: Rc<RefCell<InRegs>>,
    irq: IrqLine,
}

impl Default for InEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl InEndpoint {
    /// Creates an idle IN endpoint interface.
    #[must_use]
    pub fn new() -> Self {
        let irq = IrqLine::new();
        let regs = Rc::new(RefCell::new(InRegs {
            staged: 0,
            epno: 0,
            events: EventRegs::new(irq.clone()),
        }));
        Self { regs, irq }
    }

    /// Number of words staged since the last reset strobe.
    #[must_use]
    pub fn staged_count(&self) -> u32 {
        self.regs.borrow().staged
    }

    /// Marks the staged transfer as sent and raises the done event.
    pub fn complete_transfer(&self) {
        let mut regs = self.regs.borrow_mut();
        regs.staged = 0;
        regs.events.latch(EV_DONE);
    }
}

impl Peripheral for InEndpoint {
    fn name(&self) -> &str {
        "usb_in_ep"
    }

    fn bus_interface(&self) -> Option<BusHandle> {
        Some(BusHandle::new(self.regs.clone()))
    }

    fn irq_line(&self) -> Option<IrqLine> {
        Some(self.irq.clone())
    }
}

#[derive(Debug)]
struct OutRegs {
    data: u32,
    epno: u32,
    enabled: bool,
    events: EventRegs,
}

impl BusTarget for OutRegs {
    fn read32(&mut self, offset: u32) -> u32 {
        match offset {
            DATA_OFFSET => self.data,
            EPNO_OFFSET => self.epno,
            ENABLE_OFFSET => u32::from(self.enabled),
            EV_STATUS_OFFSET | EV_PENDING_OFFSET => self.events.pending(),
            EV_ENABLE_OFFSET => self.events.enable(),
            _ => 0,
        }
    }

    fn write32(&mut self, offset: u32, value: u32) {
        match offset {
            EPNO_OFFSET => self.epno = value & EPNO_MASK,
            RESET_OFFSET => self.data = 0,
            ENABLE_OFFSET => self.enabled = value & 1 != 0,
            EV_PENDING_OFFSET => self.events.acknowledge(value),
            EV_ENABLE_OFFSET => self.events.set_enable(value),
            _ => {}
        }
    }
}

/// OUT endpoint interface peripheral.
///
/// The USB core latches received words through [`OutEndpoint::deliver`]
/// while the interface is enabled by the host CPU.
#[derive(Debug)]
pub struct OutEndpoint {
    regs: Rc<RefCell<OutRegs>>,
    irq: IrqLine,
}

impl Default for OutEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl OutEndpoint {
    /// Creates a disabled OUT endpoint interface.
    #[must_use]
    pub fn new() -> Self {
        let irq = IrqLine::new();
        let regs = Rc::new(RefCell::new(OutRegs {
            data: 0,
            epno: 0,
            enabled: false,
            events: EventRegs::new(irq.clone()),
        }));
        Self { regs, irq }
    }

    /// Returns `true` when the host CPU has enabled reception.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.regs.borrow().enabled
    }

    /// Latches a received word and raises the done event.
    ///
    /// Words delivered while the interface is disabled are dropped.
    pub fn deliver(&self, data: u32) {
        let mut regs = self.regs.borrow_mut();
        if !regs.enabled {
            return;
        }
        regs.data = data;
        regs.events.latch(EV_DONE);
    }
}

impl Peripheral for OutEndpoint {
    fn name(&self) -> &str {
        "usb_out_ep"
    }

    fn bus_interface(&self) -> Option<BusHandle> {
        Some(BusHandle::new(self.regs.clone()))
    }

    fn irq_line(&self) -> Option<IrqLine> {
        Some(self.irq.clone())
    }
}
