//! Top-level front-end assembly: fixed memory map, peripherals, and reset
//! wiring.

use crate::bus::BusParams;
use crate::compose::{Composer, MapEntry, SystemBus};
use crate::error::{FrontendError, UnmappedAddress};
use crate::irq::IrqLine;
use crate::periph::{DeviceController, InEndpoint, OutEndpoint, SetupInterface};
use crate::reset::{PhyResetSequencer, ResetTiming, TimingWarning};
use crate::ulpi::UlpiBundle;

/// Construction parameters for the front-end.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FrontendConfig {
    /// PHY reset sequencing parameters.
    pub timing: ResetTiming,
    /// Straps the external USB core to full-speed-only operation.
    pub full_speed_only: bool,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            timing: ResetTiming::usb_phy_default(),
            full_speed_only: false,
        }
    }
}

/// The assembled USB device front-end.
///
/// Composes the four register interfaces onto one shared bus, owns the PHY
/// reset sequencer, and forwards the sequencer's stop output upward as the
/// bus holdoff consumed by dependent logic.
#[derive(Debug)]
pub struct UsbFrontend {
    bus: SystemBus,
    sequencer: PhyResetSequencer,
    ulpi: UlpiBundle,
    controller: DeviceController,
    setup: SetupInterface,
    in_ep: InEndpoint,
    out_ep: OutEndpoint,
    full_speed_only: bool,
}

impl UsbFrontend {
    /// Shared bus geometry: 30-bit byte-granular address space, 32-bit data.
    pub const BUS_PARAMS: BusParams = BusParams {
        addr_width: 30,
        data_width: 32,
        granularity_bits: 8,
    };

    /// Device controller register window base.
    pub const CONTROLLER_BASE: u32 = 0x0000_0000;
    /// Setup interface register window base.
    pub const SETUP_BASE: u32 = 0x0000_1000;
    /// IN endpoint interface register window base.
    pub const IN_EP_BASE: u32 = 0x0000_2000;
    /// OUT endpoint interface register window base.
    pub const OUT_EP_BASE: u32 = 0x0000_3000;

    /// Assembles the front-end from a configuration.
    ///
    /// Returns the assembly together with any timing warnings so the host
    /// can surface sub-cycle durations to operators.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::Timing`] for invalid timing parameters and
    /// [`FrontendError::Compose`] if the memory map is rejected.
    pub fn new(config: FrontendConfig) -> Result<(Self, Vec<TimingWarning>), FrontendError> {
        let (schedule, warnings) = config.timing.compile()?;

        let mut composer = Composer::new(Self::BUS_PARAMS);
        let controller = composer.attach(DeviceController::new(), Self::CONTROLLER_BASE)?;
        let setup = composer.attach(SetupInterface::new(), Self::SETUP_BASE)?;
        let in_ep = composer.attach(InEndpoint::new(), Self::IN_EP_BASE)?;
        let out_ep = composer.attach(OutEndpoint::new(), Self::OUT_EP_BASE)?;
        let bus = composer.finish();

        let sequencer = PhyResetSequencer::new(schedule);
        let ulpi = UlpiBundle {
            rst: sequencer.reset(),
            ..UlpiBundle::default()
        };

        Ok((
            Self {
                bus,
                sequencer,
                ulpi,
                controller,
                setup,
                in_ep,
                out_ep,
                full_speed_only: config.full_speed_only,
            },
            warnings,
        ))
    }

    /// Advances one clock cycle: the sequencer takes its registered update
    /// and the reset output is mirrored onto the ULPI `rst` pin.
    pub fn tick(&mut self) {
        self.sequencer.tick();
        self.ulpi.rst = self.sequencer.reset();
    }

    /// Reset driven into the external USB core's reset domain.
    #[must_use]
    pub const fn usb_reset(&self) -> bool {
        self.sequencer.reset()
    }

    /// Bus holdoff exported upward: dependent logic stalls while asserted.
    #[must_use]
    pub const fn bus_holdoff(&self) -> bool {
        self.sequencer.stop()
    }

    /// The reset sequencer.
    #[must_use]
    pub const fn sequencer(&self) -> &PhyResetSequencer {
        &self.sequencer
    }

    /// Reads a word from the composed bus.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedAddress`] for reserved address space.
    pub fn read32(&self, addr: u32) -> Result<u32, UnmappedAddress> {
        self.bus.read32(addr)
    }

    /// Writes a word to the composed bus.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedAddress`] for reserved address space; the write is
    /// dropped.
    pub fn write32(&self, addr: u32, value: u32) -> Result<(), UnmappedAddress> {
        self.bus.write32(addr, value)
    }

    /// Registered interrupt lines in attach order, for the external
    /// interrupt controller.
    pub fn irq_lines(&self) -> impl Iterator<Item = (&str, &IrqLine)> {
        self.bus.irq_lines()
    }

    /// Composed memory map in attach order.
    #[must_use]
    pub fn memory_map(&self) -> &[MapEntry] {
        self.bus.map()
    }

    /// The PHY-facing signal bundle.
    #[must_use]
    pub const fn ulpi(&self) -> &UlpiBundle {
        &self.ulpi
    }

    /// Mutable access to the PHY-facing signal bundle for the external
    /// USB core's passthrough wiring.
    pub fn ulpi_mut(&mut self) -> &mut UlpiBundle {
        &mut self.ulpi
    }

    /// The device controller peripheral.
    #[must_use]
    pub const fn controller(&self) -> &DeviceController {
        &self.controller
    }

    /// The setup interface peripheral.
    #[must_use]
    pub const fn setup(&self) -> &SetupInterface {
        &self.setup
    }

    /// The IN endpoint interface peripheral.
    #[must_use]
    pub const fn in_ep(&self) -> &InEndpoint {
        &self.in_ep
    }

    /// The OUT endpoint interface peripheral.
    #[must_use]
    pub const fn out_ep(&self) -> &OutEndpoint {
        &self.out_ep
    }

    /// Full-speed-only strap forwarded to the external USB core.
    #[must_use]
    pub const fn full_speed_only(&self) -> bool {
        self.full_speed_only
    }
}
