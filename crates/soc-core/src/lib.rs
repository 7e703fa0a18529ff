//! Bus composition and PHY reset sequencing core for the Kelpie USB device
//! front-end.
//!
//! The crate models three things: a shared-bus address decoder that
//! partitions a flat address space into non-overlapping peripheral regions,
//! a composer that attaches heterogeneous peripherals (with or without
//! interrupt lines) to that bus, and a clocked sequencer that drives an
//! external PHY through its timed power-on reset protocol.

/// Shared-bus primitives: parameters, target interfaces, and the decoder.
pub mod bus;
pub use bus::{AddressDecoder, BusHandle, BusParams, BusTarget, DecoderBuilder, Region};

/// Error taxonomy for composition, routing, and timing.
pub mod error;
pub use error::{ComposeError, FrontendError, TimingError, UnmappedAddress};

/// Interrupt line wires and the build-time IRQ namespace.
pub mod irq;
pub use irq::{IrqAggregator, IrqLine};

/// Peripheral capability trait and the front-end register blocks.
pub mod periph;
pub use periph::{
    DeviceController, EventRegs, InEndpoint, OutEndpoint, Peripheral, SetupInterface,
    REGISTER_WINDOW_BYTES,
};

/// Peripheral composition onto the shared bus.
pub mod compose;
pub use compose::{Composer, MapEntry, SystemBus};

/// PHY reset timing and the clocked reset/stop sequencer.
pub mod reset;
pub use reset::{PhyResetSequencer, ResetSchedule, ResetTiming, SequencerPhase, TimingWarning};

/// ULPI PHY-facing signal bundle.
pub mod ulpi;
pub use ulpi::UlpiBundle;

/// Top-level front-end assembly.
pub mod top;
pub use top::{FrontendConfig, UsbFrontend};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
