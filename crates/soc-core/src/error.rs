//! Error taxonomy for bus composition, address routing, and reset timing.
//!
//! Configuration-class errors (`ComposeError`, `TimingError`) are detected
//! once at build time and abort assembly. [`UnmappedAddress`] is the one
//! runtime-normal condition: an access into reserved address space decodes
//! as "no peripheral selected" and must never crash the system.

use thiserror::Error;

use crate::reset::SequencerPhase;

/// Configuration errors raised while composing peripherals onto the bus.
///
/// Every failing operation is all-or-nothing: on error neither the decoder
/// nor the IRQ namespace has been mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// New region's address range intersects an existing region's range.
    #[error(
        "region 0x{base:08x}+0x{size:x} overlaps existing region \
         0x{existing_base:08x}+0x{existing_size:x}"
    )]
    RegionOverlap {
        /// Base address of the rejected region.
        base: u32,
        /// Byte size of the rejected region.
        size: u32,
        /// Base address of the already-registered region it intersects.
        existing_base: u32,
        /// Byte size of the already-registered region it intersects.
        existing_size: u32,
    },
    /// Region base or size is not a multiple of the bus granularity.
    #[error(
        "region 0x{base:08x}+0x{size:x} is not aligned to the \
         {granularity_bytes}-byte bus granularity"
    )]
    MisalignedRegion {
        /// Base address of the rejected region.
        base: u32,
        /// Byte size of the rejected region.
        size: u32,
        /// Bus granularity in bytes.
        granularity_bytes: u32,
    },
    /// Region size is zero; an empty window can never be routed to.
    #[error("region at 0x{base:08x} has zero size")]
    EmptyRegion {
        /// Base address of the rejected region.
        base: u32,
    },
    /// Region extends beyond the decoder's address space.
    #[error("region 0x{base:08x}+0x{size:x} exceeds the {addr_width}-bit address space")]
    RegionOutOfRange {
        /// Base address of the rejected region.
        base: u32,
        /// Byte size of the rejected region.
        size: u32,
        /// Decoder address width in bits.
        addr_width: u8,
    },
    /// Peripheral did not expose the required bus-facing interface.
    #[error("peripheral `{name}` exposes no bus interface")]
    MissingBusInterface {
        /// Stable name of the offending peripheral.
        name: String,
    },
    /// Two peripherals tried to register the same interrupt name.
    #[error("interrupt name `{name}` is already registered")]
    DuplicateIrqName {
        /// The contested interrupt name.
        name: String,
    },
}

/// Address decode miss: no region owns the address.
///
/// A normal runtime condition for reserved address space. Reads have no
/// valid response and writes are dropped by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("no region owns address 0x{addr:08x}")]
pub struct UnmappedAddress {
    /// The unrouted bus address.
    pub addr: u32,
}

/// Invalid reset-timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimingError {
    /// Clock frequency is non-finite or not positive.
    #[error("clock frequency {hz} Hz is not a positive finite value")]
    InvalidClockFrequency {
        /// The rejected frequency in hertz.
        hz: f64,
    },
    /// Phase duration is negative or non-finite.
    #[error("{phase} length {seconds} s is not a non-negative finite value")]
    InvalidDuration {
        /// Phase whose duration was rejected.
        phase: SequencerPhase,
        /// The rejected duration in seconds.
        seconds: f64,
    },
}

/// Front-end assembly failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontendError {
    /// Bus composition rejected the memory map.
    #[error(transparent)]
    Compose(#[from] ComposeError),
    /// Reset timing parameters were invalid.
    #[error(transparent)]
    Timing(#[from] TimingError),
}
