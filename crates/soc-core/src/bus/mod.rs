//! Shared-bus primitives: fixed bus parameters, the bus-facing target
//! interface, and the two-phase address decoder.

/// Address decoder construction and routing.
pub mod decoder;
/// Bus-facing target interface and shared handles.
pub mod target;

pub use decoder::{AddressDecoder, DecoderBuilder, Region};
pub use target::{BusHandle, BusTarget};

/// Fixed parameters shared by every region on one decoder.
///
/// All three values are set when the decoder is created and apply uniformly
/// to every region for the decoder's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusParams {
    /// Address width in bits; the decoder spans `[0, 2^addr_width)`.
    pub addr_width: u8,
    /// Data width in bits for a full-width transfer.
    pub data_width: u8,
    /// Minimum addressable unit in bits (8 on a byte-granular bus).
    ///
    /// Must be a nonzero multiple of 8.
    pub granularity_bits: u8,
}

impl BusParams {
    /// Granularity expressed in bytes.
    #[must_use]
    pub const fn granularity_bytes(self) -> u32 {
        self.granularity_bits as u32 / 8
    }

    /// Exclusive upper bound of the decoder's address space.
    #[must_use]
    pub const fn address_limit(self) -> u64 {
        1_u64 << self.addr_width
    }
}

#[cfg(test)]
mod tests {
    use super::BusParams;

    #[test]
    fn byte_granular_bus_has_one_byte_units() {
        let params = BusParams {
            addr_width: 30,
            data_width: 32,
            granularity_bits: 8,
        };
        assert_eq!(params.granularity_bytes(), 1);
        assert_eq!(params.address_limit(), 1 << 30);
    }

    #[test]
    fn word_granular_bus_has_four_byte_units() {
        let params = BusParams {
            addr_width: 16,
            data_width: 32,
            granularity_bits: 32,
        };
        assert_eq!(params.granularity_bytes(), 4);
        assert_eq!(params.address_limit(), 0x1_0000);
    }
}
