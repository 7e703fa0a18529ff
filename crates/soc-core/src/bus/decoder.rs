//! Two-phase address decoder: a mutable builder collects regions during
//! composition, then is consumed into an immutable routing structure.
//!
//! The decoder is generic over the target handle type so routing can be
//! tested independently of any peripheral model.

use crate::error::{ComposeError, UnmappedAddress};

use super::BusParams;

/// Contiguous address-space window owned by a single target.
///
/// The window covers the half-open range `[base, base + size)`. Created once
/// at composition time and immutable thereafter.
#[derive(Debug, Clone)]
pub struct Region<T> {
    base: u32,
    size: u32,
    target: T,
}

impl<T> Region<T> {
    /// Base address of the window.
    #[must_use]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Byte size of the window.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Exclusive end of the window.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.base as u64 + self.size as u64
    }

    /// The owning target's handle.
    #[must_use]
    pub const fn target(&self) -> &T {
        &self.target
    }

    /// Returns `true` when `addr` falls inside the window.
    #[must_use]
    pub const fn contains(&self, addr: u32) -> bool {
        addr >= self.base && (addr as u64) < self.end()
    }
}

/// Build-phase decoder accepting regions; consumed by [`DecoderBuilder::finish`].
///
/// Region insertion is a build-time operation only: once the builder is
/// finished no further regions can be added.
#[derive(Debug)]
pub struct DecoderBuilder<T> {
    params: BusParams,
    regions: Vec<Region<T>>,
}

impl<T> DecoderBuilder<T> {
    /// Creates an empty builder over the given bus parameters.
    #[must_use]
    pub const fn new(params: BusParams) -> Self {
        Self {
            params,
            regions: Vec::new(),
        }
    }

    /// The bus parameters every region must respect.
    #[must_use]
    pub const fn params(&self) -> BusParams {
        self.params
    }

    /// Number of regions added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` when no region has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Inserts a region covering `[base, base + size)` routed to `target`.
    ///
    /// The operation is all-or-nothing: on any error no state changes.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::EmptyRegion`] for a zero-size window,
    /// [`ComposeError::MisalignedRegion`] when `base` or `size` is not a
    /// multiple of the bus granularity, [`ComposeError::RegionOutOfRange`]
    /// when the window does not fit inside `[0, 2^addr_width)`, and
    /// [`ComposeError::RegionOverlap`] when the window intersects an
    /// existing region.
    pub fn add_region(&mut self, base: u32, size: u32, target: T) -> Result<(), ComposeError> {
        if size == 0 {
            return Err(ComposeError::EmptyRegion { base });
        }

        // Sub-byte granularity degenerates to byte-granular alignment.
        let granularity = self.params.granularity_bytes().max(1);
        if base % granularity != 0 || size % granularity != 0 {
            return Err(ComposeError::MisalignedRegion {
                base,
                size,
                granularity_bytes: granularity,
            });
        }

        let end = u64::from(base) + u64::from(size);
        if end > self.params.address_limit() {
            return Err(ComposeError::RegionOutOfRange {
                base,
                size,
                addr_width: self.params.addr_width,
            });
        }

        let insert_at = self.regions.partition_point(|region| region.base < base);
        let conflict = insert_at
            .checked_sub(1)
            .map(|index| &self.regions[index])
            .filter(|previous| previous.end() > u64::from(base))
            .or_else(|| {
                self.regions
                    .get(insert_at)
                    .filter(|next| u64::from(next.base) < end)
            });
        if let Some(existing) = conflict {
            return Err(ComposeError::RegionOverlap {
                base,
                size,
                existing_base: existing.base,
                existing_size: existing.size,
            });
        }

        self.regions.insert(insert_at, Region { base, size, target });
        Ok(())
    }

    /// Consumes the builder into an immutable routing decoder.
    #[must_use]
    pub fn finish(self) -> AddressDecoder<T> {
        AddressDecoder {
            params: self.params,
            regions: self.regions,
        }
    }
}

/// Finalized address decoder: routes bus addresses to region targets.
///
/// Routing is combinational and read-only; the region set is fixed for the
/// decoder's lifetime.
#[derive(Debug)]
pub struct AddressDecoder<T> {
    params: BusParams,
    regions: Vec<Region<T>>,
}

impl<T> AddressDecoder<T> {
    /// The bus parameters the decoder was built with.
    #[must_use]
    pub const fn params(&self) -> BusParams {
        self.params
    }

    /// Regions in ascending base-address order.
    #[must_use]
    pub fn regions(&self) -> &[Region<T>] {
        &self.regions
    }

    /// Routes an address to the target of the unique region containing it.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedAddress`] when no region contains `addr`. This is a
    /// normal condition for reserved address space, not a hard fault.
    pub fn route(&self, addr: u32) -> Result<&T, UnmappedAddress> {
        self.route_offset(addr).map(|(target, _)| target)
    }

    /// Routes an address and also returns the region-local byte offset.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedAddress`] when no region contains `addr`.
    pub fn route_offset(&self, addr: u32) -> Result<(&T, u32), UnmappedAddress> {
        let candidate = self
            .regions
            .partition_point(|region| region.base <= addr)
            .checked_sub(1)
            .map(|index| &self.regions[index]);
        match candidate {
            Some(region) if region.contains(addr) => Ok((&region.target, addr - region.base)),
            _ => Err(UnmappedAddress { addr }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BusParams, DecoderBuilder};
    use crate::error::{ComposeError, UnmappedAddress};

    const PARAMS: BusParams = BusParams {
        addr_width: 30,
        data_width: 32,
        granularity_bits: 8,
    };

    fn builder() -> DecoderBuilder<char> {
        DecoderBuilder::new(PARAMS)
    }

    #[test]
    fn routes_addresses_to_owning_regions_at_boundaries() {
        let mut builder = builder();
        builder.add_region(0x0000, 0x1000, 'a').expect("first region");
        builder.add_region(0x1000, 0x1000, 'b').expect("second region");
        let decoder = builder.finish();

        assert_eq!(decoder.route(0x0000), Ok(&'a'));
        assert_eq!(decoder.route(0x0FFF), Ok(&'a'));
        assert_eq!(decoder.route(0x1000), Ok(&'b'));
        assert_eq!(decoder.route(0x1FFF), Ok(&'b'));
        assert_eq!(decoder.route(0x2000), Err(UnmappedAddress { addr: 0x2000 }));
    }

    #[test]
    fn route_offset_is_region_local() {
        let mut builder = builder();
        builder.add_region(0x3000, 0x1000, 'd').expect("region");
        let decoder = builder.finish();

        assert_eq!(decoder.route_offset(0x3014), Ok((&'d', 0x14)));
    }

    #[test]
    fn gap_between_regions_is_unmapped() {
        let mut builder = builder();
        builder.add_region(0x0000, 0x1000, 'a').expect("low region");
        builder.add_region(0x4000, 0x1000, 'e').expect("high region");
        let decoder = builder.finish();

        assert_eq!(decoder.route(0x1000), Err(UnmappedAddress { addr: 0x1000 }));
        assert_eq!(decoder.route(0x3FFF), Err(UnmappedAddress { addr: 0x3FFF }));
        assert_eq!(decoder.route(0x4000), Ok(&'e'));
    }

    #[test]
    fn out_of_order_insertion_still_routes() {
        let mut builder = builder();
        builder.add_region(0x2000, 0x1000, 'c').expect("high first");
        builder.add_region(0x0000, 0x1000, 'a').expect("low second");
        let decoder = builder.finish();

        assert_eq!(decoder.route(0x0800), Ok(&'a'));
        assert_eq!(decoder.route(0x2800), Ok(&'c'));
        let bases: Vec<u32> = decoder.regions().iter().map(super::Region::base).collect();
        assert_eq!(bases, vec![0x0000, 0x2000]);
    }

    #[test]
    fn overlap_is_rejected_without_mutation() {
        let mut builder = builder();
        builder.add_region(0x1000, 0x1000, 'b').expect("first region");

        let error = builder
            .add_region(0x1800, 0x1000, 'x')
            .expect_err("tail overlap");
        assert_eq!(
            error,
            ComposeError::RegionOverlap {
                base: 0x1800,
                size: 0x1000,
                existing_base: 0x1000,
                existing_size: 0x1000,
            }
        );
        assert_eq!(builder.len(), 1);

        let error = builder
            .add_region(0x0800, 0x1000, 'x')
            .expect_err("head overlap");
        assert!(matches!(error, ComposeError::RegionOverlap { .. }));
        assert_eq!(builder.len(), 1);

        let decoder = builder.finish();
        assert_eq!(decoder.route(0x1800), Ok(&'b'));
    }

    #[test]
    fn contained_and_containing_overlaps_are_rejected() {
        let mut builder = builder();
        builder.add_region(0x1000, 0x4000, 'b').expect("wide region");

        assert!(matches!(
            builder.add_region(0x2000, 0x1000, 'x'),
            Err(ComposeError::RegionOverlap { .. })
        ));
        assert!(matches!(
            builder.add_region(0x0000, 0x10000, 'x'),
            Err(ComposeError::RegionOverlap { .. })
        ));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn zero_size_region_is_rejected() {
        let mut builder = builder();
        assert_eq!(
            builder.add_region(0x1000, 0, 'x'),
            Err(ComposeError::EmptyRegion { base: 0x1000 })
        );
        assert!(builder.is_empty());
    }

    #[test]
    fn misaligned_region_is_rejected_on_word_granular_bus() {
        let word_params = BusParams {
            addr_width: 16,
            data_width: 32,
            granularity_bits: 32,
        };
        let mut builder: DecoderBuilder<char> = DecoderBuilder::new(word_params);

        assert_eq!(
            builder.add_region(0x0002, 0x0010, 'x'),
            Err(ComposeError::MisalignedRegion {
                base: 0x0002,
                size: 0x0010,
                granularity_bytes: 4,
            })
        );
        assert_eq!(
            builder.add_region(0x0000, 0x0012, 'x'),
            Err(ComposeError::MisalignedRegion {
                base: 0x0000,
                size: 0x0012,
                granularity_bytes: 4,
            })
        );
        assert!(builder.is_empty());
    }

    #[test]
    fn region_past_the_address_limit_is_rejected() {
        let narrow = BusParams {
            addr_width: 16,
            data_width: 32,
            granularity_bits: 8,
        };
        let mut builder: DecoderBuilder<char> = DecoderBuilder::new(narrow);

        assert_eq!(
            builder.add_region(0xF000, 0x2000, 'x'),
            Err(ComposeError::RegionOutOfRange {
                base: 0xF000,
                size: 0x2000,
                addr_width: 16,
            })
        );
        assert!(builder.is_empty());

        builder.add_region(0xF000, 0x1000, 'y').expect("exact fit");
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn adjacent_regions_do_not_conflict() {
        let mut builder = builder();
        builder.add_region(0x1000, 0x1000, 'b').expect("first");
        builder.add_region(0x0000, 0x1000, 'a').expect("left neighbour");
        builder.add_region(0x2000, 0x1000, 'c').expect("right neighbour");
        assert_eq!(builder.len(), 3);
    }
}
