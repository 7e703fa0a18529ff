//! Peripheral composition onto the shared bus.
//!
//! The composer is the build-phase façade: `attach` inserts a region into
//! the address decoder and, when the peripheral exposes an interrupt
//! capability, registers its line in the IRQ namespace. `finish` consumes
//! the composer into the immutable [`SystemBus`].

use crate::bus::{AddressDecoder, BusHandle, BusParams, DecoderBuilder};
use crate::error::{ComposeError, UnmappedAddress};
use crate::irq::{IrqAggregator, IrqLine};
use crate::periph::Peripheral;

/// Map listing entry for one composed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// Stable peripheral name.
    pub name: String,
    /// Region base address.
    pub base: u32,
    /// Region byte size.
    pub size: u32,
}

/// Build-phase façade collecting peripherals onto one decoder and one IRQ
/// namespace.
#[derive(Debug)]
pub struct Composer {
    decoder: DecoderBuilder<BusHandle>,
    irqs: IrqAggregator,
    map: Vec<MapEntry>,
}

impl Composer {
    /// Creates an empty composer over the given bus parameters.
    #[must_use]
    pub fn new(params: BusParams) -> Self {
        Self {
            decoder: DecoderBuilder::new(params),
            irqs: IrqAggregator::new(),
            map: Vec::new(),
        }
    }

    /// Attaches a peripheral's register window at `base`.
    ///
    /// The bus-facing interface is required; the interrupt capability is
    /// probed once and registered only when present — a bus-only peripheral
    /// contributes no IRQ entry, which is not an error. Returns the
    /// peripheral unchanged so call sites can store it.
    ///
    /// Attaching the same peripheral twice is not guarded against; callers
    /// must attach each peripheral exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::MissingBusInterface`] when the peripheral
    /// exposes no bus interface, [`ComposeError::DuplicateIrqName`] when
    /// its name is already registered, or any region error from the
    /// decoder. On error nothing has been mutated.
    pub fn attach<P: Peripheral>(&mut self, peripheral: P, base: u32) -> Result<P, ComposeError> {
        let interface =
            peripheral
                .bus_interface()
                .ok_or_else(|| ComposeError::MissingBusInterface {
                    name: peripheral.name().to_owned(),
                })?;

        let line = peripheral.irq_line();
        if line.is_some() && self.irqs.contains(peripheral.name()) {
            return Err(ComposeError::DuplicateIrqName {
                name: peripheral.name().to_owned(),
            });
        }

        self.decoder.add_region(base, peripheral.window(), interface)?;
        if let Some(line) = line {
            self.irqs.register(peripheral.name(), line)?;
        }
        self.map.push(MapEntry {
            name: peripheral.name().to_owned(),
            base,
            size: peripheral.window(),
        });
        Ok(peripheral)
    }

    /// Number of interrupt lines registered so far.
    #[must_use]
    pub fn irq_count(&self) -> usize {
        self.irqs.len()
    }

    /// Consumes the composer into the immutable system bus.
    #[must_use]
    pub fn finish(self) -> SystemBus {
        SystemBus {
            decoder: self.decoder.finish(),
            irqs: self.irqs,
            map: self.map,
        }
    }
}

/// Finalized composed bus: routing, word access, and the IRQ namespace.
///
/// Immutable once built; all composition happens through [`Composer`].
#[derive(Debug)]
pub struct SystemBus {
    decoder: AddressDecoder<BusHandle>,
    irqs: IrqAggregator,
    map: Vec<MapEntry>,
}

impl SystemBus {
    /// The bus parameters the decoder was built with.
    #[must_use]
    pub const fn params(&self) -> BusParams {
        self.decoder.params()
    }

    /// Routes an address to the owning peripheral's interface handle.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedAddress`] when no region contains `addr`.
    pub fn route(&self, addr: u32) -> Result<&BusHandle, UnmappedAddress> {
        self.decoder.route(addr)
    }

    /// Reads a full-width word at a bus address.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedAddress`] when no region contains `addr`; there is
    /// no valid response for reserved address space.
    pub fn read32(&self, addr: u32) -> Result<u32, UnmappedAddress> {
        let (target, offset) = self.decoder.route_offset(addr)?;
        Ok(target.read32(offset))
    }

    /// Writes a full-width word at a bus address.
    ///
    /// # Errors
    ///
    /// Returns [`UnmappedAddress`] when no region contains `addr`; the
    /// write is dropped.
    pub fn write32(&self, addr: u32, value: u32) -> Result<(), UnmappedAddress> {
        let (target, offset) = self.decoder.route_offset(addr)?;
        target.write32(offset, value);
        Ok(())
    }

    /// Registered interrupt lines in registration order.
    pub fn irq_lines(&self) -> impl Iterator<Item = (&str, &IrqLine)> {
        self.irqs.lines()
    }

    /// Composed regions in attach order.
    #[must_use]
    pub fn map(&self) -> &[MapEntry] {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::{Composer, MapEntry};
    use crate::bus::{BusHandle, BusParams, BusTarget};
    use crate::error::{ComposeError, UnmappedAddress};
    use crate::irq::IrqLine;
    use crate::periph::Peripheral;

    const PARAMS: BusParams = BusParams {
        addr_width: 30,
        data_width: 32,
        granularity_bits: 8,
    };

    #[derive(Default)]
    struct Scratch {
        word: u32,
    }

    impl BusTarget for Scratch {
        fn read32(&mut self, _offset: u32) -> u32 {
            self.word
        }

        fn write32(&mut self, _offset: u32, value: u32) {
            self.word = value;
        }
    }

    struct BusOnly {
        name: &'static str,
        handle: BusHandle,
    }

    impl BusOnly {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                handle: BusHandle::from_target(Scratch::default()),
            }
        }
    }

    impl Peripheral for BusOnly {
        fn name(&self) -> &str {
            self.name
        }

        fn bus_interface(&self) -> Option<BusHandle> {
            Some(self.handle.clone())
        }
    }

    #[derive(Debug)]
    struct WithIrq {
        name: &'static str,
        handle: BusHandle,
        irq: IrqLine,
    }

    impl WithIrq {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                handle: BusHandle::from_target(Scratch::default()),
                irq: IrqLine::new(),
            }
        }
    }

    impl Peripheral for WithIrq {
        fn name(&self) -> &str {
            self.name
        }

        fn bus_interface(&self) -> Option<BusHandle> {
            Some(self.handle.clone())
        }

        fn irq_line(&self) -> Option<IrqLine> {
            Some(self.irq.clone())
        }
    }

    #[derive(Debug)]
    struct Headless;

    impl Peripheral for Headless {
        fn name(&self) -> &str {
            "headless"
        }

        fn bus_interface(&self) -> Option<BusHandle> {
            None
        }
    }

    #[test]
    fn bus_only_peripheral_adds_no_irq_entry() {
        let mut composer = Composer::new(PARAMS);
        composer
            .attach(BusOnly::new("scratch"), 0x0000)
            .expect("attach");
        assert_eq!(composer.irq_count(), 0);

        let bus = composer.finish();
        assert_eq!(bus.irq_lines().count(), 0);
        assert!(bus.route(0x0000).is_ok());
    }

    #[test]
    fn irq_capable_peripheral_registers_under_its_own_name() {
        let mut composer = Composer::new(PARAMS);
        let peripheral = composer
            .attach(WithIrq::new("usb_setup"), 0x1000)
            .expect("attach");
        assert_eq!(composer.irq_count(), 1);

        let bus = composer.finish();
        let names: Vec<&str> = bus.irq_lines().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["usb_setup"]);

        peripheral.irq.set(true);
        let (_, line) = bus.irq_lines().next().expect("registered line");
        assert!(line.asserted());
    }

    #[test]
    fn missing_bus_interface_aborts_without_mutation() {
        let mut composer = Composer::new(PARAMS);
        let error = composer.attach(Headless, 0x0000).expect_err("attach");
        assert_eq!(
            error,
            ComposeError::MissingBusInterface {
                name: "headless".to_owned(),
            }
        );
        assert_eq!(composer.irq_count(), 0);

        let bus = composer.finish();
        assert!(bus.map().is_empty());
        assert_eq!(bus.route(0x0000), Err(UnmappedAddress { addr: 0x0000 }));
    }

    #[test]
    fn duplicate_irq_name_leaves_decoder_untouched() {
        let mut composer = Composer::new(PARAMS);
        composer
            .attach(WithIrq::new("usb_setup"), 0x0000)
            .expect("first attach");

        let error = composer
            .attach(WithIrq::new("usb_setup"), 0x1000)
            .expect_err("second attach");
        assert!(matches!(error, ComposeError::DuplicateIrqName { .. }));

        let bus = composer.finish();
        assert_eq!(bus.map().len(), 1);
        assert_eq!(bus.route(0x1000), Err(UnmappedAddress { addr: 0x1000 }));
    }

    #[test]
    fn word_access_routes_through_the_owning_region() {
        let mut composer = Composer::new(PARAMS);
        composer
            .attach(BusOnly::new("low"), 0x0000)
            .expect("low attach");
        composer
            .attach(BusOnly::new("high"), 0x1000)
            .expect("high attach");
        let bus = composer.finish();

        bus.write32(0x1004, 0xCAFE).expect("mapped write");
        assert_eq!(bus.read32(0x1FFC), Ok(0xCAFE));
        assert_eq!(bus.read32(0x0000), Ok(0));
        assert_eq!(bus.read32(0x2000), Err(UnmappedAddress { addr: 0x2000 }));
    }

    #[test]
    fn map_listing_follows_attach_order() {
        let mut composer = Composer::new(PARAMS);
        composer
            .attach(WithIrq::new("usb_device_controller"), 0x0000)
            .expect("controller");
        composer
            .attach(BusOnly::new("scratch"), 0x1000)
            .expect("scratch");
        let bus = composer.finish();

        assert_eq!(
            bus.map(),
            &[
                MapEntry {
                    name: "usb_device_controller".to_owned(),
                    base: 0x0000,
                    size: 0x1000,
                },
                MapEntry {
                    name: "scratch".to_owned(),
                    base: 0x1000,
                    size: 0x1000,
                },
            ]
        );
    }
}
