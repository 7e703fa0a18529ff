#![no_main]

use libfuzzer_sys::fuzz_target;
use soc_core::{BusParams, DecoderBuilder};

const PARAMS: BusParams = BusParams {
    addr_width: 30,
    data_width: 32,
    granularity_bits: 8,
};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // First chunk drives region insertion, the tail drives routing probes.
    let mut builder = DecoderBuilder::new(PARAMS);
    let mut chunks = data.chunks_exact(8);
    for (index, chunk) in (&mut chunks).take(16).enumerate() {
        let base = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let size = u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        // Errors are expected for hostile layouts; the builder must simply
        // stay consistent.
        let _ = builder.add_region(base, size, index);
    }

    let decoder = builder.finish();
    for probe in chunks.remainder().iter().chain(data.iter().take(16)) {
        let addr = u32::from(*probe) << 12;
        let _ = decoder.route(addr);
        let _ = decoder.route_offset(addr);
    }
});
