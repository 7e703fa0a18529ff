//! Prints the power-on reset/holdoff trace for a scaled-down schedule.

use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use soc_core::periph::controller::CONNECT_OFFSET;
use soc_core::{FrontendConfig, ResetTiming, SequencerPhase, UsbFrontend};
use thiserror as _;

fn main() {
    // 1 kHz clock keeps the trace human-sized: 5 reset cycles, 3 stop cycles.
    let timing = ResetTiming {
        clock_frequency_hz: 1000.0,
        reset_length_s: 5e-3,
        stop_length_s: 3e-3,
        power_on_reset: true,
    };
    let (mut frontend, warnings) = UsbFrontend::new(FrontendConfig {
        timing,
        full_speed_only: false,
    })
    .expect("front-end assembly should succeed");

    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let schedule = frontend.sequencer().schedule();
    println!(
        "schedule: reset={} cycles, stop={} cycles",
        schedule.reset_cycles, schedule.stop_cycles
    );

    let mut cycle = 0u64;
    let mut last_phase = frontend.sequencer().phase();
    println!("cycle {cycle:>4}: enter {last_phase}");
    while frontend.sequencer().phase() != SequencerPhase::Idle {
        frontend.tick();
        cycle += 1;
        let phase = frontend.sequencer().phase();
        if phase != last_phase {
            println!("cycle {cycle:>4}: enter {phase}");
            last_phase = phase;
        }
    }

    frontend
        .write32(UsbFrontend::CONTROLLER_BASE + CONNECT_OFFSET, 1)
        .expect("controller window is mapped");
    println!(
        "connect requested: {}",
        frontend.controller().connect_requested()
    );

    for (name, line) in frontend.irq_lines() {
        println!("irq {name}: {}", line.asserted());
    }
}
