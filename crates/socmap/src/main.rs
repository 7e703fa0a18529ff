//! CLI entry point for the Kelpie memory-map and timing inspector.

use std::env;
use std::ffi::OsString;

use soc_core::{FrontendConfig, ResetTiming, UsbFrontend};

const USAGE_TEXT: &str = "\
Usage: kelpie-socmap <command> [options]

Commands:
  map                                 Print the composed memory map and IRQ namespace
  timing <clock_hz> <reset_s> <stop_s> [--no-power-on]
                                      Compile and print the reset schedule

Options:
  -h, --help           Show this help message

Examples:
  kelpie-socmap map
  kelpie-socmap timing 60e6 10e-3 2e-4
  kelpie-socmap timing 60e6 10e-3 2e-4 --no-power-on
";

#[derive(Debug, PartialEq)]
enum Command {
    Map,
    Timing(TimingArgs),
}

#[derive(Debug, PartialEq)]
struct TimingArgs {
    clock_hz: f64,
    reset_s: f64,
    stop_s: f64,
    power_on_reset: bool,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "map" => parse_map_args(args).map(|()| ParseResult::Command(Command::Map)),
        "timing" => parse_timing_args(args)
            .map(Command::Timing)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_map_args(args: impl Iterator<Item = OsString>) -> Result<(), String> {
    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }
        return Err(format!("unexpected argument: {}", arg.to_string_lossy()));
    }
    Ok(())
}

fn parse_timing_args(args: impl Iterator<Item = OsString>) -> Result<TimingArgs, String> {
    let mut values = Vec::new();
    let mut power_on_reset = true;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--no-power-on" {
            power_on_reset = false;
            continue;
        }

        if arg.to_string_lossy().starts_with("--") {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if values.len() == 3 {
            return Err("too many timing values provided".to_string());
        }
        values.push(parse_number(&arg)?);
    }

    if values.len() != 3 {
        return Err("timing requires <clock_hz> <reset_s> <stop_s>".to_string());
    }

    Ok(TimingArgs {
        clock_hz: values[0],
        reset_s: values[1],
        stop_s: values[2],
        power_on_reset,
    })
}

fn parse_number(arg: &OsString) -> Result<f64, String> {
    let text = arg.to_string_lossy();
    text.parse::<f64>()
        .map_err(|_| format!("not a number: {text}"))
}

fn run_map() -> Result<(), i32> {
    let (frontend, warnings) = match UsbFrontend::new(FrontendConfig::default()) {
        Ok(assembled) => assembled,
        Err(e) => {
            eprintln!("error: {e}");
            return Err(1);
        }
    };

    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let params = UsbFrontend::BUS_PARAMS;
    println!(
        "bus: {}-bit addresses, {}-bit data, {}-bit granularity",
        params.addr_width, params.data_width, params.granularity_bits
    );
    println!();
    println!("memory map:");
    for entry in frontend.memory_map() {
        println!(
            "  0x{:08x}..0x{:08x}  {}",
            entry.base,
            u64::from(entry.base) + u64::from(entry.size),
            entry.name
        );
    }
    println!();
    println!("irq namespace:");
    for (index, (name, _)) in frontend.irq_lines().enumerate() {
        println!("  {index}: {name}");
    }

    Ok(())
}

fn run_timing(args: &TimingArgs) -> Result<(), i32> {
    let timing = ResetTiming {
        clock_frequency_hz: args.clock_hz,
        reset_length_s: args.reset_s,
        stop_length_s: args.stop_s,
        power_on_reset: args.power_on_reset,
    };

    let (schedule, warnings) = match timing.compile() {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("error: {e}");
            return Err(1);
        }
    };

    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    println!("clock: {} Hz", args.clock_hz);
    println!("reset: {} cycles", schedule.reset_cycles);
    println!("stop:  {} cycles", schedule.stop_cycles);
    println!(
        "power-on reset: {}",
        if schedule.power_on_reset {
            "armed"
        } else {
            "disarmed"
        }
    );

    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Map)) => match run_map() {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::Timing(args))) => match run_timing(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            2
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::{parse_args, parse_timing_args, Command, ParseResult, TimingArgs};
    use std::ffi::OsString;

    #[test]
    fn parses_map_command() {
        let result = parse_args([OsString::from("map")].into_iter())
            .expect("map should parse without error");
        assert!(matches!(result, ParseResult::Command(Command::Map)));
    }

    #[test]
    fn parses_timing_command() {
        let result = parse_timing_args(
            [
                OsString::from("60e6"),
                OsString::from("10e-3"),
                OsString::from("2e-4"),
            ]
            .into_iter(),
        )
        .expect("valid timing args should parse");

        assert_eq!(
            result,
            TimingArgs {
                clock_hz: 60e6,
                reset_s: 10e-3,
                stop_s: 2e-4,
                power_on_reset: true,
            }
        );
    }

    #[test]
    fn parses_no_power_on_flag() {
        let result = parse_timing_args(
            [
                OsString::from("60e6"),
                OsString::from("10e-3"),
                OsString::from("2e-4"),
                OsString::from("--no-power-on"),
            ]
            .into_iter(),
        )
        .expect("flagged timing args should parse");
        assert!(!result.power_on_reset);
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args([OsString::from("--help")].into_iter())
            .expect("help should parse without error");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_unknown_command() {
        let error = parse_args([OsString::from("unknown")].into_iter())
            .expect_err("unknown command should fail parse");
        assert!(error.contains("unknown command"));
    }

    #[test]
    fn rejects_map_with_arguments() {
        let error = parse_args([OsString::from("map"), OsString::from("extra")].into_iter())
            .expect_err("map takes no arguments");
        assert!(error.contains("unexpected argument"));
    }

    #[test]
    fn rejects_non_numeric_timing_value() {
        let error = parse_timing_args(
            [
                OsString::from("fast"),
                OsString::from("10e-3"),
                OsString::from("2e-4"),
            ]
            .into_iter(),
        )
        .expect_err("non-numeric clock should fail parse");
        assert!(error.contains("not a number"));
    }

    #[test]
    fn rejects_missing_timing_values() {
        let error = parse_timing_args([OsString::from("60e6")].into_iter())
            .expect_err("missing values should fail parse");
        assert!(error.contains("timing requires"));
    }

    #[test]
    fn rejects_extra_timing_values() {
        let error = parse_timing_args(
            [
                OsString::from("60e6"),
                OsString::from("10e-3"),
                OsString::from("2e-4"),
                OsString::from("1"),
            ]
            .into_iter(),
        )
        .expect_err("extra values should fail parse");
        assert!(error.contains("too many"));
    }
}
