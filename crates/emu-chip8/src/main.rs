//! CHIP-8 machine binary.
//!
//! Builds a machine, loads a program image and reports what landed where:
//! a load summary, optional hexdumps and state queries, as text or JSON.

use std::path::PathBuf;
use std::process;

use emu_chip8::{BootImage, Chip8, Chip8Model, MemoryConfig};
use emu_core::{Observable, Value, parse_address};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Bytes per hexdump row.
const DUMP_WIDTH: usize = 16;

/// Default hexdump length.
const DEFAULT_DUMP_LEN: u16 = 64;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    model: Chip8Model,
    boot: BootSource,
    dumps: Vec<(u16, u16)>,
    queries: Vec<String>,
    json: bool,
}

enum BootSource {
    Font,
    None,
    File(PathBuf),
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        process::exit(0);
    }
    parse_arg_list(&args).unwrap_or_else(|msg| {
        eprintln!("{msg}");
        process::exit(1);
    })
}

fn print_usage() {
    eprintln!("Usage: emu-chip8 [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --rom <file>          Program image (.ch8)");
    eprintln!("  --model <name>        chip8, eti660, superchip, xochip [default: chip8]");
    eprintln!("  --no-font             Leave memory below the entry point empty");
    eprintln!("  --boot <file>         Boot image written at $0000 instead of the font");
    eprintln!("  --dump <addr>[:<len>] Hexdump a memory range (repeatable)");
    eprintln!("  --query <path>        Print a state query (repeatable)");
    eprintln!("  --json                Print the report as JSON");
}

/// Value following `flag`; another option in that position counts as missing.
fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    match args.get(i) {
        Some(value) if !value.starts_with("--") => Ok(value.as_str()),
        _ => Err(format!("Missing value for {flag}")),
    }
}

fn parse_arg_list(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        rom_path: None,
        model: Chip8Model::Chip8,
        boot: BootSource::Font,
        dumps: Vec::new(),
        queries: Vec::new(),
        json: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = Some(PathBuf::from(flag_value(args, i, "--rom")?));
            }
            "--model" => {
                i += 1;
                let name = flag_value(args, i, "--model")?;
                cli.model = Chip8Model::from_name(name).ok_or_else(|| {
                    format!("Unknown model: {name} (expected chip8, eti660, superchip, xochip)")
                })?;
            }
            "--no-font" => {
                cli.boot = BootSource::None;
            }
            "--boot" => {
                i += 1;
                cli.boot = BootSource::File(PathBuf::from(flag_value(args, i, "--boot")?));
            }
            "--dump" => {
                i += 1;
                let range = flag_value(args, i, "--dump")?;
                let dump = parse_dump(range).ok_or_else(|| {
                    format!("Invalid dump range: {range} (expected <addr>[:<len>])")
                })?;
                cli.dumps.push(dump);
            }
            "--query" => {
                i += 1;
                cli.queries.push(flag_value(args, i, "--query")?.to_string());
            }
            "--json" => {
                cli.json = true;
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(cli)
}

fn parse_dump(range: &str) -> Option<(u16, u16)> {
    match range.split_once(':') {
        Some((addr, len)) => Some((parse_address(addr)?, len.parse().ok()?)),
        None => Some((parse_address(range)?, DEFAULT_DUMP_LEN)),
    }
}

// ---------------------------------------------------------------------------
// Machine setup
// ---------------------------------------------------------------------------

fn make_chip8(cli: &CliArgs) -> Chip8 {
    let boot_image = match &cli.boot {
        BootSource::Font => BootImage::Font,
        BootSource::None => BootImage::None,
        BootSource::File(path) => match std::fs::read(path) {
            Ok(data) => BootImage::Custom(data),
            Err(e) => {
                eprintln!("Failed to read boot image {}: {e}", path.display());
                process::exit(1);
            }
        },
    };

    let config = MemoryConfig::new(cli.model).with_boot_image(boot_image);
    match Chip8::new(config) {
        Ok(chip8) => chip8,
        Err(e) => {
            eprintln!("Failed to create machine: {e}");
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Report {
    model: &'static str,
    memory_size: usize,
    entry_point: u16,
    program_loaded: bool,
    program_len: usize,
    dumps: Vec<Dump>,
    queries: Vec<Query>,
}

#[derive(Serialize)]
struct Dump {
    address: u16,
    bytes: Vec<u8>,
}

#[derive(Serialize)]
struct Query {
    path: String,
    value: Option<Value>,
}

fn build_report(chip8: &Chip8, cli: &CliArgs, loaded: bool) -> Report {
    let dumps = cli
        .dumps
        .iter()
        .map(|&(address, len)| match chip8.read_block(address, len) {
            Ok(bytes) => Dump {
                address,
                bytes: bytes.to_vec(),
            },
            Err(e) => {
                eprintln!("Dump skipped: {e}");
                Dump {
                    address,
                    bytes: Vec::new(),
                }
            }
        })
        .collect();

    let queries = cli
        .queries
        .iter()
        .map(|path| Query {
            path: path.clone(),
            value: chip8.query(path),
        })
        .collect();

    Report {
        model: chip8.model().name(),
        memory_size: chip8.memory().size(),
        entry_point: chip8.entry_point(),
        program_loaded: loaded,
        program_len: chip8.program_len().unwrap_or(0),
        dumps,
        queries,
    }
}

fn print_report(report: &Report) {
    println!(
        "{}: {} bytes, entry ${:04X}",
        report.model, report.memory_size, report.entry_point
    );
    if report.program_loaded {
        println!("program: {} bytes", report.program_len);
    } else {
        println!("program: not loaded");
    }

    for dump in &report.dumps {
        for (row, chunk) in dump.bytes.chunks(DUMP_WIDTH).enumerate() {
            let addr = dump.address as usize + row * DUMP_WIDTH;
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
            println!("${addr:04X}  {}", hex.join(" "));
        }
    }

    for query in &report.queries {
        match &query.value {
            Some(value) => println!("{} = {value}", query.path),
            None => println!("{} = <unknown path>", query.path),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let mut chip8 = make_chip8(&cli);

    let loaded = match &cli.rom_path {
        Some(path) => chip8.init(path),
        None => false,
    };

    let report = build_report(&chip8, &cli, loaded);
    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to encode report: {e}");
                process::exit(1);
            }
        }
    } else {
        print_report(&report);
    }

    if cli.rom_path.is_some() && !loaded {
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn flags_with_values_parse() {
        let cli = parse_arg_list(&args(&[
            "--rom", "pong.ch8", "--model", "eti660", "--boot", "boot.bin", "--dump",
            "$0200:32", "--query", "cpu.pc", "--json",
        ]))
        .expect("valid arguments");
        assert_eq!(cli.rom_path, Some(PathBuf::from("pong.ch8")));
        assert_eq!(cli.model, Chip8Model::Eti660);
        assert!(matches!(cli.boot, BootSource::File(ref path) if path == &PathBuf::from("boot.bin")));
        assert_eq!(cli.dumps, vec![(0x0200, 32)]);
        assert_eq!(cli.queries, vec!["cpu.pc".to_string()]);
        assert!(cli.json);
    }

    #[test]
    fn every_flag_rejects_a_missing_value() {
        for flag in ["--rom", "--model", "--boot", "--dump", "--query"] {
            assert_eq!(
                parse_arg_list(&args(&[flag])).err(),
                Some(format!("Missing value for {flag}")),
            );
            assert_eq!(
                parse_arg_list(&args(&[flag, "--json"])).err(),
                Some(format!("Missing value for {flag}")),
            );
        }
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(parse_arg_list(&args(&["--model", "vip"])).is_err());
        assert!(parse_arg_list(&args(&["--dump", "$0200:x"])).is_err());
        assert!(parse_arg_list(&args(&["--frobnicate"])).is_err());
    }
}
