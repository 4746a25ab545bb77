//! Run the RSDP locators against a raw dump of low physical memory.
//!
//! ```text
//! rsdp-probe <image> [--base <addr>] [--module <start>:<end>]...
//! ```
//!
//! The dump is treated as physical memory starting at `--base` (default 0).
//! Exits with 0 if either version was found, 1 if neither was, 2 on bad usage
//! and 3 if the image cannot be read or the report cannot be written.

mod logger;

use std::io::{self, Write};
use std::process::ExitCode;
use std::{env, fs};

use boot_rsdp::{BootModule, PhysAddr, RsdpLocator, RsdpVersion, SliceMap};
use log::debug;

use crate::logger::StderrLogger;

const USAGE: &str = "usage: rsdp-probe <image> [--base <addr>] [--module <start>:<end>]...";

/// Process exit status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
enum Status {
    Found = 0,
    NotFound = 1,
    Usage = 2,
    Io = 3,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        Self::from(status as u8)
    }
}

#[derive(Debug, thiserror::Error)]
enum UsageError {
    #[error("missing image path")]
    MissingImage,
    #[error("{0} needs a value")]
    MissingValue(&'static str),
    #[error("not a number: {0:?}")]
    BadNumber(String),
    #[error("module must be <start>:<end>, got {0:?}")]
    BadModule(String),
    #[error("unexpected argument {0:?}")]
    Unexpected(String),
}

#[derive(Debug)]
struct Args {
    image: String,
    base: PhysAddr,
    modules: Vec<BootModule>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, UsageError> {
        let mut image = None;
        let mut base = PhysAddr::zero();
        let mut modules = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--base" => {
                    let value = args.next().ok_or(UsageError::MissingValue("--base"))?;
                    base = PhysAddr::new(parse_number(&value)?);
                }
                "--module" => {
                    let value = args.next().ok_or(UsageError::MissingValue("--module"))?;
                    modules.push(parse_module(&value)?);
                }
                _ if arg.starts_with("--") || image.is_some() => {
                    return Err(UsageError::Unexpected(arg));
                }
                _ => image = Some(arg),
            }
        }

        Ok(Self {
            image: image.ok_or(UsageError::MissingImage)?,
            base,
            modules,
        })
    }
}

fn parse_number(s: &str) -> Result<u64, UsageError> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|_| UsageError::BadNumber(s.to_owned()))
}

fn parse_module(s: &str) -> Result<BootModule, UsageError> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| UsageError::BadModule(s.to_owned()))?;
    Ok(BootModule::new(
        PhysAddr::new(parse_number(start)?),
        PhysAddr::new(parse_number(end)?),
    ))
}

fn main() -> ExitCode {
    if let Err(e) = StderrLogger::from_env().init() {
        eprintln!("rsdp-probe: logging disabled: {e}");
    }

    run(env::args().skip(1), &mut io::stdout().lock()).into()
}

/// Parse `argv`, load the image and report on it. Diagnostics go to stderr.
fn run(argv: impl Iterator<Item = String>, out: &mut impl Write) -> Status {
    let args = match Args::parse(argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("rsdp-probe: {e}");
            eprintln!("{USAGE}");
            return Status::Usage;
        }
    };

    let bytes = match fs::read(&args.image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("rsdp-probe: {}: {e}", args.image);
            return Status::Io;
        }
    };
    debug!("Loaded {} bytes from {} at {}", bytes.len(), args.image, args.base);

    probe(&bytes, args.base, &args.modules, out).unwrap_or_else(|e| {
        eprintln!("rsdp-probe: {e}");
        Status::Io
    })
}

/// Run both locators over `image`, mapped at `base`, and write what was found.
fn probe(
    image: &[u8],
    base: PhysAddr,
    modules: &[BootModule],
    out: &mut impl Write,
) -> io::Result<Status> {
    let map = SliceMap::new(base, image);
    let mut locator = RsdpLocator::new(&map);
    if !modules.is_empty() {
        locator = locator.with_modules(modules);
    }

    let mut status = Status::NotFound;
    for version in [RsdpVersion::V1, RsdpVersion::V2] {
        let location = match locator.locate(version) {
            Ok(location) => location,
            Err(e) => {
                writeln!(out, "RSDP {version}: {e}")?;
                continue;
            }
        };

        status = Status::Found;
        writeln!(out, "RSDP {version}: {} ({})", location.address, location.source)?;
        if let Some(view) = locator.view(&location) {
            writeln!(out, "  OEM id    {:?}", String::from_utf8_lossy(&view.oem_id()))?;
            writeln!(out, "  revision  {}", view.revision())?;
            writeln!(out, "  RSDT      {}", view.rsdt_address())?;
            if let Some(xsdt) = view.xsdt_address().filter(|_| view.revision() != 0) {
                writeln!(out, "  XSDT      {xsdt}")?;
            }
        }
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, UsageError> {
        Args::parse(args.iter().map(|&s| s.to_owned()))
    }

    #[test]
    fn numbers_accept_hex_and_decimal() {
        assert_eq!(parse_number("0xE0000").ok(), Some(0xE_0000));
        assert_eq!(parse_number("0X10_0000").ok(), Some(0x10_0000));
        assert_eq!(parse_number("1024").ok(), Some(1024));
        assert!(parse_number("0xZZ").is_err());
        assert!(parse_number("").is_err());
    }

    #[test]
    fn modules_and_base_are_collected() {
        let args = parse(&[
            "low.bin",
            "--base",
            "0x1000",
            "--module",
            "0x80000:0x80024",
            "--module",
            "4096:8192",
        ])
        .expect("valid");

        assert_eq!(args.image, "low.bin");
        assert_eq!(args.base, PhysAddr::new(0x1000));
        assert_eq!(
            args.modules,
            [
                BootModule::new(PhysAddr::new(0x8_0000), PhysAddr::new(0x8_0024)),
                BootModule::new(PhysAddr::new(4096), PhysAddr::new(8192)),
            ]
        );
    }

    #[test]
    fn usage_errors() {
        assert!(matches!(parse(&[]), Err(UsageError::MissingImage)));
        assert!(matches!(
            parse(&["a.bin", "--base"]),
            Err(UsageError::MissingValue("--base"))
        ));
        assert!(matches!(
            parse(&["a.bin", "--module", "0x1000"]),
            Err(UsageError::BadModule(_))
        ));
        assert!(matches!(
            parse(&["a.bin", "b.bin"]),
            Err(UsageError::Unexpected(_))
        ));
        assert!(matches!(
            parse(&["a.bin", "--verbose"]),
            Err(UsageError::Unexpected(_))
        ));
    }

    fn checksum(bytes: &[u8]) -> u8 {
        0u8.wrapping_sub(bytes.iter().fold(0u8, |a, &b| a.wrapping_add(b)))
    }

    /// A zeroed first MiB with an ACPI 1.0 record at `0xF6A40` and an
    /// ACPI 2.0 record at `0xF5B00`, either of which may be left out.
    fn low_memory(v1: bool, v2: bool) -> Vec<u8> {
        let mut mem = vec![0u8; 0x10_0000];

        if v1 {
            let rec = &mut mem[0xF_6A40..0xF_6A54];
            rec[..8].copy_from_slice(b"RSD PTR ");
            rec[9..15].copy_from_slice(b"BOCHS ");
            rec[16..20].copy_from_slice(&0x07FE_14D2u32.to_le_bytes());
            rec[8] = checksum(rec);
        }

        if v2 {
            let rec = &mut mem[0xF_5B00..0xF_5B24];
            rec[..8].copy_from_slice(b"RSD PTR ");
            rec[9..15].copy_from_slice(b"OVMF  ");
            rec[15] = 2;
            rec[16..20].copy_from_slice(&0x7FB7_E014u32.to_le_bytes());
            rec[20..24].copy_from_slice(&36u32.to_le_bytes());
            rec[24..32].copy_from_slice(&0x7FB7_E0E8u64.to_le_bytes());
            rec[8] = checksum(&rec[..20]);
            rec[32] = checksum(rec);
        }

        mem
    }

    fn report(image: &[u8], modules: &[BootModule]) -> (Status, Vec<String>) {
        let mut out = Vec::new();
        let status = probe(image, PhysAddr::zero(), modules, &mut out).expect("in-memory write");
        let text = String::from_utf8(out).expect("utf-8 report");
        (status, text.lines().map(str::to_owned).collect())
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Status::Found as u8, 0);
        assert_eq!(Status::NotFound as u8, 1);
        assert_eq!(Status::Usage as u8, 2);
        assert_eq!(Status::Io as u8, 3);
    }

    #[test]
    fn reports_a_v1_record() {
        let (status, lines) = report(&low_memory(true, false), &[]);

        assert_eq!(status, Status::Found);
        assert_eq!(
            lines,
            [
                "RSDP v1: 0x00000000000F6A40 (BIOS area)",
                "  OEM id    \"BOCHS \"",
                "  revision  0",
                "  RSDT      0x0000000007FE14D2",
                "RSDP v2: no valid RSDP v2 in boot modules, EBDA or BIOS area",
            ]
        );
    }

    #[test]
    fn reports_a_v2_record_with_its_xsdt() {
        let (status, lines) = report(&low_memory(false, true), &[]);

        assert_eq!(status, Status::Found);
        assert_eq!(
            lines,
            [
                "RSDP v1: no valid RSDP v1 in boot modules, EBDA or BIOS area",
                "RSDP v2: 0x00000000000F5B00 (BIOS area)",
                "  OEM id    \"OVMF  \"",
                "  revision  2",
                "  RSDT      0x000000007FB7E014",
                "  XSDT      0x000000007FB7E0E8",
            ]
        );
    }

    #[test]
    fn reports_the_module_a_record_came_from() {
        let mut mem = low_memory(true, false);
        mem.copy_within(0xF_6A40..0xF_6A54, 0x8_0000);
        let modules = [BootModule::new(
            PhysAddr::new(0x8_0000),
            PhysAddr::new(0x8_0014),
        )];

        let (status, lines) = report(&mem, &modules);
        assert_eq!(status, Status::Found);
        assert_eq!(lines[0], "RSDP v1: 0x0000000000080000 (boot module 0)");
    }

    #[test]
    fn nothing_found_is_not_found() {
        let (status, lines) = report(&low_memory(false, false), &[]);

        assert_eq!(status, Status::NotFound);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.contains("no valid RSDP")));
    }

    #[test]
    fn bad_arguments_are_usage_errors() {
        let argv = ["--base".to_owned()];
        let mut out = Vec::new();
        assert_eq!(run(argv.into_iter(), &mut out), Status::Usage);
        assert!(out.is_empty());
    }

    #[test]
    fn unreadable_image_is_an_io_error() {
        let path = env::temp_dir().join("rsdp-probe-missing-image.bin");
        let _ = fs::remove_file(&path);
        let argv = [path.to_string_lossy().into_owned()];

        let mut out = Vec::new();
        assert_eq!(run(argv.into_iter(), &mut out), Status::Io);
        assert!(out.is_empty());
    }

    #[test]
    fn image_file_is_probed() {
        let path = env::temp_dir().join(format!("rsdp-probe-{}.bin", std::process::id()));
        fs::write(&path, low_memory(true, true)).expect("temp file");
        let argv = [path.to_string_lossy().into_owned()];

        let mut out = Vec::new();
        let status = run(argv.into_iter(), &mut out);
        let _ = fs::remove_file(&path);

        assert_eq!(status, Status::Found);
        let text = String::from_utf8(out).expect("utf-8 report");
        assert!(text.contains("RSDP v1: 0x00000000000F6A40 (BIOS area)"));
        assert!(text.contains("RSDP v2: 0x00000000000F5B00 (BIOS area)"));
    }
}
