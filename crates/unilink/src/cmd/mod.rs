use clap::{Args, Subcommand};
use std::path::PathBuf;

use unilink_frame::{ENCODERS, EXAMPLES, MOTORS, SYSTEM, UPDATE};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod loopback;
pub mod monitor;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one frame.
    Encode(EncodeArgs),
    /// Decode a captured byte stream.
    Decode(DecodeArgs),
    /// Read frames from a device until interrupted.
    Monitor(MonitorArgs),
    /// Send frames through a pair of in-memory links and check the counters.
    Loopback(LoopbackArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Loopback(args) => loopback::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Component name (motors, encoders, update, system, examples) or id.
    #[arg(value_parser = parse_component)]
    pub component: u8,
    /// Data id within the component.
    #[arg(value_parser = parse_u8)]
    pub data_id: u8,
    /// Hex payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["hex", "data"])]
    pub file: Option<PathBuf>,
    /// Sequence id to stamp.
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub sequence: u8,
    /// Reserved header flags (0-7).
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub flags: u8,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file; `-` or absent reads stdin.
    pub path: Option<PathBuf>,
    /// Input is hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Exit non-zero if any frame failed or any byte was skipped.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Device or capture file to read.
    pub device: PathBuf,
    /// Exit after N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Print counters this often (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub stats_interval: String,
    /// Never write read-request replies back to the device.
    #[arg(long)]
    pub read_only: bool,
}

#[derive(Args, Debug)]
pub struct LoopbackArgs {
    /// Frames to send.
    #[arg(long, default_value = "1000")]
    pub frames: u32,
    /// Bytes handed to the receiver per ingest call.
    #[arg(long, default_value = "61")]
    pub chunk: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Decimal or `0x`-prefixed hex byte.
pub fn parse_u8(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("expected a byte value (0-255 or 0x00-0xff), got {input:?}"))
}

pub fn parse_component(input: &str) -> Result<u8, String> {
    match input.to_ascii_lowercase().as_str() {
        "system" => Ok(SYSTEM),
        "motors" | "motor" => Ok(MOTORS),
        "update" => Ok(UPDATE),
        "encoders" | "encoder" => Ok(ENCODERS),
        "examples" => Ok(EXAMPLES),
        _ => parse_u8(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_values() {
        assert_eq!(parse_u8("42"), Ok(42));
        assert_eq!(parse_u8("0xA0"), Ok(0xA0));
        assert!(parse_u8("256").is_err());
        assert!(parse_u8("0xZZ").is_err());
    }

    #[test]
    fn component_names() {
        assert_eq!(parse_component("Motors"), Ok(MOTORS));
        assert_eq!(parse_component("encoder"), Ok(ENCODERS));
        assert_eq!(parse_component("0x10"), Ok(0x10));
        assert!(parse_component("lidar").is_err());
    }
}
