use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use sigbus_catalog::SignalCatalog;
use tracing::debug;

use crate::exit::{catalog_error, CliError, CliResult, DATA_INVALID, USAGE};
use crate::output::OutputFormat;

pub mod catalog;
pub mod decode;
pub mod encode;
pub mod replay;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the signals known to this node.
    Catalog(CatalogArgs),
    /// Encode one datagram for a signal value.
    Encode(EncodeArgs),
    /// Decode one datagram without arbitration.
    Decode(DecodeArgs),
    /// Feed a timed datagram log through a receiving dictionary.
    Replay(ReplayArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, signals: Option<&Path>) -> CliResult<i32> {
    match command {
        Command::Catalog(args) => catalog::run(args, format, &load_catalog(signals)?),
        Command::Encode(args) => encode::run(args, format, &load_catalog(signals)?),
        Command::Decode(args) => decode::run(args, format, &load_catalog(signals)?),
        Command::Replay(args) => replay::run(args, format, &load_catalog(signals)?),
        Command::Version(args) => version::run(args),
    }
}

/// The JSON signal list at `path`, or the built-in table.
pub fn load_catalog(path: Option<&Path>) -> CliResult<SignalCatalog> {
    match path {
        Some(path) => SignalCatalog::from_file(path)
            .map_err(|err| catalog_error(&format!("loading {}", path.display()), err)),
        None => {
            debug!("using built-in signal table");
            Ok(SignalCatalog::builtin())
        }
    }
}

/// Parse a byte given in decimal or `0x`-prefixed hex.
pub fn parse_byte(text: &str) -> Result<u8, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => text.parse::<u8>(),
    };
    parsed.map_err(|err| format!("invalid byte {text:?}: {err}"))
}

/// Parse a `u32` given in decimal or `0x`-prefixed hex.
pub fn parse_u32(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|err| format!("invalid integer {text:?}: {err}"))
}

/// Decode hex text, ignoring whitespace, `:` separators and a `0x` prefix.
pub fn decode_hex(text: &str) -> CliResult<Vec<u8>> {
    let trimmed = text.trim();
    let digits: String = trimmed
        .strip_prefix("0x")
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex: {err}")))
}

pub fn usage(message: impl Into<String>) -> CliError {
    CliError::new(USAGE, message)
}

#[derive(Args, Debug, Default)]
pub struct CatalogArgs {}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Signal name.
    pub name: String,
    /// Value: a number for scaled signals, an integer for integer signals,
    /// hex bytes for buffer signals.
    #[arg(allow_hyphen_values = true)]
    pub value: String,
    /// Sending device number.
    #[arg(long, default_value = "0", value_parser = parse_byte)]
    pub device: u8,
    /// Priority byte (bit 7 = healthy, bits 0-6 = rank).
    #[arg(long, default_value = "0x80", value_parser = parse_byte)]
    pub priority: u8,
    /// Header timestamp in milliseconds.
    #[arg(long, default_value = "0", value_parser = parse_u32)]
    pub timestamp: u32,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Datagram bytes as hex.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Log file: one `<t_ms> <hex>` entry per line, `#` starts a comment.
    pub file: PathBuf,
    /// Exit non-zero if any datagram failed to ingest.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
