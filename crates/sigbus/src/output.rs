use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use sigbus_signal::{Payload, PayloadKind};

pub const SCHEMA_BASE: &str = "https://schemas.sigbus.dev/cli/v1";

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn schema_id(name: &str) -> String {
    format!("{SCHEMA_BASE}/{name}.schema.json")
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

/// Decimal places needed to show one resolution step.
pub fn precision_for(resolution: f64) -> usize {
    let digits = (-resolution.log10() - 1e-9).ceil();
    if digits.is_finite() {
        digits.clamp(0.0, 12.0) as usize
    } else {
        0
    }
}

/// Human-readable payload value.
pub fn payload_text(payload: &Payload) -> String {
    match payload {
        Payload::Scaled(value) => {
            format!("{:.*}", precision_for(value.resolution()), value.value())
        }
        Payload::Integer(value) => value.to_string(),
        Payload::Buffer(bytes) => hex::encode(bytes),
    }
}

/// Short kind label with its shape parameter.
pub fn kind_text(kind: &PayloadKind) -> String {
    match kind {
        PayloadKind::Scaled { resolution } => format!("scaled ({resolution:e})"),
        PayloadKind::Integer => "integer".to_string(),
        PayloadKind::Buffer { length } => format!("buffer ({length} bytes)"),
    }
}

#[cfg(test)]
mod tests {
    use sigbus_wire::{FixedPointValue, SEMI_TO_DEGREES};

    use super::*;

    #[test]
    fn precision_tracks_resolution() {
        assert_eq!(precision_for(1.0), 0);
        assert_eq!(precision_for(0.1), 1);
        assert_eq!(precision_for(0.01), 2);
        assert_eq!(precision_for(0.25), 1);
        assert_eq!(precision_for(SEMI_TO_DEGREES), 8);
        assert_eq!(precision_for(1000.0), 0);
    }

    #[test]
    fn payload_text_by_kind() {
        let fixed = FixedPointValue::from_raw(0.01, 12345).unwrap();
        assert_eq!(payload_text(&Payload::Scaled(fixed)), "123.45");
        assert_eq!(payload_text(&Payload::Integer(7)), "7");
        assert_eq!(
            payload_text(&Payload::Buffer(vec![0xDE, 0xAD].into_boxed_slice())),
            "dead"
        );
    }

    #[test]
    fn schema_ids_share_a_base() {
        assert_eq!(
            schema_id("decode"),
            "https://schemas.sigbus.dev/cli/v1/decode.schema.json"
        );
    }
}
