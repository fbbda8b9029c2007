use serde::Serialize;
use sigbus_catalog::SignalCatalog;
use sigbus_signal::{Payload, SignalHeader};
use sigbus_wire::ByteReader;

use crate::cmd::{decode_hex, DecodeArgs};
use crate::exit::{signal_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{payload_text, print_json, schema_id, table, OutputFormat};

#[derive(Debug, Serialize)]
struct DecodeOutput {
    schema_id: String,
    name: String,
    category: u8,
    subcategory: u8,
    device: u8,
    priority: u8,
    healthy: bool,
    rank: u8,
    timestamp: u32,
    kind: &'static str,
    value: String,
    units: Option<String>,
    trailing_bytes: usize,
}

pub fn run(args: DecodeArgs, format: OutputFormat, catalog: &SignalCatalog) -> CliResult<i32> {
    let bytes = decode_hex(&args.hex)?;
    let output = decode(&bytes, catalog)?;

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            let mut out = table(&["FIELD", "VALUE"]);
            out.add_row(vec!["signal".to_string(), output.name.clone()]);
            out.add_row(vec![
                "identity".to_string(),
                format!("{}:{}", output.category, output.subcategory),
            ]);
            out.add_row(vec!["device".to_string(), output.device.to_string()]);
            out.add_row(vec![
                "priority".to_string(),
                format!(
                    "{:#04x} ({}, rank {})",
                    output.priority,
                    if output.healthy { "healthy" } else { "unhealthy" },
                    output.rank
                ),
            ]);
            out.add_row(vec!["timestamp".to_string(), output.timestamp.to_string()]);
            out.add_row(vec![
                "value".to_string(),
                format!(
                    "{} {}",
                    output.value,
                    output.units.as_deref().unwrap_or_default()
                )
                .trim_end()
                .to_string(),
            ]);
            if output.trailing_bytes > 0 {
                out.add_row(vec![
                    "trailing".to_string(),
                    format!("{} bytes", output.trailing_bytes),
                ]);
            }
            println!("{out}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => println!("{} {}", output.name, output.value),
    }
    Ok(SUCCESS)
}

fn decode(bytes: &[u8], catalog: &SignalCatalog) -> CliResult<DecodeOutput> {
    let mut reader = ByteReader::new(bytes);
    let header =
        SignalHeader::read(&mut reader).map_err(|err| signal_error("decoding header", err))?;
    let definition = catalog.definition(header.identity).ok_or_else(|| {
        CliError::new(
            DATA_INVALID,
            format!("unknown signal identity {}", header.identity),
        )
    })?;

    let payload = Payload::new(definition.kind)
        .and_then(|template| template.read_candidate(&mut reader))
        .map_err(|err| signal_error("decoding payload", err))?;

    Ok(DecodeOutput {
        schema_id: schema_id("decode"),
        name: definition.name.clone(),
        category: header.identity.category,
        subcategory: header.identity.subcategory,
        device: header.from_device,
        priority: header.priority.to_byte(),
        healthy: header.priority.is_healthy(),
        rank: header.priority.rank(),
        timestamp: header.timestamp,
        kind: payload.kind_name(),
        value: payload_text(&payload),
        units: definition.units.clone(),
        trailing_bytes: reader.bytes_available(),
    })
}
