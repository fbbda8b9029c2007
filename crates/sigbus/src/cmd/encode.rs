use serde::Serialize;
use sigbus_catalog::{SignalCatalog, SignalDefinition};
use sigbus_dictionary::{DictionaryBuilder, DictionaryConfig, SignalDictionary};
use sigbus_signal::{ManualClock, Mode, PayloadKind, Priority};
use tracing::debug;

use crate::cmd::{decode_hex, parse_u32, usage, EncodeArgs};
use crate::exit::{dictionary_error, CliResult, SUCCESS};
use crate::output::{print_json, print_raw, schema_id, table, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput<'a> {
    schema_id: String,
    name: &'a str,
    category: u8,
    subcategory: u8,
    device: u8,
    priority: u8,
    timestamp: u32,
    size: usize,
    datagram: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat, catalog: &SignalCatalog) -> CliResult<i32> {
    let definition = catalog
        .get(&args.name)
        .ok_or_else(|| usage(format!("unknown signal: {}", args.name)))?;
    let identity = definition.identity;

    let mut builder = DictionaryBuilder::with_config(DictionaryConfig {
        local_device: args.device,
        transmit_priority: Priority::from_byte(args.priority),
        ..DictionaryConfig::default()
    });
    builder
        .register(definition.descriptor(), definition.kind, Mode::Transmit)
        .map_err(|err| dictionary_error("registering signal", err))?;
    let dictionary = builder.build_with_clock(ManualClock::new(args.timestamp));

    apply_value(&dictionary, definition, &args.value)?;
    let datagram = dictionary
        .emit_bytes(identity)
        .map_err(|err| dictionary_error("encoding datagram", err))?;
    debug!(%identity, bytes = datagram.len(), "datagram encoded");

    let hex = hex::encode(&datagram);
    match format {
        OutputFormat::Json => print_json(&EncodeOutput {
            schema_id: schema_id("encode"),
            name: &definition.name,
            category: identity.category,
            subcategory: identity.subcategory,
            device: args.device,
            priority: args.priority,
            timestamp: args.timestamp,
            size: datagram.len(),
            datagram: hex,
        }),
        OutputFormat::Table => {
            let mut out = table(&[
                "SIGNAL",
                "ID",
                "DEVICE",
                "PRIORITY",
                "TIMESTAMP",
                "DATAGRAM",
            ]);
            out.add_row(vec![
                definition.name.clone(),
                identity.to_string(),
                args.device.to_string(),
                Priority::from_byte(args.priority).to_string(),
                args.timestamp.to_string(),
                hex,
            ]);
            println!("{out}");
        }
        OutputFormat::Pretty => println!("{hex}"),
        OutputFormat::Raw => print_raw(&datagram),
    }
    Ok(SUCCESS)
}

fn apply_value(
    dictionary: &SignalDictionary<ManualClock>,
    definition: &SignalDefinition,
    text: &str,
) -> CliResult<()> {
    let identity = definition.identity;
    let result = match definition.kind {
        PayloadKind::Scaled { .. } => {
            let value = text
                .trim()
                .parse::<f64>()
                .map_err(|err| usage(format!("invalid value {text:?}: {err}")))?;
            if !value.is_finite() {
                return Err(usage(format!("value must be finite: {text}")));
            }
            dictionary.set_scaled(identity, value)
        }
        PayloadKind::Integer => {
            let value = parse_u32(text.trim()).map_err(usage)?;
            dictionary.set_integer(identity, value)
        }
        PayloadKind::Buffer { .. } => dictionary.set_bytes(identity, &decode_hex(text)?),
    };
    result.map_err(|err| dictionary_error("setting value", err))
}
