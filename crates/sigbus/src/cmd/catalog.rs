use serde::Serialize;
use sigbus_catalog::{SignalCatalog, SignalDefinition};
use sigbus_signal::PayloadKind;

use crate::cmd::CatalogArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{kind_text, print_json, schema_id, table, OutputFormat};

#[derive(Serialize)]
struct SignalRow<'a> {
    name: &'a str,
    category: u8,
    subcategory: u8,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
    units: Option<&'a str>,
    timeout_ms: u32,
    description: &'a str,
}

impl<'a> From<&'a SignalDefinition> for SignalRow<'a> {
    fn from(definition: &'a SignalDefinition) -> Self {
        let (resolution, length) = match definition.kind {
            PayloadKind::Scaled { resolution } => (Some(resolution), None),
            PayloadKind::Integer => (None, None),
            PayloadKind::Buffer { length } => (None, Some(length)),
        };
        Self {
            name: &definition.name,
            category: definition.identity.category,
            subcategory: definition.identity.subcategory,
            kind: definition.kind.name(),
            resolution,
            length,
            units: definition.units.as_deref(),
            timeout_ms: definition.timeout_ms,
            description: &definition.description,
        }
    }
}

#[derive(Serialize)]
struct CatalogOutput<'a> {
    schema_id: String,
    version: u32,
    count: usize,
    signals: Vec<SignalRow<'a>>,
}

pub fn run(_args: CatalogArgs, format: OutputFormat, catalog: &SignalCatalog) -> CliResult<i32> {
    match format {
        OutputFormat::Json => {
            let output = CatalogOutput {
                schema_id: schema_id("catalog"),
                version: catalog.version(),
                count: catalog.len(),
                signals: catalog.iter().map(SignalRow::from).collect(),
            };
            print_json(&output);
        }
        OutputFormat::Table => {
            let mut out = table(&["NAME", "ID", "KIND", "UNITS", "TIMEOUT", "DESCRIPTION"]);
            for definition in catalog {
                out.add_row(vec![
                    definition.name.clone(),
                    definition.identity.to_string(),
                    kind_text(&definition.kind),
                    definition.units.clone().unwrap_or_default(),
                    format!("{} ms", definition.timeout_ms),
                    definition.description.clone(),
                ]);
            }
            println!("{out}");
            println!("signal list version {}", catalog.version());
        }
        OutputFormat::Pretty => {
            for definition in catalog {
                println!(
                    "{:<20} {:>7}  {:<28} {:<8} {} ms",
                    definition.name,
                    definition.identity.to_string(),
                    kind_text(&definition.kind),
                    definition.units.as_deref().unwrap_or("-"),
                    definition.timeout_ms
                );
            }
        }
        OutputFormat::Raw => {
            for definition in catalog {
                println!("{}", definition.name);
            }
        }
    }
    Ok(SUCCESS)
}
