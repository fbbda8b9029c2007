use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use sigbus_catalog::SignalCatalog;
use sigbus_dictionary::{DictionaryBuilder, IngestOutcome, SignalDictionary};
use sigbus_signal::{Clock, ManualClock, Mode, SignalHeader, SignalIdentity};
use sigbus_wire::ByteReader;
use tracing::info;

use crate::cmd::{decode_hex, ReplayArgs};
use crate::exit::{dictionary_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{payload_text, print_json, schema_id, table, OutputFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogEntry {
    line: usize,
    t_ms: u32,
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum EventOutcome {
    Accepted,
    Rejected,
    Error,
}

#[derive(Debug, Serialize)]
struct ReplayEvent {
    line: usize,
    t_ms: u32,
    signal: Option<String>,
    outcome: EventOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignalState {
    name: String,
    category: u8,
    subcategory: u8,
    value: String,
    valid: bool,
    device: u8,
    priority: u8,
    timestamp: u32,
}

#[derive(Debug, Default, Serialize)]
struct ReplaySummary {
    accepted: usize,
    rejected: usize,
    errors: usize,
}

#[derive(Debug, Serialize)]
struct ReplayOutput {
    schema_id: String,
    summary: ReplaySummary,
    events: Vec<ReplayEvent>,
    signals: Vec<SignalState>,
}

pub fn run(args: ReplayArgs, format: OutputFormat, catalog: &SignalCatalog) -> CliResult<i32> {
    let content = std::fs::read_to_string(&args.file)
        .map_err(|err| io_error(&format!("reading {}", args.file.display()), err))?;
    let entries = parse_log(&content)?;
    let output = replay(&entries, catalog)?;
    info!(
        entries = entries.len(),
        accepted = output.summary.accepted,
        rejected = output.summary.rejected,
        errors = output.summary.errors,
        "replay finished"
    );

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            let mut events = table(&["LINE", "T (ms)", "SIGNAL", "OUTCOME"]);
            for event in &output.events {
                events.add_row(vec![
                    event.line.to_string(),
                    event.t_ms.to_string(),
                    event.signal.clone().unwrap_or_else(|| "-".to_string()),
                    match &event.error {
                        Some(error) => format!("error: {error}"),
                        None => outcome_text(event.outcome).to_string(),
                    },
                ]);
            }
            println!("{events}");
            println!("{}", state_table(&output.signals));
        }
        OutputFormat::Pretty => {
            for event in &output.events {
                println!(
                    "line {} t={} {} {}{}",
                    event.line,
                    event.t_ms,
                    event.signal.as_deref().unwrap_or("-"),
                    outcome_text(event.outcome),
                    event
                        .error
                        .as_deref()
                        .map(|error| format!(": {error}"))
                        .unwrap_or_default()
                );
            }
            println!("{}", state_table(&output.signals));
        }
        OutputFormat::Raw => {
            for signal in &output.signals {
                println!("{} {}", signal.name, signal.value);
            }
        }
    }

    if args.strict && output.summary.errors > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{} datagram(s) failed to ingest", output.summary.errors),
        ));
    }
    Ok(SUCCESS)
}

fn parse_log(content: &str) -> CliResult<Vec<LogEntry>> {
    let mut entries = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }

        let invalid =
            |message: String| CliError::new(DATA_INVALID, format!("line {line}: {message}"));
        let (time, hex) = text
            .split_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected `<t_ms> <hex>`".to_string()))?;
        let t_ms = time
            .parse::<u32>()
            .map_err(|err| invalid(format!("bad time {time:?}: {err}")))?;
        let bytes = decode_hex(hex).map_err(|err| invalid(err.message))?;
        entries.push(LogEntry { line, t_ms, bytes });
    }
    Ok(entries)
}

fn replay(entries: &[LogEntry], catalog: &SignalCatalog) -> CliResult<ReplayOutput> {
    let clock = Arc::new(ManualClock::new(entries.first().map_or(0, |entry| entry.t_ms)));
    let mut builder = DictionaryBuilder::new();
    builder
        .register_catalog(catalog, |_| Mode::Receive)
        .map_err(|err| dictionary_error("registering catalog", err))?;
    let dictionary = builder.build_with_clock(Arc::clone(&clock));

    let mut summary = ReplaySummary::default();
    let mut events = Vec::new();
    let mut touched = BTreeSet::new();

    for entry in entries {
        clock.set(entry.t_ms);
        let mut reader = ByteReader::new(&entry.bytes);

        // A line may carry several datagrams back to back.
        while reader.bytes_available() > 0 {
            let identity = SignalHeader::peek(&reader).ok().map(|header| header.identity);
            let signal = identity.map(|identity| signal_name(catalog, identity));

            let (outcome, error) = match dictionary.ingest(&mut reader) {
                Ok(IngestOutcome::Accepted) => {
                    summary.accepted += 1;
                    touched.extend(identity);
                    (EventOutcome::Accepted, None)
                }
                Ok(IngestOutcome::Rejected) => {
                    summary.rejected += 1;
                    (EventOutcome::Rejected, None)
                }
                Err(err) => {
                    summary.errors += 1;
                    (EventOutcome::Error, Some(err.to_string()))
                }
            };
            events.push(ReplayEvent {
                line: entry.line,
                t_ms: entry.t_ms,
                signal,
                outcome,
                error,
            });
            if outcome == EventOutcome::Error {
                break;
            }
        }
    }

    let signals = touched
        .into_iter()
        .filter_map(|identity| signal_state(&dictionary, catalog, identity))
        .collect();

    Ok(ReplayOutput {
        schema_id: schema_id("replay"),
        summary,
        events,
        signals,
    })
}

fn signal_state<C: Clock>(
    dictionary: &SignalDictionary<C>,
    catalog: &SignalCatalog,
    identity: SignalIdentity,
) -> Option<SignalState> {
    let record = dictionary.read(identity).ok()?;
    let now = dictionary.clock().now_millis();
    let header = record.header();
    Some(SignalState {
        name: signal_name(catalog, identity),
        category: identity.category,
        subcategory: identity.subcategory,
        value: payload_text(record.payload()),
        valid: record.is_valid(now),
        device: header.from_device,
        priority: header.priority.to_byte(),
        timestamp: header.timestamp,
    })
}

fn signal_name(catalog: &SignalCatalog, identity: SignalIdentity) -> String {
    catalog
        .name_for(identity)
        .map(str::to_string)
        .unwrap_or_else(|| identity.to_string())
}

fn outcome_text(outcome: EventOutcome) -> &'static str {
    match outcome {
        EventOutcome::Accepted => "accepted",
        EventOutcome::Rejected => "rejected",
        EventOutcome::Error => "error",
    }
}

fn state_table(signals: &[SignalState]) -> comfy_table::Table {
    let mut out = table(&["SIGNAL", "ID", "VALUE", "VALID", "DEVICE", "PRIORITY", "TIMESTAMP"]);
    for signal in signals {
        out.add_row(vec![
            signal.name.clone(),
            format!("{}:{}", signal.category, signal.subcategory),
            signal.value.clone(),
            if signal.valid { "yes" } else { "no" }.to_string(),
            signal.device.to_string(),
            format!("{:#04x}", signal.priority),
            signal.timestamp.to_string(),
        ]);
    }
    out
}
