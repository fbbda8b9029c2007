mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sigbus", version, about = "Cockpit signal bus tooling")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// JSON signal list. Defaults to the built-in table.
    #[arg(long, value_name = "FILE", env = "SIGBUS_SIGNALS", global = true)]
    signals: Option<PathBuf>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format, cli.signals.as_deref());

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "sigbus",
            "encode",
            "altitude_msl",
            "-12.5",
            "--device",
            "0x0a",
            "--priority",
            "0x81",
        ])
        .expect("encode args should parse");

        match cli.command {
            Command::Encode(args) => {
                assert_eq!(args.value, "-12.5");
                assert_eq!(args.device, 0x0A);
                assert_eq!(args.priority, 0x81);
                assert_eq!(args.timestamp, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_priority() {
        let err = Cli::try_parse_from(["sigbus", "encode", "x", "1", "--priority", "0x180"])
            .expect_err("priority above one byte should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "sigbus",
            "replay",
            "log.txt",
            "--signals",
            "signals.json",
            "--format",
            "json",
            "--strict",
        ])
        .expect("replay args should parse");

        assert_eq!(cli.signals, Some(PathBuf::from("signals.json")));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Command::Replay(ref args) if args.strict));
    }
}
