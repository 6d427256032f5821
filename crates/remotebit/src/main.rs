mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "remotebit", version, about = "remote:bit peer messaging CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

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
    let result = cmd::run(cli.command, format);

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
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "remotebit",
            "send",
            "/tmp/test.sock",
            "--component",
            "speed",
            "--id",
            "3",
            "--values",
            "300,65535",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.target.component, 100);
                assert_eq!(args.target.id.get(), 3);
                assert_eq!(args.payload.values, Some(vec![300, 65535]));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "remotebit",
            "encode",
            "--component",
            "button",
            "--values",
            "1",
            "--bytes",
            "2",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn requires_a_payload() {
        let err = Cli::try_parse_from(["remotebit", "encode", "--component", "button"])
            .expect_err("missing payload should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_out_of_range_id_and_power() {
        assert!(Cli::try_parse_from([
            "remotebit",
            "encode",
            "--component",
            "speed",
            "--id",
            "16",
            "--values",
            "1",
        ])
        .is_err());

        assert!(Cli::try_parse_from([
            "remotebit",
            "send",
            "/tmp/test.sock",
            "--component",
            "speed",
            "--values",
            "1",
            "--power",
            "8",
        ])
        .is_err());
    }

    #[test]
    fn parses_listen_filters() {
        let cli = Cli::try_parse_from([
            "remotebit",
            "listen",
            "/tmp/test.sock",
            "--components",
            "button,101",
            "--ids",
            "0,15",
            "--count",
            "2",
        ])
        .expect("listen args should parse");

        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.components, Some(vec![100, 101]));
                assert_eq!(args.ids.map(|ids| ids.len()), Some(2));
                assert_eq!(args.count, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
