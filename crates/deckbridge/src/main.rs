mod counter;
mod exit;
mod logging;

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use deckbridge_client::{Client, ClientConfig};
use tracing::info;

use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::logging::{init_logging, LogFormat, LogLevel};

/// Launch parameters, as passed by the host.
#[derive(Parser, Debug)]
#[command(name = "deckbridge", version, about = "Stream Deck counter plugin")]
struct Cli {
    /// Port of the host's WebSocket endpoint.
    #[arg(long, value_name = "PORT", allow_negative_numbers = true)]
    port: i64,

    /// Identifier the host assigned to this plugin instance.
    #[arg(long = "pluginUUID", alias = "plugin-uuid", value_name = "UUID")]
    plugin_uuid: String,

    /// Event name for the registration handshake.
    #[arg(long = "registerEvent", alias = "register-event", value_name = "EVENT")]
    register_event: String,

    /// Host environment and device info (JSON).
    #[arg(long, value_name = "JSON")]
    info: String,

    /// Log output format.
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Append logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    SUCCESS
                }
                _ => USAGE,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::error!(code = err.code, "{err}");
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(normalize_args(args))
}

/// The host passes long flags with a single dash (`-port 28196`).
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut args = args.into_iter();
    let program = args.next();
    program
        .into_iter()
        .chain(args.map(|arg| match arg.to_str() {
            Some(flag) if is_single_dash_long(flag) => OsString::from(format!("-{flag}")),
            _ => arg,
        }))
        .collect()
}

fn is_single_dash_long(arg: &str) -> bool {
    let Some(name) = arg.strip_prefix('-') else {
        return false;
    };
    name.len() > 1 && name.starts_with(|c: char| c.is_ascii_alphabetic())
}

fn run(cli: Cli) -> CliResult<i32> {
    init_logging(cli.log_format, cli.log_level, cli.log_file.as_deref())?;

    let config = ClientConfig::new(cli.port, cli.plugin_uuid, cli.register_event, cli.info);
    let client = Arc::new(Client::new(config).map_err(|err| client_error("startup failed", err))?);
    info!(
        endpoint = %client.endpoint(),
        platform = client.platform(),
        version = client.version(),
        devices = client.devices().len(),
        "starting plugin"
    );

    counter::register(&client);
    install_ctrlc_handler(Arc::clone(&client))?;

    client
        .run()
        .map_err(|err| client_error("session failed", err))?;
    info!("plugin stopped");
    Ok(SUCCESS)
}

fn install_ctrlc_handler(client: Arc<Client>) -> CliResult<()> {
    ctrlc::set_handler(move || client.stop()).map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_host_launch_arguments() {
        let cli = parse_args(args(&[
            "plugin",
            "-port",
            "28196",
            "-pluginUUID",
            "u1",
            "-registerEvent",
            "registerPlugin",
            "-info",
            r#"{"application":{}}"#,
        ]))
        .expect("host launch args should parse");

        assert_eq!(cli.port, 28196);
        assert_eq!(cli.plugin_uuid, "u1");
        assert_eq!(cli.register_event, "registerPlugin");
        assert_eq!(cli.info, r#"{"application":{}}"#);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn accepts_double_dash_and_log_options() {
        let cli = parse_args(args(&[
            "plugin",
            "--port",
            "1",
            "--plugin-uuid",
            "u1",
            "--register-event",
            "registerPlugin",
            "--info",
            "{}",
            "--log-level",
            "debug",
            "--log-file",
            "/tmp/plugin.log",
        ]))
        .expect("double-dash args should parse");

        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/plugin.log")));
    }

    #[test]
    fn negative_port_reaches_validation() {
        let cli = parse_args(args(&[
            "plugin",
            "-port",
            "-5",
            "-pluginUUID",
            "u1",
            "-registerEvent",
            "registerPlugin",
            "-info",
            "{}",
        ]))
        .expect("negative port should parse");
        assert_eq!(cli.port, -5);
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let err = parse_args(args(&["plugin", "-port", "28196", "-pluginUUID", "u1"]))
            .expect_err("missing registerEvent and info should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn short_flags_and_values_are_untouched() {
        assert!(is_single_dash_long("-port"));
        assert!(!is_single_dash_long("--port"));
        assert!(!is_single_dash_long("-h"));
        assert!(!is_single_dash_long("-5"));
        assert!(!is_single_dash_long("{}"));
        assert_eq!(
            normalize_args(args(&["-port", "-h", "-info"])),
            args(&["-port", "-h", "--info"])
        );
    }
}
