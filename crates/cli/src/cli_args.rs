//! Command-line argument parsing.
//!
//! The global options are declared here with `clap`'s derive API. The
//! verb/resource commands are generated from the schema at startup (see
//! [`crate::dynamic`]) and attached to the command built from [`Args`].

use std::ffi::OsString;

use clap::Parser;

/// Command-line arguments for the `apx` binary.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use api_explorer_cli::cli_args::Args;
///
/// let args = Args::parse_from(["apx", "--host", "https://api.example.com"]);
/// assert_eq!(args.host.as_deref(), Some("https://api.example.com"));
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(
    name = "apx",
    version,
    about = "Browse and change the resources of a JSON:API service",
    term_width = 0 // Just to make testing across clap features easier
)]
pub struct Args {
    /// Path to the config file YAML.
    ///
    /// If not provided, defaults to `~/.api-explorer/config.yml`.
    #[arg(long, short = 'c', global = true)]
    pub config_path: Option<String>,

    /// Path to the JSON schema describing the API's resources.
    ///
    /// If not provided, the schema from the config file or the builtin one is used.
    #[arg(long, global = true)]
    pub schema_path: Option<String>,

    /// Path to the file that remembers selections and pagination between runs.
    ///
    /// If not provided, defaults to `.api-explorer/session.json`.
    #[arg(long, global = true)]
    pub session_path: Option<String>,

    /// Base URL of the API.
    #[arg(long, env = "API_EXPLORER_HOST", global = true)]
    pub host: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, env = "API_EXPLORER_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Program that shows responses. Responses are printed when unset.
    #[arg(long, env = "PAGER", global = true)]
    pub pager: Option<String>,

    /// Program used to edit attributes.
    #[arg(long, env = "EDITOR", global = true)]
    pub editor: Option<String>,
}

/// Options that decide which commands exist, so they are needed before parsing.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EarlyOptions {
    pub config_path: Option<String>,
    pub schema_path: Option<String>,
}

/// Picks `--config-path` and `--schema-path` out of the raw arguments.
///
/// Both `--name value` and `--name=value` are accepted, anywhere on the line;
/// the last occurrence wins. Everything else is left for `clap`.
pub fn early_options(args: &[OsString]) -> EarlyOptions {
    let mut options = EarlyOptions::default();
    let mut arguments = args.iter().skip(1).map(|arg| arg.to_string_lossy());

    while let Some(argument) = arguments.next() {
        if argument == "--" {
            break;
        }

        let (name, inline_value) = match argument.split_once('=') {
            Some((name, value)) => (name.to_string(), Some(value.to_string())),
            None => (argument.to_string(), None),
        };

        let slot = match name.as_str() {
            "--config-path" | "-c" => &mut options.config_path,
            "--schema-path" => &mut options.schema_path,
            _ => continue,
        };

        let value = match inline_value {
            Some(value) => Some(value),
            None => arguments.next().map(|value| value.to_string()),
        };
        if value.is_some() {
            *slot = value;
        }
    }

    options
}
