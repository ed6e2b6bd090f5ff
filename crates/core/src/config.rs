//! Configuration file and the settings resolved from it.
//!
//! Every setting can come from the command line (or its environment
//! variable), from the YAML config file, or from a built-in default, in that
//! order of precedence.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::session::DEFAULT_SESSION_PATH;

/// Default path for the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "~/.api-explorer/config.yml";

/// Contents of the configuration file. Every key is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub host: Option<String>,
    pub token: Option<String>,
    pub schema_path: Option<String>,
    pub session_path: Option<String>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Settings given on the command line; each one wins over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub host: Option<String>,
    pub token: Option<String>,
    pub schema_path: Option<String>,
    pub session_path: Option<String>,
}

/// The effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: Option<String>,
    pub token: Option<String>,
    /// `None` means the builtin schema.
    pub schema_path: Option<String>,
    pub session_path: String,
    pub headers: BTreeMap<String, String>,
}

/// What's needed to talk to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Base URL without a trailing `/`.
    pub host: String,
    pub token: String,
    pub headers: BTreeMap<String, String>,
}

/// Resolves the configuration file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// configuration path. Shell expansions like `~` are resolved.
pub fn get_config_path(config_path_arg: &Option<String>) -> String {
    let config_path = match config_path_arg {
        Some(config_path) => config_path,
        None => DEFAULT_CONFIG_PATH,
    };

    shellexpand::tilde(config_path).to_string()
}

/// Reads the configuration file.
///
/// A missing file at the default location counts as an empty configuration;
/// a missing file that was asked for explicitly does not.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is malformed or doesn't match the expected structure
pub fn read_config(config_path_arg: &Option<String>) -> Result<Config> {
    let config_path = get_config_path(config_path_arg);

    let contents = match fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound && config_path_arg.is_none() => {
            debug!("No config file at `{config_path}`, using defaults");
            return Ok(Config::default());
        }
        Err(e) => return Err(Error::io_error("config".to_string(), config_path, e)),
    };

    if contents.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&contents).map_err(|e| {
        Error::yaml_error("reading".to_string(), "config".to_string(), config_path, e)
    })
}

fn expand(path: String) -> String {
    shellexpand::tilde(&path).to_string()
}

impl Config {
    /// Schema file to load; a path given on the command line wins.
    pub fn schema_path(&self, schema_path: Option<String>) -> Option<String> {
        schema_path.or_else(|| self.schema_path.clone()).map(expand)
    }

    /// Applies `overrides` on top of the file's values and fills in defaults.
    pub fn resolve(self, overrides: Overrides) -> Settings {
        let schema_path = self.schema_path(overrides.schema_path);
        let session_path = overrides
            .session_path
            .or(self.session_path)
            .unwrap_or_else(|| DEFAULT_SESSION_PATH.to_string());

        Settings {
            schema_path,
            host: overrides.host.or(self.host),
            token: overrides.token.or(self.token),
            session_path: expand(session_path),
            headers: self.headers,
        }
    }
}

impl Settings {
    /// # Errors
    ///
    /// Returns [`Error::MissingHost`] or [`Error::MissingToken`] if either is
    /// not configured anywhere.
    pub fn connection(&self) -> Result<Connection> {
        let host = self
            .host
            .as_deref()
            .filter(|host| !host.is_empty())
            .ok_or(Error::MissingHost)?;
        let token = self
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingToken)?;

        Ok(Connection {
            host: host.trim_end_matches('/').to_string(),
            token: token.to_string(),
            headers: self.headers.clone(),
        })
    }
}
