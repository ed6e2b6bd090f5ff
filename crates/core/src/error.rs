use leon::{ParseError, RenderError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("The sub process exited with a non-success code.")]
    SubProcessExit,

    #[error("Error with sub process: {}", _0)]
    SubProcess(#[from] std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("Error {} {} at `{}`: {}", .action, .description, .path, .original)]
    Json {
        action: String,
        description: String,
        path: String,
        original: serde_json::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("No API host configured. Pass `--host` or set `host` in the config file.")]
    MissingHost,

    #[error("No API token configured. Pass `--token` or set `token` in the config file.")]
    MissingToken,

    #[error("This command needs an API connection")]
    NotConnected,

    #[error("`{}` is not a complete command", .0)]
    IncompleteCommand(String),

    #[error("Unknown resource type `{}`", .0)]
    UnknownResource(String),

    #[error("Resource `{}` has no relationship `{}`", .0, .1)]
    UnknownRelationship(String, String),

    #[error("Resource `{}` does not support `{}`", .0, .1)]
    UnsupportedOperation(String, String),

    #[error("{} not found", .0)]
    NotFound(String),

    #[error("Filter resolution loops back on itself: {}", .0.join(" -> "))]
    FilterCycle(Vec<String>),

    #[error("Selection cancelled")]
    SelectionCancelled,

    #[error("nothing changed")]
    NothingChanged,

    #[error("Edited document must be a JSON object: {}", .0)]
    InvalidDocument(String),

    #[error("Required attribute `{}` was left empty", .0)]
    MissingAttribute(String),

    #[error("Attribute `{}` is not accepted here", .0)]
    UnexpectedAttribute(String),

    #[error("last request did not have a {} page", .0)]
    NoPage(String),

    #[error("{} `{}` has no related link for `{}`", .0, .1, .2)]
    NoRelatedLink(String, String, String),

    #[error("{} `{}` doesn't say whether `{}` holds one resource or many", .0, .1, .2)]
    UnknownCardinality(String, String, String),

    #[error("Malformed API payload: {}", .0)]
    Payload(String),

    #[error("API returned status {}: {}", .status, .message)]
    Api { status: u16, message: String },

    #[error("Error talking to the API: {}", .0)]
    Transport(String),

    #[error("Error parsing display template: {}", .0)]
    Parse(#[from] ParseError),

    #[error("Error rendering display template: {}", .0)]
    Render(#[from] RenderError),

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn json_error(
        action: &str,
        description: &str,
        path: &str,
        original: serde_json::Error,
    ) -> Self {
        Self::Json {
            action: action.to_string(),
            description: description.to_string(),
            path: path.to_string(),
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    pub fn payload(message: impl std::fmt::Display) -> Self {
        Self::Payload(message.to_string())
    }
}
