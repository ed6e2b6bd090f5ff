//! API Explorer CLI Library
//!
//! This crate provides the terminal front end of the API explorer: argument
//! parsing, the commands generated from the schema, the HTTP client and the
//! interactive pieces (picker, pager, editor, confirmation prompt) that the
//! core's actions are run with.
//!
//! # Architecture
//!
//! - [`cli_args`]: Global options and the early scan for config and schema paths
//! - [`dynamic`]: Turns the command tree into `clap` commands and finds the invoked action
//! - [`http`]: JSON:API client over HTTP
//! - [`picker`]: Full screen fuzzy picker
//! - [`process`]: Pager and editor subprocesses
//! - [`prompt`]: Yes/no questions on the terminal
//!
//! # Examples
//!
//! ```bash
//! # List projects, resolving the organization filter interactively
//! apx get projects
//!
//! # Remember a project so later commands don't ask for it
//! apx select project
//!
//! # Follow a relationship of the remembered project
//! apx get project team
//!
//! # Page through the last listing
//! apx get next
//! ```

pub mod cli_args;
pub mod dynamic;
pub mod http;
pub mod picker;
pub mod process;
pub mod prompt;
