//! API Explorer Core Library
//!
//! This crate provides the core functionality for api-explorer, a terminal
//! tool for browsing and changing the resources of a JSON:API service. The
//! commands it offers are generated from a schema document describing the
//! service's resource types.
//!
//! # Key Features
//!
//! - **Schema**: Typed model of the resource description document
//! - **Command Tree**: Verb/resource command hierarchy derived from the schema
//! - **Resolution**: Finding the resource an operation acts on from flags, the session or a picker
//! - **Session**: Selected resources and pagination cursors kept between invocations
//! - **Editing**: Changing attributes through the operator's editor, sending only what changed
//!
//! The API, the picker, the pager, the editor and confirmation prompts are
//! all traits, so the front end decides how they are implemented.
//!
//! # Examples
//!
//! Building the command tree from the builtin schema:
//!
//! ```
//! use api_explorer_core::schema::Schema;
//! use api_explorer_core::tree::build_tree;
//!
//! let schema = Schema::builtin()?;
//! let tree = build_tree("apx", &schema);
//! assert!(tree.find(&["get", "projects"]).is_some());
//! # Ok::<(), api_explorer_core::error::Error>(())
//! ```

pub mod actions;
pub mod client;
pub mod config;
pub mod display;
pub mod edit;
pub mod error;
pub mod interaction;
pub mod jsonapi;
pub mod resolve;
pub mod schema;
pub mod selection;
pub mod session;
pub mod tree;
