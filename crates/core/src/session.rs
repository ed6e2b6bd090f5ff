//! Persistent key/value state shared between invocations.
//!
//! Selected resource IDs are stored under the singular resource name and the
//! cursors of the last list response under [`NEXT_KEY`] / [`PREVIOUS_KEY`].
//! The file store rewrites the whole object on every change and does no
//! locking: two invocations racing on the same project can lose an update.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::client::PageLinks;
use crate::error::{Error, Result};

/// Default location of the session file, relative to the working project.
pub const DEFAULT_SESSION_PATH: &str = ".api-explorer/session.json";

pub const NEXT_KEY: &str = "next";
pub const PREVIOUS_KEY: &str = "previous";

pub trait SessionStore {
    /// Returns the stored value, or `None` if the key or the whole store is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage exists but can't be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an error if the backing storage can't be read or written.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a single key. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage can't be read or written.
    fn clear(&self, key: &str) -> Result<()>;

    /// Drops the whole store.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage can't be removed.
    fn clear_all(&self) -> Result<()>;

    /// Human readable location, used in messages.
    fn location(&self) -> String;
}

/// Stores the cursors of a list response, dropping any that the response lacks.
///
/// # Errors
///
/// Returns an error if the store can't be written.
pub fn record_pagination(session: &dyn SessionStore, links: &PageLinks) -> Result<()> {
    for (key, link) in [(NEXT_KEY, &links.next), (PREVIOUS_KEY, &links.previous)] {
        match link {
            Some(link) => session.save(key, link)?,
            None => session.clear(key)?,
        }
    }

    Ok(())
}

/// Session state kept as a flat JSON object in a single file.
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_string(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Option<BTreeMap<String, String>>> {
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io_error("session".to_string(), self.path_string(), e)),
        };

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| Error::json_error("reading", "session file", &self.path_string(), e))
    }

    fn write(&self, data: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::io_error(
                        "session directory".to_string(),
                        parent.display().to_string(),
                        e,
                    )
                })?;
            }
        }

        let body = serde_json::to_string_pretty(data)
            .map_err(|e| Error::json_error("writing", "session file", &self.path_string(), e))?;

        fs::write(&self.path, body)
            .map_err(|e| Error::io_error("session".to_string(), self.path_string(), e))
    }
}

impl SessionStore for JsonFileSessionStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.and_then(|mut data| data.remove(key)))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.read()?.unwrap_or_default();
        data.insert(key.to_string(), value.to_string());
        debug!("Saving `{key}` to {}", self.path_string());
        self.write(&data)
    }

    fn clear(&self, key: &str) -> Result<()> {
        let Some(mut data) = self.read()? else {
            return Ok(());
        };

        if data.remove(key).is_some() {
            debug!("Clearing `{key}` from {}", self.path_string());
            self.write(&data)?;
        }

        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        info!("Removing session file {}", self.path_string());
        fs::remove_file(&self.path)
            .map_err(|e| Error::io_error("session".to_string(), self.path_string(), e))
    }

    fn location(&self) -> String {
        self.path_string()
    }
}

/// Session state that lives only as long as the value, for tests and dry runs.
#[derive(Default, Debug)]
pub struct MemorySessionStore {
    data: RefCell<BTreeMap<String, String>>,
    reads: RefCell<usize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        store.data.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        store
    }

    /// How many times [`SessionStore::load`] was called.
    pub fn reads(&self) -> usize {
        *self.reads.borrow()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.data.borrow().clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        *self.reads.borrow_mut() += 1;
        Ok(self.data.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        self.data.borrow_mut().clear();
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
