//! Full screen fuzzy picker for choosing resources.
//!
//! This module provides:
//! - A scrolling list with a fuzzy filter and a JSON preview of the highlighted entry
//! - Multi-selection with marks for to-many relationships
//! - Keyboard and mouse navigation

pub mod types;
pub mod ui;

use log::debug;

use api_explorer_core::error::{Error, Result};
use api_explorer_core::selection::{Entry, Picker};

use self::types::PickerChoice;

/// [`Picker`] that takes over the terminal while the operator chooses.
pub struct TerminalPicker;

impl TerminalPicker {
    fn choose(header: &str, entries: &[Entry], multi: bool) -> Result<Vec<usize>> {
        match ui::run_picker(header, entries, multi)? {
            PickerChoice::Picked(indexes) => {
                debug!("Picked {indexes:?} for `{header}`");
                Ok(indexes)
            }
            PickerChoice::Cancelled => Err(Error::SelectionCancelled),
        }
    }
}

impl Picker for TerminalPicker {
    fn pick(&mut self, header: &str, entries: &[Entry]) -> Result<usize> {
        Self::choose(header, entries, false)?
            .first()
            .copied()
            .ok_or(Error::SelectionCancelled)
    }

    fn pick_many(&mut self, header: &str, entries: &[Entry]) -> Result<Vec<usize>> {
        Self::choose(header, entries, true)
    }
}
