//! Interactive selection on top of a [`Picker`].
//!
//! The picker only knows about labelled entries; this module maps items to
//! entries, prepends the "empty" sentinel when no selection is allowed and
//! translates the picker's answer back into indexes of the caller's items.

use crate::error::{Error, Result};

pub const EMPTY_LABEL: &str = "<empty>";
pub const EMPTY_PREVIEW: &str = "Empty selection";

/// One line in the picker, plus what to show next to it while highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub label: String,
    pub preview: String,
}

/// A widget that lets the operator choose among entries.
pub trait Picker {
    /// Returns the index of the chosen entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectionCancelled`] if the operator backs out.
    fn pick(&mut self, header: &str, entries: &[Entry]) -> Result<usize>;

    /// Returns the indexes of the chosen entries, in entry order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectionCancelled`] if the operator backs out.
    fn pick_many(&mut self, header: &str, entries: &[Entry]) -> Result<Vec<usize>>;
}

fn build_entries<T>(
    items: &[T],
    label: impl Fn(&T) -> String,
    preview: impl Fn(&T) -> String,
    allow_empty: bool,
) -> Vec<Entry> {
    let sentinel = allow_empty.then(|| Entry {
        label: EMPTY_LABEL.to_string(),
        preview: EMPTY_PREVIEW.to_string(),
    });

    sentinel
        .into_iter()
        .chain(items.iter().map(|item| Entry {
            label: label(item),
            preview: preview(item),
        }))
        .collect()
}

/// Maps an entry index back to an item index; `None` for the sentinel.
fn item_index(entry_index: usize, item_count: usize, allow_empty: bool) -> Result<Option<usize>> {
    let index = if allow_empty {
        match entry_index.checked_sub(1) {
            Some(index) => index,
            None => return Ok(None),
        }
    } else {
        entry_index
    };

    if index < item_count {
        Ok(Some(index))
    } else {
        Err(Error::SelectionCancelled)
    }
}

/// Lets the operator choose one item; `None` means the sentinel was chosen.
///
/// # Errors
///
/// Returns an error if the picker fails or is cancelled.
pub fn pick_one<T>(
    picker: &mut dyn Picker,
    header: &str,
    items: &[T],
    label: impl Fn(&T) -> String,
    preview: impl Fn(&T) -> String,
    allow_empty: bool,
) -> Result<Option<usize>> {
    let entries = build_entries(items, label, preview, allow_empty);
    let chosen = picker.pick(header, &entries)?;
    item_index(chosen, items.len(), allow_empty)
}

/// Lets the operator choose any number of items.
///
/// Choosing the sentinel means "no selection" and wins over any other marked entry.
///
/// # Errors
///
/// Returns an error if the picker fails or is cancelled.
pub fn pick_many<T>(
    picker: &mut dyn Picker,
    header: &str,
    items: &[T],
    label: impl Fn(&T) -> String,
    preview: impl Fn(&T) -> String,
    allow_empty: bool,
) -> Result<Vec<usize>> {
    let entries = build_entries(items, label, preview, allow_empty);
    let chosen = picker.pick_many(header, &entries)?;

    let mut indexes = Vec::with_capacity(chosen.len());
    for entry_index in chosen {
        match item_index(entry_index, items.len(), allow_empty)? {
            Some(index) => indexes.push(index),
            None => return Ok(Vec::new()),
        }
    }

    Ok(indexes)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers with fixed indexes and remembers what it was shown.
    struct ScriptedPicker {
        answer: Vec<usize>,
        shown: Vec<Entry>,
    }

    impl Picker for ScriptedPicker {
        fn pick(&mut self, _header: &str, entries: &[Entry]) -> Result<usize> {
            self.shown = entries.to_vec();
            Ok(self.answer[0])
        }

        fn pick_many(&mut self, _header: &str, entries: &[Entry]) -> Result<Vec<usize>> {
            self.shown = entries.to_vec();
            Ok(self.answer.clone())
        }
    }

    fn picker(answer: Vec<usize>) -> ScriptedPicker {
        ScriptedPicker {
            answer,
            shown: Vec::new(),
        }
    }

    fn pick(picker: &mut ScriptedPicker, allow_empty: bool) -> Result<Option<usize>> {
        pick_one(
            picker,
            "Select item",
            &["a", "b"],
            |s| s.to_uppercase(),
            |s| format!("preview {s}"),
            allow_empty,
        )
    }

    #[test]
    fn test_pick_one_without_sentinel() {
        let mut picker = picker(vec![1]);
        assert_eq!(pick(&mut picker, false).unwrap(), Some(1));
        assert_eq!(picker.shown.len(), 2);
        assert_eq!(picker.shown[0].label, "A");
        assert_eq!(picker.shown[0].preview, "preview a");
    }

    #[test]
    fn test_pick_one_sentinel_is_first_and_means_none() {
        let mut picker = picker(vec![0]);
        assert_eq!(pick(&mut picker, true).unwrap(), None);
        assert_eq!(picker.shown.len(), 3);
        assert_eq!(picker.shown[0].label, EMPTY_LABEL);
        assert_eq!(picker.shown[0].preview, EMPTY_PREVIEW);
    }

    #[test]
    fn test_pick_one_shifts_index_past_sentinel() {
        let mut picker = picker(vec![2]);
        assert_eq!(pick(&mut picker, true).unwrap(), Some(1));
    }

    #[test]
    fn test_pick_one_out_of_range() {
        let mut picker = picker(vec![5]);
        assert!(matches!(
            pick(&mut picker, false),
            Err(Error::SelectionCancelled)
        ));
    }

    #[test]
    fn test_pick_many_sentinel_yields_no_selection() {
        let mut picker = picker(vec![0, 2]);
        let chosen = pick_many(
            &mut picker,
            "Select items",
            &["a", "b"],
            ToString::to_string,
            ToString::to_string,
            true,
        )
        .unwrap();
        assert!(chosen.is_empty());
    }

    #[test]
    fn test_pick_many_maps_indexes() {
        let mut picker = picker(vec![1, 2]);
        let chosen = pick_many(
            &mut picker,
            "Select items",
            &["a", "b"],
            ToString::to_string,
            ToString::to_string,
            true,
        )
        .unwrap();
        assert_eq!(chosen, vec![0, 1]);
    }
}
