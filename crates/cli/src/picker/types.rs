//! Type definitions for the picker and its UI state.

use std::collections::BTreeSet;

/// How the operator left the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerChoice {
    /// Entry indexes, in entry order.
    Picked(Vec<usize>),
    Cancelled,
}

/// Direction to move the highlight in the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleDirection {
    Up,
    Down,
}

/// State for the UI viewport.
///
/// Tracks the visible portion of the list when there are more entries than
/// can fit on screen.
#[derive(Clone, PartialEq, Debug)]
pub struct ViewportState {
    pub offset: usize,
    pub height: u16,
    pub width: u16,
}

impl ViewportState {
    /// Viewport for a terminal of the given size: one line each for the header and the filter.
    pub fn for_terminal(width: u16, height: u16) -> Self {
        Self {
            offset: 0,
            height: height.saturating_sub(2),
            width,
        }
    }

    /// Widths of the list and preview panes; narrow terminals get no preview.
    pub fn panes(&self) -> (u16, u16) {
        if self.width < 60 {
            (self.width, 0)
        } else {
            let list = self.width / 2;
            (list, self.width - list - 1)
        }
    }
}

/// Complete UI state for the picker.
#[derive(Clone, PartialEq, Debug)]
pub struct UiState {
    /// Position of the highlight among the displayed entries
    pub selected_index: usize,
    /// Viewport state for scrolling
    pub viewport: ViewportState,
    /// Whether the operator is currently filtering
    pub is_filtering: bool,
    /// Current filter text
    pub filter_text: String,
    /// Whether several entries can be marked
    pub multi: bool,
    /// Marked entry indexes (not display positions)
    pub marked: BTreeSet<usize>,
}

impl UiState {
    pub fn new(viewport: ViewportState, multi: bool) -> Self {
        Self {
            selected_index: 0,
            viewport,
            is_filtering: false,
            filter_text: String::new(),
            multi,
            marked: BTreeSet::new(),
        }
    }

    /// Copy of the state with a new filter, highlight back at the top.
    pub fn with_filter(&self, filter_text: String) -> Self {
        let mut state = self.clone();
        state.filter_text = filter_text;
        state.selected_index = 0;
        state.viewport.offset = 0;
        state
    }

    pub fn toggle_mark(&mut self, entry_index: usize) {
        if !self.marked.remove(&entry_index) {
            self.marked.insert(entry_index);
        }
    }
}
