use std::fmt::Display;
use std::io::{self, stdout, Write};
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::Color::{DarkBlue, DarkGreen, Reset, Yellow};
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{event, execute, queue, terminal, ExecutableCommand};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::types::CycleDirection::{Down, Up};
use super::types::{CycleDirection, PickerChoice, UiState, ViewportState};
use api_explorer_core::error::{Error, Result};
use api_explorer_core::selection::Entry;

/// What an input event asks for: leave with a choice, a new state, a move.
type Outcome = (Option<PickerChoice>, Option<UiState>, Option<CycleDirection>);

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Disable raw mode on drop
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = stdout.execute(DisableMouseCapture);
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

/// Lets the operator pick from `entries` in a full screen list with a preview pane.
///
/// # Errors
///
/// Returns [`Error::Stdio`] if the terminal can't be controlled.
pub fn run_picker(header: &str, entries: &[Entry], multi: bool) -> Result<PickerChoice> {
    picker_loop(header, entries, multi).map_err(Error::Stdio)
}

fn picker_loop(header: &str, entries: &[Entry], multi: bool) -> io::Result<PickerChoice> {
    let mut stdout = stdout();

    // Restores the terminal however far the setup below gets
    let _raw_mode_guard = RawModeGuard;

    stdout.execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    stdout.execute(EnableMouseCapture)?;

    let (width, height) = terminal::size()?;
    let mut ui_state = UiState::new(ViewportState::for_terminal(width, height), multi);
    let mut indexes_to_display = filter_displayed_indexes(entries, &ui_state.filter_text);

    redraw_ui(header, entries, &indexes_to_display, &ui_state)?;

    loop {
        if !event::poll(Duration::from_millis(500))? {
            continue;
        }

        let (choice, new_state, direction) = match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                handle_key_event(key_event, &ui_state, &indexes_to_display)?
            }
            Event::Mouse(mouse_event) => {
                handle_mouse_event(mouse_event, &ui_state, &indexes_to_display)
            }
            Event::Resize(width, height) => (
                None,
                Some(handle_resize(
                    width,
                    height,
                    &ui_state,
                    indexes_to_display.len(),
                )),
                None,
            ),
            _ => (None, None, None),
        };

        if let Some(choice) = choice {
            return Ok(choice);
        }

        let mut next_state = new_state.unwrap_or_else(|| ui_state.clone());
        if let Some(direction) = direction {
            next_state = move_selected_index(&next_state, indexes_to_display.len(), direction);
        }

        if next_state.filter_text != ui_state.filter_text {
            indexes_to_display = filter_displayed_indexes(entries, &next_state.filter_text);
        }

        if next_state != ui_state {
            ui_state = next_state;
            redraw_ui(header, entries, &indexes_to_display, &ui_state)?;
        }
    }
}

fn redraw_ui(
    header: &str,
    entries: &[Entry],
    indexes_to_display: &[usize],
    ui_state: &UiState,
) -> io::Result<()> {
    let mut stdout = stdout();

    queue!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    print_header(header, ui_state, indexes_to_display.len())?;

    if indexes_to_display.is_empty() {
        queue!(
            stdout,
            MoveTo(0, 1),
            SetForegroundColor(Color::Red),
            Print("No matching entries!".to_string()),
            SetAttribute(Attribute::Reset)
        )?;
    } else {
        print_entries_with_selection(entries, indexes_to_display, ui_state)?;
        if let Some(entry_index) = indexes_to_display.get(ui_state.selected_index) {
            print_preview(&entries[*entry_index], ui_state)?;
        }
    }

    if ui_state.is_filtering {
        queue!(
            stdout,
            MoveTo(0, ui_state.viewport.height + 1),
            SetAttribute(Attribute::Bold),
            Print(format!("Filter: {}", ui_state.filter_text)),
            SetAttribute(Attribute::Reset)
        )?;
    }

    stdout.flush()?;
    Ok(())
}

/// Handle keyboard events in the picker
fn handle_key_event(
    key_event: KeyEvent,
    ui_state: &UiState,
    indexes_to_display: &[usize],
) -> io::Result<Outcome> {
    let highlighted = indexes_to_display.get(ui_state.selected_index).copied();

    match key_event.code {
        KeyCode::Up | KeyCode::Down => {
            let direction = if key_event.code == KeyCode::Up {
                Up
            } else {
                Down
            };
            Ok((None, None, Some(direction)))
        }
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            Ok((Some(PickerChoice::Cancelled), None, None))
        }
        KeyCode::Enter => {
            if ui_state.multi && !ui_state.marked.is_empty() {
                let marked = ui_state.marked.iter().copied().collect();
                return Ok((Some(PickerChoice::Picked(marked)), None, None));
            }

            if let Some(entry_index) = highlighted {
                return Ok((Some(PickerChoice::Picked(vec![entry_index])), None, None));
            }

            execute!(stdout(), Print("\x07"))?;
            Ok((None, None, None))
        }
        KeyCode::Tab | KeyCode::Char(' ') if ui_state.multi && !ui_state.is_filtering => {
            let Some(entry_index) = highlighted else {
                return Ok((None, None, None));
            };

            let mut updated_state = ui_state.clone();
            updated_state.toggle_mark(entry_index);
            Ok((None, Some(updated_state), Some(Down)))
        }
        KeyCode::Backspace => {
            if ui_state.filter_text.is_empty() {
                return Ok((None, None, None));
            }

            let mut filter_text = ui_state.filter_text.clone();
            filter_text.pop();
            Ok((None, Some(ui_state.with_filter(filter_text)), None))
        }
        KeyCode::Esc if ui_state.is_filtering => {
            let mut updated_state = ui_state.with_filter(String::new());
            updated_state.is_filtering = false;
            Ok((None, Some(updated_state), None))
        }
        KeyCode::Esc => Ok((Some(PickerChoice::Cancelled), None, None)),
        KeyCode::Char(c) if ui_state.is_filtering => {
            let mut filter_text = ui_state.filter_text.clone();
            filter_text.push(c);
            Ok((None, Some(ui_state.with_filter(filter_text)), None))
        }
        KeyCode::Char('/') => {
            let mut updated_state = ui_state.clone();
            updated_state.is_filtering = true;
            Ok((None, Some(updated_state), None))
        }
        KeyCode::Char('j') => Ok((None, None, Some(Down))),
        KeyCode::Char('k') => Ok((None, None, Some(Up))),
        KeyCode::Char('q') => Ok((Some(PickerChoice::Cancelled), None, None)),
        _ => Ok((None, None, None)),
    }
}

/// Handle mouse events: the wheel scrolls, a left click picks (or marks) a row
fn handle_mouse_event(
    mouse_event: MouseEvent,
    ui_state: &UiState,
    indexes_to_display: &[usize],
) -> Outcome {
    if mouse_event.modifiers != KeyModifiers::NONE {
        return (None, None, None);
    }

    match mouse_event.kind {
        MouseEventKind::ScrollDown => (None, None, Some(Down)),
        MouseEventKind::ScrollUp => (None, None, Some(Up)),
        MouseEventKind::Down(MouseButton::Left) => {
            let (list_width, _) = ui_state.viewport.panes();
            if mouse_event.row == 0 || mouse_event.column >= list_width {
                // Click on header or preview
                return (None, None, None);
            }

            let clicked_index = (mouse_event.row - 1) as usize + ui_state.viewport.offset;
            let Some(entry_index) = indexes_to_display.get(clicked_index).copied() else {
                return (None, None, None);
            };

            if ui_state.multi {
                let mut updated_state = ui_state.clone();
                updated_state.selected_index = clicked_index;
                updated_state.toggle_mark(entry_index);
                (None, Some(updated_state), None)
            } else {
                (Some(PickerChoice::Picked(vec![entry_index])), None, None)
            }
        }
        _ => (None, None, None),
    }
}

/// Handle window resize events
fn handle_resize(width: u16, height: u16, ui_state: &UiState, displayed_count: usize) -> UiState {
    let mut ui_state = ui_state.clone();
    let mut new_viewport = ViewportState {
        offset: ui_state.viewport.offset,
        ..ViewportState::for_terminal(width, height)
    };
    let new_height = new_viewport.height;

    // If growing taller, try to show more items above current selection
    match new_height.cmp(&ui_state.viewport.height) {
        std::cmp::Ordering::Greater if new_viewport.offset > 0 => {
            let height_increase = new_height - ui_state.viewport.height;
            new_viewport.offset = new_viewport.offset.saturating_sub(height_increase as usize);
        }
        std::cmp::Ordering::Less
            if ui_state.selected_index >= new_viewport.offset + new_height as usize =>
        {
            new_viewport.offset = ui_state
                .selected_index
                .saturating_sub((new_height as usize).saturating_sub(1));

            if new_viewport.offset + new_height as usize > displayed_count {
                new_viewport.offset = displayed_count.saturating_sub(new_height as usize);
            }
        }
        _ => {}
    }

    ui_state.viewport = new_viewport;
    ui_state
}

/// Print the header line of the picker
fn print_header(header: &str, ui_state: &UiState, displayed_count: usize) -> io::Result<()> {
    let mut stdout = stdout();
    let width = ui_state.viewport.width as usize;

    let left_padding_size = 2usize;
    let left_padding = " ".repeat(left_padding_size);

    let instructions = if ui_state.is_filtering {
        format!("{header}   |   <esc>: Stop Filtering")
    } else {
        let mark = if ui_state.multi {
            format!("<tab>: Mark ({})   |   ", ui_state.marked.len())
        } else {
            String::new()
        };
        format!(
            "{header}   |   /: Filter   |   {}/{}   |   {mark}<esc>: Cancel",
            pad_to_width_of(ui_state.selected_index + 1, displayed_count),
            displayed_count
        )
    };
    let instructions = fit_to_width(&instructions, width.saturating_sub(left_padding_size));

    queue!(
        stdout,
        MoveTo(0, 0),
        SetBackgroundColor(DarkGreen),
        Print(left_padding),
        Print(instructions),
        SetBackgroundColor(Reset),
        SetForegroundColor(Reset),
    )?;

    Ok(())
}

/// Pad a value to match the width of the largest value
fn pad_to_width_of<T: Display>(value: T, max_number: usize) -> String {
    let width = format!("{max_number}").len();
    format!("{:>width$}", value.to_string())
}

/// Cut or pad `text` to exactly `width` characters
fn fit_to_width(text: &str, width: usize) -> String {
    let mut fitted: String = text.chars().take(width).collect();
    let length = fitted.chars().count();
    fitted.push_str(&" ".repeat(width - length));
    fitted
}

/// Text of one list row, marker included in multi mode
fn row_text(entry: &Entry, entry_index: usize, ui_state: &UiState, width: u16) -> String {
    let marker = match (ui_state.multi, ui_state.marked.contains(&entry_index)) {
        (false, _) => "",
        (true, true) => "[x] ",
        (true, false) => "[ ] ",
    };

    fit_to_width(&format!("{marker}{}", entry.label), width as usize)
}

/// Print the visible rows with the highlighted one emphasised
fn print_entries_with_selection(
    entries: &[Entry],
    indexes_to_display: &[usize],
    ui_state: &UiState,
) -> io::Result<()> {
    let mut stdout = stdout();
    let viewport = &ui_state.viewport;
    let (list_width, _) = viewport.panes();

    let visible_entries = indexes_to_display
        .iter()
        .enumerate()
        .skip(viewport.offset)
        .take(viewport.height as usize);

    for (row, (position, entry_index)) in visible_entries.enumerate() {
        queue!(stdout, MoveTo(0, row as u16 + 1))?;

        if position == ui_state.selected_index {
            queue!(
                stdout,
                SetAttribute(Attribute::Bold),
                SetBackgroundColor(DarkBlue),
                SetForegroundColor(Yellow),
            )?;
        }

        queue!(
            stdout,
            Print(row_text(&entries[*entry_index], *entry_index, ui_state, list_width)),
            SetAttribute(Attribute::Reset),
            SetBackgroundColor(Reset),
            SetForegroundColor(Reset),
        )?;
    }

    Ok(())
}

/// Lines of `preview` that fit a pane of `width` by `height`
fn preview_lines(preview: &str, width: u16, height: u16) -> Vec<String> {
    preview
        .lines()
        .take(height as usize)
        .map(|line| line.chars().take(width as usize).collect())
        .collect()
}

/// Print the preview pane to the right of the list
fn print_preview(entry: &Entry, ui_state: &UiState) -> io::Result<()> {
    let (list_width, preview_width) = ui_state.viewport.panes();
    if preview_width == 0 {
        return Ok(());
    }

    let mut stdout = stdout();
    for row in 0..ui_state.viewport.height {
        queue!(stdout, MoveTo(list_width, row + 1), Print("│"))?;
    }

    let lines = preview_lines(&entry.preview, preview_width, ui_state.viewport.height);
    for (row, line) in lines.iter().enumerate() {
        queue!(stdout, MoveTo(list_width + 1, row as u16 + 1), Print(line))?;
    }

    Ok(())
}

/// Move the highlight in the given direction, wrapping around at both ends
fn move_selected_index(
    ui_state: &UiState,
    displayed_count: usize,
    direction: CycleDirection,
) -> UiState {
    if displayed_count == 0 {
        return ui_state.clone();
    }

    let mut new_index = ui_state.selected_index;
    let mut ui_state = ui_state.clone();
    let height = (ui_state.viewport.height as usize).max(1);

    match direction {
        Up => {
            if new_index == 0 {
                new_index = displayed_count - 1;
                ui_state.viewport.offset = new_index.saturating_sub(height - 1);
            } else {
                new_index -= 1;
                if new_index < ui_state.viewport.offset {
                    ui_state.viewport.offset = new_index;
                }
            }
        }
        Down => {
            new_index = (new_index + 1) % displayed_count;
            if new_index < ui_state.selected_index {
                ui_state.viewport.offset = 0;
            } else if new_index >= ui_state.viewport.offset + height {
                ui_state.viewport.offset = new_index - height + 1;
            }
        }
    }

    ui_state.selected_index = new_index;
    ui_state
}

/// Entry indexes whose label fuzzily matches `predicate`, in entry order
fn filter_displayed_indexes(entries: &[Entry], predicate: &str) -> Vec<usize> {
    if predicate.is_empty() {
        return (0..entries.len()).collect();
    }

    let matcher = SkimMatcherV2::default();

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| matcher.fuzzy_match(&entry.label, predicate).map(|_| i))
        .collect()
}
