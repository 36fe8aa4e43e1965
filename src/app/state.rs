use super::screen::Screen;
use crate::ui::theme::Theme;
use parsha_tracker::gateway::TransportError;
use parsha_tracker::reading::{Aliyah, Parsha, group_by_book};
use parsha_tracker::tracker::{SelectionSnapshot, Tracker};
use ratatui::widgets::ListState;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

const STATUS_MESSAGE_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

pub struct AppState {
    pub tracker: Tracker,
    pub screen: Screen,
    /// Row in the overview, counted over the canonical book sequence.
    pub overview_cursor: usize,
    /// Row in the weekly aliyot list, counted in aliyah order.
    pub aliyah_cursor: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub theme: Theme,
    pub status_message: Option<(String, StatusKind, Instant)>,
    pub overview_list_state: ListState,
    pub aliyot_list_state: ListState,
    pub terminal_height: u16,
    selection_rx: watch::Receiver<SelectionSnapshot>,
    runtime: Handle,
}

impl AppState {
    pub fn new(tracker: Tracker, theme: Theme, runtime: Handle) -> Self {
        let selection_rx = tracker.selection().subscribe();
        Self {
            tracker,
            screen: Screen::Overview,
            overview_cursor: 0,
            aliyah_cursor: 0,
            should_quit: false,
            show_help: false,
            theme,
            status_message: None,
            overview_list_state: ListState::default(),
            aliyot_list_state: ListState::default(),
            terminal_height: 0,
            selection_rx,
            runtime,
        }
    }

    pub fn parshiot(&self) -> &[Parsha] {
        self.tracker.selection().parshiot()
    }

    pub fn selected_parsha(&self) -> Option<&Parsha> {
        self.tracker.selection().selected()
    }

    /// Parshiot in the order the overview shows them: known books in reading
    /// order, input order within each book.
    pub fn overview_parshiot(&self) -> Vec<&Parsha> {
        group_by_book(self.parshiot())
            .canonical()
            .flat_map(|(_, parshiot)| parshiot.iter().copied())
            .collect()
    }

    pub fn overview_parsha_at_cursor(&self) -> Option<&Parsha> {
        self.overview_parshiot().get(self.overview_cursor).copied()
    }

    pub fn selected_aliyah(&self) -> Option<&Aliyah> {
        self.selected_parsha()
            .and_then(|p| p.aliyot_in_order().get(self.aliyah_cursor).copied())
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, StatusKind::Info, Instant::now()));
    }

    pub fn set_error_message(&mut self, message: String) {
        self.status_message = Some((message, StatusKind::Error, Instant::now()));
    }

    pub fn clear_expired_status_message(&mut self) {
        if let Some((_, _, time)) = &self.status_message
            && time.elapsed().as_secs() > STATUS_MESSAGE_SECS
        {
            self.status_message = None;
        }
    }

    fn report_failure(&mut self, action: &str, error: TransportError) {
        warn!(action, error = %error, "Gateway call failed");
        self.set_error_message(format!("{action} failed: {error}"));
    }

    /// Reacts to selection changes published by the tracker.
    pub fn sync_with_selection(&mut self) -> bool {
        match self.selection_rx.has_changed() {
            Ok(true) => {}
            _ => return false,
        }
        let snapshot = self.selection_rx.borrow_and_update().clone();
        debug!(
            revision = snapshot.revision,
            selected = ?snapshot.selected,
            "Selection changed"
        );
        self.clamp_cursors();
        true
    }

    pub fn clamp_cursors(&mut self) {
        let overview_len = self.overview_parshiot().len();
        self.overview_cursor = self.overview_cursor.min(overview_len.saturating_sub(1));

        let aliyot_len = self.selected_parsha().map_or(0, |p| p.aliyot.len());
        self.aliyah_cursor = self.aliyah_cursor.min(aliyot_len.saturating_sub(1));

        self.overview_list_state.select(Some(self.overview_cursor));
        self.aliyot_list_state.select(Some(self.aliyah_cursor));
    }

    /// Reloads the collection. On failure the error is left in the status bar
    /// and `false` is returned.
    pub fn refresh(&mut self) -> bool {
        let result = self.runtime.block_on(self.tracker.refresh());
        match result {
            Ok(()) => {
                self.sync_with_selection();
                true
            }
            Err(e) => {
                self.report_failure("Loading parshiot", e);
                false
            }
        }
    }

    pub fn move_cursor_up(&mut self) {
        match self.screen {
            Screen::Overview => self.overview_cursor = self.overview_cursor.saturating_sub(1),
            Screen::Weekly => self.aliyah_cursor = self.aliyah_cursor.saturating_sub(1),
        }
        self.clamp_cursors();
    }

    pub fn move_cursor_down(&mut self) {
        match self.screen {
            Screen::Overview => self.overview_cursor = self.overview_cursor.saturating_add(1),
            Screen::Weekly => self.aliyah_cursor = self.aliyah_cursor.saturating_add(1),
        }
        self.clamp_cursors();
    }

    /// Opens the parsha under the overview cursor in the weekly screen.
    pub fn open_parsha_at_cursor(&mut self) {
        let Some(title) = self.overview_parsha_at_cursor().map(|p| p.title.clone()) else {
            return;
        };
        self.tracker
            .selection_mut()
            .resolve_initial_selection(&title);
        self.screen = Screen::Weekly;
        self.aliyah_cursor = 0;
        self.sync_with_selection();
        self.clamp_cursors();
    }

    pub fn back_to_overview(&mut self) {
        self.screen = Screen::Overview;
        // Keep the overview cursor on the parsha that was open.
        if let Some(title) = self.selected_parsha().map(|p| p.title.clone())
            && let Some(idx) = self.overview_parshiot().iter().position(|p| p.title == title)
        {
            self.overview_cursor = idx;
        }
        self.clamp_cursors();
    }

    pub fn select_next_parsha(&mut self) {
        self.step_parsha(1);
    }

    pub fn select_previous_parsha(&mut self) {
        self.step_parsha(-1);
    }

    /// Moves the selection to a neighbour in overview order, so stepping never
    /// lands on a parsha the overview does not list.
    fn step_parsha(&mut self, offset: isize) {
        let neighbour = {
            let order = self.overview_parshiot();
            let current = self
                .selected_parsha()
                .and_then(|selected| order.iter().position(|p| p.title == selected.title));
            current
                .and_then(|idx| idx.checked_add_signed(offset))
                .and_then(|idx| order.get(idx))
                .map(|p| p.title.clone())
        };

        let Some(title) = neighbour else {
            return;
        };
        if self.tracker.selection_mut().select_by_title(&title) {
            self.aliyah_cursor = 0;
            self.sync_with_selection();
        }
    }

    pub fn toggle_current_aliyah(&mut self) {
        let Some((title, number, current)) = self.selected_parsha().and_then(|p| {
            self.selected_aliyah()
                .map(|a| (p.title.clone(), a.number, a.is_complete))
        }) else {
            return;
        };

        let result = self
            .runtime
            .block_on(self.tracker.toggle_one(&title, number, current));
        match result {
            Ok(()) => {
                self.sync_with_selection();
            }
            Err(e) => self.report_failure("Updating aliyah", e),
        }
    }

    pub fn toggle_all_aliyot(&mut self) {
        let result = self.runtime.block_on(self.tracker.toggle_selected_all());
        match result {
            Ok(Some(target)) => {
                self.sync_with_selection();
                let label = if target { "complete" } else { "incomplete" };
                self.set_status_message(format!("Marked all aliyot {label}"));
            }
            Ok(None) => {}
            Err(e) => self.report_failure("Updating all aliyot", e),
        }
    }
}
