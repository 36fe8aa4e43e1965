use crate::reading::Parsha;
use tokio::sync::watch;

/// What observers see after each change to the selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Bumped on every load and on every effective selection change.
    pub revision: u64,
    pub selected: Option<String>,
    pub len: usize,
}

/// Owns the parshiot collection and the currently selected parsha.
///
/// The selection is held as an index into the current collection, so a
/// selected parsha is always an element of the latest load, never an object
/// left over from an earlier fetch. All writes go through `load` and the
/// `select_*` methods; views observe through [`Selection::subscribe`].
#[derive(Debug)]
pub struct Selection {
    parshiot: Vec<Parsha>,
    selected: Option<usize>,
    revision: u64,
    notifier: watch::Sender<SelectionSnapshot>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        let (notifier, _) = watch::channel(SelectionSnapshot::default());
        Self {
            parshiot: Vec::new(),
            selected: None,
            revision: 0,
            notifier,
        }
    }

    pub fn parshiot(&self) -> &[Parsha] {
        &self.parshiot
    }

    pub fn selected(&self) -> Option<&Parsha> {
        self.selected.and_then(|idx| self.parshiot.get(idx))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn find(&self, title: &str) -> Option<&Parsha> {
        self.position(title).map(|idx| &self.parshiot[idx])
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.notifier.subscribe()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            revision: self.revision,
            selected: self.selected().map(|p| p.title.clone()),
            len: self.parshiot.len(),
        }
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.parshiot.iter().position(|p| p.title == title)
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        self.notifier.send_replace(snapshot);
    }

    /// Replaces the whole collection and re-resolves the selection by title.
    ///
    /// With nothing selected, the first parsha becomes selected. A selected
    /// title that is missing from the new collection leaves nothing selected.
    pub fn load(&mut self, parshiot: Vec<Parsha>) {
        let previous = self.selected().map(|p| p.title.clone());
        self.parshiot = parshiot;

        self.selected = match previous {
            Some(title) => {
                let found = self.position(&title);
                if found.is_none() {
                    tracing::debug!(title = %title, "Selected parsha vanished on reload");
                }
                found
            }
            None if !self.parshiot.is_empty() => Some(0),
            None => None,
        };

        self.publish();
    }

    /// Applies a selection requested from outside (e.g. navigating from the
    /// overview). Unmatched titles leave the current selection untouched.
    pub fn resolve_initial_selection(&mut self, requested_title: &str) {
        self.select_by_title(requested_title);
    }

    /// Selects the parsha with `title`. Unknown titles are a no-op and return `false`.
    pub fn select_by_title(&mut self, title: &str) -> bool {
        let Some(idx) = self.position(title) else {
            tracing::debug!(title, "Ignoring selection of unknown parsha");
            return false;
        };

        if self.selected != Some(idx) {
            self.selected = Some(idx);
            self.publish();
        }
        true
    }

    pub fn select_next(&mut self) -> bool {
        self.select_offset(1)
    }

    pub fn select_previous(&mut self) -> bool {
        self.select_offset(-1)
    }

    fn select_offset(&mut self, offset: isize) -> bool {
        let Some(current) = self.selected else {
            return false;
        };
        let Some(target) = current.checked_add_signed(offset) else {
            return false;
        };
        match self.parshiot.get(target).map(|p| p.title.clone()) {
            Some(title) => self.select_by_title(&title),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{Aliyah, Book};
    use pretty_assertions::assert_eq;

    fn parsha(title: &str, complete: bool) -> Parsha {
        let mut aliyah = Aliyah::new(1, "", 10, 1);
        aliyah.is_complete = complete;
        Parsha {
            title: title.to_string(),
            name: String::new(),
            book: Book::Exodus,
            torah_portion: String::new(),
            aliyot: vec![aliyah],
        }
    }

    fn selected_title(selection: &Selection) -> Option<&str> {
        selection.selected().map(|p| p.title.as_str())
    }

    #[test]
    fn test_first_load_selects_first_parsha() {
        let mut selection = Selection::new();
        selection.load(vec![parsha("Exodus-1", false), parsha("Exodus-2", false)]);
        assert_eq!(selected_title(&selection), Some("Exodus-1"));
    }

    #[test]
    fn test_empty_load_selects_nothing() {
        let mut selection = Selection::new();
        selection.load(vec![]);
        assert!(selection.selected().is_none());
    }

    #[test]
    fn test_reload_rebinds_selection_to_new_data() {
        let mut selection = Selection::new();
        selection.load(vec![parsha("Exodus-1", false), parsha("Exodus-3", false)]);
        assert!(selection.select_by_title("Exodus-3"));

        // Same title at a different position, with fresh completion state.
        selection.load(vec![parsha("Exodus-3", true), parsha("Exodus-1", false)]);
        let selected = selection.selected().unwrap();
        assert_eq!(selected.title, "Exodus-3");
        assert!(selected.aliyot[0].is_complete);
        assert_eq!(selection.selected_index(), Some(0));
    }

    #[test]
    fn test_reload_without_selected_title_clears_selection() {
        let mut selection = Selection::new();
        selection.load(vec![parsha("Exodus-1", false), parsha("Exodus-3", false)]);
        selection.select_by_title("Exodus-3");

        selection.load(vec![parsha("Exodus-1", false), parsha("Exodus-2", false)]);
        assert!(selection.selected().is_none());

        // The next load with nothing selected picks the first parsha again.
        selection.load(vec![parsha("Exodus-2", false)]);
        assert_eq!(selected_title(&selection), Some("Exodus-2"));
    }

    #[test]
    fn test_select_unknown_title_is_noop() {
        let mut selection = Selection::new();
        selection.load(vec![parsha("Exodus-1", false), parsha("Exodus-2", false)]);
        selection.select_by_title("Exodus-2");

        assert!(!selection.select_by_title("Exodus-9"));
        assert_eq!(selected_title(&selection), Some("Exodus-2"));
    }

    #[test]
    fn test_resolve_initial_selection() {
        let mut selection = Selection::new();
        selection.load(vec![parsha("Exodus-1", false), parsha("Exodus-2", false)]);

        selection.resolve_initial_selection("Exodus-2");
        assert_eq!(selected_title(&selection), Some("Exodus-2"));

        selection.resolve_initial_selection("Genesis-1");
        assert_eq!(selected_title(&selection), Some("Exodus-2"));
    }

    #[test]
    fn test_select_next_and_previous_stop_at_edges() {
        let mut selection = Selection::new();
        selection.load(vec![parsha("A", false), parsha("B", false)]);

        assert!(!selection.select_previous());
        assert!(selection.select_next());
        assert_eq!(selected_title(&selection), Some("B"));
        assert!(!selection.select_next());
        assert!(selection.select_previous());
        assert_eq!(selected_title(&selection), Some("A"));
    }

    #[test]
    fn test_subscribers_observe_changes() {
        let mut selection = Selection::new();
        let mut rx = selection.subscribe();
        assert!(!rx.has_changed().unwrap());

        selection.load(vec![parsha("A", false), parsha("B", false)]);
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(
            snapshot,
            SelectionSnapshot {
                revision: 1,
                selected: Some("A".to_string()),
                len: 2,
            }
        );

        // Re-selecting the current parsha publishes nothing.
        selection.select_by_title("A");
        assert!(!rx.has_changed().unwrap());

        selection.select_by_title("B");
        assert_eq!(rx.borrow_and_update().selected.as_deref(), Some("B"));
    }
}
