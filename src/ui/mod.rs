pub mod components;
pub mod theme;

use crate::app::{AppState, event::handle_key_event};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::debug;

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = disable_raw_mode();
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = stdout.flush();
    }
}

/// Runs the terminal client until the user quits.
///
/// When `watch_path` is given (offline mode), writes to that file by another
/// process trigger a reload of the collection.
pub fn run_tui(mut state: AppState, watch_path: Option<PathBuf>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (change_tx, change_rx) = mpsc::channel();
    let _watcher = watch_path
        .as_deref()
        .and_then(|path| setup_progress_watcher(path, change_tx));

    let result = run_app(&mut terminal, &mut state, change_rx);
    terminal.show_cursor()?;

    result
}

fn setup_progress_watcher(path: &Path, tx: mpsc::Sender<()>) -> Option<RecommendedWatcher> {
    let watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res
                && event.kind.is_modify()
            {
                let _ = tx.send(());
            }
        },
        Config::default(),
    );

    match watcher {
        Ok(mut w) => {
            if w.watch(path, RecursiveMode::NonRecursive).is_ok() {
                Some(w)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    change_rx: mpsc::Receiver<()>,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            components::render(f, state);
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key_event(key, state)?;
        }

        let mut should_reload = false;
        while change_rx.try_recv().is_ok() {
            should_reload = true;
        }
        if should_reload {
            debug!("Progress file changed on disk, reloading");
            state.refresh();
        }

        state.sync_with_selection();
        state.clear_expired_status_message();

        if state.should_quit {
            break;
        }
    }

    Ok(())
}
