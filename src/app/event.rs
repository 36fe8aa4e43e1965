use super::screen::Screen;
use super::state::AppState;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Result<()> {
    if state.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            state.show_help = false;
        }
        return Ok(());
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.should_quit = true;
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Char('?') => state.show_help = true,
        KeyCode::Char('r') => {
            if state.refresh() {
                state.set_status_message("Refreshed".to_string());
            }
        }
        KeyCode::Up | KeyCode::Char('k') => state.move_cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => state.move_cursor_down(),
        _ => match state.screen {
            Screen::Overview => handle_overview_key(key, state),
            Screen::Weekly => handle_weekly_key(key, state),
        },
    }

    Ok(())
}

fn handle_overview_key(key: KeyEvent, state: &mut AppState) {
    if key.code == KeyCode::Enter {
        state.open_parsha_at_cursor();
    }
}

fn handle_weekly_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => state.toggle_current_aliyah(),
        KeyCode::Char('a') => state.toggle_all_aliyot(),
        KeyCode::Left | KeyCode::Char('h') => state.select_previous_parsha(),
        KeyCode::Right | KeyCode::Char('l') => state.select_next_parsha(),
        KeyCode::Esc | KeyCode::Char('b') => state.back_to_overview(),
        _ => {}
    }
}
