use crate::app::AppState;
use crate::app::screen::Screen;
use crate::app::state::StatusKind;
use parsha_tracker::utils::unicode::pad_to_width;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn render(f: &mut Frame, state: &AppState, area: Rect) {
    if let Some((message, kind, _)) = &state.status_message {
        let bg = match kind {
            StatusKind::Info => state.theme.status_info_bg,
            StatusKind::Error => state.theme.status_error_bg,
        };
        render_status_message(f, message, bg, area);
        return;
    }

    let position = match state.screen {
        Screen::Overview => format!("{} parshiot", state.overview_parshiot().len()),
        Screen::Weekly => match state.selected_parsha() {
            Some(parsha) => {
                let index = state.tracker.selection().selected_index().map_or(0, |i| i + 1);
                format!("{} ({}/{})", parsha.short_title(), index, state.parshiot().len())
            }
            None => "no selection".to_string(),
        },
    };

    let nav_hint = match state.screen {
        Screen::Overview => "Enter open  ? help  q quit",
        Screen::Weekly => "x toggle  a all  h/l prev/next  ? help",
    };
    let version_text = format!("v{VERSION}");

    let left_content = format!(" {} | {} | {}", state.screen, position, nav_hint);
    let right_content = format!("{version_text} ");
    let left_width = (area.width as usize).saturating_sub(right_content.len());

    let base_style = Style::default()
        .fg(state.theme.status_bar_fg)
        .bg(state.theme.status_bar_bg);

    let status_line = format!("{}{}", pad_to_width(&left_content, left_width), right_content);
    let status = Paragraph::new(Line::from(vec![Span::styled(status_line, base_style)]));

    f.render_widget(status, area);
}

fn render_status_message(f: &mut Frame, message: &str, bg: Color, area: Rect) {
    let display_message = format!(" {message} ");

    let style = Style::default()
        .fg(Color::White)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let status_line = pad_to_width(&display_message, area.width as usize);
    let status = Paragraph::new(Line::from(vec![Span::styled(status_line, style)]));
    f.render_widget(status, area);
}
