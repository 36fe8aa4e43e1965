pub mod overview;
pub mod status_bar;
pub mod weekly;

use crate::app::AppState;
use crate::app::screen::Screen;
use parsha_tracker::reading::AggregateStats;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
};

pub fn render(f: &mut Frame, state: &mut AppState) {
    state.terminal_height = f.area().height;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Screen body
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    match state.screen {
        Screen::Overview => overview::render(f, state, chunks[0]),
        Screen::Weekly => weekly::render(f, state, chunks[0]),
    }

    status_bar::render(f, state, chunks[1]);

    if state.show_help {
        render_help_overlay(f, state);
    }
}

/// Text progress bar, e.g. `██████░░░░` for 60% at width 10.
pub(crate) fn progress_bar(percentage: u32, width: usize) -> String {
    let filled = (percentage.min(100) as usize * width + 50) / 100;
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

/// `completed/total (pct%)` for the word, verse and aliyah dimensions.
pub(crate) fn stats_labels(stats: &AggregateStats) -> [String; 3] {
    [
        format!("{}/{} ({}%)", stats.completed.words, stats.total.words, stats.percentage.words),
        format!(
            "{}/{} ({}%)",
            stats.completed.verses, stats.total.verses, stats.percentage.verses
        ),
        format!(
            "{}/{} ({}%)",
            stats.completed.aliyot, stats.total.aliyot, stats.percentage.aliyot
        ),
    ]
}

fn render_help_overlay(f: &mut Frame, state: &AppState) {
    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(state.theme.foreground);
    let section_style = Style::default()
        .fg(state.theme.book_header)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(state.theme.dimmed);

    let entry = |keys: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("    {keys:<16}"), key_style),
            Span::styled(desc, desc_style),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(
            "  Parsha Tracker Help",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("  ── Navigation ──", section_style)),
        entry("j / ↓", "Move cursor down"),
        entry("k / ↑", "Move cursor up"),
        entry("Enter", "Open parsha (overview)"),
        entry("h / ←", "Previous parsha (weekly)"),
        entry("l / →", "Next parsha (weekly)"),
        entry("Esc / b", "Back to overview"),
        Line::from(""),
        Line::from(Span::styled("  ── Progress ──", section_style)),
        entry("Space / x", "Toggle aliyah complete"),
        entry("a", "Mark all aliyot complete/incomplete"),
        entry("r", "Reload from source"),
        Line::from(""),
        Line::from(Span::styled("  ── Other ──", section_style)),
        entry("?", "Toggle this help"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("  Esc or ? to close", dim_style)),
    ];

    let area = centered_rect(60, 70, f.area());
    let items: Vec<ListItem> = lines.into_iter().map(ListItem::new).collect();
    let list_widget = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::default().bg(state.theme.background)),
    );

    f.render_widget(Clear, area);
    f.render_widget(list_widget, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use parsha_tracker::reading::Tally;

    #[test]
    fn test_progress_bar_widths() {
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(progress_bar(50, 4), "██░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(250, 4), "████");
    }

    #[test]
    fn test_stats_labels() {
        let stats = AggregateStats::from_tallies(
            Tally { words: 250, verses: 22, aliyot: 2 },
            Tally { words: 450, verses: 36, aliyot: 3 },
        );
        let [words, verses, aliyot] = stats_labels(&stats);
        assert_eq!(words, "250/450 (56%)");
        assert_eq!(verses, "22/36 (61%)");
        assert_eq!(aliyot, "2/3 (67%)");
    }
}
