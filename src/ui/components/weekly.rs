use super::stats_labels;
use crate::app::AppState;
use parsha_tracker::reading::global_stats;
use parsha_tracker::tracker::plan_toggle_all;
use parsha_tracker::utils::unicode::pad_to_width;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

const VERSES_WIDTH: usize = 26;

pub fn render(f: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = state.theme.clone();

    let Some(parsha) = state.selected_parsha() else {
        let empty = Paragraph::new(Line::from(Span::styled(
            " No parshiot found",
            Style::default().fg(theme.dimmed),
        )))
        .block(Block::default().borders(Borders::ALL).title(" Weekly Parsha "));
        f.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(area);

    let stats = global_stats(std::iter::once(parsha));
    let [words, verses, aliyot] = stats_labels(&stats);
    let bulk_label = if plan_toggle_all(parsha).target {
        "Mark All Complete"
    } else {
        "Mark All Incomplete"
    };

    let header_lines = vec![
        Line::from(vec![
            Span::styled(
                parsha.title.clone(),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(parsha.name.clone(), Style::default().fg(theme.book_header)),
        ]),
        Line::from(Span::styled(
            format!("{}  ·  {}", parsha.book, parsha.torah_portion),
            Style::default().fg(theme.dimmed),
        )),
        Line::from(format!(
            "aliyot {aliyot}  ·  verses {verses}  ·  words {words}"
        )),
        Line::from(Span::styled(
            format!("[a] {bulk_label}"),
            Style::default().fg(theme.progress_fill),
        )),
    ];

    let header = Paragraph::new(header_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Weekly Parsha ")
            .style(Style::default().bg(theme.background)),
    );
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem<'static>> = parsha
        .aliyot_in_order()
        .into_iter()
        .map(|aliyah| {
            let (checkbox, style) = if aliyah.is_complete {
                ("[x]", Style::default().fg(theme.complete))
            } else {
                ("[ ]", Style::default().fg(theme.foreground))
            };
            let completed_on = aliyah
                .date_completed
                .map(|d| format!("  completed {}", d.format("%Y-%m-%d")))
                .unwrap_or_default();

            ListItem::new(Line::from(vec![
                Span::styled(format!(" {checkbox} Aliyah {:<2} ", aliyah.number), style),
                Span::raw(pad_to_width(&aliyah.verses, VERSES_WIDTH)),
                Span::styled(
                    format!(
                        "{} verses, {} words",
                        aliyah.verse_count, aliyah.word_count
                    ),
                    Style::default().fg(theme.dimmed),
                ),
                Span::styled(completed_on, Style::default().fg(theme.complete)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Aliyot "))
        .highlight_style(
            Style::default()
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    let cursor = state.aliyah_cursor;
    state.aliyot_list_state.select(Some(cursor));
    f.render_stateful_widget(list, chunks[1], &mut state.aliyot_list_state);
}
