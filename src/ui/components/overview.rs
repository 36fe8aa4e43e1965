use super::{progress_bar, stats_labels};
use crate::app::AppState;
use crate::ui::theme::Theme;
use parsha_tracker::reading::{book_stats, global_stats, group_by_book, parsha_stats};
use parsha_tracker::utils::unicode::pad_to_width;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem},
};

const TITLE_WIDTH: usize = 22;
const BAR_WIDTH: usize = 12;

pub fn render(f: &mut Frame, state: &mut AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    render_global_header(f, state, chunks[0]);

    let theme = state.theme.clone();
    let (mut items, cursor_row) = build_rows(state, &theme);

    if items.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            " No parshiot found",
            Style::default().fg(theme.dimmed),
        ))));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Torah Reading Progress ")
                .style(Style::default().bg(theme.background)),
        )
        .highlight_style(
            Style::default()
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    state.overview_list_state.select(cursor_row);
    f.render_stateful_widget(list, chunks[1], &mut state.overview_list_state);
}

/// One row per book header and per parsha, plus the list row the cursor is on.
fn build_rows(state: &AppState, theme: &Theme) -> (Vec<ListItem<'static>>, Option<usize>) {
    let groups = group_by_book(state.parshiot());

    let mut items: Vec<ListItem<'static>> = Vec::new();
    // List row of the parsha under the cursor; book headers take rows too.
    let mut cursor_row = None;
    let mut parsha_index = 0;

    for (book, in_book) in groups.canonical() {
        let book_totals = book_stats(in_book.iter().copied());
        let [words, verses, aliyot] = stats_labels(&book_totals);
        items.push(ListItem::new(Line::from(vec![
            Span::styled(
                format!(" {book}  "),
                Style::default()
                    .fg(theme.book_header)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("words {words}  verses {verses}  aliyot {aliyot}"),
                Style::default().fg(theme.dimmed),
            ),
        ])));

        for parsha in in_book {
            let figures = parsha_stats(parsha, &book_totals.total);
            let percentage = (figures.completion_fraction * 100.0).round() as u32;
            let title_style = if figures.total_aliyot > 0 && parsha.is_complete() {
                Style::default().fg(theme.complete)
            } else {
                Style::default().fg(theme.foreground)
            };

            if parsha_index == state.overview_cursor {
                cursor_row = Some(items.len());
            }
            parsha_index += 1;

            items.push(ListItem::new(Line::from(vec![
                Span::raw("   "),
                Span::styled(pad_to_width(parsha.short_title(), TITLE_WIDTH), title_style),
                Span::styled(
                    progress_bar(percentage, BAR_WIDTH),
                    Style::default().fg(theme.progress_fill),
                ),
                Span::raw(format!(
                    " {}/{} aliyot",
                    figures.completed_aliyot, figures.total_aliyot
                )),
                Span::styled(
                    format!(
                        "  {:.1}% of words  {:.1}% of verses",
                        figures.word_share_of_book, figures.verse_share_of_book
                    ),
                    Style::default().fg(theme.dimmed),
                ),
            ])));
        }
    }

    (items, cursor_row)
}

fn render_global_header(f: &mut Frame, state: &AppState, area: Rect) {
    let stats = global_stats(state.parshiot());
    let [words, verses, aliyot] = stats_labels(&stats);
    let label = format!("words {words}  ·  verses {verses}  ·  aliyot {aliyot}");

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Overall "))
        .gauge_style(
            Style::default()
                .fg(state.theme.progress_fill)
                .bg(state.theme.progress_empty),
        )
        .percent(stats.percentage.words.min(100) as u16)
        .label(label);

    f.render_widget(gauge, area);
}
