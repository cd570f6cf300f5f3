use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::exercise::ExerciseKind;
use crate::ui::{bold, dim, inner, italic, red_bold, selected};

pub fn render_menu(menu_index: usize, status: Option<&str>, area: Rect, buf: &mut Buffer) {
    let kinds = ExerciseKind::ALL;
    let [title, list, status_area, legend] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(kinds.len() as u16),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner(area));

    Paragraph::new(Line::from(vec![
        Span::styled("kwiz", bold().fg(Color::Magenta)),
        Span::styled("  choose an exercise", dim()),
    ]))
    .alignment(Alignment::Center)
    .render(title, buf);

    let lines = kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let label = format!(" {}. {} ", i + 1, kind.title());
            if i == menu_index {
                Line::from(Span::styled(label, selected()))
            } else {
                Line::from(Span::styled(label, Style::default()))
            }
        })
        .collect::<Vec<_>>();
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(list, buf);

    if let Some(status) = status {
        Paragraph::new(Span::styled(status, red_bold()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(status_area, buf);
    }

    Paragraph::new(Span::styled(
        "(↑/↓ or 1-8) choose  (enter) open  (q)uit",
        italic(),
    ))
    .alignment(Alignment::Center)
    .render(legend, buf);
}
