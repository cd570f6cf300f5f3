use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::clock::Clock;
use crate::session::Session;
use crate::ui::charting::{bar_width, format_label, time_bars};
use crate::ui::{bold, dim, green_bold, inner, italic, red_bold};
use crate::util::{format_clock, format_score};

pub fn render_results<C: Clock>(session: &Session<C>, area: Rect, buf: &mut Buffer) {
    let results = session.results();
    let [title_area, summary_area, table_area, chart_area, legend_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Min(4),
        Constraint::Length(8),
        Constraint::Length(1),
    ])
    .areas(inner(area));

    Paragraph::new(Line::from(vec![
        Span::styled(session.kind().title(), bold().fg(Color::Magenta)),
        Span::styled(format!("  {}", session.bank().name), dim()),
    ]))
    .alignment(Alignment::Center)
    .render(title_area, buf);

    let average = results
        .average_seconds()
        .map(|a| format!("{}s", format_label(a)))
        .unwrap_or_else(|| "-".into());
    Paragraph::new(Line::from(vec![
        Span::styled(format!("{} score", format_score(results.final_score)), bold()),
        Span::raw("   "),
        Span::styled(format!("{} correct", results.correct_count), green_bold()),
        Span::raw("   "),
        Span::styled(format!("{} wrong", results.wrong_count), red_bold()),
        Span::raw("   "),
        Span::styled(
            format!("{} total", format_clock(session.stats().elapsed_seconds)),
            bold(),
        ),
        Span::raw("   "),
        Span::styled(format!("{average} per question"), bold()),
    ]))
    .alignment(Alignment::Center)
    .render(summary_area, buf);

    if results.questions.is_empty() {
        Paragraph::new("No questions were answered.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .render(table_area, buf);
    } else {
        let header = Row::new(vec![
            Cell::from("#"),
            Cell::from(""),
            Cell::from("Question"),
            Cell::from("Your answer"),
            Cell::from("Correct answer"),
            Cell::from("Time"),
        ])
        .style(bold().fg(Color::Yellow));

        let rows = results
            .questions
            .iter()
            .map(|attempt| {
                let mark = if attempt.is_correct {
                    Cell::from(Span::styled("✓", green_bold()))
                } else {
                    Cell::from(Span::styled("✗", red_bold()))
                };
                Row::new(vec![
                    Cell::from((attempt.question_index + 1).to_string()),
                    mark,
                    Cell::from(attempt.prompt.clone()),
                    Cell::from(attempt.user_answer.clone()),
                    Cell::from(attempt.correct_answer.clone()),
                    Cell::from(format_clock(attempt.elapsed_at_submission)),
                ])
            })
            .collect::<Vec<_>>();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Length(5),
        ];
        Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Answers"))
            .column_spacing(1)
            .render(table_area, buf);

        let bars = time_bars(results);
        let data = bars
            .iter()
            .map(|(label, secs)| (label.as_str(), *secs))
            .collect::<Vec<_>>();
        BarChart::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Seconds per question"),
            )
            .data(data.as_slice())
            .bar_width(bar_width(data.len(), chart_area.width.saturating_sub(2)))
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Magenta))
            .value_style(bold().fg(Color::Black).bg(Color::Magenta))
            .render(chart_area, buf);
    }

    Paragraph::new(Span::styled("(r)estart / (m)enu / (q)uit", italic()))
        .alignment(Alignment::Center)
        .render(legend_area, buf);
}
