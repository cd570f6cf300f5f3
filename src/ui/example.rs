use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::bank::WorkedExample;
use crate::exercise::ExerciseKind;
use crate::ui::{bold, dim, green_bold, inner, italic};

/// Read-only solved sample for the current exercise.
pub fn render_example(kind: ExerciseKind, example: &WorkedExample, area: Rect, buf: &mut Buffer) {
    let [title_area, prompt_area, body_area, legend_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(inner(area));

    Paragraph::new(Line::from(vec![
        Span::styled("Learn with an example", bold().fg(Color::Magenta)),
        Span::styled(format!("  {}", kind.title()), dim()),
    ]))
    .alignment(Alignment::Center)
    .render(title_area, buf);

    Paragraph::new(Span::styled(example.question.clone(), bold()))
        .wrap(Wrap { trim: true })
        .render(prompt_area, buf);

    let label_width = example
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = example
        .rows
        .iter()
        .map(|row| {
            let mut spans = vec![
                Span::styled(format!("{:<label_width$}", row.label), bold()),
                Span::raw("  "),
                Span::styled(row.answer.clone(), green_bold()),
            ];
            if let Some(note) = &row.note {
                spans.push(Span::styled(format!("  ({note})"), dim()));
            }
            Line::from(spans)
        })
        .collect::<Vec<_>>();
    if let Some(explanation) = &example.explanation {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(explanation.clone(), italic())));
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Solved "))
        .wrap(Wrap { trim: false })
        .render(body_area, buf);

    Paragraph::new(Span::styled("(ctrl+e / esc) back to practice", italic()))
        .alignment(Alignment::Center)
        .render(legend_area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::ExampleRow;
    use crate::ui::buffer_text;

    #[test]
    fn solved_rows_and_explanation_are_drawn() {
        let example = WorkedExample {
            question: "Sort the senses".into(),
            rows: vec![
                ExampleRow {
                    label: "Sight".into(),
                    answer: "Glowing firelight".into(),
                    note: None,
                },
                ExampleRow {
                    label: "Sound".into(),
                    answer: "Thunder rumbling".into(),
                    note: Some("you hear it".into()),
                },
            ],
            explanation: Some("Each detail belongs to one sense.".into()),
        };
        let area = Rect::new(0, 0, 90, 20);
        let mut buf = Buffer::empty(area);
        render_example(ExerciseKind::CategorySort, &example, area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Learn with an example"));
        assert!(text.contains("Sort the senses"));
        assert!(text.contains("Glowing firelight"));
        assert!(text.contains("(you hear it)"));
        assert!(text.contains("Each detail belongs to one sense."));
        assert!(text.contains("back to practice"));
    }
}
