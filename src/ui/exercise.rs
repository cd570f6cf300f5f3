use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::Cursor;
use crate::clock::Clock;
use crate::exercise::{
    CategorySort, ChangeMode, ClickToChange, FillIn, GapFill, Highlight, MultiSelect, Question,
    SelectGroup, Sequencing, TableMatch,
};
use crate::progress::AnswerAttempt;
use crate::response::Response;
use crate::session::{Phase, Session, Stats};
use crate::ui::{bold, centered, dim, focused, green_bold, inner, italic, red_bold, selected};
use crate::util::{format_clock, format_score};

pub fn render_exercise<C: Clock>(
    session: &Session<C>,
    cursor: &Cursor,
    status: Option<&str>,
    area: Rect,
    buf: &mut Buffer,
) {
    let [stats_area, gauge_area, _, prompt_area, body_area, status_area, legend_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .areas(inner(area));

    let stats = session.stats();
    stats_line(&stats).render(stats_area, buf);
    progress_gauge(&stats).render(gauge_area, buf);

    let Some(question) = session.current_question() else {
        return;
    };
    Paragraph::new(Span::styled(question.prompt().to_string(), bold()))
        .wrap(Wrap { trim: true })
        .render(prompt_area, buf);

    let interactive = session.phase() == Phase::InProgress;
    if let Some(draft) = session.draft() {
        Paragraph::new(question_lines(question, draft, cursor, interactive))
            .wrap(Wrap { trim: false })
            .render(body_area, buf);
    }

    if let Some(attempt) = session.last_attempt() {
        render_feedback(attempt, question.explanation(), session.phase(), body_area, buf);
    }

    if let Some(status) = status {
        Paragraph::new(Span::styled(status.to_string(), red_bold().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .render(status_area, buf);
    }

    let has_example = session.bank().example().is_some();
    Paragraph::new(Span::styled(legend(question, cursor, has_example), italic()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(legend_area, buf);
}

fn stats_line(stats: &Stats) -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::styled(
            format!(
                "Question {} / {}",
                stats.question_number, stats.total_questions
            ),
            bold(),
        ),
        Span::raw("   "),
        Span::styled(format_clock(stats.elapsed_seconds), bold().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(
            format!("Score {}", format_score(stats.score)),
            bold().fg(Color::Magenta),
        ),
    ]))
    .alignment(Alignment::Center)
}

fn progress_gauge(stats: &Stats) -> Gauge<'static> {
    let ratio = if stats.total_questions == 0 {
        0.0
    } else {
        stats.answered as f64 / stats.total_questions as f64
    };
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{}/{} answered", stats.answered, stats.total_questions))
}

fn render_feedback(
    attempt: &AnswerAttempt,
    explanation: Option<&str>,
    phase: Phase,
    area: Rect,
    buf: &mut Buffer,
) {
    let mut lines = Vec::new();
    let (title, style) = if attempt.is_correct {
        (" Correct! ", green_bold())
    } else {
        (" Not quite ", red_bold())
    };

    if attempt.is_correct {
        lines.push(Line::from(Span::styled(
            attempt.correct_answer.clone(),
            green_bold(),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Your answer: ", dim()),
            Span::styled(blank_dash(&attempt.user_answer), red_bold()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Correct answer: ", dim()),
            Span::styled(attempt.correct_answer.clone(), green_bold()),
        ]));
        if let Some(explanation) = explanation {
            lines.push(Line::from(Span::styled(explanation.to_string(), italic())));
        }
        if phase == Phase::AwaitingAck {
            lines.push(Line::from(Span::styled("(enter) got it", italic())));
        }
    }

    let width = lines
        .iter()
        .map(|l| l.width())
        .max()
        .unwrap_or(0)
        .max(title.width()) as u16
        + 4;
    let popup = centered(area, width, lines.len() as u16 + 2);
    Clear.render(popup, buf);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(Span::styled(title, style)),
        )
        .render(popup, buf);
}

fn blank_dash(answer: &str) -> String {
    if answer.trim().is_empty() {
        "(no answer)".to_string()
    } else {
        answer.to_string()
    }
}

fn legend(question: &Question, cursor: &Cursor, has_example: bool) -> String {
    if cursor.editing.is_some() {
        return "(type) correction  (enter) keep  (esc) cancel".into();
    }
    let keys = match question {
        Question::CategorySort(_) => "(↑/↓) item  (1-9 or ←/→) category  (0) unplace",
        Question::FillIn(_) => "(type) answer",
        Question::GapFill(_) => "(type) letter  (←/→) blank",
        Question::Highlight(q) if q.takes_corrections() => "(←/→) word  (space) correct it",
        Question::Highlight(_) => "(←/→) move  (space) highlight",
        Question::ClickToChange(_) => "(←/→) word  (space) change",
        Question::MultiSelect(_) => "(↑/↓) option  (space or 1-9) pick",
        Question::Sequencing(_) => "(↑/↓) move  (space) grab/drop",
        Question::TableMatch(_) => "(↑/↓) row  (←/→ or 1-9) column",
    };
    let audio = if question.audio_text().is_some() {
        "  (ctrl+p) listen"
    } else {
        ""
    };
    let example = if has_example { "  (ctrl+e) example" } else { "" };
    format!("{keys}  (enter) submit{audio}{example}  (ctrl+r) restart  (esc) menu")
}

/// The question body with the draft filled in. Focus is only drawn while the
/// user can still edit.
pub fn question_lines(
    question: &Question,
    draft: &Response,
    cursor: &Cursor,
    interactive: bool,
) -> Vec<Line<'static>> {
    let focus = interactive.then_some(cursor.index);
    match question {
        Question::CategorySort(q) => sort_lines(q, draft, focus),
        Question::FillIn(q) => fill_lines(q, draft),
        Question::GapFill(q) => gap_lines(q, draft, focus),
        Question::Highlight(q) => highlight_lines(q, draft, focus, cursor.editing.as_deref()),
        Question::ClickToChange(q) => click_lines(q, draft, focus),
        Question::MultiSelect(q) => multi_lines(q, draft, focus),
        Question::Sequencing(q) => sequence_lines(q, draft, focus, cursor.grabbed),
        Question::TableMatch(q) => table_lines(q, draft, focus),
    }
}

fn marker(focus: Option<usize>, index: usize) -> &'static str {
    if focus == Some(index) {
        "› "
    } else {
        "  "
    }
}

fn sort_lines(q: &CategorySort, draft: &Response, focus: Option<usize>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(
        q.categories
            .iter()
            .enumerate()
            .map(|(i, c)| Span::styled(format!("{}: {}   ", i + 1, c), dim()))
            .collect::<Vec<_>>(),
    )];
    lines.push(Line::default());

    let width = q.options.iter().map(|o| o.content.width()).max().unwrap_or(0);
    for (i, item) in q.options.iter().enumerate() {
        let style = if focus == Some(i) { focused() } else { bold() };
        let placed = match draft.category_of(item.id) {
            Some(category) => Span::styled(format!("[{category}]"), green_bold()),
            None => Span::styled("[ ]".to_string(), dim()),
        };
        let mut spans = vec![
            Span::raw(marker(focus, i)),
            Span::styled(
                format!("{}{}", item.content, " ".repeat(width - item.content.width())),
                style,
            ),
            Span::raw("  "),
            placed,
        ];
        if let Some(label) = &item.label {
            spans.push(Span::styled(format!("  ({label})"), italic()));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn fill_lines(q: &FillIn, draft: &Response) -> Vec<Line<'static>> {
    let typed = match draft {
        Response::Text(t) => t.clone(),
        _ => String::new(),
    };
    let (before, after) = q.parts();
    let mut lines = Vec::new();
    if let Some(hint) = &q.hint_word {
        lines.push(Line::from(Span::styled(hint.clone(), italic())));
        lines.push(Line::default());
    }
    let answer = if typed.is_empty() {
        "___".to_string()
    } else {
        typed
    };
    let sep = if before.is_empty() || before.ends_with(' ') {
        ""
    } else {
        " "
    };
    lines.push(Line::from(vec![
        Span::styled(format!("{before}{sep}"), bold()),
        Span::styled(answer, focused().fg(Color::Cyan)),
        Span::styled(after, bold()),
    ]));
    lines
}

fn gap_lines(q: &GapFill, draft: &Response, focus: Option<usize>) -> Vec<Line<'static>> {
    let spans = q
        .letters()
        .into_iter()
        .enumerate()
        .flat_map(|(i, c)| {
            let cell = if q.is_blank(i) {
                let letter = draft.letter_at(i).unwrap_or("_").to_string();
                let style = if focus == Some(i) {
                    focused().fg(Color::Cyan)
                } else {
                    bold().fg(Color::Cyan)
                };
                Span::styled(letter, style)
            } else {
                Span::styled(c.to_string(), bold())
            };
            [cell, Span::raw(" ")]
        })
        .collect::<Vec<_>>();

    let mut lines = vec![Line::from(spans)];
    if let Some(image) = &q.image {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(format!("[picture: {image}]"), dim())));
    }
    lines
}

fn highlight_lines(
    q: &Highlight,
    draft: &Response,
    focus: Option<usize>,
    editing: Option<&str>,
) -> Vec<Line<'static>> {
    let gap = if q.selects_characters() { "" } else { " " };
    let mut spans = Vec::new();
    for (i, unit) in q.units().into_iter().enumerate() {
        let mut style = if draft.is_selected(i) {
            selected()
        } else {
            bold()
        };
        if focus == Some(i) {
            style = style.patch(focused());
        }

        if let (Some(text), true) = (editing, focus == Some(i)) {
            spans.push(Span::styled(format!("{unit}→{text}▏"), focused().fg(Color::Cyan)));
        } else if let Some(correction) = draft.correction_at(i) {
            spans.push(Span::styled(unit, style.add_modifier(Modifier::CROSSED_OUT)));
            spans.push(Span::styled(format!("→{correction}"), green_bold()));
        } else {
            spans.push(Span::styled(unit, style));
        }
        spans.push(Span::raw(gap));
    }
    vec![Line::from(spans)]
}

fn click_lines(q: &ClickToChange, draft: &Response, focus: Option<usize>) -> Vec<Line<'static>> {
    let mut spans = Vec::new();
    for (i, word) in q.words.iter().enumerate() {
        let (text, mut style) = if draft.is_selected(i) {
            (q.changed_word(i), green_bold())
        } else if q.mode == ChangeMode::Pronoun && !q.is_clickable(i) {
            (word.text.clone(), dim())
        } else {
            (word.text.clone(), bold())
        };
        if focus == Some(i) {
            style = style.patch(focused());
        }
        spans.push(Span::styled(text, style));
        spans.push(Span::raw(" "));
    }
    vec![Line::from(spans)]
}

fn multi_lines(q: &MultiSelect, draft: &Response, focus: Option<usize>) -> Vec<Line<'static>> {
    let picked = q
        .options
        .iter()
        .enumerate()
        .filter(|(i, _)| draft.is_selected(*i))
        .count();
    let hint = match q.group {
        SelectGroup::SoundMatching => "listen and ",
        SelectGroup::Synonym => "",
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{hint}choose {} ({picked} chosen)", q.required_selections),
            dim(),
        )),
        Line::default(),
    ];
    for (i, option) in q.options.iter().enumerate() {
        let (mark, style) = if draft.is_selected(i) {
            ("[x]", green_bold())
        } else {
            ("[ ]", bold())
        };
        let style = if focus == Some(i) {
            style.patch(focused())
        } else {
            style
        };
        lines.push(Line::from(vec![
            Span::raw(marker(focus, i)),
            Span::styled(format!("{mark} {}. {}", i + 1, option.word), style),
        ]));
    }
    lines
}

fn sequence_lines(
    q: &Sequencing,
    draft: &Response,
    focus: Option<usize>,
    grabbed: bool,
) -> Vec<Line<'static>> {
    let Response::Order(ids) = draft else {
        return Vec::new();
    };
    ids.iter()
        .enumerate()
        .filter_map(|(position, id)| q.item(*id).map(|item| (position, item)))
        .map(|(position, item)| {
            let is_focus = focus == Some(position);
            let style = match (is_focus, grabbed) {
                (true, true) => selected(),
                (true, false) => focused(),
                _ => bold(),
            };
            let handle = if is_focus && grabbed { "≡ " } else { "  " };
            Line::from(vec![
                Span::raw(marker(focus, position)),
                Span::styled(format!("{handle}{}. {}", position + 1, item.content), style),
            ])
        })
        .collect()
}

fn table_lines(q: &TableMatch, draft: &Response, focus: Option<usize>) -> Vec<Line<'static>> {
    let text_width = q.rows.iter().map(|r| r.text.width()).max().unwrap_or(0);
    let cell_width = q
        .columns
        .iter()
        .map(|c| c.label.width())
        .max()
        .unwrap_or(0)
        .max(3);

    let pad = |s: &str, w: usize| format!("{s}{}", " ".repeat(w.saturating_sub(s.width())));

    let mut header = vec![Span::raw(format!("  {}  ", " ".repeat(text_width)))];
    header.extend(q.columns.iter().enumerate().map(|(i, c)| {
        Span::styled(
            pad(&format!("{}:{}", i + 1, c.label), cell_width + 3),
            dim(),
        )
    }));
    let mut lines = vec![Line::from(header)];

    for (row, r) in q.rows.iter().enumerate() {
        let style = if focus == Some(row) { focused() } else { bold() };
        let mut spans = vec![
            Span::raw(marker(focus, row)),
            Span::styled(pad(&r.text, text_width), style),
            Span::raw("  "),
        ];
        for column in &q.columns {
            let (mark, style) = if draft.column_of(row) == Some(column.id.as_str()) {
                ("(●)", green_bold())
            } else {
                ("( )", dim())
            };
            spans.push(Span::styled(pad(mark, cell_width + 3), style));
        }
        lines.push(Line::from(spans));
    }
    lines
}
