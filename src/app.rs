use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::Duration;

use crate::bank::{BankError, ExerciseBank};
use crate::clock::Clock;
use crate::exercise::{
    CategorySort, ClickToChange, ExerciseKind, GapFill, Highlight, MultiSelect, Question,
    Sequencing, TableMatch,
};
use crate::response::Response;
use crate::session::{Phase, Session, SessionError, DEFAULT_FEEDBACK_DELAY};
use crate::speech::{SilentSpeaker, Speaker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Exercise,
    Results,
}

/// What the event loop should do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub bank_dir: Option<PathBuf>,
    pub feedback_delay: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            bank_dir: None,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
        }
    }
}

/// Keyboard focus inside the current question.
///
/// `index` is the focused item, word, option, row or position; for gap-fill
/// it is the char position of the focused blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    /// Sequencing: the focused item moves with the arrows.
    pub grabbed: bool,
    /// Highlight pronouns: correction being typed for the focused word.
    pub editing: Option<String>,
}

impl Cursor {
    fn for_question(question: &Question) -> Self {
        let index = match question {
            Question::GapFill(q) => q.first_blank().unwrap_or(0),
            _ => 0,
        };
        Self {
            index,
            ..Self::default()
        }
    }
}

pub struct App<C: Clock + Clone> {
    pub state: AppState,
    pub menu_index: usize,
    pub cursor: Cursor,
    /// One-line message for the footer, cleared by the next action.
    pub status: Option<String>,
    /// The bank's worked example covers the question; the session is untouched.
    pub showing_example: bool,
    session: Option<Session<C>>,
    /// Question index the cursor was built for.
    cursor_for: Option<usize>,
    last_exercise: Option<ExerciseKind>,
    clock: C,
    settings: AppSettings,
    speaker: Box<dyn Speaker>,
}

impl<C: Clock + Clone> App<C> {
    pub fn new(clock: C, settings: AppSettings) -> Self {
        Self::with_speaker(clock, settings, Box::new(SilentSpeaker))
    }

    pub fn with_speaker(clock: C, settings: AppSettings, speaker: Box<dyn Speaker>) -> Self {
        Self {
            state: AppState::Menu,
            menu_index: 0,
            cursor: Cursor::default(),
            status: None,
            showing_example: false,
            session: None,
            cursor_for: None,
            last_exercise: None,
            clock,
            settings,
            speaker,
        }
    }

    pub fn session(&self) -> Option<&Session<C>> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// The exercise most recently opened, for saving back to the config.
    pub fn last_exercise(&self) -> Option<ExerciseKind> {
        self.last_exercise
    }

    pub fn selected_kind(&self) -> ExerciseKind {
        ExerciseKind::ALL[self.menu_index % ExerciseKind::ALL.len()]
    }

    /// Load the bank for `kind` and start a session over it.
    pub fn open(&mut self, kind: ExerciseKind) -> Result<(), BankError> {
        let bank = ExerciseBank::load(kind, self.settings.bank_dir.as_deref())?;
        self.start(bank);
        Ok(())
    }

    pub fn start(&mut self, bank: ExerciseBank) {
        if let Some(i) = ExerciseKind::ALL.iter().position(|k| *k == bank.kind) {
            self.menu_index = i;
        }
        self.last_exercise = Some(bank.kind);
        self.session = Some(Session::new(
            bank,
            self.clock.clone(),
            self.settings.feedback_delay,
        ));
        self.status = None;
        self.showing_example = false;
        self.cursor_for = None;
        self.state = AppState::Exercise;
        self.sync();
    }

    fn leave_to_menu(&mut self) {
        self.session = None;
        self.showing_example = false;
        self.cursor = Cursor::default();
        self.cursor_for = None;
        self.state = AppState::Menu;
    }

    /// Rebuild the cursor when the question changed and follow the session
    /// into the results screen once it finishes.
    fn sync(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.is_finished() {
            self.cursor = Cursor::default();
            self.cursor_for = None;
            self.showing_example = false;
            if self.state == AppState::Exercise {
                self.state = AppState::Results;
            }
            return;
        }
        if self.cursor_for != Some(session.current_index()) {
            if let Some(question) = session.current_question() {
                self.cursor = Cursor::for_question(question);
            }
            self.cursor_for = Some(session.current_index());
        }
    }

    /// Drive session timers. Returns whether a redraw is needed.
    pub fn on_tick(&mut self) -> bool {
        let changed = self.session.as_mut().is_some_and(|s| s.poll());
        if changed {
            self.sync();
        }
        changed
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }
        match self.state {
            AppState::Menu => self.on_menu_key(key),
            AppState::Exercise => {
                self.on_exercise_key(key);
                Control::Continue
            }
            AppState::Results => self.on_results_key(key),
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) -> Control {
        let count = ExerciseKind::ALL.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_index = (self.menu_index + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_index = (self.menu_index + 1) % count;
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(n) = c.to_digit(10).filter(|n| (1..=count as u32).contains(n)) {
                    self.menu_index = n as usize - 1;
                }
            }
            KeyCode::Enter => {
                let kind = self.selected_kind();
                if let Err(e) = self.open(kind) {
                    log::error!("could not open {kind}: {e}");
                    self.status = Some(e.to_string());
                }
            }
            _ => {}
        }
        Control::Continue
    }

    fn on_results_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char('r') => self.restart(),
            KeyCode::Char('m') | KeyCode::Esc => self.leave_to_menu(),
            _ => {}
        }
        Control::Continue
    }

    fn on_exercise_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('p') => self.play_audio(),
                KeyCode::Char('e') => self.toggle_example(),
                _ => {}
            }
            return;
        }
        if self.showing_example {
            if key.code == KeyCode::Esc {
                self.showing_example = false;
            }
            return;
        }
        if self.cursor.editing.is_some() {
            self.edit_correction(key.code);
            return;
        }
        match key.code {
            KeyCode::Esc => self.leave_to_menu(),
            KeyCode::Enter => self.confirm(),
            code => {
                self.status = None;
                self.edit_response(code);
            }
        }
    }

    pub fn restart(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.restart();
        self.status = None;
        self.showing_example = false;
        self.cursor_for = None;
        self.state = AppState::Exercise;
        self.sync();
    }

    /// Enter: submit the draft, or dismiss an incorrect-answer overlay.
    fn confirm(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let outcome = match session.phase() {
            Phase::InProgress => session.submit_draft().map(|_| ()),
            Phase::AwaitingAck => session.acknowledge_incorrect(),
            Phase::CorrectDelay | Phase::Finished => Ok(()),
        };
        match outcome {
            Ok(()) => self.status = None,
            Err(SessionError::NotSubmittable) => {
                self.status = Some("answer every part before submitting".into());
            }
            Err(e) => {
                log::warn!("rejected: {e}");
                self.status = Some(e.to_string());
            }
        }
        self.sync();
    }

    fn toggle_example(&mut self) {
        let has_example = self
            .session
            .as_ref()
            .is_some_and(|s| s.bank().example().is_some());
        if !has_example {
            self.status = Some("this exercise has no worked example".into());
            return;
        }
        self.showing_example = !self.showing_example;
        self.status = None;
    }

    fn play_audio(&mut self) {
        let Some(text) = self
            .session
            .as_ref()
            .and_then(|s| s.current_question())
            .and_then(Question::audio_text)
        else {
            self.status = Some("this question has no audio".into());
            return;
        };
        if let Err(e) = self.speaker.speak(&text) {
            log::warn!("speech failed: {e}");
            self.status = Some(e.to_string());
        }
    }

    fn edit_response(&mut self, code: KeyCode) {
        let Some((question, draft)) = self.session.as_mut().and_then(Session::editing) else {
            return;
        };
        let cursor = &mut self.cursor;
        match question {
            Question::CategorySort(q) => sort_key(q, draft, cursor, code),
            Question::FillIn(_) => text_key(draft, code),
            Question::GapFill(q) => gap_key(q, draft, cursor, code),
            Question::Highlight(q) => highlight_key(q, draft, cursor, code),
            Question::ClickToChange(q) => click_key(q, draft, cursor, code),
            Question::MultiSelect(q) => multi_key(q, draft, cursor, code),
            Question::Sequencing(q) => sequence_key(q, draft, cursor, code),
            Question::TableMatch(q) => table_key(q, draft, cursor, code),
        }
    }

    fn edit_correction(&mut self, code: KeyCode) {
        let Some(text) = self.cursor.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Esc => self.cursor.editing = None,
            KeyCode::Enter => {
                let index = self.cursor.index;
                let text = self.cursor.editing.take().unwrap_or_default();
                if let Some(draft) = self.session.as_mut().and_then(|s| s.draft_mut()) {
                    draft.set_correction(index, &text);
                }
            }
            _ => {}
        }
    }
}

fn step(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        (index + 1).min(len - 1)
    } else {
        index.saturating_sub(1)
    }
}

/// Cycle through `None, 0, 1, .., len - 1`.
fn cycle(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    match (current, forward) {
        (_, _) if len == 0 => None,
        (None, true) => Some(0),
        (None, false) => Some(len - 1),
        (Some(i), true) if i + 1 < len => Some(i + 1),
        (Some(_), true) => None,
        (Some(0), false) => None,
        (Some(i), false) => Some(i - 1),
    }
}

/// 1-based digit key as a 0-based index.
fn digit(c: char) -> Option<usize> {
    c.to_digit(10)
        .filter(|d| *d > 0)
        .map(|d| d as usize - 1)
}

fn sort_key(q: &CategorySort, draft: &mut Response, cursor: &mut Cursor, code: KeyCode) {
    let Some(item) = q.options.get(cursor.index) else {
        return;
    };
    match code {
        KeyCode::Up => cursor.index = step(cursor.index, q.options.len(), false),
        KeyCode::Down => cursor.index = step(cursor.index, q.options.len(), true),
        KeyCode::Left | KeyCode::Right => {
            let current = draft
                .category_of(item.id)
                .and_then(|c| q.categories.iter().position(|k| k == c));
            match cycle(current, q.categories.len(), code == KeyCode::Right)
                .and_then(|i| q.categories.get(i))
            {
                Some(category) => draft.place(item.id, category),
                None => draft.unplace(item.id),
            };
        }
        KeyCode::Char('0') | KeyCode::Backspace | KeyCode::Delete => {
            draft.unplace(item.id);
        }
        KeyCode::Char(c) => {
            if let Some(category) = digit(c).and_then(|i| q.categories.get(i)) {
                draft.place(item.id, category);
                cursor.index = step(cursor.index, q.options.len(), true);
            }
        }
        _ => {}
    }
}

fn text_key(draft: &mut Response, code: KeyCode) {
    match code {
        KeyCode::Char(c) => {
            draft.push_char(c);
        }
        KeyCode::Backspace => {
            draft.pop_char();
        }
        _ => {}
    }
}

fn gap_key(q: &GapFill, draft: &mut Response, cursor: &mut Cursor, code: KeyCode) {
    match code {
        KeyCode::Left | KeyCode::BackTab => {
            if let Some(prev) = q.previous_blank(cursor.index) {
                cursor.index = prev;
            }
        }
        KeyCode::Right | KeyCode::Tab => {
            if let Some(next) = q.next_blank(cursor.index) {
                cursor.index = next;
            }
        }
        KeyCode::Backspace => {
            if draft.letter_at(cursor.index).is_none() {
                if let Some(prev) = q.previous_blank(cursor.index) {
                    cursor.index = prev;
                }
            }
            draft.set_letter(cursor.index, "");
        }
        KeyCode::Char(c) if !c.is_whitespace() && q.is_blank(cursor.index) => {
            draft.set_letter(cursor.index, &c.to_string());
            if let Some(next) = q.next_blank(cursor.index) {
                cursor.index = next;
            }
        }
        _ => {}
    }
}

fn highlight_key(q: &Highlight, draft: &mut Response, cursor: &mut Cursor, code: KeyCode) {
    let len = q.units().len();
    match code {
        KeyCode::Left => cursor.index = step(cursor.index, len, false),
        KeyCode::Right => cursor.index = step(cursor.index, len, true),
        KeyCode::Char(' ') if q.takes_corrections() => {
            let existing = draft.correction_at(cursor.index).unwrap_or_default();
            cursor.editing = Some(existing.to_string());
        }
        KeyCode::Backspace | KeyCode::Delete if q.takes_corrections() => {
            draft.set_correction(cursor.index, "");
        }
        KeyCode::Char(' ') if cursor.index < len => {
            draft.toggle(cursor.index);
        }
        _ => {}
    }
}

fn click_key(q: &ClickToChange, draft: &mut Response, cursor: &mut Cursor, code: KeyCode) {
    let len = q.words.len();
    match code {
        KeyCode::Left => cursor.index = step(cursor.index, len, false),
        KeyCode::Right => cursor.index = step(cursor.index, len, true),
        KeyCode::Char(' ') if q.is_clickable(cursor.index) => {
            draft.toggle(cursor.index);
        }
        _ => {}
    }
}

fn multi_key(q: &MultiSelect, draft: &mut Response, cursor: &mut Cursor, code: KeyCode) {
    let len = q.options.len();
    match code {
        KeyCode::Up | KeyCode::Left => cursor.index = step(cursor.index, len, false),
        KeyCode::Down | KeyCode::Right => cursor.index = step(cursor.index, len, true),
        KeyCode::Char(' ') if cursor.index < len => {
            draft.toggle_capped(cursor.index, q.required_selections);
        }
        KeyCode::Char(c) => {
            if let Some(i) = digit(c).filter(|i| *i < len) {
                cursor.index = i;
                draft.toggle_capped(i, q.required_selections);
            }
        }
        _ => {}
    }
}

fn sequence_key(q: &Sequencing, draft: &mut Response, cursor: &mut Cursor, code: KeyCode) {
    let len = q.options.len();
    match code {
        KeyCode::Char(' ') => cursor.grabbed = !cursor.grabbed,
        KeyCode::Up | KeyCode::Down => {
            let to = step(cursor.index, len, code == KeyCode::Down);
            if cursor.grabbed && to != cursor.index {
                draft.move_item(cursor.index, to);
            }
            cursor.index = to;
        }
        _ => {}
    }
}

fn table_key(q: &TableMatch, draft: &mut Response, cursor: &mut Cursor, code: KeyCode) {
    let rows = q.rows.len();
    match code {
        KeyCode::Up => cursor.index = step(cursor.index, rows, false),
        KeyCode::Down => cursor.index = step(cursor.index, rows, true),
        KeyCode::Left | KeyCode::Right => {
            let current = draft
                .column_of(cursor.index)
                .and_then(|id| q.column_index(id));
            let forward = code == KeyCode::Right;
            // a row never goes back to unanswered
            let next = cycle(current, q.columns.len(), forward)
                .or_else(|| cycle(None, q.columns.len(), forward));
            if let Some(column) = next.and_then(|i| q.columns.get(i)) {
                draft.select_column(cursor.index, &column.id);
            }
        }
        KeyCode::Char(c) => {
            if let Some(column) = digit(c).and_then(|i| q.columns.get(i)) {
                draft.select_column(cursor.index, &column.id);
                cursor.index = step(cursor.index, rows, true);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_with(json: &str, kind: ExerciseKind) -> (App<FakeClock>, FakeClock) {
        let clock = FakeClock::new();
        let mut app = App::new(clock.clone(), AppSettings::default());
        app.start(ExerciseBank::from_json("test", kind, json).unwrap());
        (app, clock)
    }

    fn draft(app: &App<FakeClock>) -> Response {
        app.session().and_then(|s| s.draft()).cloned().unwrap()
    }

    #[test]
    fn cycle_wraps_through_none() {
        assert_eq!(cycle(None, 2, true), Some(0));
        assert_eq!(cycle(Some(1), 2, true), None);
        assert_eq!(cycle(None, 2, false), Some(1));
        assert_eq!(cycle(Some(0), 2, false), None);
        assert_eq!(cycle(None, 0, true), None);
    }

    #[test]
    fn menu_opens_builtin_bank() {
        let mut app = App::new(FakeClock::new(), AppSettings::default());
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Exercise);
        assert_eq!(app.last_exercise(), Some(ExerciseKind::FillIn));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Menu);
        assert!(app.session().is_none());
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Control::Quit);
    }

    const WITH_EXAMPLE: &str = r#"{ "name": "t", "kind": "fill_in",
        "example": { "question": "Add s for more than one",
                     "rows": [{ "label": "one dog, two ___", "answer": "dogs" }] },
        "exercises": [
            { "style": "word_completion", "sentence": "two {answer}", "given": "cat", "answer": "cats" }
        ] }"#;

    #[test]
    fn worked_example_toggles_without_touching_the_session() {
        let (mut app, clock) = app_with(WITH_EXAMPLE, ExerciseKind::FillIn);
        app.handle_key(key(KeyCode::Char('c')));

        app.handle_key(ctrl('e'));
        assert!(app.showing_example);

        // typing and enter are swallowed while the example is up
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(draft(&app), Response::Text("c".into()));
        let session = app.session().unwrap();
        assert_eq!(session.phase(), Phase::InProgress);
        assert!(session.results().questions.is_empty());

        clock.advance_secs(3);
        app.on_tick();
        assert_eq!(app.session().unwrap().stats().elapsed_seconds, 3);

        app.handle_key(ctrl('e'));
        assert!(!app.showing_example);
        app.handle_key(ctrl('e'));
        app.handle_key(key(KeyCode::Esc));
        assert!(!app.showing_example);
        assert_eq!(app.state, AppState::Exercise);
    }

    #[test]
    fn bank_without_example_reports_it() {
        let (mut app, _) = app_with(
            r#"{ "name": "t", "kind": "fill_in", "exercises": [
                { "style": "word_completion", "sentence": "two {answer}", "given": "cat", "answer": "cats" }
            ] }"#,
            ExerciseKind::FillIn,
        );
        app.handle_key(ctrl('e'));
        assert!(!app.showing_example);
        assert_eq!(app.status.as_deref(), Some("this exercise has no worked example"));
    }

    #[test]
    fn restart_closes_the_example() {
        let (mut app, _) = app_with(WITH_EXAMPLE, ExerciseKind::FillIn);
        app.handle_key(ctrl('e'));
        app.handle_key(ctrl('r'));
        assert!(!app.showing_example);
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let (mut app, _) = app_with(
            r#"{ "name": "t", "kind": "fill_in", "exercises": [
                { "style": "word_completion", "sentence": "two {answer}", "given": "cat", "answer": "cats" }
            ] }"#,
            ExerciseKind::FillIn,
        );
        assert_eq!(app.handle_key(ctrl('c')), Control::Quit);
    }

    #[test]
    fn typed_answer_is_submitted_with_enter() {
        let (mut app, clock) = app_with(
            r#"{ "name": "t", "kind": "fill_in", "exercises": [
                { "style": "word_completion", "sentence": "two {answer}", "given": "cat", "answer": "cats" }
            ] }"#,
            ExerciseKind::FillIn,
        );
        app.handle_key(key(KeyCode::Enter));
        assert!(app.status.is_some());

        for c in "Catz".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(draft(&app), Response::Text("Cats".into()));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().unwrap().phase(), Phase::CorrectDelay);

        clock.advance_secs(2);
        assert!(app.on_tick());
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.session().unwrap().results().correct_count, 1);
    }

    #[test]
    fn gap_fill_cursor_jumps_between_blanks() {
        let (mut app, _) = app_with(
            r#"{ "name": "t", "kind": "gap_fill", "exercises": [
                { "question": "Fill", "word": "rabbit", "blanks": [1, 4] }
            ] }"#,
            ExerciseKind::GapFill,
        );
        assert_eq!(app.cursor.index, 1);
        app.handle_key(key(KeyCode::Char('A')));
        assert_eq!(app.cursor.index, 4);
        app.handle_key(key(KeyCode::Char('i')));

        let r = draft(&app);
        assert_eq!(r.letter_at(1), Some("a"));
        assert_eq!(r.letter_at(4), Some("i"));

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(draft(&app).letter_at(4), None);
    }

    #[test]
    fn category_keys_place_and_cycle() {
        let (mut app, _) = app_with(
            r#"{ "name": "t", "kind": "category_sort", "exercises": [
                { "question": "Sort", "categories": ["A", "B"], "options": [
                    { "id": 1, "content": "one", "category": "A" },
                    { "id": 2, "content": "two", "category": "B" }
                ] }
            ] }"#,
            ExerciseKind::CategorySort,
        );
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.cursor.index, 1);
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));

        let r = draft(&app);
        assert_eq!(r.category_of(1), Some("A"));
        assert_eq!(r.category_of(2), Some("B"));

        app.handle_key(key(KeyCode::Enter));
        assert!(app.session().unwrap().results().questions[0].is_correct);
    }

    #[test]
    fn sequencing_moves_grabbed_item() {
        let (mut app, _) = app_with(
            r#"{ "name": "t", "kind": "sequencing", "exercises": [
                { "question": "Order", "options": [
                    { "id": 1, "content": "second", "order": 2 },
                    { "id": 2, "content": "first", "order": 1 }
                ] }
            ] }"#,
            ExerciseKind::Sequencing,
        );
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(draft(&app), Response::Order(vec![2, 1]));
        assert_eq!(app.cursor.index, 0);
    }

    #[test]
    fn pronoun_corrections_are_typed_in_edit_mode() {
        let (mut app, _) = app_with(
            r#"{ "name": "t", "kind": "highlight", "exercises": [
                { "question": "Fix", "type": "pronouns", "text": "Me went home",
                  "targets": [{ "word": "Me", "correction": "I" }] }
            ] }"#,
            ExerciseKind::Highlight,
        );
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.cursor.editing.as_deref(), Some(""));
        app.handle_key(key(KeyCode::Char('I')));
        // enter commits the correction instead of submitting
        app.handle_key(key(KeyCode::Enter));
        assert!(app.cursor.editing.is_none());
        assert_eq!(draft(&app).correction_at(0), Some("I"));
        assert_eq!(app.session().unwrap().phase(), Phase::InProgress);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().unwrap().phase(), Phase::CorrectDelay);
    }

    #[test]
    fn wrong_answer_needs_enter_to_continue() {
        let (mut app, _) = app_with(
            r#"{ "name": "t", "kind": "table_match", "exercises": [
                { "question": "Tense", "columns": [{ "id": "past", "label": "Past" }, { "id": "now", "label": "Now" }],
                  "rows": [{ "text": "I ran", "correct_answer": "past" }] },
                { "question": "Tense", "columns": [{ "id": "past", "label": "Past" }, { "id": "now", "label": "Now" }],
                  "rows": [{ "text": "I run", "correct_answer": "now" }] }
            ] }"#,
            ExerciseKind::TableMatch,
        );
        app.handle_key(key(KeyCode::Char('2')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().unwrap().phase(), Phase::AwaitingAck);

        // edits are ignored while the feedback is up
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(draft(&app).column_of(0), Some("now"));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().unwrap().current_index(), 1);
        assert!(draft(&app).is_empty());
    }

    #[test]
    fn results_restart_returns_to_first_question() {
        let (mut app, _) = app_with(
            r#"{ "name": "t", "kind": "multi_select", "exercises": [
                { "question": "Pick", "required_selections": 1,
                  "options": [{ "word": "a", "is_correct": true }, { "word": "b" }] }
            ] }"#,
            ExerciseKind::MultiSelect,
        );
        app.handle_key(key(KeyCode::Char('2')));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Results);

        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Exercise);
        assert_eq!(app.session().unwrap().results().answered(), 0);
    }

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Speaker for Recorder {
        fn speak(&mut self, text: &str) -> Result<(), crate::speech::SpeechError> {
            self.0.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn ctrl_p_reads_the_word_aloud() {
        let spoken = Rc::new(RefCell::new(Vec::new()));
        let mut app = App::with_speaker(
            FakeClock::new(),
            AppSettings::default(),
            Box::new(Recorder(spoken.clone())),
        );
        app.start(
            ExerciseBank::from_json(
                "t",
                ExerciseKind::GapFill,
                r#"{ "name": "t", "kind": "gap_fill", "exercises": [
                    { "question": "Fill", "word": "cat", "blanks": [1] }
                ] }"#,
            )
            .unwrap(),
        );
        app.handle_key(ctrl('p'));
        assert_eq!(*spoken.borrow(), vec!["cat".to_string()]);
    }

    #[test]
    fn empty_bank_goes_straight_to_results() {
        let (app, _) = app_with(
            r#"{ "name": "t", "kind": "sequencing", "exercises": [] }"#,
            ExerciseKind::Sequencing,
        );
        assert_eq!(app.state, AppState::Results);
    }
}
