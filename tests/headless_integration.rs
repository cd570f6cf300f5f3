use std::fs;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use kwiz::app::{App, AppSettings, AppState, Control};
use kwiz::clock::FakeClock;
use kwiz::exercise::ExerciseKind;
use kwiz::runtime::{FixedTicker, QuizEvent, Runner, TestEventSource};
use kwiz::session::Phase;

const TWO_WORDS: &str = r#"{ "name": "two words", "kind": "fill_in", "exercises": [
    { "style": "word_completion", "sentence": "two {answer}", "given": "cat", "answer": "cats" },
    { "style": "word_completion", "sentence": "three {answer}", "given": "dog", "answer": "dogs" }
] }"#;

type TestRunner = Runner<TestEventSource, FixedTicker>;

fn headless() -> (Sender<QuizEvent>, TestRunner) {
    let (tx, source) = TestEventSource::channel();
    (tx, Runner::new(source, FixedTicker::new(Duration::from_millis(5))))
}

fn press(tx: &Sender<QuizEvent>, code: KeyCode) {
    tx.send(QuizEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .unwrap();
}

fn type_str(tx: &Sender<QuizEvent>, s: &str) {
    for c in s.chars() {
        press(tx, KeyCode::Char(c));
    }
}

/// Handle queued events until the source runs dry (a timeout tick) or the
/// app asks to quit.
fn drain(runner: &TestRunner, app: &mut App<FakeClock>) -> Control {
    for _ in 0..1000u32 {
        match runner.step() {
            QuizEvent::Tick => {
                app.on_tick();
                return Control::Continue;
            }
            QuizEvent::Resize => {}
            QuizEvent::Key(key) => {
                if app.handle_key(key) == Control::Quit {
                    return Control::Quit;
                }
            }
        }
    }
    Control::Continue
}

fn screen_text(app: &App<FakeClock>) -> String {
    let area = Rect::new(0, 0, 120, 40);
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    buf.content().iter().map(|cell| cell.symbol()).collect()
}

// Drives a whole session through the runtime the binary uses, without a TTY.
#[test]
fn headless_session_from_menu_to_results() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fill_in.json"), TWO_WORDS).unwrap();

    let clock = FakeClock::new();
    let settings = AppSettings {
        bank_dir: Some(dir.path().to_path_buf()),
        ..AppSettings::default()
    };
    let mut app = App::new(clock.clone(), settings);
    let (tx, runner) = headless();

    press(&tx, KeyCode::Char('2'));
    press(&tx, KeyCode::Enter);
    drain(&runner, &mut app);
    assert_eq!(app.state, AppState::Exercise);
    assert_eq!(app.last_exercise(), Some(ExerciseKind::FillIn));
    assert!(screen_text(&app).contains("two"));

    type_str(&tx, "cats");
    press(&tx, KeyCode::Enter);
    drain(&runner, &mut app);
    let session = app.session().unwrap();
    assert_eq!(session.phase(), Phase::CorrectDelay);
    assert!(screen_text(&app).contains("Correct!"));

    clock.advance_secs(2);
    drain(&runner, &mut app);
    let session = app.session().unwrap();
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.stats().elapsed_seconds, 2);

    type_str(&tx, "dogz");
    press(&tx, KeyCode::Enter);
    drain(&runner, &mut app);
    assert_eq!(app.session().unwrap().phase(), Phase::AwaitingAck);
    assert!(screen_text(&app).contains("Not quite"));

    press(&tx, KeyCode::Enter);
    drain(&runner, &mut app);
    assert_eq!(app.state, AppState::Results);
    let text = screen_text(&app);
    assert!(text.contains("50% score"));
    assert!(text.contains("dogz"));

    press(&tx, KeyCode::Char('q'));
    assert_eq!(drain(&runner, &mut app), Control::Quit);
}

#[test]
fn headless_restart_from_results() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("fill_in.json"), TWO_WORDS).unwrap();

    let clock = FakeClock::new();
    let mut app = App::new(
        clock.clone(),
        AppSettings {
            bank_dir: Some(dir.path().to_path_buf()),
            ..AppSettings::default()
        },
    );
    app.open(ExerciseKind::FillIn).unwrap();
    let (tx, runner) = headless();

    for word in ["nope", "nope"] {
        type_str(&tx, word);
        press(&tx, KeyCode::Enter);
        press(&tx, KeyCode::Enter);
    }
    drain(&runner, &mut app);
    assert_eq!(app.state, AppState::Results);
    assert_eq!(app.session().unwrap().results().wrong_count, 2);

    press(&tx, KeyCode::Char('r'));
    drain(&runner, &mut app);
    assert_eq!(app.state, AppState::Exercise);
    let session = app.session().unwrap();
    assert_eq!(session.current_index(), 0);
    assert!(session.results().questions.is_empty());

    press(&tx, KeyCode::Esc);
    drain(&runner, &mut app);
    assert_eq!(app.state, AppState::Menu);
    assert!(app.session().is_none());
}

#[test]
fn timer_ticks_flow_through_the_runner() {
    let clock = FakeClock::new();
    let mut app = App::new(clock.clone(), AppSettings::default());
    app.open(ExerciseKind::Sequencing).unwrap();
    let (_tx, runner) = headless();

    for _ in 0..5 {
        clock.advance_secs(1);
        drain(&runner, &mut app);
    }
    assert_eq!(app.session().unwrap().stats().elapsed_seconds, 5);
}
