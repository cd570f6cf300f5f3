use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::App;
use crate::clock::Clock;
use crate::ui::{example, exercise, menu, results};

/// A UI Screen boundary: draws one [`crate::app::AppState`].
pub trait Screen {
    fn render<C: Clock + Clone>(&self, app: &App<C>, area: Rect, buf: &mut Buffer);
}

/// Exercise picker
pub struct MenuScreen;

impl Screen for MenuScreen {
    fn render<C: Clock + Clone>(&self, app: &App<C>, area: Rect, buf: &mut Buffer) {
        menu::render_menu(app.menu_index, app.status.as_deref(), area, buf);
    }
}

/// Stats bar, current question and answer feedback
pub struct ExerciseScreen;

impl Screen for ExerciseScreen {
    fn render<C: Clock + Clone>(&self, app: &App<C>, area: Rect, buf: &mut Buffer) {
        let Some(session) = app.session() else {
            return;
        };
        match session.bank().example() {
            Some(worked) if app.showing_example => {
                example::render_example(session.kind(), worked, area, buf)
            }
            _ => exercise::render_exercise(session, &app.cursor, app.status.as_deref(), area, buf),
        }
    }
}

/// Final score, per-question table and timing chart
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render<C: Clock + Clone>(&self, app: &App<C>, area: Rect, buf: &mut Buffer) {
        if let Some(session) = app.session() {
            results::render_results(session, area, buf);
        }
    }
}
