pub mod charting;
pub mod example;
pub mod exercise;
pub mod menu;
pub mod results;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::app::{App, AppState};
use crate::clock::Clock;
use screen::{ExerciseScreen, MenuScreen, ResultsScreen, Screen};

pub(crate) const HORIZONTAL_MARGIN: u16 = 5;
pub(crate) const VERTICAL_MARGIN: u16 = 2;

impl<C: Clock + Clone> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Menu => MenuScreen.render(self, area, buf),
            AppState::Exercise => ExerciseScreen.render(self, area, buf),
            AppState::Results => ResultsScreen.render(self, area, buf),
        }
    }
}

pub(crate) fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub(crate) fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub(crate) fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

pub(crate) fn green_bold() -> Style {
    bold().fg(Color::Green)
}

pub(crate) fn red_bold() -> Style {
    bold().fg(Color::Red)
}

/// Focus marker for the element under the keyboard cursor.
pub(crate) fn focused() -> Style {
    Style::default().add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
}

pub(crate) fn selected() -> Style {
    Style::default().fg(Color::Black).bg(Color::Yellow)
}

/// Area inside the screen margins.
pub(crate) fn inner(area: Rect) -> Rect {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(0)])
        .split(area)[0]
}

/// A `width` x `height` box centered in `area`, clipped to it.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
pub(crate) fn buffer_text(buf: &Buffer) -> String {
    buf.content().iter().map(|c| c.symbol()).collect()
}
