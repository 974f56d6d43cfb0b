//! "Generated Code" panel.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use dbstudio_core::highlight::{tokenize, Token, TokenKind, CODE_PLACEHOLDER};

use crate::ui::shell::panel_block;

pub const PANEL_TITLE: &str = "Generated Code";

fn token_style(kind: TokenKind) -> Style {
    match kind {
        TokenKind::Keyword => Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        TokenKind::Builtin => Style::default().fg(Color::Cyan),
        TokenKind::String => Style::default().fg(Color::Green),
        TokenKind::Comment => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
        TokenKind::Number => Style::default().fg(Color::Yellow),
        TokenKind::Decorator => Style::default().fg(Color::LightBlue),
        TokenKind::FunctionName => Style::default()
            .fg(Color::LightYellow)
            .add_modifier(Modifier::BOLD),
        TokenKind::Plain => Style::default(),
    }
}

/// Highlighted copy of the current code text.
#[derive(Debug, Default)]
pub struct CodeViewer {
    lines: Vec<Vec<Token>>,
    scroll: u16,
    area: Rect,
}

impl CodeViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-highlight after the code text changed.
    pub fn set_code(&mut self, code: &str) {
        self.lines = if code.is_empty() {
            Vec::new()
        } else {
            tokenize(code)
        };
        self.scroll = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.area.contains(pos)
    }

    pub fn scroll_by(&mut self, lines: i32) {
        let max = self.lines.len().saturating_sub(1) as i32;
        self.scroll = (i32::from(self.scroll) + lines).clamp(0, max.max(0)) as u16;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-10),
            KeyCode::PageDown => self.scroll_by(10),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        self.area = area;
        let block = panel_block(PANEL_TITLE, focused);

        if self.lines.is_empty() {
            let placeholder = Paragraph::new(CODE_PLACEHOLDER)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let lines: Vec<Line> = self
            .lines
            .iter()
            .map(|tokens| {
                Line::from(
                    tokens
                        .iter()
                        .map(|token| Span::styled(token.text.as_str(), token_style(token.kind)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(block).scroll((self.scroll, 0)),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;

    fn screen(viewer: &mut CodeViewer) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 6)).unwrap();
        terminal
            .draw(|frame| viewer.render(frame, frame.area(), false))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..6u16)
            .flat_map(|y| (0..60u16).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol().to_string())
            .collect()
    }

    #[test]
    fn empty_code_shows_placeholder() {
        let mut viewer = CodeViewer::new();
        viewer.set_code("");
        assert!(screen(&mut viewer).contains(CODE_PLACEHOLDER));
    }

    #[test]
    fn keywords_are_styled() {
        let mut viewer = CodeViewer::new();
        viewer.set_code("def run():\n    return 1\n");
        let mut terminal = Terminal::new(TestBackend::new(30, 5)).unwrap();
        terminal
            .draw(|frame| viewer.render(frame, frame.area(), false))
            .unwrap();

        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(1u16, 1u16)].symbol(), "d");
        assert_eq!(buffer[(1u16, 1u16)].fg, Color::Magenta);
        assert_eq!(buffer[(5u16, 1u16)].fg, Color::LightYellow);
    }

    #[test]
    fn scrolling_is_clamped_to_the_text() {
        let mut viewer = CodeViewer::new();
        viewer.set_code("a = 1\nb = 2\nc = 3");
        viewer.scroll_by(10);
        assert_eq!(viewer.scroll, 2);
        viewer.scroll_by(-10);
        assert_eq!(viewer.scroll, 0);

        viewer.scroll_by(1);
        viewer.set_code("x = 1");
        assert_eq!(viewer.scroll, 0);
    }
}
