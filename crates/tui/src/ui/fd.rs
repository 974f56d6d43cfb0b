//! Full-screen list of detected functional dependencies.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use dbstudio_core::fd::fd_lines;
use dbstudio_core::store::StudioState;

use crate::ui::shell::panel_block;
use crate::ui::table::BACK_HINT;

pub const VIEW_TITLE: &str = "Detected Functional Dependencies";

#[derive(Debug, Default)]
pub struct FdScreen {
    scroll: u16,
}

impl FdScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.scroll = 0;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }

    pub fn scroll_by(&mut self, lines: i32) {
        self.scroll = (i32::from(self.scroll) + lines).clamp(0, i32::from(u16::MAX)) as u16;
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &StudioState) {
        let block = panel_block(VIEW_TITLE, true).title_bottom(Line::from(BACK_HINT).right_aligned());
        let inner = block.inner(area);

        let empty = state.original_fds.is_empty();
        let lines: Vec<Line> = fd_lines(&state.original_fds)
            .into_iter()
            .map(|line| {
                if empty {
                    Line::styled(line, Style::default().fg(Color::DarkGray))
                } else {
                    Line::from(format!("• {line}"))
                }
            })
            .collect();

        let max = (lines.len() as u16).saturating_sub(inner.height);
        self.scroll = self.scroll.min(max);
        frame.render_widget(Paragraph::new(lines).block(block).scroll((self.scroll, 0)), area);
    }
}
