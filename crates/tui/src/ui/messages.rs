//! "Messages" panel: the message log plus navigation to the result views.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use dbstudio_core::store::StudioState;

use crate::ui::shell::panel_block;

pub const PANEL_TITLE: &str = "Messages";
pub const TABLES_TOGGLE: &str = "Normalized Tables";
pub const SHOW_ER_DIAGRAM: &str = "Show ER Diagram";
pub const SHOW_FDS: &str = "Show Functional Dependencies";

/// A selectable row below the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageItem {
    TablesToggle,
    Table(String),
    ShowErDiagram,
    ShowFds,
}

/// Navigation requested from the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRequest {
    OpenTable(String),
    ShowErDiagram,
    ShowFds,
}

#[derive(Debug, Default)]
pub struct MessagePanel {
    tables_open: bool,
    selected: usize,
    /// Lines scrolled up from the bottom of the log.
    scroll_back: u16,
    area: Rect,
    item_rows: Vec<(Rect, MessageItem)>,
}

impl MessagePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables_open(&self) -> bool {
        self.tables_open
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.area.contains(pos)
    }

    /// Rows offered for the current state.
    pub fn items(&self, state: &StudioState) -> Vec<MessageItem> {
        let mut items = Vec::new();
        if !state.normalized_tables.is_empty() {
            items.push(MessageItem::TablesToggle);
            if self.tables_open {
                items.extend(state.normalized_tables.iter().cloned().map(MessageItem::Table));
            }
        }
        if state.er_diagram_ready {
            items.push(MessageItem::ShowErDiagram);
        }
        if state.fd_ready {
            items.push(MessageItem::ShowFds);
        }
        items
    }

    fn activate(&mut self, item: MessageItem) -> Option<MessageRequest> {
        match item {
            MessageItem::TablesToggle => {
                self.tables_open = !self.tables_open;
                None
            }
            MessageItem::Table(name) => Some(MessageRequest::OpenTable(name)),
            MessageItem::ShowErDiagram => Some(MessageRequest::ShowErDiagram),
            MessageItem::ShowFds => Some(MessageRequest::ShowFds),
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent, state: &StudioState) -> Option<MessageRequest> {
        let items = self.items(state);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(items.len().saturating_sub(1));
                None
            }
            KeyCode::PageUp => {
                self.scroll(3);
                None
            }
            KeyCode::PageDown => {
                self.scroll(-3);
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let item = items.get(self.selected.min(items.len().saturating_sub(1)))?.clone();
                self.activate(item)
            }
            _ => None,
        }
    }

    /// Activate the row under `pos`.
    pub fn click(&mut self, pos: Position) -> Option<MessageRequest> {
        let (idx, item) = self
            .item_rows
            .iter()
            .enumerate()
            .find(|(_, (rect, _))| rect.contains(pos))
            .map(|(idx, (_, item))| (idx, item.clone()))?;
        self.selected = idx;
        self.activate(item)
    }

    /// Scroll the log up by `lines` (down when negative).
    pub fn scroll(&mut self, lines: i32) {
        let next = i32::from(self.scroll_back) + lines;
        self.scroll_back = next.clamp(0, i32::from(u16::MAX)) as u16;
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &StudioState, focused: bool) {
        self.area = area;
        let block = panel_block(PANEL_TITLE, focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let items = self.items(state);
        self.selected = self.selected.min(items.len().saturating_sub(1));
        let items_height = (items.len() as u16).min(inner.height / 2);
        let [log_area, items_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(items_height)]).areas(inner);

        let lines: Vec<Line> = state.messages.visible().map(Line::from).collect();
        let width = usize::from(log_area.width.max(1));
        let total: usize = state
            .messages
            .visible()
            .map(|msg| msg.chars().count().div_ceil(width).max(1))
            .sum();
        let overflow = (total as u16).saturating_sub(log_area.height);
        self.scroll_back = self.scroll_back.min(overflow);
        let offset = overflow - self.scroll_back;
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((offset, 0)),
            log_area,
        );

        self.item_rows.clear();
        for (idx, item) in items.into_iter().enumerate().take(usize::from(items_height)) {
            let row = Rect::new(items_area.x, items_area.y + idx as u16, items_area.width, 1);
            let (label, base) = match &item {
                MessageItem::TablesToggle => {
                    let arrow = if self.tables_open { "▲" } else { "▼" };
                    (format!("{TABLES_TOGGLE} {arrow}"), Style::default().fg(Color::LightCyan))
                }
                MessageItem::Table(name) => (format!("  • {name}"), Style::default()),
                MessageItem::ShowErDiagram => {
                    (format!("[{SHOW_ER_DIAGRAM}]"), Style::default().fg(Color::LightGreen))
                }
                MessageItem::ShowFds => {
                    (format!("[{SHOW_FDS}]"), Style::default().fg(Color::LightGreen))
                }
            };
            let style = if focused && idx == self.selected {
                base.bg(Color::Blue).add_modifier(Modifier::BOLD)
            } else {
                base
            };
            frame.render_widget(Paragraph::new(label).style(style), row);
            self.item_rows.push((row, item));
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;

    fn state_with_tables() -> StudioState {
        let mut state = StudioState::new();
        state.normalized_tables = vec!["Orders".into(), "Customers".into()];
        state
    }

    fn press(panel: &mut MessagePanel, state: &StudioState, code: KeyCode) -> Option<MessageRequest> {
        panel.handle_key(&KeyEvent::new(code, KeyModifiers::NONE), state)
    }

    #[test]
    fn buttons_follow_ready_flags() {
        let panel = MessagePanel::new();
        let mut state = StudioState::new();
        assert!(panel.items(&state).is_empty());

        state.fd_ready = true;
        assert_eq!(panel.items(&state), vec![MessageItem::ShowFds]);
        state.er_diagram_ready = true;
        assert_eq!(
            panel.items(&state),
            vec![MessageItem::ShowErDiagram, MessageItem::ShowFds]
        );
    }

    #[test]
    fn table_list_expands_and_opens_tables() {
        let mut panel = MessagePanel::new();
        let state = state_with_tables();

        assert_eq!(press(&mut panel, &state, KeyCode::Enter), None);
        assert!(panel.tables_open());
        assert_eq!(panel.items(&state).len(), 3);

        press(&mut panel, &state, KeyCode::Down);
        press(&mut panel, &state, KeyCode::Down);
        assert_eq!(
            press(&mut panel, &state, KeyCode::Enter),
            Some(MessageRequest::OpenTable("Customers".into()))
        );
    }

    #[test]
    fn clicking_rendered_rows_activates_them() {
        let mut panel = MessagePanel::new();
        let mut state = state_with_tables();
        state.er_diagram_ready = true;
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal
            .draw(|frame| panel.render(frame, frame.area(), &state, true))
            .unwrap();

        // rows sit at the bottom of the inner area: toggle, then the button
        assert_eq!(panel.click(Position::new(2, 10)), Some(MessageRequest::ShowErDiagram));
        assert_eq!(panel.click(Position::new(2, 9)), None);
        assert!(panel.tables_open());
    }

    #[test]
    fn suppressed_messages_are_not_drawn() {
        let mut panel = MessagePanel::new();
        let mut state = StudioState::new();
        state.messages.push("File uploaded successfully");
        state
            .messages
            .push("Unexpected token '<', \"<!DOCTYPE \"... is not valid JSON");
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal
            .draw(|frame| panel.render(frame, frame.area(), &state, false))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = (0..8u16)
            .flat_map(|y| (0..40u16).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol().to_string())
            .collect();
        assert!(text.contains("File uploaded successfully"));
        assert!(!text.contains("DOCTYPE"));
    }
}
