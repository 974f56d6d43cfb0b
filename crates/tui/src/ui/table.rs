//! Full-screen viewer of one normalized table.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use dbstudio_core::store::StudioState;
use dbstudio_core::table::TableView;

use crate::ui::shell::panel_block;

pub const VIEW_TITLE: &str = "Normalized Tables";
pub const BACK_HINT: &str = " Esc / b: back ";

#[derive(Debug, Default)]
pub struct TableScreen {
    offset: usize,
    /// First column shown; earlier columns scroll off to the left.
    column: usize,
    visible_rows: usize,
}

impl TableScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start again from the first row.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.column = 0;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        let page = self.visible_rows.max(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.offset = self.offset.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.offset += 1,
            KeyCode::PageUp => self.offset = self.offset.saturating_sub(page),
            KeyCode::PageDown => self.offset += page,
            KeyCode::Left | KeyCode::Char('h') => self.column = self.column.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => self.column += 1,
            KeyCode::Home => {
                self.offset = 0;
                self.column = 0;
            }
            _ => {}
        }
    }

    pub fn scroll_by(&mut self, rows: i32) {
        self.offset = shifted(self.offset, rows);
    }

    pub fn scroll_columns(&mut self, columns: i32) {
        self.column = shifted(self.column, columns);
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &StudioState) {
        let block = panel_block(VIEW_TITLE, true).title_bottom(Line::from(BACK_HINT).right_aligned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let view = match TableView::new(state.selected_table_data.as_ref()) {
            Ok(view) => view,
            Err(message) => {
                let name = state.selected_table.as_deref().unwrap_or_default();
                let lines = vec![
                    Line::styled(name, Style::default().add_modifier(Modifier::BOLD)),
                    Line::styled(message, Style::default().fg(Color::LightRed)),
                ];
                frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
                return;
            }
        };

        let [title_area, table_area] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(inner);
        frame.render_widget(
            Paragraph::new(Line::styled(
                view.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            title_area,
        );

        // header row takes one line
        self.visible_rows = usize::from(table_area.height.saturating_sub(1));
        let max_offset = view.rows.len().saturating_sub(self.visible_rows);
        self.offset = self.offset.min(max_offset);

        self.column = self.column.min(view.headers.len().saturating_sub(1));
        let skip = self.column;

        let widths: Vec<Constraint> = view
            .column_widths()
            .into_iter()
            .skip(skip)
            .map(|w| Constraint::Length(w as u16))
            .collect();
        let header = Row::new(view.headers.iter().skip(skip).map(|h| Cell::from(h.as_str())))
            .style(Style::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD));
        let rows = view.rows.iter().skip(self.offset).map(|row| {
            Row::new(row.iter().skip(skip).map(|cell| Cell::from(cell.as_str())))
        });

        frame.render_widget(
            Table::new(rows, widths).header(header).column_spacing(2),
            table_area,
        );
    }
}

fn shifted(value: usize, delta: i32) -> usize {
    if delta < 0 {
        value.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        value + delta as usize
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use dbstudio_core::table::{CellValue, NormalizedTable, NO_DATA_MESSAGE, NO_VALID_ROWS_MESSAGE};

    use super::*;

    fn screen_text(screen: &mut TableScreen, state: &StudioState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(50, 10)).unwrap();
        terminal
            .draw(|frame| screen.render(frame, frame.area(), state))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..10u16)
            .map(|y| (0..50u16).map(|x| buffer[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn orders() -> NormalizedTable {
        NormalizedTable {
            name: "Orders".into(),
            headers: vec!["order_id".into(), "customer_id".into()],
            rows: vec![
                vec![CellValue::Number(1.0), CellValue::Number(7.0)],
                vec![CellValue::Null, CellValue::Number(3.0)],
            ],
        }
    }

    #[test]
    fn valid_rows_are_listed_under_headers() {
        let mut state = StudioState::new();
        state.selected_table = Some("Orders".into());
        state.selected_table_data = Some(orders());

        let text = screen_text(&mut TableScreen::new(), &state);
        assert!(text.contains("order_id"));
        assert!(text.contains("customer_id"));
        assert!(text.contains(VIEW_TITLE));
        assert_eq!(text.lines().filter(|line| line.contains('7')).count(), 1);
        assert!(!text.contains('3'));
    }

    #[test]
    fn missing_data_shows_message() {
        let state = StudioState::new();
        assert!(screen_text(&mut TableScreen::new(), &state).contains(NO_DATA_MESSAGE));
    }

    #[test]
    fn table_without_valid_rows_says_so() {
        let mut state = StudioState::new();
        let mut table = orders();
        table.rows.remove(0);
        state.selected_table_data = Some(table);
        assert!(screen_text(&mut TableScreen::new(), &state).contains(NO_VALID_ROWS_MESSAGE));
    }

    #[test]
    fn offset_is_clamped_on_render() {
        let mut state = StudioState::new();
        state.selected_table_data = Some(orders());
        let mut screen = TableScreen::new();
        screen.scroll_by(50);
        screen_text(&mut screen, &state);
        assert_eq!(screen.offset(), 0);
    }

    #[test]
    fn wide_table_scrolls_to_its_last_column() {
        let mut state = StudioState::new();
        state.selected_table_data = Some(NormalizedTable {
            name: "Shipments".into(),
            headers: vec![
                "shipment_identifier".into(),
                "warehouse_location".into(),
                "delivery_postcode".into(),
            ],
            rows: vec![vec![
                CellValue::Number(1.0),
                CellValue::Text("north".into()),
                CellValue::Text("AB12".into()),
            ]],
        });
        let mut screen = TableScreen::new();
        assert!(!screen_text(&mut screen, &state).contains("delivery_postcode"));

        for _ in 0..5 {
            screen.handle_key(&KeyEvent::from(KeyCode::Right));
        }
        let text = screen_text(&mut screen, &state);
        assert_eq!(screen.column(), 2);
        assert!(text.contains("delivery_postcode"));
        assert!(text.contains("AB12"));
        assert!(!text.contains("shipment_identifier"));

        screen.scroll_columns(-1);
        assert!(screen_text(&mut screen, &state).contains("warehouse_location"));
    }
}
