//! Three-column shell with draggable one-cell handles.
//!
//! Left: action panel. Center: workflow graph. Right: messages over
//! generated code.

use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};
use ratatui::Frame;

use dbstudio_core::panels::{PanelId, PanelLayout, ResizeHandle, ResolvedLayout, HANDLE_SIZE};

use crate::storage::LocalStorage;

/// Screen areas of the main view from the most recent frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShellAreas {
    pub actions: Rect,
    pub graph: Rect,
    pub messages: Rect,
    pub code: Rect,
    pub left_center: Rect,
    pub center_right: Rect,
    pub messages_code: Rect,
}

impl ShellAreas {
    pub fn handle(&self, handle: ResizeHandle) -> Rect {
        match handle {
            ResizeHandle::LeftCenter => self.left_center,
            ResizeHandle::CenterRight => self.center_right,
            ResizeHandle::MessagesCode => self.messages_code,
        }
    }

    /// The resize handle under `pos`, if any.
    pub fn handle_at(&self, pos: Position) -> Option<ResizeHandle> {
        [
            ResizeHandle::LeftCenter,
            ResizeHandle::CenterRight,
            ResizeHandle::MessagesCode,
        ]
        .into_iter()
        .find(|handle| self.handle(*handle).contains(pos))
    }
}

/// Lay the shell out over `area`.
pub fn split(area: Rect, layout: &PanelLayout) -> (ShellAreas, ResolvedLayout) {
    let sizes = layout.resolve(area.width, area.height);
    let x = area.x;
    let y = area.y;

    let actions = Rect::new(x, y, sizes.left, area.height);
    let left_center = Rect::new(x + sizes.left, y, HANDLE_SIZE, area.height);
    let graph = Rect::new(left_center.right(), y, sizes.center, area.height);
    let center_right = Rect::new(graph.right(), y, HANDLE_SIZE, area.height);
    let right_x = center_right.right();

    let messages = Rect::new(right_x, y, sizes.right, sizes.messages);
    let messages_code = Rect::new(right_x, messages.bottom(), sizes.right, HANDLE_SIZE);
    let code = Rect::new(right_x, messages_code.bottom(), sizes.right, sizes.code);

    let areas = ShellAreas {
        actions,
        graph,
        messages,
        code,
        left_center,
        center_right,
        messages_code,
    };
    (areas.clamped(area), sizes)
}

impl ShellAreas {
    fn clamped(self, area: Rect) -> Self {
        Self {
            actions: self.actions.intersection(area),
            graph: self.graph.intersection(area),
            messages: self.messages.intersection(area),
            code: self.code.intersection(area),
            left_center: self.left_center.intersection(area),
            center_right: self.center_right.intersection(area),
            messages_code: self.messages_code.intersection(area),
        }
    }
}

/// Draw the three handles, highlighting the one being dragged.
pub fn render_handles(frame: &mut Frame, areas: &ShellAreas, dragging: Option<ResizeHandle>) {
    let buf = frame.buffer_mut();
    for handle in [
        ResizeHandle::LeftCenter,
        ResizeHandle::CenterRight,
        ResizeHandle::MessagesCode,
    ] {
        let rect = areas.handle(handle);
        let style = if dragging == Some(handle) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let symbol = if handle.is_vertical() { "─" } else { "│" };
        for y in rect.top()..rect.bottom() {
            for x in rect.left()..rect.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(symbol).set_style(style);
                }
            }
        }
    }
}

/// Bordered container used by every panel and full-screen view.
pub fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(Color::LightCyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(format!(" {title} "))
        .title_style(Style::default().add_modifier(Modifier::BOLD))
}

/// Panel sizes saved by earlier sessions.
pub fn restore_layout(storage: &LocalStorage) -> PanelLayout {
    PanelLayout::restore(PanelId::ALL.into_iter().filter_map(|panel| {
        storage
            .get_json::<u16>(panel.storage_key())
            .map(|size| (panel, size))
    }))
}

/// Save the sizes of the two panels beside `handle`.
pub fn persist_sizes(storage: &mut LocalStorage, layout: &PanelLayout, handle: ResizeHandle) {
    let (a, b) = handle.neighbours();
    for panel in [a, b] {
        let Some(size) = layout.explicit(panel) else {
            continue;
        };
        if let Err(e) = storage.set_json(panel.storage_key(), &size) {
            tracing::warn!(panel = panel.storage_key(), error = %e, "Failed to save panel size");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn areas_tile_the_screen() {
        let area = Rect::new(0, 0, 200, 40);
        let (areas, sizes) = split(area, &PanelLayout::new());

        assert_eq!(areas.actions.width, sizes.left);
        assert_eq!(areas.left_center.x, sizes.left);
        assert_eq!(areas.graph.x, sizes.left + 1);
        assert_eq!(areas.center_right.x, areas.graph.right());
        assert_eq!(areas.messages.right(), 200);
        assert_eq!(areas.code.bottom(), 40);
        assert_eq!(areas.messages.height + 1 + areas.code.height, 40);
    }

    #[test]
    fn handles_are_hit_tested() {
        let (areas, sizes) = split(Rect::new(0, 0, 200, 40), &PanelLayout::new());
        assert_eq!(
            areas.handle_at(Position::new(sizes.left, 5)),
            Some(ResizeHandle::LeftCenter)
        );
        assert_eq!(
            areas.handle_at(Position::new(areas.messages.x + 3, areas.messages.bottom())),
            Some(ResizeHandle::MessagesCode)
        );
        assert_eq!(areas.handle_at(Position::new(1, 1)), None);
    }

    #[test]
    fn resized_panels_are_persisted_and_restored() {
        let mut storage = LocalStorage::in_memory();
        let mut layout = PanelLayout::new();
        let start = layout.resolve(200, 40);
        layout.drag(ResizeHandle::LeftCenter, &start, 6);
        persist_sizes(&mut storage, &layout, ResizeHandle::LeftCenter);

        let restored = restore_layout(&storage);
        assert_eq!(restored.explicit(PanelId::Left), Some(start.left + 6));
        assert_eq!(restored.resolve(200, 40).left, start.left + 6);
    }
}
