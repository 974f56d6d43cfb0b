//! Resizable panel shell: three columns, with the right column split into
//! Messages over Generated Code.
//!
//! Sizes are terminal cells. Dragging a handle moves space between its two
//! neighbours only, so the total is conserved.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::CoreError;

/// Width of a column handle and height of the row handle, in cells.
pub const HANDLE_SIZE: u16 = 1;

pub const DEFAULT_LEFT_WIDTH: u16 = 30;
pub const DEFAULT_RIGHT_WIDTH: u16 = 42;
pub const DEFAULT_MESSAGES_HEIGHT: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    Left,
    Center,
    Right,
    Messages,
    Code,
}

impl PanelId {
    pub const ALL: [PanelId; 5] = [
        PanelId::Left,
        PanelId::Center,
        PanelId::Right,
        PanelId::Messages,
        PanelId::Code,
    ];

    /// Key the panel's size is persisted under.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Left => "dbstudio-leftWidth",
            Self::Center => "dbstudio-centerWidth",
            Self::Right => "dbstudio-rightWidth",
            Self::Messages => "dbstudio-messagesHeight",
            Self::Code => "dbstudio-codeHeight",
        }
    }

    /// Smallest size a drag may leave the panel with.
    pub fn min_size(self) -> u16 {
        match self {
            Self::Left => 18,
            Self::Center | Self::Right => 24,
            Self::Messages | Self::Code => 4,
        }
    }
}

impl FromStr for PanelId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|panel| panel.storage_key() == s)
            .ok_or_else(|| CoreError::UnknownPanel(s.to_string()))
    }
}

/// A draggable boundary between two neighbouring panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    LeftCenter,
    CenterRight,
    MessagesCode,
}

impl ResizeHandle {
    /// The panels before and after the handle.
    pub fn neighbours(self) -> (PanelId, PanelId) {
        match self {
            Self::LeftCenter => (PanelId::Left, PanelId::Center),
            Self::CenterRight => (PanelId::Center, PanelId::Right),
            Self::MessagesCode => (PanelId::Messages, PanelId::Code),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::MessagesCode)
    }
}

/// Grow `a` by `delta` and shrink `b` by the same amount.
///
/// When either side would drop below its minimum it is pinned there and
/// the other side takes the rest, so `a + b` stays constant.
pub fn resize_pair(start_a: u16, start_b: u16, delta: i32, min_a: u16, min_b: u16) -> (u16, u16) {
    let total = i32::from(start_a) + i32::from(start_b);
    let mut a = i32::from(start_a) + delta;
    let mut b = i32::from(start_b) - delta;

    if a < i32::from(min_a) {
        a = i32::from(min_a);
        b = total - a;
    } else if b < i32::from(min_b) {
        b = i32::from(min_b);
        a = total - b;
    }

    (to_cells(a), to_cells(b))
}

fn to_cells(value: i32) -> u16 {
    u16::try_from(value.max(0)).unwrap_or(u16::MAX)
}

/// Concrete sizes for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedLayout {
    pub left: u16,
    pub center: u16,
    pub right: u16,
    pub messages: u16,
    pub code: u16,
}

impl ResolvedLayout {
    pub fn size(&self, panel: PanelId) -> u16 {
        match panel {
            PanelId::Left => self.left,
            PanelId::Center => self.center,
            PanelId::Right => self.right,
            PanelId::Messages => self.messages,
            PanelId::Code => self.code,
        }
    }
}

/// Explicit panel sizes chosen by the user.
///
/// Panels without an explicit size use their default; the center column
/// and the code pane are flexible and absorb whatever space is left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelLayout {
    sizes: BTreeMap<PanelId, u16>,
}

impl PanelLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted sizes.
    pub fn restore(entries: impl IntoIterator<Item = (PanelId, u16)>) -> Self {
        Self {
            sizes: entries.into_iter().collect(),
        }
    }

    pub fn explicit(&self, panel: PanelId) -> Option<u16> {
        self.sizes.get(&panel).copied()
    }

    /// Sizes for a shell of `width` × `height` cells, where `height` is the
    /// height of the right column.
    pub fn resolve(&self, width: u16, height: u16) -> ResolvedLayout {
        let available = width.saturating_sub(2 * HANDLE_SIZE);
        let mut left = self.explicit(PanelId::Left).unwrap_or(DEFAULT_LEFT_WIDTH);
        let mut right = self.explicit(PanelId::Right).unwrap_or(DEFAULT_RIGHT_WIDTH);

        // The center gives way first; then right and left shrink towards
        // their minimums.
        let center_min = PanelId::Center.min_size();
        let mut overflow = left
            .saturating_add(right)
            .saturating_add(center_min)
            .saturating_sub(available);
        let right_slack = right.saturating_sub(PanelId::Right.min_size()).min(overflow);
        right -= right_slack;
        overflow -= right_slack;
        let left_slack = left.saturating_sub(PanelId::Left.min_size()).min(overflow);
        left -= left_slack;
        let center = available.saturating_sub(left.saturating_add(right));

        let rows = height.saturating_sub(HANDLE_SIZE);
        let mut messages = self
            .explicit(PanelId::Messages)
            .unwrap_or(DEFAULT_MESSAGES_HEIGHT);
        let code_min = PanelId::Code.min_size();
        if messages.saturating_add(code_min) > rows {
            messages = rows
                .saturating_sub(code_min)
                .max(PanelId::Messages.min_size().min(rows));
        }
        let code = rows.saturating_sub(messages);

        ResolvedLayout {
            left,
            center,
            right,
            messages,
            code,
        }
    }

    /// Apply a drag of `delta` cells on `handle`, starting from the sizes
    /// captured when the drag began. Returns the two new neighbour sizes.
    pub fn drag(&mut self, handle: ResizeHandle, start: &ResolvedLayout, delta: i32) -> (u16, u16) {
        let (a, b) = handle.neighbours();
        let sizes = resize_pair(start.size(a), start.size(b), delta, a.min_size(), b.min_size());
        self.sizes.insert(a, sizes.0);
        self.sizes.insert(b, sizes.1);
        sizes
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn resize_moves_space_between_neighbours() {
        assert_eq!(resize_pair(40, 60, 10, 18, 24), (50, 50));
        assert_eq!(resize_pair(40, 60, -10, 18, 24), (30, 70));
    }

    #[test]
    fn resize_clamps_and_conserves_total() {
        assert_eq!(resize_pair(40, 60, -100, 18, 24), (18, 82));
        assert_eq!(resize_pair(40, 60, 100, 18, 24), (76, 24));
        for delta in -200..200 {
            let (a, b) = resize_pair(40, 60, delta, 18, 24);
            assert_eq!(a + b, 100);
            assert!(a >= 18 && b >= 24);
        }
    }

    #[test]
    fn storage_keys_parse_back_to_panels() {
        for panel in PanelId::ALL {
            assert_eq!(panel.storage_key().parse::<PanelId>().unwrap(), panel);
        }
        assert_matches!("sidebar".parse::<PanelId>(), Err(CoreError::UnknownPanel(_)));
    }

    #[test]
    fn defaults_leave_the_center_flexible() {
        let layout = PanelLayout::new().resolve(200, 40);
        assert_eq!(layout.left, DEFAULT_LEFT_WIDTH);
        assert_eq!(layout.right, DEFAULT_RIGHT_WIDTH);
        assert_eq!(layout.center, 200 - 2 - DEFAULT_LEFT_WIDTH - DEFAULT_RIGHT_WIDTH);
        assert_eq!(layout.messages, DEFAULT_MESSAGES_HEIGHT);
        assert_eq!(layout.code, 40 - 1 - DEFAULT_MESSAGES_HEIGHT);
    }

    #[test]
    fn restored_sizes_override_defaults() {
        let layout = PanelLayout::restore([(PanelId::Left, 20), (PanelId::Messages, 15)]);
        let resolved = layout.resolve(200, 40);
        assert_eq!(resolved.left, 20);
        assert_eq!(resolved.messages, 15);
    }

    #[test]
    fn narrow_terminal_shrinks_side_columns_to_minimums() {
        let resolved = PanelLayout::new().resolve(60, 40);
        assert_eq!(resolved.right, PanelId::Right.min_size());
        assert_eq!(resolved.left, PanelId::Left.min_size());
        assert_eq!(resolved.left + resolved.center + resolved.right, 58);
    }

    #[test]
    fn drag_updates_both_neighbours() {
        let mut layout = PanelLayout::new();
        let start = layout.resolve(200, 40);
        let (left, center) = layout.drag(ResizeHandle::LeftCenter, &start, 5);

        assert_eq!(left, start.left + 5);
        assert_eq!(center, start.center - 5);
        assert_eq!(layout.explicit(PanelId::Left), Some(left));
        assert_eq!(layout.resolve(200, 40).left, left);
    }

    #[test]
    fn vertical_drag_respects_minimums() {
        let mut layout = PanelLayout::new();
        let start = layout.resolve(200, 30);
        let (messages, code) = layout.drag(ResizeHandle::MessagesCode, &start, 100);
        assert_eq!(code, PanelId::Code.min_size());
        assert_eq!(messages + code, start.messages + start.code);
    }
}
