//! "DataBase Workflow" panel: the workflow graph on a zoomable canvas.
//!
//! Canvas geometry is kept in pixels (see `dbstudio_core::canvas`) and
//! mapped to terminal cells of [`CELL_WIDTH`] x [`CELL_HEIGHT`] pixels.

use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use dbstudio_core::canvas::{
    centre_scroll, fill_missing_positions, pointer_to_canvas, ControlPointMap, ControlSlot,
    EdgeGeometry, EdgeKey, NodePositions, NodeWidths, ZoomLevel, BOX_HEIGHT, DEFAULT_BOX_WIDTH,
    GRAPH_MAX_ZOOM, GRAPH_MIN_ZOOM,
};
use dbstudio_core::history::PositionHistory;
use dbstudio_core::navigation::{NavOutcome, StepNavigator};
use dbstudio_core::types::{Point, Size};
use dbstudio_core::workflow::WorkflowStep;

use crate::ui::shell::panel_block;

pub const PANEL_TITLE: &str = "DataBase Workflow";

/// Canvas pixels per terminal column.
pub const CELL_WIDTH: f64 = 8.0;
/// Canvas pixels per terminal row.
pub const CELL_HEIGHT: f64 = 16.0;

const LABEL_PADDING: usize = 4;
const MIN_BOX_ROWS: i32 = 3;
const SCROLL_STEP: f64 = 4.0;

/// Toolbar buttons above the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphButton {
    ZoomIn,
    ZoomOut,
    Undo,
    Redo,
    StepBack,
    StepForward,
}

impl GraphButton {
    pub const ALL: [GraphButton; 6] = [
        GraphButton::ZoomIn,
        GraphButton::ZoomOut,
        GraphButton::Undo,
        GraphButton::Redo,
        GraphButton::StepBack,
        GraphButton::StepForward,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ZoomIn => "[+]",
            Self::ZoomOut => "[-]",
            Self::Undo => "[Undo]",
            Self::Redo => "[Redo]",
            Self::StepBack => "[◀ Step]",
            Self::StepForward => "[Step ▶]",
        }
    }

    /// Longer description shown in the status bar.
    pub fn title(self) -> &'static str {
        match self {
            Self::ZoomIn => "Zoom in",
            Self::ZoomOut => "Zoom out",
            Self::Undo => "Undo (2 steps)",
            Self::Redo => "Redo (2 steps)",
            Self::StepBack => "Step backward (remove last workflow box)",
            Self::StepForward => "Step forward (restore workflow box)",
        }
    }
}

/// Canvas width in pixels of the node box for `step`.
pub fn measured_width(step: WorkflowStep) -> f64 {
    (step.display_name().chars().count() + LABEL_PADDING) as f64 * CELL_WIDTH
}

#[derive(Debug)]
pub struct WorkflowGraph {
    positions: NodePositions,
    widths: NodeWidths,
    history: PositionHistory,
    navigator: StepNavigator,
    controls: ControlPointMap,
    zoom: ZoomLevel,
    scroll: Point,
    panel: Rect,
    canvas: Rect,
    toolbar: Vec<(Rect, GraphButton)>,
}

impl WorkflowGraph {
    /// Graph starting from previously saved node positions.
    pub fn new(positions: NodePositions) -> Self {
        Self {
            positions,
            widths: NodeWidths::new(),
            history: PositionHistory::new(),
            navigator: StepNavigator::new(),
            controls: ControlPointMap::new(),
            zoom: ZoomLevel::graph(),
            scroll: Point::default(),
            panel: Rect::default(),
            canvas: Rect::default(),
            toolbar: Vec::new(),
        }
    }

    pub fn positions(&self) -> &NodePositions {
        &self.positions
    }

    pub fn navigator(&self) -> &StepNavigator {
        &self.navigator
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    pub fn controls(&self) -> &ControlPointMap {
        &self.controls
    }

    pub fn scale(&self) -> f64 {
        self.zoom.scale()
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn canvas(&self) -> Rect {
        self.canvas
    }

    pub fn current_step(&self) -> Option<WorkflowStep> {
        self.navigator.current_step()
    }

    /// Show every step of `canonical` and measure their boxes.
    pub fn sync(&mut self, canonical: &[WorkflowStep]) {
        self.navigator.sync(canonical);
        for step in canonical {
            self.widths.insert(*step, measured_width(*step));
        }
    }

    /// Forget everything tied to the session. Node positions are kept.
    pub fn reset(&mut self) {
        self.navigator.sync(&[]);
        self.history.clear();
        self.controls.clear();
        self.zoom.reset();
        self.scroll = Point::default();
    }

    /// Place the toolbar and canvas inside the panel at `area`.
    pub fn layout(&mut self, area: Rect) {
        self.panel = area;
        let inner = panel_block(PANEL_TITLE, false).inner(area);
        let toolbar_row = Rect::new(inner.x, inner.y, inner.width, inner.height.min(1));
        self.canvas = Rect::new(
            inner.x,
            inner.y.saturating_add(1),
            inner.width,
            inner.height.saturating_sub(1),
        );

        self.toolbar.clear();
        let mut x = toolbar_row.x;
        for button in GraphButton::ALL {
            let width = button.label().chars().count() as u16;
            if x + width > toolbar_row.right() {
                break;
            }
            self.toolbar
                .push((Rect::new(x, toolbar_row.y, width, toolbar_row.height), button));
            x += width + 1;
        }
    }

    /// Give unplaced visible steps their default-layout slot. Returns
    /// `true` when positions changed and should be saved.
    pub fn fill_missing(&mut self) -> bool {
        if self.canvas.width == 0 {
            return false;
        }
        let container = f64::from(self.canvas.width) * CELL_WIDTH;
        let steps = self.navigator.partition();
        fill_missing_positions(&mut self.positions, &steps, &self.widths, container)
    }

    // ---- coordinates ----

    /// Cell of canvas point `p`, relative to the terminal origin.
    fn to_cell(&self, p: Point) -> (i32, i32) {
        let scale = self.zoom.scale();
        let col = ((p.x * scale - self.scroll.x) / CELL_WIDTH).round() as i32;
        let row = ((p.y * scale - self.scroll.y) / CELL_HEIGHT).round() as i32;
        (i32::from(self.canvas.x) + col, i32::from(self.canvas.y) + row)
    }

    /// Canvas point under the terminal cell `pos`.
    pub fn to_canvas(&self, pos: Position) -> Point {
        let pointer = Point::new(
            f64::from(pos.x.saturating_sub(self.canvas.x)) * CELL_WIDTH,
            f64::from(pos.y.saturating_sub(self.canvas.y)) * CELL_HEIGHT,
        );
        pointer_to_canvas(pointer, self.scroll, self.zoom.scale())
    }

    fn width_of(&self, step: WorkflowStep) -> f64 {
        self.widths.get(&step).copied().unwrap_or(DEFAULT_BOX_WIDTH)
    }

    /// Cell rectangle `(col, row, width, height)` of the node box.
    fn node_cells(&self, step: WorkflowStep) -> Option<(i32, i32, i32, i32)> {
        let origin = *self.positions.get(&step)?;
        let scale = self.zoom.scale();
        let (col, row) = self.to_cell(origin);
        let width = ((self.width_of(step) * scale) / CELL_WIDTH).round().max(3.0) as i32;
        let height = ((BOX_HEIGHT * scale) / CELL_HEIGHT)
            .round()
            .max(f64::from(MIN_BOX_ROWS)) as i32;
        Some((col, row, width, height))
    }

    /// Connectors between consecutive visible steps that both have a
    /// position.
    pub fn edges(&self) -> Vec<(EdgeKey, EdgeGeometry)> {
        EdgeKey::chain(self.navigator.visible())
            .into_iter()
            .filter_map(|key| {
                let from = self.positions.get(&key.from)?;
                let to = self.positions.get(&key.to)?;
                let geometry =
                    EdgeGeometry::between(*from, self.width_of(key.from), *to, self.controls.get(&key));
                Some((key, geometry))
            })
            .collect()
    }

    // ---- hit testing ----

    pub fn contains(&self, pos: Position) -> bool {
        self.panel.contains(pos)
    }

    pub fn button_at(&self, pos: Position) -> Option<GraphButton> {
        self.toolbar
            .iter()
            .find(|(rect, _)| rect.contains(pos))
            .map(|(_, button)| *button)
    }

    /// The topmost visible node under `pos`.
    pub fn node_at(&self, pos: Position) -> Option<WorkflowStep> {
        if !self.canvas.contains(pos) {
            return None;
        }
        let (x, y) = (i32::from(pos.x), i32::from(pos.y));
        self.navigator.visible().iter().rev().copied().find(|step| {
            self.node_cells(*step).is_some_and(|(col, row, width, height)| {
                x >= col && x < col + width && y >= row && y < row + height
            })
        })
    }

    /// The connector marker under `pos`.
    pub fn marker_at(&self, pos: Position) -> Option<(EdgeKey, ControlSlot)> {
        if !self.canvas.contains(pos) {
            return None;
        }
        let target = (i32::from(pos.x), i32::from(pos.y));
        self.edges().into_iter().find_map(|(key, geometry)| {
            geometry
                .markers()
                .into_iter()
                .find(|(_, point)| self.to_cell(*point) == target)
                .map(|(slot, _)| (key, slot))
        })
    }

    pub fn button_enabled(&self, button: GraphButton) -> bool {
        let scale = self.zoom.scale();
        match button {
            GraphButton::ZoomIn => scale < GRAPH_MAX_ZOOM,
            GraphButton::ZoomOut => scale > GRAPH_MIN_ZOOM,
            GraphButton::Undo => self.history.can_undo(),
            GraphButton::Redo => self.history.can_redo(),
            GraphButton::StepBack => self.navigator.can_step_back(),
            GraphButton::StepForward => self.navigator.can_step_forward(),
        }
    }

    // ---- commands ----

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
    }

    pub fn apply_wheel(&mut self, delta_y: f64) {
        self.zoom.apply_wheel(delta_y);
    }

    /// Scroll the viewport by whole cells. Never scrolls past the origin.
    pub fn scroll_by(&mut self, columns: f64, rows: f64) {
        self.scroll = Point::new(
            (self.scroll.x + columns * SCROLL_STEP * CELL_WIDTH).max(0.0),
            (self.scroll.y + rows * SCROLL_STEP * CELL_HEIGHT).max(0.0),
        );
    }

    /// Returns `true` when positions changed.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.positions.clone()) {
            Some(positions) => {
                self.positions = positions;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.positions.clone()) {
            Some(positions) => {
                self.positions = positions;
                true
            }
            None => false,
        }
    }

    /// Snapshot taken before a node drag started.
    pub fn record(&mut self, before: NodePositions) {
        self.history.record(before);
    }

    pub fn step_back(&mut self) -> NavOutcome {
        let outcome = self.navigator.step_back();
        if let NavOutcome::Focus(step) = outcome {
            self.centre_on(step);
        }
        outcome
    }

    pub fn step_forward(&mut self) -> NavOutcome {
        let outcome = self.navigator.step_forward();
        if let NavOutcome::Focus(step) = outcome {
            self.centre_on(step);
        }
        outcome
    }

    pub fn select(&mut self, step: WorkflowStep) -> bool {
        self.navigator.select(step)
    }

    /// Select the visible step `offset` places from the current one.
    pub fn select_relative(&mut self, offset: isize) -> Option<WorkflowStep> {
        let visible = self.navigator.visible();
        if visible.is_empty() {
            return None;
        }
        let last = visible.len() as isize - 1;
        let next = match self.navigator.current() {
            Some(idx) => (idx as isize + offset).clamp(0, last),
            None if offset < 0 => last,
            None => 0,
        };
        let step = visible[next as usize];
        self.navigator.select(step);
        self.centre_on(step);
        Some(step)
    }

    /// Scroll so that `step` sits in the middle of the canvas.
    pub fn centre_on(&mut self, step: WorkflowStep) {
        let Some(position) = self.positions.get(&step).copied() else {
            return;
        };
        let viewport = Size::new(
            f64::from(self.canvas.width) * CELL_WIDTH,
            f64::from(self.canvas.height) * CELL_HEIGHT,
        );
        self.scroll = centre_scroll(position, self.width_of(step), viewport, self.zoom.scale());
    }

    /// Offset between the pointer and the node origin when grabbing `step`.
    pub fn grab_offset(&self, step: WorkflowStep, pos: Position) -> Point {
        let pointer = self.to_canvas(pos);
        let origin = self.positions.get(&step).copied().unwrap_or_default();
        Point::new(pointer.x - origin.x, pointer.y - origin.y)
    }

    /// Move `step` so the grabbed point follows the pointer.
    pub fn move_node(&mut self, step: WorkflowStep, pos: Position, grab: Point) {
        let pointer = self.to_canvas(pos);
        let target = Point::new((pointer.x - grab.x).max(0.0), (pointer.y - grab.y).max(0.0));
        self.positions.insert(step, target);
    }

    pub fn set_control(&mut self, edge: EdgeKey, slot: ControlSlot, pos: Position) {
        let point = self.to_canvas(pos);
        self.controls.entry(edge).or_default().set(slot, point);
    }

    // ---- rendering ----

    pub fn render(&self, frame: &mut Frame, focused: bool) {
        let zoom_label = format!(" {:.0}% ", self.zoom.scale() * 100.0);
        let block = panel_block(PANEL_TITLE, focused).title_top(Line::from(zoom_label).right_aligned());
        frame.render_widget(block, self.panel);

        for (rect, button) in &self.toolbar {
            let style = if self.button_enabled(*button) {
                Style::default().fg(Color::LightCyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            frame.render_widget(Paragraph::new(button.label()).style(style), *rect);
        }

        let canvas = self.canvas;
        let buf = frame.buffer_mut();
        let edges = self.edges();

        let line_style = Style::default().fg(Color::Gray);
        for (_, geometry) in &edges {
            let (c0, r0) = self.to_cell(geometry.p0);
            let (c3, r3) = self.to_cell(geometry.p3);
            let span = (c3 - c0).abs() + (r3 - r0).abs();
            for point in geometry.sample((span as usize * 2).max(16)) {
                let (col, row) = self.to_cell(point);
                put(buf, canvas, col, row, "·", line_style);
            }
            put(buf, canvas, c3, r3, "▶", line_style);
        }

        let active = self.navigator.current_step();
        for step in self.navigator.visible() {
            if let Some(cells) = self.node_cells(*step) {
                draw_box(buf, canvas, cells, step.display_name(), active == Some(*step));
            }
        }

        let marker_style = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
        for (_, geometry) in &edges {
            for (_, point) in geometry.markers() {
                let (col, row) = self.to_cell(point);
                put(buf, canvas, col, row, "◆", marker_style);
            }
        }
    }
}

fn put(buf: &mut Buffer, clip: Rect, col: i32, row: i32, symbol: &str, style: Style) {
    let inside = col >= i32::from(clip.left())
        && col < i32::from(clip.right())
        && row >= i32::from(clip.top())
        && row < i32::from(clip.bottom());
    if !inside {
        return;
    }
    if let Some(cell) = buf.cell_mut((col as u16, row as u16)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

fn draw_box(
    buf: &mut Buffer,
    clip: Rect,
    (col, row, width, height): (i32, i32, i32, i32),
    label: &str,
    active: bool,
) {
    let border = if active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let fill = Style::default();
    let right = col + width - 1;
    let bottom = row + height - 1;

    for y in row..=bottom {
        for x in col..=right {
            let symbol = match (x == col, x == right, y == row, y == bottom) {
                (true, _, true, _) => "╭",
                (_, true, true, _) => "╮",
                (true, _, _, true) => "╰",
                (_, true, _, true) => "╯",
                (_, _, true, _) | (_, _, _, true) => "─",
                (true, _, _, _) | (_, true, _, _) => "│",
                _ => " ",
            };
            let style = if symbol == " " { fill } else { border };
            put(buf, clip, x, y, symbol, style);
        }
    }

    let room = (width - 2).max(0) as usize;
    let text: String = label.chars().take(room).collect();
    let offset = (room - text.chars().count()) / 2;
    let label_row = row + height / 2;
    let label_style = if active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    for (i, ch) in text.chars().enumerate() {
        let mut tmp = [0u8; 4];
        put(
            buf,
            clip,
            col + 1 + (offset + i) as i32,
            label_row,
            ch.encode_utf8(&mut tmp),
            label_style,
        );
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use WorkflowStep::*;

    fn graph(steps: &[WorkflowStep]) -> WorkflowGraph {
        let mut graph = WorkflowGraph::new(NodePositions::new());
        graph.layout(Rect::new(0, 0, 80, 20));
        graph.sync(steps);
        graph.fill_missing();
        graph
    }

    #[test]
    fn default_layout_places_boxes_left_to_right() {
        let graph = graph(&[Upload, ConvertToCsv]);
        assert_eq!(graph.positions()[&Upload], Point::new(50.0, 60.0));
        // 80px "Upload" box + 60px spacing
        assert_eq!(graph.positions()[&ConvertToCsv], Point::new(190.0, 60.0));
    }

    #[test]
    fn saved_positions_are_not_overwritten() {
        let mut saved = NodePositions::new();
        saved.insert(Upload, Point::new(300.0, 100.0));
        let mut graph = WorkflowGraph::new(saved);
        graph.layout(Rect::new(0, 0, 80, 20));
        graph.sync(&[Upload, ConvertToCsv]);
        assert!(graph.fill_missing());
        assert_eq!(graph.positions()[&Upload], Point::new(300.0, 100.0));
        assert!(!graph.fill_missing());
    }

    #[test]
    fn nodes_are_hit_by_their_cells() {
        let graph = graph(&[Upload, ConvertToCsv]);
        // canvas starts at (1, 2); (50, 60)px maps to 6.25 and 3.75 cells
        assert_eq!(graph.node_at(Position::new(7, 6)), Some(Upload));
        assert_eq!(graph.node_at(Position::new(16, 8)), Some(Upload));
        assert_eq!(graph.node_at(Position::new(3, 3)), None);
    }

    #[test]
    fn markers_are_hit_where_they_are_drawn() {
        let graph = graph(&[Upload, ConvertToCsv]);
        let (key, geometry) = graph.edges()[0];
        let (col, row) = graph.to_cell(geometry.markers()[1].1);
        assert_eq!(
            graph.marker_at(Position::new(col as u16, row as u16)),
            Some((key, ControlSlot::Second))
        );
    }

    #[test]
    fn dragged_node_follows_pointer_and_undoes() {
        let mut graph = graph(&[Upload, ConvertToCsv]);
        let before = graph.positions().clone();
        let grab = graph.grab_offset(Upload, Position::new(7, 6));

        graph.move_node(Upload, Position::new(17, 10), grab);
        graph.record(before.clone());
        assert_eq!(graph.positions()[&Upload], Point::new(50.0 + 80.0, 60.0 + 64.0));

        assert!(graph.undo());
        assert_eq!(graph.positions(), &before);
        assert!(graph.redo());
        assert_eq!(graph.positions()[&Upload], Point::new(130.0, 124.0));
        assert!(!graph.redo());
    }

    #[test]
    fn control_point_drag_accounts_for_zoom() {
        let mut graph = graph(&[Upload, ConvertToCsv]);
        graph.zoom_in();
        graph.zoom_in();
        let key = EdgeKey::new(Upload, ConvertToCsv);
        graph.set_control(key, ControlSlot::First, Position::new(13, 7));

        let c1 = graph.controls()[&key].c1.unwrap();
        assert!((c1.x - 96.0 / 1.2).abs() < 1e-9);
        assert!((c1.y - 80.0 / 1.2).abs() < 1e-9);
    }

    #[test]
    fn step_back_hides_last_node_and_centres_on_new_last() {
        let mut graph = graph(&[Upload, ConvertToCsv, CleanModify]);
        assert_eq!(graph.step_back(), NavOutcome::Focus(ConvertToCsv));
        assert_eq!(graph.navigator().visible(), &[Upload, ConvertToCsv]);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.step_forward(), NavOutcome::Focus(CleanModify));
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn select_relative_walks_visible_steps() {
        let mut graph = graph(&[Upload, ConvertToCsv]);
        assert_eq!(graph.select_relative(1), Some(Upload));
        assert_eq!(graph.select_relative(1), Some(ConvertToCsv));
        assert_eq!(graph.select_relative(1), Some(ConvertToCsv));
        assert_eq!(graph.current_step(), Some(ConvertToCsv));
    }

    #[test]
    fn reset_clears_session_but_keeps_positions() {
        let mut graph = graph(&[Upload, ConvertToCsv]);
        graph.zoom_in();
        graph.record(graph.positions().clone());
        graph.reset();

        assert!(graph.navigator().visible().is_empty());
        assert!(!graph.history().can_undo());
        assert_eq!(graph.scale(), 1.0);
        assert!(graph.positions().contains_key(&Upload));
    }

    #[test]
    fn render_draws_labels_and_toolbar() {
        let mut graph = graph(&[Upload, ConvertToCsv]);
        graph.select(Upload);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| graph.render(frame, true)).unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..80u16).map(|x| buffer[(x, 7)].symbol().to_string()).collect();
        assert!(row.contains("Upload"), "row was {row:?}");
        let toolbar: String = (0..80u16).map(|x| buffer[(x, 1)].symbol().to_string()).collect();
        assert!(toolbar.starts_with("│[+] [-] [Undo]"), "toolbar was {toolbar:?}");
    }
}
