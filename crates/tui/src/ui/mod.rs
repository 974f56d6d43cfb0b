//! Views of the studio and the application state that drives them.
//!
//! [`App`] turns terminal events into [`Command`]s for the runtime and
//! folds completed [`Outcome`]s back into the shared [`StudioState`].
//! Nothing in here touches the network.

pub mod actions;
pub mod code;
pub mod er;
pub mod fd;
pub mod graph;
pub mod messages;
pub mod shell;
pub mod table;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use dbstudio_core::canvas::{ControlSlot, EdgeKey, NodePositions, POSITIONS_STORAGE_KEY};
use dbstudio_core::navigation::NavOutcome;
use dbstudio_core::panels::{PanelLayout, ResizeHandle, ResolvedLayout};
use dbstudio_core::store::{StoreAction, StudioState};
use dbstudio_core::types::Point;
use dbstudio_core::workflow::WorkflowStep;

use crate::effects::{loading_table_message, Command, Outcome};
use crate::gesture::{Gesture, GestureTracker};
use crate::storage::LocalStorage;

use self::actions::{ActionPanel, ActionRequest};
use self::code::CodeViewer;
use self::er::{ErButton, ErDiagramScreen, ZOOM_HINT};
use self::fd::FdScreen;
use self::graph::{GraphButton, WorkflowGraph};
use self::messages::{MessagePanel, MessageRequest};
use self::shell::ShellAreas;
use self::table::TableScreen;

/// Which screen fills the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Main,
    Table,
    FunctionalDependencies,
    ErDiagram,
}

/// Panel of the main view receiving keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Actions,
    Graph,
    Messages,
    Code,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Actions => Self::Graph,
            Self::Graph => Self::Messages,
            Self::Messages => Self::Code,
            Self::Code => Self::Actions,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Actions => Self::Code,
            Self::Graph => Self::Actions,
            Self::Messages => Self::Graph,
            Self::Code => Self::Messages,
        }
    }
}

// ---------------------------------------------------------------------------
// Drag gestures
// ---------------------------------------------------------------------------

/// A left-button drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DragGesture {
    /// Moving a panel boundary.
    Resize {
        handle: ResizeHandle,
        start: ResolvedLayout,
        origin: Position,
        pointer: Position,
    },
    /// Moving a workflow node. `before` is the snapshot for undo.
    Node {
        step: WorkflowStep,
        grab: Point,
        before: NodePositions,
        origin: Position,
        pointer: Position,
    },
    /// Reshaping a connector through one of its markers.
    Control {
        edge: EdgeKey,
        slot: ControlSlot,
        pointer: Position,
    },
    /// Panning the ER diagram.
    Pan {
        start: (u16, u16),
        origin: Position,
        pointer: Position,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Resized(ResizeHandle),
    NodeMoved { before: NodePositions },
    /// Pressed and released on a node without moving.
    NodeClicked(WorkflowStep),
    Reshaped,
    Panned,
}

impl Gesture for DragGesture {
    type Outcome = DragOutcome;

    fn moved(&mut self, to: Position) {
        match self {
            Self::Resize { pointer, .. }
            | Self::Node { pointer, .. }
            | Self::Control { pointer, .. }
            | Self::Pan { pointer, .. } => *pointer = to,
        }
    }

    fn finish(self) -> DragOutcome {
        match self {
            Self::Resize { handle, .. } => DragOutcome::Resized(handle),
            Self::Node {
                step,
                before,
                origin,
                pointer,
                ..
            } => {
                if pointer == origin {
                    DragOutcome::NodeClicked(step)
                } else {
                    DragOutcome::NodeMoved { before }
                }
            }
            Self::Control { .. } => DragOutcome::Reshaped,
            Self::Pan { .. } => DragOutcome::Panned,
        }
    }
}

fn offset(value: u16, delta: i32) -> u16 {
    (i32::from(value) + delta).clamp(0, i32::from(u16::MAX)) as u16
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct App {
    state: StudioState,
    storage: LocalStorage,
    view: View,
    focus: Focus,
    panels: PanelLayout,
    shell: ShellAreas,
    resolved: ResolvedLayout,
    actions: ActionPanel,
    graph: WorkflowGraph,
    messages: MessagePanel,
    code: CodeViewer,
    table: TableScreen,
    fds: FdScreen,
    er: ErDiagramScreen,
    drag: GestureTracker<DragGesture>,
    quit: bool,
}

impl App {
    /// Fresh session with panel sizes and node positions restored from
    /// `storage`.
    pub fn new(storage: LocalStorage) -> Self {
        let panels = shell::restore_layout(&storage);
        let positions = storage
            .get_json::<NodePositions>(POSITIONS_STORAGE_KEY)
            .unwrap_or_default();
        tracing::debug!(saved_positions = positions.len(), "Restored studio layout");

        Self {
            state: StudioState::new(),
            storage,
            view: View::Main,
            focus: Focus::Actions,
            panels,
            shell: ShellAreas::default(),
            resolved: ResolvedLayout::default(),
            actions: ActionPanel::new(),
            graph: WorkflowGraph::new(positions),
            messages: MessagePanel::new(),
            code: CodeViewer::new(),
            table: TableScreen::new(),
            fds: FdScreen::new(),
            er: ErDiagramScreen::new(),
            drag: GestureTracker::new(),
            quit: false,
        }
    }

    pub fn state(&self) -> &StudioState {
        &self.state
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn panels(&self) -> &PanelLayout {
        &self.panels
    }

    pub fn shell(&self) -> &ShellAreas {
        &self.shell
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn messages(&self) -> &MessagePanel {
        &self.messages
    }

    pub fn code(&self) -> &CodeViewer {
        &self.code
    }

    pub fn table(&self) -> &TableScreen {
        &self.table
    }

    pub fn er(&self) -> &ErDiagramScreen {
        &self.er
    }

    pub fn drag(&self) -> Option<&DragGesture> {
        self.drag.active()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// End whatever gesture is active and stop the event loop.
    pub fn quit(&mut self) {
        self.end_gesture();
        self.quit = true;
    }

    /// Apply store actions and keep the views in step with the state.
    pub fn dispatch(&mut self, actions: impl IntoIterator<Item = StoreAction>) {
        let changes = self.state.apply_all(actions);
        if changes.reset {
            tracing::info!("Workflow refreshed");
            self.end_gesture();
            self.graph.reset();
            self.messages = MessagePanel::new();
            self.er.close();
            self.view = View::Main;
        }
        if changes.steps {
            self.graph.sync(self.state.workflow_steps.as_slice());
        }
        if changes.code {
            self.code.set_code(&self.state.current_code);
        }
    }

    /// Fold a completed command back in.
    pub fn apply_outcome(&mut self, outcome: Outcome) -> Vec<Command> {
        match outcome {
            Outcome::Store(actions) => {
                self.dispatch(actions);
                Vec::new()
            }
            Outcome::TableOpened(actions) => {
                self.dispatch(actions);
                self.show(View::Table)
            }
            Outcome::ErDiagram(result) => {
                self.er.receive(result);
                Vec::new()
            }
        }
    }

    /// Switch screens. Leaving a screen ends any drag on it.
    pub fn show(&mut self, view: View) -> Vec<Command> {
        let mut commands = self.end_gesture();
        if self.view == View::ErDiagram && view != View::ErDiagram {
            self.er.close();
        }
        self.view = view;
        match view {
            View::Main => {}
            View::Table => self.table.reset(),
            View::FunctionalDependencies => self.fds.reset(),
            View::ErDiagram => commands.push(self.er.open()),
        }
        commands
    }

    // ---- events ----

    pub fn handle_event(&mut self, event: &Event) -> Vec<Command> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key(key),
            Event::Mouse(mouse) => self.on_mouse(mouse),
            Event::FocusLost => self.end_gesture(),
            _ => Vec::new(),
        }
    }

    fn on_key(&mut self, key: &KeyEvent) -> Vec<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return Vec::new();
        }
        if key.code == KeyCode::Esc && self.drag.is_active() {
            return self.end_gesture();
        }

        match self.view {
            View::Main => self.on_main_key(key),
            View::Table => {
                if is_back(key) {
                    return self.show(View::Main);
                }
                if key.code == KeyCode::Char('q') {
                    self.quit();
                }
                self.table.handle_key(key);
                Vec::new()
            }
            View::FunctionalDependencies => {
                if is_back(key) {
                    return self.show(View::Main);
                }
                if key.code == KeyCode::Char('q') {
                    self.quit();
                }
                self.fds.handle_key(key);
                Vec::new()
            }
            View::ErDiagram => self.on_er_key(key),
        }
    }

    fn on_main_key(&mut self, key: &KeyEvent) -> Vec<Command> {
        if self.actions.is_prompting() {
            let request = self.actions.handle_key(key);
            return self.run_action(request);
        }
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return Vec::new();
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return Vec::new();
            }
            _ => {}
        }

        match self.focus {
            Focus::Actions => {
                let request = self.actions.handle_key(key);
                self.run_action(request)
            }
            Focus::Graph => self.on_graph_key(key),
            Focus::Messages => {
                let request = self.messages.handle_key(key, &self.state);
                self.on_message_request(request)
            }
            Focus::Code => {
                self.code.handle_key(key);
                Vec::new()
            }
        }
    }

    fn on_graph_key(&mut self, key: &KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => self.press_graph_button(GraphButton::ZoomIn),
            KeyCode::Char('-') => self.press_graph_button(GraphButton::ZoomOut),
            KeyCode::Char('u') => self.press_graph_button(GraphButton::Undo),
            KeyCode::Char('r') => self.press_graph_button(GraphButton::Redo),
            KeyCode::Char('[') => self.press_graph_button(GraphButton::StepBack),
            KeyCode::Char(']') => self.press_graph_button(GraphButton::StepForward),
            KeyCode::Left => {
                self.graph.select_relative(-1);
                Vec::new()
            }
            KeyCode::Right => {
                self.graph.select_relative(1);
                Vec::new()
            }
            KeyCode::Enter => self
                .graph
                .current_step()
                .map(|step| vec![Command::LoadCode(step)])
                .unwrap_or_default(),
            KeyCode::Char('h') => self.scroll_graph(-1.0, 0.0),
            KeyCode::Char('l') => self.scroll_graph(1.0, 0.0),
            KeyCode::Char('k') => self.scroll_graph(0.0, -1.0),
            KeyCode::Char('j') => self.scroll_graph(0.0, 1.0),
            _ => Vec::new(),
        }
    }

    fn on_er_key(&mut self, key: &KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => return self.show(View::Main),
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.er.zoom_in(),
            KeyCode::Char('-') => self.er.zoom_out(),
            KeyCode::Char('0') | KeyCode::Char('r') => self.er.reset_view(),
            KeyCode::Left | KeyCode::Char('h') => self.er.pan_by(-4, 0),
            KeyCode::Right | KeyCode::Char('l') => self.er.pan_by(4, 0),
            KeyCode::Up | KeyCode::Char('k') => self.er.pan_by(0, -2),
            KeyCode::Down | KeyCode::Char('j') => self.er.pan_by(0, 2),
            _ => {}
        }
        Vec::new()
    }

    fn on_mouse(&mut self, mouse: &MouseEvent) -> Vec<Command> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.on_press(pos),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.on_drag(pos);
                Vec::new()
            }
            MouseEventKind::Up(MouseButton::Left) => self.end_gesture(),
            MouseEventKind::ScrollUp => {
                self.on_wheel(pos, -1.0, mouse.modifiers);
                Vec::new()
            }
            MouseEventKind::ScrollDown => {
                self.on_wheel(pos, 1.0, mouse.modifiers);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn on_press(&mut self, pos: Position) -> Vec<Command> {
        match self.view {
            View::Main => self.on_main_press(pos),
            View::ErDiagram => {
                if let Some(button) = self.er.button_at(pos) {
                    return self.press_er_button(button);
                }
                if self.er.contains(pos) {
                    return self.begin(DragGesture::Pan {
                        start: self.er.scroll(),
                        origin: pos,
                        pointer: pos,
                    });
                }
                Vec::new()
            }
            View::Table | View::FunctionalDependencies => Vec::new(),
        }
    }

    fn on_main_press(&mut self, pos: Position) -> Vec<Command> {
        if let Some(handle) = self.shell.handle_at(pos) {
            return self.begin(DragGesture::Resize {
                handle,
                start: self.resolved,
                origin: pos,
                pointer: pos,
            });
        }

        if self.shell.actions.contains(pos) {
            self.focus = Focus::Actions;
            let request = self.actions.click(pos);
            return self.run_action(request);
        }

        if self.graph.contains(pos) {
            self.focus = Focus::Graph;
            if let Some(button) = self.graph.button_at(pos) {
                return self.press_graph_button(button);
            }
            if let Some((edge, slot)) = self.graph.marker_at(pos) {
                return self.begin(DragGesture::Control {
                    edge,
                    slot,
                    pointer: pos,
                });
            }
            if let Some(step) = self.graph.node_at(pos) {
                let grab = self.graph.grab_offset(step, pos);
                return self.begin(DragGesture::Node {
                    step,
                    grab,
                    before: self.graph.positions().clone(),
                    origin: pos,
                    pointer: pos,
                });
            }
            return Vec::new();
        }

        if self.messages.contains(pos) {
            self.focus = Focus::Messages;
            let request = self.messages.click(pos);
            return self.on_message_request(request);
        }

        if self.code.contains(pos) {
            self.focus = Focus::Code;
        }
        Vec::new()
    }

    fn on_drag(&mut self, pos: Position) {
        if !self.drag.update(pos) {
            return;
        }
        match self.drag.active() {
            Some(DragGesture::Resize {
                handle,
                start,
                origin,
                pointer,
            }) => {
                let delta = if handle.is_vertical() {
                    i32::from(pointer.y) - i32::from(origin.y)
                } else {
                    i32::from(pointer.x) - i32::from(origin.x)
                };
                self.panels.drag(*handle, start, delta);
            }
            Some(DragGesture::Node {
                step, grab, pointer, ..
            }) => self.graph.move_node(*step, *pointer, *grab),
            Some(DragGesture::Control {
                edge,
                slot,
                pointer,
            }) => self.graph.set_control(*edge, *slot, *pointer),
            Some(DragGesture::Pan {
                start,
                origin,
                pointer,
            }) => {
                let dx = i32::from(origin.x) - i32::from(pointer.x);
                let dy = i32::from(origin.y) - i32::from(pointer.y);
                self.er.set_scroll((offset(start.0, dx), offset(start.1, dy)));
            }
            None => {}
        }
    }

    fn on_wheel(&mut self, pos: Position, delta_y: f64, modifiers: KeyModifiers) {
        let zoom = modifiers.contains(KeyModifiers::CONTROL);
        let lines = delta_y as i32;
        match self.view {
            View::ErDiagram if zoom => self.er.apply_wheel(delta_y),
            View::ErDiagram => self.er.pan_by(0, lines * 2),
            View::Table if modifiers.contains(KeyModifiers::SHIFT) => {
                self.table.scroll_columns(lines)
            }
            View::Table => self.table.scroll_by(lines),
            View::FunctionalDependencies => self.fds.scroll_by(lines),
            View::Main => {
                if self.graph.contains(pos) {
                    if zoom {
                        self.graph.apply_wheel(delta_y);
                    } else if modifiers.contains(KeyModifiers::SHIFT) {
                        self.graph.scroll_by(delta_y, 0.0);
                    } else {
                        self.graph.scroll_by(0.0, delta_y);
                    }
                } else if self.messages.contains(pos) {
                    self.messages.scroll(-lines);
                } else if self.code.contains(pos) {
                    self.code.scroll_by(lines);
                }
            }
        }
    }

    // ---- gestures ----

    fn begin(&mut self, gesture: DragGesture) -> Vec<Command> {
        match self.drag.begin(gesture) {
            Some(previous) => self.finish_drag(previous),
            None => Vec::new(),
        }
    }

    /// End the active gesture, if any. Runs on release, Escape, view
    /// changes and quit.
    pub fn end_gesture(&mut self) -> Vec<Command> {
        match self.drag.end() {
            Some(outcome) => self.finish_drag(outcome),
            None => Vec::new(),
        }
    }

    fn finish_drag(&mut self, outcome: DragOutcome) -> Vec<Command> {
        match outcome {
            DragOutcome::Resized(handle) => {
                shell::persist_sizes(&mut self.storage, &self.panels, handle);
            }
            DragOutcome::NodeMoved { before } => {
                self.graph.record(before);
                self.save_positions();
            }
            DragOutcome::NodeClicked(step) => {
                self.graph.select(step);
                return vec![Command::LoadCode(step)];
            }
            DragOutcome::Reshaped | DragOutcome::Panned => {}
        }
        Vec::new()
    }

    // ---- panel requests ----

    fn run_action(&mut self, request: Option<ActionRequest>) -> Vec<Command> {
        match request {
            Some(ActionRequest::Run(command)) => {
                tracing::debug!(?command, "Action requested");
                vec![command]
            }
            Some(ActionRequest::Reset) => {
                self.dispatch([StoreAction::Reset]);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn on_message_request(&mut self, request: Option<MessageRequest>) -> Vec<Command> {
        match request {
            Some(MessageRequest::OpenTable(name)) => {
                self.dispatch([StoreAction::message(loading_table_message(&name))]);
                vec![Command::OpenTable(name)]
            }
            Some(MessageRequest::ShowErDiagram) => self.show(View::ErDiagram),
            Some(MessageRequest::ShowFds) => self.show(View::FunctionalDependencies),
            None => Vec::new(),
        }
    }

    fn press_graph_button(&mut self, button: GraphButton) -> Vec<Command> {
        match button {
            GraphButton::ZoomIn => self.graph.zoom_in(),
            GraphButton::ZoomOut => self.graph.zoom_out(),
            GraphButton::Undo => {
                if self.graph.undo() {
                    self.save_positions();
                }
            }
            GraphButton::Redo => {
                if self.graph.redo() {
                    self.save_positions();
                }
            }
            GraphButton::StepBack => {
                let outcome = self.graph.step_back();
                return self.on_navigation(outcome);
            }
            GraphButton::StepForward => {
                let outcome = self.graph.step_forward();
                return self.on_navigation(outcome);
            }
        }
        Vec::new()
    }

    fn press_er_button(&mut self, button: ErButton) -> Vec<Command> {
        match button {
            ErButton::ZoomIn => self.er.zoom_in(),
            ErButton::ZoomOut => self.er.zoom_out(),
            ErButton::Reset => self.er.reset_view(),
            ErButton::Back => return self.show(View::Main),
        }
        Vec::new()
    }

    fn on_navigation(&mut self, outcome: NavOutcome) -> Vec<Command> {
        match outcome {
            NavOutcome::Focus(step) => vec![Command::LoadCode(step)],
            NavOutcome::Emptied => {
                self.dispatch([StoreAction::SetCurrentCode(String::new())]);
                Vec::new()
            }
            NavOutcome::Unchanged => Vec::new(),
        }
    }

    fn scroll_graph(&mut self, columns: f64, rows: f64) -> Vec<Command> {
        self.graph.scroll_by(columns, rows);
        Vec::new()
    }

    fn save_positions(&mut self) {
        if let Err(e) = self
            .storage
            .set_json(POSITIONS_STORAGE_KEY, self.graph.positions())
        {
            tracing::warn!(error = %e, "Failed to save node positions");
        }
    }

    // ---- rendering ----

    pub fn render(&mut self, frame: &mut Frame) {
        let [body, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());
        match self.view {
            View::Main => self.render_main(frame, body),
            View::Table => self.table.render(frame, body, &self.state),
            View::FunctionalDependencies => self.fds.render(frame, body, &self.state),
            View::ErDiagram => self.er.render(frame, body),
        }
        frame.render_widget(
            Paragraph::new(self.status_hint()).style(Style::default().fg(Color::DarkGray)),
            status,
        );
    }

    fn render_main(&mut self, frame: &mut Frame, area: Rect) {
        let (areas, resolved) = shell::split(area, &self.panels);
        self.shell = areas;
        self.resolved = resolved;

        self.actions
            .render(frame, areas.actions, self.focus == Focus::Actions);

        self.graph.layout(areas.graph);
        if self.graph.fill_missing() {
            self.save_positions();
        }
        self.graph.render(frame, self.focus == Focus::Graph);

        self.messages
            .render(frame, areas.messages, &self.state, self.focus == Focus::Messages);
        self.code
            .render(frame, areas.code, self.focus == Focus::Code);

        let dragging = match self.drag.active() {
            Some(DragGesture::Resize { handle, .. }) => Some(*handle),
            _ => None,
        };
        shell::render_handles(frame, &areas, dragging);
    }

    fn status_hint(&self) -> String {
        match self.view {
            View::Main if self.actions.is_prompting() => {
                "Type a dataset path  Enter: upload  Esc: cancel".to_string()
            }
            View::Main => match self.focus {
                Focus::Actions => "Tab: next panel  ↑↓: select  Enter: run  q: quit".to_string(),
                Focus::Graph => format!(
                    "+ {}  - {}  u {}  r {}  [ {}  ] {}  Enter: code  hjkl: scroll",
                    GraphButton::ZoomIn.title(),
                    GraphButton::ZoomOut.title(),
                    GraphButton::Undo.title(),
                    GraphButton::Redo.title(),
                    GraphButton::StepBack.title(),
                    GraphButton::StepForward.title(),
                ),
                Focus::Messages => "↑↓: select  Enter: open  PgUp/PgDn: scroll".to_string(),
                Focus::Code => "↑↓ PgUp/PgDn: scroll  Tab: next panel".to_string(),
            },
            View::Table => "Esc / b: back  ↑↓: rows  ←→: columns".to_string(),
            View::FunctionalDependencies => "Esc / b: back  ↑↓: scroll".to_string(),
            View::ErDiagram => format!("{ZOOM_HINT}  +/-: zoom  0: reset  Esc / b: back"),
        }
    }
}

fn is_back(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_drag_without_movement_is_a_click() {
        let gesture = DragGesture::Node {
            step: WorkflowStep::Upload,
            grab: Point::default(),
            before: NodePositions::new(),
            origin: Position::new(3, 3),
            pointer: Position::new(3, 3),
        };
        assert_eq!(gesture.finish(), DragOutcome::NodeClicked(WorkflowStep::Upload));
    }

    #[test]
    fn moved_node_hands_back_its_snapshot() {
        let mut before = NodePositions::new();
        before.insert(WorkflowStep::Upload, Point::new(50.0, 60.0));
        let mut gesture = DragGesture::Node {
            step: WorkflowStep::Upload,
            grab: Point::default(),
            before: before.clone(),
            origin: Position::new(3, 3),
            pointer: Position::new(3, 3),
        };
        gesture.moved(Position::new(9, 4));
        assert_eq!(gesture.finish(), DragOutcome::NodeMoved { before });
    }

    #[test]
    fn focus_cycles_through_panels() {
        let mut focus = Focus::Actions;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Actions);
        assert_eq!(Focus::Actions.previous(), Focus::Code);
    }
}
