//! "DataBase Tools" panel: the ten workflow actions.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use dbstudio_core::workflow::WorkflowStep;

use crate::effects::Command;
use crate::ui::shell::panel_block;

pub const PANEL_TITLE: &str = "DataBase Tools";

/// A button of the action panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioAction {
    DatasetUpload,
    CsvDataLoader,
    NoiseClean,
    FdDetector,
    KeyDetector,
    Normalization,
    CheckDependencyPreservation,
    CheckLosslessDecomposition,
    GenerateErDiagram,
    RefreshWorkflow,
}

impl StudioAction {
    /// Buttons in pipeline order.
    pub const ALL: [StudioAction; 10] = [
        StudioAction::DatasetUpload,
        StudioAction::CsvDataLoader,
        StudioAction::NoiseClean,
        StudioAction::FdDetector,
        StudioAction::KeyDetector,
        StudioAction::Normalization,
        StudioAction::CheckDependencyPreservation,
        StudioAction::CheckLosslessDecomposition,
        StudioAction::GenerateErDiagram,
        StudioAction::RefreshWorkflow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::DatasetUpload => "Dataset Upload",
            Self::CsvDataLoader => "CSV Data Loader",
            Self::NoiseClean => "Noise Clean",
            Self::FdDetector => "FD Detector",
            Self::KeyDetector => "Key Detector",
            Self::Normalization => "Normalization",
            Self::CheckDependencyPreservation => "Check Dependency Preservation",
            Self::CheckLosslessDecomposition => "Check Lossless Decomposition",
            Self::GenerateErDiagram => "Generate ER Diagram",
            Self::RefreshWorkflow => "Refresh Workflow",
        }
    }

    /// The workflow step this button adds on success, if any.
    pub fn step(self) -> Option<WorkflowStep> {
        match self {
            Self::DatasetUpload => Some(WorkflowStep::Upload),
            Self::CsvDataLoader => Some(WorkflowStep::ConvertToCsv),
            Self::NoiseClean => Some(WorkflowStep::CleanModify),
            Self::FdDetector => Some(WorkflowStep::FdModified),
            Self::KeyDetector => Some(WorkflowStep::KeyDetection),
            Self::Normalization => Some(WorkflowStep::NormalizeTable),
            Self::CheckDependencyPreservation => Some(WorkflowStep::DependencyPreservation),
            Self::CheckLosslessDecomposition => Some(WorkflowStep::LosslessCheck),
            Self::GenerateErDiagram => Some(WorkflowStep::ErDiagram),
            Self::RefreshWorkflow => None,
        }
    }
}

/// What activating a button asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Run(Command),
    /// Drop the whole session ("Refresh Workflow").
    Reset,
}

/// Selection and upload prompt of the action panel.
#[derive(Debug, Default)]
pub struct ActionPanel {
    selected: usize,
    prompt: Option<String>,
    list_area: Rect,
    /// Kept across frames so clicks map through the list's scroll offset.
    list_state: ListState,
}

impl ActionPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> StudioAction {
        StudioAction::ALL[self.selected.min(StudioAction::ALL.len() - 1)]
    }

    /// Whether the upload path prompt is open and capturing keys.
    pub fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Press `action`. Upload opens the path prompt instead of running.
    pub fn activate(&mut self, action: StudioAction) -> Option<ActionRequest> {
        if let Some(idx) = StudioAction::ALL.iter().position(|a| *a == action) {
            self.selected = idx;
        }
        match action {
            StudioAction::DatasetUpload => {
                self.prompt = Some(String::new());
                None
            }
            StudioAction::RefreshWorkflow => Some(ActionRequest::Reset),
            StudioAction::CheckDependencyPreservation => {
                Some(ActionRequest::Run(Command::CheckDependencyPreservation))
            }
            StudioAction::CheckLosslessDecomposition => {
                Some(ActionRequest::Run(Command::LosslessCheck))
            }
            other => other
                .step()
                .map(|step| ActionRequest::Run(Command::RunStep(step))),
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<ActionRequest> {
        if let Some(input) = self.prompt.as_mut() {
            match key.code {
                KeyCode::Char(c) => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Esc => self.prompt = None,
                KeyCode::Enter => {
                    let path = input.trim().to_string();
                    self.prompt = None;
                    if !path.is_empty() {
                        return Some(ActionRequest::Run(Command::Upload(PathBuf::from(path))));
                    }
                }
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(StudioAction::ALL.len() - 1);
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(self.selected()),
            _ => None,
        }
    }

    /// Press the button under `pos`.
    pub fn click(&mut self, pos: Position) -> Option<ActionRequest> {
        if !self.list_area.contains(pos) {
            return None;
        }
        let row = self.list_state.offset() + usize::from(pos.y - self.list_area.y);
        StudioAction::ALL
            .get(row)
            .copied()
            .and_then(|action| self.activate(action))
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let block = panel_block(PANEL_TITLE, focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let prompt_height = if self.prompt.is_some() { 3 } else { 0 };
        let [list_area, prompt_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(prompt_height)])
                .areas(inner);
        self.list_area = list_area;

        let items: Vec<ListItem> = StudioAction::ALL
            .iter()
            .map(|action| {
                let style = if *action == StudioAction::RefreshWorkflow {
                    Style::default().fg(Color::LightRed)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(action.label(), style)))
            })
            .collect();
        let highlight = if focused {
            Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let list = List::new(items).highlight_style(highlight);
        self.list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, list_area, &mut self.list_state);

        if let Some(input) = &self.prompt {
            let prompt = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Dataset path (Enter to upload, Esc to cancel):",
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(format!("> {input}")),
            ])
            .wrap(Wrap { trim: false });
            frame.render_widget(prompt, prompt_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn step_buttons_run_their_step() {
        let mut panel = ActionPanel::new();
        assert_eq!(
            panel.activate(StudioAction::FdDetector),
            Some(ActionRequest::Run(Command::RunStep(WorkflowStep::FdModified)))
        );
        assert_eq!(
            panel.activate(StudioAction::CheckLosslessDecomposition),
            Some(ActionRequest::Run(Command::LosslessCheck))
        );
        assert_eq!(panel.activate(StudioAction::RefreshWorkflow), Some(ActionRequest::Reset));
    }

    #[test]
    fn upload_prompts_for_a_path() {
        let mut panel = ActionPanel::new();
        assert_eq!(panel.activate(StudioAction::DatasetUpload), None);
        assert!(panel.is_prompting());

        for c in "data.csv".chars() {
            assert_eq!(panel.handle_key(&key(KeyCode::Char(c))), None);
        }
        assert_matches!(
            panel.handle_key(&key(KeyCode::Enter)),
            Some(ActionRequest::Run(Command::Upload(path))) if path == PathBuf::from("data.csv")
        );
        assert!(!panel.is_prompting());
    }

    #[test]
    fn empty_upload_path_is_ignored() {
        let mut panel = ActionPanel::new();
        panel.activate(StudioAction::DatasetUpload);
        assert_eq!(panel.handle_key(&key(KeyCode::Enter)), None);
        assert!(!panel.is_prompting());
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut panel = ActionPanel::new();
        panel.handle_key(&key(KeyCode::Up));
        assert_eq!(panel.selected(), StudioAction::DatasetUpload);
        for _ in 0..20 {
            panel.handle_key(&key(KeyCode::Down));
        }
        assert_eq!(panel.selected(), StudioAction::RefreshWorkflow);
    }

    #[test]
    fn click_follows_scrolled_list() {
        let mut panel = ActionPanel::new();
        for _ in 0..9 {
            panel.handle_key(&key(KeyCode::Down));
        }
        // Four visible rows; keeping the last action in view scrolls by six.
        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        terminal
            .draw(|frame| panel.render(frame, frame.area(), true))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let first_row: String = (1..29u16).map(|x| buffer[(x, 1)].symbol().to_string()).collect();
        assert!(first_row.starts_with("Check Dependency"));

        assert_eq!(
            panel.click(Position::new(2, 1)),
            Some(ActionRequest::Run(Command::CheckDependencyPreservation))
        );
        assert!(!panel.is_prompting());
    }
}
