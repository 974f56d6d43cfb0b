//! Session-wide state shared by every view, with a pure reducer.
//!
//! Views never mutate [`StudioState`] directly. Backend workflows produce
//! [`StoreAction`]s, and the event loop folds them in with
//! [`StudioState::apply`] in completion order.

use crate::fd::{DecomposedSchema, FunctionalDependency};
use crate::messages::MessageLog;
use crate::table::NormalizedTable;
use crate::workflow::{WorkflowStep, WorkflowSteps};

/// Everything the views render from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioState {
    pub workflow_steps: WorkflowSteps,
    pub current_code: String,
    pub messages: MessageLog,
    pub normalized_tables: Vec<String>,
    pub selected_table: Option<String>,
    pub selected_table_data: Option<NormalizedTable>,
    pub original_fds: Vec<FunctionalDependency>,
    pub decomposed_schemas: Vec<DecomposedSchema>,
    pub er_diagram_ready: bool,
    pub fd_ready: bool,
}

/// A single state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    /// Append a succeeded step (ignored when already present).
    AddWorkflowStep(WorkflowStep),
    SetCurrentCode(String),
    AddMessage(String),
    SetNormalizedTables(Vec<String>),
    SelectTable {
        name: String,
        data: NormalizedTable,
    },
    SetOriginalFds(Vec<FunctionalDependency>),
    SetDecomposedSchemas(Vec<DecomposedSchema>),
    SetErDiagramReady(bool),
    SetFdReady(bool),
    /// Drop all session state ("Refresh Workflow").
    Reset,
}

impl StoreAction {
    pub fn message(text: impl Into<String>) -> Self {
        Self::AddMessage(text.into())
    }
}

/// What changed as a result of applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes {
    pub steps: bool,
    pub code: bool,
    pub reset: bool,
}

impl Changes {
    fn merge(self, other: Changes) -> Changes {
        Changes {
            steps: self.steps || other.steps,
            code: self.code || other.code,
            reset: self.reset || other.reset,
        }
    }
}

impl StudioState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action.
    pub fn apply(&mut self, action: StoreAction) -> Changes {
        let mut changes = Changes::default();
        match action {
            StoreAction::AddWorkflowStep(step) => {
                changes.steps = self.workflow_steps.push(step);
            }
            StoreAction::SetCurrentCode(code) => {
                changes.code = self.current_code != code;
                self.current_code = code;
            }
            StoreAction::AddMessage(msg) => self.messages.push(msg),
            StoreAction::SetNormalizedTables(tables) => self.normalized_tables = tables,
            StoreAction::SelectTable { name, data } => {
                self.selected_table = Some(name);
                self.selected_table_data = Some(data);
            }
            StoreAction::SetOriginalFds(fds) => self.original_fds = fds,
            StoreAction::SetDecomposedSchemas(schemas) => self.decomposed_schemas = schemas,
            StoreAction::SetErDiagramReady(ready) => self.er_diagram_ready = ready,
            StoreAction::SetFdReady(ready) => self.fd_ready = ready,
            StoreAction::Reset => {
                *self = Self::default();
                changes = Changes {
                    steps: true,
                    code: true,
                    reset: true,
                };
            }
        }
        changes
    }

    /// Apply a batch of actions in order.
    pub fn apply_all(&mut self, actions: impl IntoIterator<Item = StoreAction>) -> Changes {
        actions
            .into_iter()
            .fold(Changes::default(), |acc, action| acc.merge(self.apply(action)))
    }
}
