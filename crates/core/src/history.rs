//! Undo/redo of workflow node positions.
//!
//! Both stacks hold whole [`NodePositions`] snapshots. Every invocation
//! moves a fixed batch of snapshots.

use crate::canvas::NodePositions;

/// Snapshots moved per undo or redo.
pub const HISTORY_BATCH: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionHistory {
    undo: Vec<NodePositions>,
    redo: Vec<NodePositions>,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the positions as they were before a drag. Clears redo.
    pub fn record(&mut self, before: NodePositions) {
        self.undo.push(before);
        self.redo.clear();
    }

    /// Step back up to [`HISTORY_BATCH`] snapshots.
    ///
    /// Returns the positions to display, or `None` (and changes nothing)
    /// when there is nothing to undo.
    pub fn undo(&mut self, current: NodePositions) -> Option<NodePositions> {
        transfer(&mut self.undo, &mut self.redo, current)
    }

    /// Reverse the most recent undo batch.
    pub fn redo(&mut self, current: NodePositions) -> Option<NodePositions> {
        transfer(&mut self.redo, &mut self.undo, current)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

// Each popped snapshot replaces the state being walked through, and the
// replaced state goes onto the opposite stack, so the opposite operation
// retraces the same path.
fn transfer(
    from: &mut Vec<NodePositions>,
    to: &mut Vec<NodePositions>,
    current: NodePositions,
) -> Option<NodePositions> {
    if from.is_empty() {
        return None;
    }
    let mut state = current;
    for _ in 0..HISTORY_BATCH {
        let Some(previous) = from.pop() else { break };
        to.push(std::mem::replace(&mut state, previous));
    }
    Some(state)
}
