//! Step-by-step navigation through the workflow graph.
//!
//! Stepping back hides the last visible step; stepping forward restores
//! the most recently hidden one. Visible steps always form a prefix of the
//! canonical list and hidden steps the matching suffix, in original order.

use std::collections::VecDeque;

use crate::workflow::WorkflowStep;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepNavigator {
    visible: Vec<WorkflowStep>,
    removed: VecDeque<WorkflowStep>,
    current: Option<usize>,
}

/// Outcome of a navigation command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Centre on this step and load its code.
    Focus(WorkflowStep),
    /// The last visible step was hidden; clear the code panel.
    Emptied,
    /// Nothing to do.
    Unchanged,
}

impl StepNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show every canonical step again. Called whenever the canonical list
    /// changes.
    pub fn sync(&mut self, canonical: &[WorkflowStep]) {
        self.visible = canonical.to_vec();
        self.removed.clear();
        self.clamp_current();
    }

    pub fn visible(&self) -> &[WorkflowStep] {
        &self.visible
    }

    pub fn removed(&self) -> impl Iterator<Item = WorkflowStep> + '_ {
        self.removed.iter().copied()
    }

    pub fn removed_len(&self) -> usize {
        self.removed.len()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_step(&self) -> Option<WorkflowStep> {
        self.current.and_then(|i| self.visible.get(i).copied())
    }

    pub fn can_step_back(&self) -> bool {
        !self.visible.is_empty()
    }

    pub fn can_step_forward(&self) -> bool {
        !self.removed.is_empty()
    }

    /// Hide the last visible step.
    pub fn step_back(&mut self) -> NavOutcome {
        let Some(hidden) = self.visible.pop() else {
            return NavOutcome::Unchanged;
        };
        self.removed.push_front(hidden);

        match self.visible.last().copied() {
            Some(last) => {
                self.current = Some(self.visible.len() - 1);
                NavOutcome::Focus(last)
            }
            None => {
                self.current = None;
                NavOutcome::Emptied
            }
        }
    }

    /// Restore the most recently hidden step.
    pub fn step_forward(&mut self) -> NavOutcome {
        let Some(restored) = self.removed.pop_front() else {
            return NavOutcome::Unchanged;
        };
        self.visible.push(restored);
        self.current = Some(self.visible.len() - 1);
        NavOutcome::Focus(restored)
    }

    /// Mark `step` as the active node if it is visible.
    pub fn select(&mut self, step: WorkflowStep) -> bool {
        match self.visible.iter().position(|s| *s == step) {
            Some(idx) => {
                self.current = Some(idx);
                true
            }
            None => false,
        }
    }

    /// Concatenation of visible and removed steps.
    pub fn partition(&self) -> Vec<WorkflowStep> {
        self.visible
            .iter()
            .copied()
            .chain(self.removed.iter().copied())
            .collect()
    }

    fn clamp_current(&mut self) {
        if let Some(idx) = self.current {
            self.current = self.visible.len().checked_sub(1).map(|last| idx.min(last));
        }
    }
}
