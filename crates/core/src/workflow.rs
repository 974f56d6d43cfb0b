//! Workflow steps of the dataset-to-ER-diagram pipeline.
//!
//! A step is appended to the canonical [`WorkflowSteps`] list when its
//! backend action succeeds. The list never shrinks during a session; the
//! graph view hides trailing steps through
//! [`StepNavigator`](crate::navigation::StepNavigator) instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One backend-executed stage of the pipeline.
///
/// Declaration order is pipeline order. The serialized form is the wire
/// identifier the backend uses in `/api/code/{step}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowStep {
    Upload,
    #[serde(rename = "ConvertToCSV")]
    ConvertToCsv,
    CleanModify,
    #[serde(rename = "FDModified")]
    FdModified,
    KeyDetection,
    NormalizeTable,
    DependencyPreservation,
    LosslessCheck,
    #[serde(rename = "ERDiagram")]
    ErDiagram,
}

impl WorkflowStep {
    /// All steps, in pipeline order.
    pub const ALL: [WorkflowStep; 9] = [
        WorkflowStep::Upload,
        WorkflowStep::ConvertToCsv,
        WorkflowStep::CleanModify,
        WorkflowStep::FdModified,
        WorkflowStep::KeyDetection,
        WorkflowStep::NormalizeTable,
        WorkflowStep::DependencyPreservation,
        WorkflowStep::LosslessCheck,
        WorkflowStep::ErDiagram,
    ];

    /// Wire identifier of the step.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::ConvertToCsv => "ConvertToCSV",
            Self::CleanModify => "CleanModify",
            Self::FdModified => "FDModified",
            Self::KeyDetection => "KeyDetection",
            Self::NormalizeTable => "NormalizeTable",
            Self::DependencyPreservation => "DependencyPreservation",
            Self::LosslessCheck => "LosslessCheck",
            Self::ErDiagram => "ERDiagram",
        }
    }

    /// Label shown on the step's node in the workflow graph.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::ConvertToCsv => "CSV Converter",
            Self::CleanModify => "Noise Clean",
            Self::FdModified => "FD Detection",
            Self::KeyDetection => "Key Detector",
            Self::NormalizeTable => "Normalization",
            Self::DependencyPreservation => "Check Dependency Preservation",
            Self::LosslessCheck => "Lossless Decomposition",
            Self::ErDiagram => "ER Diagram",
        }
    }

    /// Path of the `POST` endpoint that runs this step.
    ///
    /// `Upload` is a multipart submission with its own endpoint and has no
    /// trigger path.
    pub fn trigger_path(self) -> Option<&'static str> {
        match self {
            Self::Upload => None,
            Self::ConvertToCsv => Some("/api/convert_to_csv"),
            Self::CleanModify => Some("/api/clean_modify"),
            Self::FdModified => Some("/api/fd_modified"),
            Self::KeyDetection => Some("/api/key_detection"),
            Self::NormalizeTable => Some("/api/normalize_table"),
            Self::DependencyPreservation => Some("/api/dependency_preservation"),
            Self::LosslessCheck => Some("/api/lossless_check"),
            Self::ErDiagram => Some("/api/generate_er_diagram"),
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStep {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStep(s.to_string()))
    }
}

/// Canonical, completion-ordered list of succeeded steps.
///
/// Each step appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowSteps {
    steps: Vec<WorkflowStep>,
}

impl WorkflowSteps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `step` unless it is already present.
    ///
    /// Returns `true` when the list changed.
    pub fn push(&mut self, step: WorkflowStep) -> bool {
        if self.steps.contains(&step) {
            return false;
        }
        self.steps.push(step);
        true
    }

    pub fn contains(&self, step: WorkflowStep) -> bool {
        self.steps.contains(&step)
    }

    pub fn as_slice(&self) -> &[WorkflowStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = WorkflowStep> + '_ {
        self.steps.iter().copied()
    }
}
