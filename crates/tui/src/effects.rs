//! Backend workflows behind the studio's actions.
//!
//! Each workflow talks to the backend and returns the [`StoreAction`]s to
//! apply, in order. Failures become messages for the message log; only
//! [`fetch_table_data`] hands its error back to the caller.

use std::path::{Path, PathBuf};

use dbstudio_client::api::{
    trigger_failed, BackendApi, BackendApiError, CODE_FETCH_FAILED, DEPENDENCY_CHECK_FAILED,
    TABLE_FETCH_FAILED, UPLOAD_FAILED,
};
use dbstudio_core::fd::{DecomposedSchema, FunctionalDependency};
use dbstudio_core::highlight::CODE_LOAD_FAILED;
use dbstudio_core::store::StoreAction;
use dbstudio_core::table::NormalizedTable;
use dbstudio_core::workflow::WorkflowStep;

pub const TABLES_NORMALIZED: &str = "Tables normalized successfully";
pub const MISSING_FDS: &str = "Error: Functional Dependencies are missing or invalid.";
pub const MISSING_SCHEMAS: &str = "Error: Decomposed Schemas are missing or invalid.";
pub const ER_DIAGRAM_LOAD_FAILED: &str = "Failed to load ER Diagram";

/// A unit of backend work requested by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    RunStep(WorkflowStep),
    CheckDependencyPreservation,
    LosslessCheck,
    LoadCode(WorkflowStep),
    OpenTable(String),
    LoadErDiagram,
}

/// Result of a [`Command`], delivered back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Apply these actions.
    Store(Vec<StoreAction>),
    /// Apply these actions, then show the table view.
    TableOpened(Vec<StoreAction>),
    /// Encoded ER diagram image, or the reason it could not be loaded.
    ErDiagram(Result<Vec<u8>, String>),
}

/// Run `command` against the backend.
pub async fn perform(api: &BackendApi, command: Command) -> Outcome {
    match command {
        Command::Upload(path) => Outcome::Store(upload(api, &path).await),
        Command::RunStep(step) => Outcome::Store(run_step(api, step).await),
        Command::CheckDependencyPreservation => {
            Outcome::Store(check_dependency_preservation(api).await)
        }
        Command::LosslessCheck => Outcome::Store(lossless_check(api).await),
        Command::LoadCode(step) => Outcome::Store(load_code(api, step).await),
        Command::OpenTable(name) => open_table(api, &name).await,
        Command::LoadErDiagram => Outcome::ErDiagram(
            api.er_diagram_image()
                .await
                .map_err(|e| e.user_message(ER_DIAGRAM_LOAD_FAILED)),
        ),
    }
}

// ---------------------------------------------------------------------------
// Action panel workflows
// ---------------------------------------------------------------------------

/// Upload the dataset at `path`.
pub async fn upload(api: &BackendApi, path: &Path) -> Vec<StoreAction> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read dataset file");
            return vec![StoreAction::message(format!(
                "{UPLOAD_FAILED}: cannot read {}: {e}",
                path.display()
            ))];
        }
    };

    match api.upload_dataset(&file_name, bytes).await {
        Ok(message) => vec![
            StoreAction::message(message),
            StoreAction::AddWorkflowStep(WorkflowStep::Upload),
        ],
        Err(e) => {
            tracing::warn!(error = %e, "Dataset upload failed");
            vec![StoreAction::message(e.user_message(UPLOAD_FAILED))]
        }
    }
}

/// Trigger `step` and run its follow-up fetches.
pub async fn run_step(api: &BackendApi, step: WorkflowStep) -> Vec<StoreAction> {
    let message = match api.trigger_step(step).await {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(step = %step, error = %e, "Backend step failed");
            return vec![StoreAction::message(e.user_message(&trigger_failed(step)))];
        }
    };

    let mut actions = vec![
        StoreAction::message(message),
        StoreAction::AddWorkflowStep(step),
    ];
    match step {
        WorkflowStep::FdModified => {
            actions.push(StoreAction::SetOriginalFds(fetch_detected_fds(api).await));
            actions.push(StoreAction::SetFdReady(true));
        }
        WorkflowStep::NormalizeTable => {
            actions.push(StoreAction::SetDecomposedSchemas(
                fetch_decomposed_schemas(api).await,
            ));
            if let Some(tables) = fetch_normalized_tables(api).await {
                actions.push(StoreAction::SetNormalizedTables(tables));
            }
            actions.push(StoreAction::message(TABLES_NORMALIZED));
        }
        WorkflowStep::ErDiagram => actions.push(StoreAction::SetErDiagramReady(true)),
        _ => {}
    }
    actions
}

/// Check dependency preservation with freshly fetched dependencies and
/// schemas. Nothing is posted when either is missing.
pub async fn check_dependency_preservation(api: &BackendApi) -> Vec<StoreAction> {
    let fds = fetch_detected_fds(api).await;
    let schemas = fetch_decomposed_schemas(api).await;

    let mut actions = vec![
        StoreAction::SetOriginalFds(fds.clone()),
        StoreAction::SetDecomposedSchemas(schemas.clone()),
    ];
    if fds.is_empty() {
        actions.push(StoreAction::message(MISSING_FDS));
        return actions;
    }
    if schemas.is_empty() {
        actions.push(StoreAction::message(MISSING_SCHEMAS));
        return actions;
    }

    match api.check_dependency_preservation(&fds, &schemas).await {
        Ok(message) => {
            actions.push(StoreAction::message(message));
            actions.push(StoreAction::AddWorkflowStep(WorkflowStep::DependencyPreservation));
        }
        Err(e) => {
            tracing::error!(error = %e, "Dependency preservation check failed");
            actions.push(StoreAction::message(e.user_message(DEPENDENCY_CHECK_FAILED)));
        }
    }
    actions
}

pub async fn lossless_check(api: &BackendApi) -> Vec<StoreAction> {
    run_step(api, WorkflowStep::LosslessCheck).await
}

// ---------------------------------------------------------------------------
// View workflows
// ---------------------------------------------------------------------------

/// Load the generated code of `step` into the code viewer.
pub async fn load_code(api: &BackendApi, step: WorkflowStep) -> Vec<StoreAction> {
    match api.fetch_code(step).await {
        Ok(code) => vec![StoreAction::SetCurrentCode(code)],
        Err(e) => {
            tracing::warn!(step = %step, reason = %e.user_message(CODE_FETCH_FAILED), "Code fetch failed");
            vec![StoreAction::SetCurrentCode(CODE_LOAD_FAILED.to_string())]
        }
    }
}

/// Fetch `name` for the table view.
///
/// The caller has already logged `Loading table {name}...`.
pub async fn open_table(api: &BackendApi, name: &str) -> Outcome {
    match fetch_table_data(api, name).await {
        Ok(data) => Outcome::TableOpened(vec![StoreAction::SelectTable {
            name: name.to_string(),
            data,
        }]),
        Err(e) => Outcome::Store(vec![StoreAction::message(format!(
            "Error loading table {name}: {}",
            e.user_message(TABLE_FETCH_FAILED)
        ))]),
    }
}

pub fn loading_table_message(name: &str) -> String {
    format!("Loading table {name}...")
}

// ---------------------------------------------------------------------------
// Store fetches
// ---------------------------------------------------------------------------

/// Detected dependencies, or an empty list when the fetch fails.
pub async fn fetch_detected_fds(api: &BackendApi) -> Vec<FunctionalDependency> {
    api.detected_fds().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to fetch Functional Dependencies");
        Vec::new()
    })
}

/// Decomposed schemas, or an empty list when the fetch fails.
pub async fn fetch_decomposed_schemas(api: &BackendApi) -> Vec<DecomposedSchema> {
    api.decomposed_schemas().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to fetch Decomposed Schemas");
        Vec::new()
    })
}

/// Table names, or `None` when the fetch fails so the current list stays.
pub async fn fetch_normalized_tables(api: &BackendApi) -> Option<Vec<String>> {
    match api.normalized_tables().await {
        Ok(tables) => Some(tables),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch normalized tables");
            None
        }
    }
}

/// Data of one normalized table. Errors are returned to the caller.
pub async fn fetch_table_data(
    api: &BackendApi,
    name: &str,
) -> Result<NormalizedTable, BackendApiError> {
    let table = api.table_data(name).await?;
    tracing::debug!(
        table = %table.name,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Fetched table data"
    );
    Ok(table)
}
