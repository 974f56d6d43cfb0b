//! REST API client for the analysis backend.
//!
//! Wraps the backend HTTP API (dataset upload, pipeline step triggers,
//! generated code, normalized tables, functional dependencies, the
//! dependency-preservation check and the ER diagram image) using
//! [`reqwest`].

use dbstudio_core::fd::{DecomposedSchema, FunctionalDependency};
use dbstudio_core::table::NormalizedTable;
use dbstudio_core::workflow::WorkflowStep;

use crate::messages::{
    error_reason, CodeResponse, DecomposedSchemasResponse, DependencyPreservationRequest,
    DetectedFdsResponse, MessageResponse,
};

/// Base URL used when none is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Fallback message for a failed dataset upload.
pub const UPLOAD_FAILED: &str = "File upload failed";

/// Fallback message for a failed code fetch.
pub const CODE_FETCH_FAILED: &str = "Failed to fetch code";

/// Fallback message for a failed table-data fetch.
pub const TABLE_FETCH_FAILED: &str = "Failed to fetch table data";

/// Fallback message for a failed dependency-preservation check.
pub const DEPENDENCY_CHECK_FAILED: &str = "Dependency preservation check failed";

/// Returned by the lossless check when the backend sent an empty body.
pub const LOSSLESS_UNEXPECTED: &str = "Unexpected response from lossless check API";

/// Fallback message for a failed step trigger.
pub fn trigger_failed(step: WorkflowStep) -> String {
    format!("Failed to trigger {step}")
}

/// HTTP client for a single backend instance.
#[derive(Debug, Clone)]
pub struct BackendApi {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the backend REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendApiError {
    /// The HTTP request itself failed (connection refused, DNS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
        /// Reason the backend gave in its JSON body, if any.
        message: Option<String>,
    },

    /// A 2xx response without the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The step has no trigger endpoint.
    #[error("Invalid step name: {0}")]
    UnknownStep(String),
}

impl BackendApiError {
    /// Text appended to the message log for this failure.
    ///
    /// The backend's own reason wins; anything else (transport failure,
    /// unreadable or malformed body) becomes `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl BackendApi {
    /// Create a new API client for a backend instance.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://localhost:5000`.
    pub fn new(api_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        let api_url = api_url.trim_end_matches('/').to_string();
        Self { client, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Upload a dataset file.
    ///
    /// Sends `POST /api/upload` as multipart with the file in the `file`
    /// field. Returns the backend's confirmation message.
    pub async fn upload_dataset(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendApiError> {
        tracing::debug!(file_name, size = bytes.len(), "Uploading dataset");
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;

        let body: MessageResponse = Self::parse_response(response).await?;
        require_message(body, "Unexpected response from upload API")
    }

    /// Run one pipeline step on the backend.
    ///
    /// Sends `POST` to the step's trigger path. Every step must answer with
    /// a `message`, except the lossless check, whose raw JSON is returned as
    /// text when no message is present.
    pub async fn trigger_step(&self, step: WorkflowStep) -> Result<String, BackendApiError> {
        let path = step
            .trigger_path()
            .ok_or_else(|| BackendApiError::UnknownStep(step.to_string()))?;
        tracing::debug!(step = %step, path, "Triggering backend step");

        let response = self.client.post(self.url(path)).send().await?;
        let text = Self::ensure_success(response).await?.text().await?;

        if step == WorkflowStep::LosslessCheck {
            return Ok(lossless_message(&text));
        }

        let body: MessageResponse = serde_json::from_str(&text)
            .map_err(|e| BackendApiError::UnexpectedResponse(e.to_string()))?;
        require_message(body, &format!("Invalid response from server on {step}"))
    }

    /// Fetch the generated source code for a step.
    ///
    /// Sends `GET /api/code/{step}`. An empty `code` is returned as is so
    /// the viewer can show its placeholder.
    pub async fn fetch_code(&self, step: WorkflowStep) -> Result<String, BackendApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/code/{step}")))
            .send()
            .await?;

        let body: CodeResponse = Self::parse_response(response).await?;
        body.code.ok_or_else(|| {
            BackendApiError::UnexpectedResponse("Invalid response when fetching code".into())
        })
    }

    /// List the names of the normalized tables.
    ///
    /// Sends `GET /api/normalized_tables`. A body without a `tables` array
    /// yields an empty list.
    pub async fn normalized_tables(&self) -> Result<Vec<String>, BackendApiError> {
        let response = self
            .client
            .get(self.url("/api/normalized_tables"))
            .send()
            .await?;

        let body: serde_json::Value = Self::parse_response(response).await?;
        match body.get("tables").and_then(serde_json::Value::as_array) {
            Some(tables) => Ok(tables
                .iter()
                .filter_map(|name| name.as_str().map(str::to_string))
                .collect()),
            None => {
                tracing::warn!(%body, "Unexpected response shape for normalized tables");
                Ok(Vec::new())
            }
        }
    }

    /// Fetch one normalized table's headers and rows.
    ///
    /// Sends `GET /api/get_normalized_table/{name}`. A missing `name` in
    /// the body is filled in with the requested one. The name is sent as a
    /// single percent-encoded path segment.
    pub async fn table_data(&self, name: &str) -> Result<NormalizedTable, BackendApiError> {
        let mut url = reqwest::Url::parse(&self.url("/api/get_normalized_table"))
            .map_err(|e| BackendApiError::UnexpectedResponse(format!("Invalid API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                BackendApiError::UnexpectedResponse(format!("Invalid API URL: {}", self.api_url))
            })?
            .push(name);

        let response = self.client.get(url).send().await?;

        let table: NormalizedTable = Self::parse_response(response).await?;
        Ok(table.with_default_name(name))
    }

    /// Fetch the functional dependencies detected by the FD step.
    ///
    /// Sends `GET /api/detected_fds`.
    pub async fn detected_fds(&self) -> Result<Vec<FunctionalDependency>, BackendApiError> {
        let response = self
            .client
            .get(self.url("/api/detected_fds"))
            .send()
            .await?;

        let body: DetectedFdsResponse = Self::parse_response(response).await?;
        Ok(body.fds)
    }

    /// Fetch the relation schemas produced by normalization.
    ///
    /// Sends `GET /api/decomposed_schemas`.
    pub async fn decomposed_schemas(&self) -> Result<Vec<DecomposedSchema>, BackendApiError> {
        let response = self
            .client
            .get(self.url("/api/decomposed_schemas"))
            .send()
            .await?;

        let body: DecomposedSchemasResponse = Self::parse_response(response).await?;
        Ok(body.schemas)
    }

    /// Ask the backend whether the decomposition preserves the given
    /// dependencies.
    ///
    /// Sends `POST /api/dependency_preservation` with a JSON body of
    /// `{originalFDs, decomposedSchemas}`.
    pub async fn check_dependency_preservation(
        &self,
        original_fds: &[FunctionalDependency],
        decomposed_schemas: &[DecomposedSchema],
    ) -> Result<String, BackendApiError> {
        tracing::debug!(
            fds = original_fds.len(),
            schemas = decomposed_schemas.len(),
            "Checking dependency preservation"
        );
        let request = DependencyPreservationRequest {
            original_fds,
            decomposed_schemas,
        };

        let response = self
            .client
            .post(self.url("/api/dependency_preservation"))
            .json(&request)
            .send()
            .await?;

        let body: MessageResponse = Self::parse_response(response).await?;
        require_message(body, "Invalid response from dependency preservation API")
    }

    /// Download the rendered ER diagram.
    ///
    /// Sends `GET /api/get_er_diagram_image` and returns the raw image
    /// bytes.
    pub async fn er_diagram_image(&self) -> Result<Vec<u8>, BackendApiError> {
        let response = self
            .client
            .get(self.url("/api/get_er_diagram_image"))
            .send()
            .await?;

        let bytes = Self::ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`BackendApiError::Api`]
    /// carrying the status, the body text and the backend's reason.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = error_reason(&body);
            tracing::warn!(status = status.as_u16(), ?message, "Backend returned an error");
            return Err(BackendApiError::Api {
                status: status.as_u16(),
                body,
                message,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendApiError> {
        let text = Self::ensure_success(response).await?.text().await?;
        serde_json::from_str(&text).map_err(|e| BackendApiError::UnexpectedResponse(e.to_string()))
    }
}

fn require_message(body: MessageResponse, context: &str) -> Result<String, BackendApiError> {
    body.message
        .filter(|message| !message.is_empty())
        .ok_or_else(|| BackendApiError::UnexpectedResponse(context.to_string()))
}

// The lossless check reports its verdict either as `{message}` or as a
// bare JSON document, which is shown verbatim.
fn lossless_message(text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => match value.get("message").and_then(serde_json::Value::as_str) {
            Some(message) => message.to_string(),
            None if value.is_null() => LOSSLESS_UNEXPECTED.to_string(),
            None => value.to_string(),
        },
        Err(_) if text.trim().is_empty() => LOSSLESS_UNEXPECTED.to_string(),
        Err(_) => text.to_string(),
    }
}
