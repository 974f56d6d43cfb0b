//! Request and response bodies exchanged with the analysis backend.
//!
//! Response fields the backend may omit are optional or defaulted; the
//! API layer decides which omissions are errors.

use serde::{Deserialize, Serialize};

use dbstudio_core::fd::{DecomposedSchema, FunctionalDependency};

/// `{message}` body returned by upload and every step trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/code/{step}` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeResponse {
    #[serde(default)]
    pub code: Option<String>,
}

/// `GET /api/detected_fds` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectedFdsResponse {
    #[serde(default)]
    pub fds: Vec<FunctionalDependency>,
}

/// `GET /api/decomposed_schemas` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecomposedSchemasResponse {
    #[serde(default)]
    pub schemas: Vec<DecomposedSchema>,
}

/// `POST /api/dependency_preservation` body.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyPreservationRequest<'a> {
    #[serde(rename = "originalFDs")]
    pub original_fds: &'a [FunctionalDependency],
    #[serde(rename = "decomposedSchemas")]
    pub decomposed_schemas: &'a [DecomposedSchema],
}

/// Pull the human-readable reason out of an error body.
///
/// The backend reports failures as `{"message": ...}`, except the table
/// endpoints which use `{"error": ...}`.
pub fn error_reason(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"].into_iter().find_map(|key| {
        value
            .get(key)
            .and_then(serde_json::Value::as_str)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_reason_prefers_message_then_error() {
        assert_eq!(
            error_reason(r#"{"message":"No uploaded files found"}"#).as_deref(),
            Some("No uploaded files found")
        );
        assert_eq!(
            error_reason(r#"{"error":"restricted","rows":[]}"#).as_deref(),
            Some("restricted")
        );
        assert_eq!(error_reason(r#"{"message":""}"#), None);
        assert_eq!(error_reason("<!DOCTYPE html>"), None);
    }

    #[test]
    fn dependency_preservation_request_uses_backend_keys() {
        let fds = vec![FunctionalDependency::new(&["id"], "name")];
        let schemas = vec![vec!["id".to_string(), "name".to_string()]];
        let body = serde_json::to_value(DependencyPreservationRequest {
            original_fds: &fds,
            decomposed_schemas: &schemas,
        })
        .unwrap();

        assert_eq!(body["originalFDs"][0]["lhs"][0], "id");
        assert_eq!(body["decomposedSchemas"][0][1], "name");
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let fds: DetectedFdsResponse = serde_json::from_str("{}").unwrap();
        let schemas: DecomposedSchemasResponse = serde_json::from_str("{}").unwrap();
        assert!(fds.fds.is_empty());
        assert!(schemas.schemas.is_empty());
    }
}
