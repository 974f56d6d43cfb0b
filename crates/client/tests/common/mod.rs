#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use dbstudio_client::api::BackendApi;

type Hits = Arc<Mutex<Vec<String>>>;

/// An in-process backend bound to an ephemeral local port.
///
/// Every request is recorded as `"METHOD /path"` so tests can assert which
/// endpoints were (or were not) called.
pub struct FakeBackend {
    pub url: String,
    hits: Hits,
}

impl FakeBackend {
    pub async fn spawn(router: Router) -> Self {
        let hits: Hits = Arc::default();
        let app = router.layer(middleware::from_fn_with_state(hits.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            hits,
        }
    }

    /// A backend answering every endpoint successfully.
    pub async fn healthy() -> Self {
        Self::spawn(healthy_routes()).await
    }

    pub fn api(&self) -> BackendApi {
        BackendApi::new(self.url.clone())
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn was_called(&self, method: &str, path: &str) -> bool {
        let wanted = format!("{method} {path}");
        self.hits().iter().any(|hit| *hit == wanted)
    }
}

async fn record(State(hits): State<Hits>, request: Request, next: Next) -> Response {
    hits.lock()
        .unwrap()
        .push(format!("{} {}", request.method(), request.uri().path()));
    next.run(request).await
}

/// URL of a port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

pub fn failure(status: StatusCode, text: &str) -> Response {
    (status, message(text)).into_response()
}

// ---------------------------------------------------------------------------
// Default handlers
// ---------------------------------------------------------------------------

pub fn healthy_routes() -> Router {
    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/convert_to_csv", post(|| async { message("File converted to CSV") }))
        .route(
            "/api/clean_modify",
            post(|| async { message("Data cleaned, merged numbered columns, and saved") }),
        )
        .route(
            "/api/fd_modified",
            post(|| async { message("Functional Dependencies detected") }),
        )
        .route("/api/key_detection", post(|| async { message("Keys detected") }))
        .route(
            "/api/normalize_table",
            post(|| async {
                message("Normalization (1NF, 2NF, 3NF) done; keys detected and saved")
            }),
        )
        .route("/api/dependency_preservation", post(dependency_preservation))
        .route(
            "/api/lossless_check",
            post(|| async { message("Lossless Decomposition: PASSED") }),
        )
        .route(
            "/api/generate_er_diagram",
            post(|| async { message("ER Diagram generated successfully") }),
        )
        .route("/api/code/{step}", get(code))
        .route(
            "/api/normalized_tables",
            get(|| async { Json(json!({ "tables": ["Orders", "Customers"] })) }),
        )
        .route("/api/get_normalized_table/{name}", get(table))
        .route(
            "/api/detected_fds",
            get(|| async {
                Json(json!({ "fds": [
                    { "lhs": ["order_id"], "rhs": ["customer_id"] },
                    { "lhs": ["order_id", "line"], "rhs": ["qty"] },
                ] }))
            }),
        )
        .route(
            "/api/decomposed_schemas",
            get(|| async {
                Json(json!({ "schemas": [["order_id", "customer_id"], ["order_id", "line", "qty"]] }))
            }),
        )
        .route(
            "/api/get_er_diagram_image",
            get(|| async { ([("content-type", "image/png")], PNG_SIGNATURE.to_vec()) }),
        )
}

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

async fn upload(mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            if file_name.is_empty() || bytes.is_empty() {
                break;
            }
            return message("File uploaded successfully").into_response();
        }
    }
    failure(StatusCode::BAD_REQUEST, "No file uploaded")
}

async fn dependency_preservation(Json(body): Json<Value>) -> Response {
    let has = |key: &str| body[key].as_array().is_some_and(|items| !items.is_empty());
    if !has("originalFDs") || !has("decomposedSchemas") {
        return failure(
            StatusCode::BAD_REQUEST,
            "Missing Functional Dependencies or Decomposed Schemas",
        );
    }
    message("Dependency Preservation: PASSED").into_response()
}

async fn code(Path(step): Path<String>) -> Response {
    match step.as_str() {
        "Upload" | "ConvertToCSV" | "CleanModify" | "FDModified" | "KeyDetection"
        | "NormalizeTable" | "DependencyPreservation" | "LosslessCheck" | "ERDiagram" => {
            Json(json!({ "code": format!("def {}():\n    pass\n", step.to_lowercase()) }))
                .into_response()
        }
        _ => failure(StatusCode::BAD_REQUEST, "Invalid step name"),
    }
}

async fn table(Path(name): Path<String>) -> Response {
    if name == "3NF_keyTable" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": format!("Access to table '{name}' is restricted."),
                "name": name,
                "headers": [],
                "rows": [],
            })),
        )
            .into_response();
    }
    Json(json!({
        "name": name,
        "headers": ["id", "qty"],
        "rows": [[1, 2], [null, 3]],
    }))
    .into_response()
}
