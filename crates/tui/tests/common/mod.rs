#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use image::{ImageFormat, Rgba, RgbaImage};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::{json, Value};

use dbstudio_client::api::BackendApi;
use dbstudio_tui::ui::App;

type Hits = Arc<Mutex<Vec<String>>>;

/// An in-process backend bound to an ephemeral local port. Requests are
/// recorded as `"METHOD /path"`.
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

    pub async fn healthy() -> Self {
        Self::spawn(routes()).await
    }

    pub fn api(&self) -> BackendApi {
        BackendApi::new(self.url.clone())
    }

    pub fn was_called(&self, method: &str, path: &str) -> bool {
        let wanted = format!("{method} {path}");
        self.hits.lock().unwrap().iter().any(|hit| *hit == wanted)
    }
}

async fn record(State(hits): State<Hits>, request: Request, next: Next) -> Response {
    hits.lock()
        .unwrap()
        .push(format!("{} {}", request.method(), request.uri().path()));
    next.run(request).await
}

pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

/// Routes of a backend that answers every step successfully.
pub fn routes() -> Router {
    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/convert_to_csv", post(|| async { message("File converted to CSV") }))
        .route("/api/clean_modify", post(|| async { message("Data cleaned") }))
        .route(
            "/api/fd_modified",
            post(|| async { message("Functional Dependencies detected") }),
        )
        .route("/api/key_detection", post(|| async { message("Keys detected") }))
        .route(
            "/api/normalize_table",
            post(|| async { message("Normalization done") }),
        )
        .route(
            "/api/dependency_preservation",
            post(|| async { message("Dependency Preservation: PASSED") }),
        )
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
                Json(json!({ "fds": [{ "lhs": ["order_id"], "rhs": ["customer_id"] }] }))
            }),
        )
        .route(
            "/api/decomposed_schemas",
            get(|| async { Json(json!({ "schemas": [["order_id", "customer_id"]] })) }),
        )
        .route(
            "/api/get_er_diagram_image",
            get(|| async { ([("content-type", "image/png")], er_png()) }),
        )
}

/// Routes of a backend that has not detected any dependencies yet.
pub fn routes_without_fds() -> Router {
    Router::new()
        .route("/api/detected_fds", get(|| async { Json(json!({ "fds": [] })) }))
        .route(
            "/api/decomposed_schemas",
            get(|| async { Json(json!({ "schemas": [["a", "b"]] })) }),
        )
        .route(
            "/api/dependency_preservation",
            post(|| async { message("Dependency Preservation: PASSED") }),
        )
}

/// Routes where every step trigger fails and the image is not a picture.
pub fn failing_routes() -> Router {
    let fail = || async { (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response() };
    Router::new()
        .route("/api/convert_to_csv", post(fail))
        .route("/api/code/{step}", get(fail))
        .route(
            "/api/get_er_diagram_image",
            get(|| async { ([("content-type", "image/png")], b"not a png".to_vec()) }),
        )
}

async fn upload(mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.unwrap_or_default();
            if bytes.is_empty() {
                break;
            }
            return message("File uploaded successfully").into_response();
        }
    }
    (StatusCode::BAD_REQUEST, message("No file uploaded")).into_response()
}

async fn code(Path(step): Path<String>) -> Json<Value> {
    Json(json!({ "code": format!("def {}():\n    pass\n", step.to_lowercase()) }))
}

async fn table(Path(name): Path<String>) -> Response {
    if name == "3NF_keyTable" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": format!("Access to table '{name}' is restricted.") })),
        )
            .into_response();
    }
    Json(json!({
        "name": name,
        "headers": ["order_id", "customer_id"],
        "rows": [[1, 7], [null, 3]],
    }))
    .into_response()
}

/// A small two-colour PNG.
pub fn er_png() -> Vec<u8> {
    let img = RgbaImage::from_fn(8, 4, |x, _| {
        if x < 4 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    });
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

pub fn terminal() -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(160, 40)).unwrap()
}

pub fn draw(terminal: &mut Terminal<TestBackend>, app: &mut App) {
    terminal.draw(|frame| app.render(frame)).unwrap();
}

pub fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn ctrl(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

pub fn shift_wheel_down(column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::ScrollDown,
        column,
        row,
        modifiers: KeyModifiers::SHIFT,
    })
}

pub fn press(column: u16, row: u16) -> Event {
    mouse(MouseEventKind::Down(MouseButton::Left), column, row)
}

pub fn drag_to(column: u16, row: u16) -> Event {
    mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
}

pub fn release(column: u16, row: u16) -> Event {
    mouse(MouseEventKind::Up(MouseButton::Left), column, row)
}
