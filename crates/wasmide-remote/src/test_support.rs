//! Local HTTP servers standing in for the execution backend and file server.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub(crate) async fn refused_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

type Reply = (StatusCode, Json<Value>);

fn reply(status: StatusCode, success: bool, message: &str) -> Reply {
    (status, Json(json!({ "success": success, "message": message })))
}

/// In-memory file server speaking the same routes as the real one.
#[derive(Clone, Default)]
pub(crate) struct FileServer {
    pub files: Arc<Mutex<BTreeMap<String, String>>>,
    pub projects: Arc<Mutex<Vec<String>>>,
    pub languages: Arc<Mutex<Vec<String>>>,
    pub list_hits: Arc<AtomicUsize>,
    pub list_delay: Option<Duration>,
    pub fail_listing: Arc<AtomicBool>,
    pub fail_writes: bool,
}

impl FileServer {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let server = Self::default();
        {
            let mut stored = server.files.lock();
            for (name, content) in files {
                stored.insert(name.to_string(), content.to_string());
            }
        }
        server
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/list-files", get(list_files))
            .route("/files/:name", get(read_file).post(write_file))
            .route("/create-file", post(create_file))
            .route("/runcode", post(run_code))
            .with_state(self.clone())
    }

    pub async fn start(&self) -> String {
        serve(self.router()).await
    }

    /// Make every later listing answer 500. Other routes keep working.
    pub fn fail_listings(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    pub fn content(&self, name: &str) -> Option<String> {
        self.files.lock().get(name).cloned()
    }

    fn record_project(&self, params: &HashMap<String, String>) {
        if let Some(project) = params.get("project") {
            self.projects.lock().push(project.clone());
        }
    }
}

async fn list_files(
    State(server): State<FileServer>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<String>>, Reply> {
    server.record_project(&params);
    server.list_hits.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = server.list_delay {
        tokio::time::sleep(delay).await;
    }
    if server.fail_listing.load(Ordering::SeqCst) {
        return Err(reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            false,
            "Error reading directory",
        ));
    }
    let names = server.files.lock().keys().cloned().collect();
    Ok(Json(names))
}

async fn read_file(
    State(server): State<FileServer>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    server.record_project(&params);
    match server.content(&name) {
        Some(content) => (
            StatusCode::OK,
            Json(json!({ "success": true, "content": content })),
        ),
        None => reply(StatusCode::NOT_FOUND, false, "File not found"),
    }
}

async fn write_file(
    State(server): State<FileServer>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Reply {
    server.record_project(&params);
    if server.fail_writes {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, false, "Error writing file");
    }
    server.files.lock().insert(name, body);
    reply(StatusCode::OK, true, "File saved successfully")
}

async fn create_file(
    State(server): State<FileServer>,
    Query(params): Query<HashMap<String, String>>,
    Json(name): Json<String>,
) -> Reply {
    server.record_project(&params);
    let mut files = server.files.lock();
    if files.contains_key(&name) {
        return reply(StatusCode::CONFLICT, false, "File already exists");
    }
    files.insert(name, String::new());
    reply(StatusCode::CREATED, true, "File created successfully")
}

async fn run_code(
    State(server): State<FileServer>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    server.record_project(&params);
    if let Some(lang) = params.get("lang") {
        server.languages.lock().push(lang.clone());
    }
    StatusCode::OK
}
