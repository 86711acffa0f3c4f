//! A minimal in-process stand-in for the search engine.
//!
//! Serves just enough of the engine's HTTP surface for the API's client:
//! health, settings updates, task polling, document upserts and searches.
//! Hits are configured per index; every search body is recorded so tests can
//! check the filter and sort the handlers asked for.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

const ENQUEUED_AT: &str = "2024-06-01T12:00:00Z";
const FINISHED_AT: &str = "2024-06-01T12:00:01Z";

#[derive(Default)]
struct StubState {
    next_task_uid: AtomicU32,
    settings_failures: AtomicUsize,
    settings_updates: AtomicUsize,
    hits: Mutex<HashMap<String, (Vec<i64>, u64)>>,
    searches: Mutex<Vec<(String, Value)>>,
}

impl StubState {
    fn task_info(&self, index: &str, kind: &str) -> Value {
        let uid = self.next_task_uid.fetch_add(1, Ordering::SeqCst);
        json!({
            "taskUid": uid,
            "indexUid": index,
            "status": "enqueued",
            "type": kind,
            "enqueuedAt": ENQUEUED_AT,
        })
    }
}

pub struct SearchStub {
    pub url: String,
    state: Arc<StubState>,
}

impl SearchStub {
    /// Bind a random local port and serve until the test runtime shuts down.
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .route("/health", get(health))
            .route(
                "/indexes/{uid}/settings",
                patch(update_settings).post(update_settings).put(update_settings),
            )
            .route("/indexes/{uid}/documents", post(add_documents).put(add_documents))
            .route("/indexes/{uid}/search", post(search))
            .route("/tasks/{uid}", get(task))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub should bind");
        let addr = listener.local_addr().expect("stub should have an address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub should serve");
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Answer searches on `index` with `ids` in this order and `total` hits.
    pub fn set_hits(&self, index: &str, ids: &[i64], total: u64) {
        self.state
            .hits
            .lock()
            .unwrap()
            .insert(index.to_string(), (ids.to_vec(), total));
    }

    /// Reject the next `count` settings updates with a 500.
    pub fn fail_settings(&self, count: usize) {
        self.state.settings_failures.store(count, Ordering::SeqCst);
    }

    /// Settings updates accepted so far.
    pub fn settings_updates(&self) -> usize {
        self.state.settings_updates.load(Ordering::SeqCst)
    }

    /// Body of the most recent search against `index`.
    pub fn last_search(&self, index: &str) -> Option<Value> {
        self.state
            .searches
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(uid, _)| uid == index)
            .map(|(_, body)| body.clone())
    }

    pub fn search_count(&self) -> usize {
        self.state.searches.lock().unwrap().len()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<Value> {
    Json(json!({ "status": "available" }))
}

async fn update_settings(
    State(state): State<Arc<StubState>>,
    Path(uid): Path<String>,
) -> (StatusCode, Json<Value>) {
    let rejected = state
        .settings_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if rejected {
        let error = json!({
            "message": "settings store unavailable",
            "code": "internal",
            "type": "internal",
            "link": "https://docs.meilisearch.com/errors#internal",
        });
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(error));
    }
    state.settings_updates.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::ACCEPTED,
        Json(state.task_info(&uid, "settingsUpdate")),
    )
}

async fn add_documents(
    State(state): State<Arc<StubState>>,
    Path(uid): Path<String>,
) -> (StatusCode, Json<Value>) {
    (
        StatusCode::ACCEPTED,
        Json(state.task_info(&uid, "documentAdditionOrUpdate")),
    )
}

async fn task(Path(uid): Path<u32>) -> Json<Value> {
    Json(json!({
        "uid": uid,
        "indexUid": null,
        "status": "succeeded",
        "type": "settingsUpdate",
        "canceledBy": null,
        "details": {},
        "error": null,
        "duration": "PT0.001S",
        "enqueuedAt": ENQUEUED_AT,
        "startedAt": ENQUEUED_AT,
        "finishedAt": FINISHED_AT,
    }))
}

async fn search(
    State(state): State<Arc<StubState>>,
    Path(uid): Path<String>,
    body: Bytes,
) -> Json<Value> {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let (ids, total) = state
        .hits
        .lock()
        .unwrap()
        .get(&uid)
        .cloned()
        .unwrap_or_default();
    state.searches.lock().unwrap().push((uid.clone(), body.clone()));

    let hits: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
    Json(json!({
        "hits": hits,
        "query": body.get("q").and_then(Value::as_str).unwrap_or_default(),
        "processingTimeMs": 1,
        "offset": body.get("offset").cloned().unwrap_or(json!(0)),
        "limit": body.get("limit").cloned().unwrap_or(json!(20)),
        "estimatedTotalHits": total,
    }))
}
