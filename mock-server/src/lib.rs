//! In-memory stand-in for the Todoist sync endpoint.
//!
//! Accepts `item_add` and `reminder_add` commands, assigns numeric IDs, and
//! resolves a reminder's `item_id` against temp IDs seen earlier in the same
//! request.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const SYNC_PATH: &str = "/sync/v8/sync";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SyncRequest {
    pub sync_token: String,
    pub commands: Vec<SyncCommand>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SyncCommand {
    #[serde(rename = "type")]
    pub kind: String,
    pub uuid: Uuid,
    pub temp_id: Uuid,
    pub args: Value,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SyncResponse {
    pub full_sync: bool,
    pub sync_status: BTreeMap<Uuid, Value>,
    pub sync_token: String,
    pub temp_id_mapping: BTreeMap<Uuid, u64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Item {
    pub id: u64,
    pub content: String,
    pub due: Value,
}

#[derive(Clone, Debug, Serialize)]
pub struct Reminder {
    pub id: u64,
    pub item_id: u64,
    pub due: Value,
}

#[derive(Debug, Default)]
pub struct Store {
    pub items: Vec<Item>,
    pub reminders: Vec<Reminder>,
    /// Every accepted request body, in arrival order.
    pub requests: Vec<SyncRequest>,
    next_id: u64,
}

impl Store {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    token: Arc<str>,
    db: Db,
}

pub fn app(token: &str) -> Router {
    app_with_store(token).0
}

/// Router plus a handle on its store, for tests that inspect what arrived.
pub fn app_with_store(token: &str) -> (Router, Db) {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let state = AppState {
        token: Arc::from(token),
        db: db.clone(),
    };
    let router = Router::new().route(SYNC_PATH, post(sync)).with_state(state);
    (router, db)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    serve(listener, app(token)).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn authorized(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|presented| presented == token)
}

fn command_error(code: i64, message: &str) -> Value {
    json!({ "error_code": code, "error": message })
}

async fn sync(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, StatusCode> {
    if !authorized(&headers, &state.token) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let mut store = state.db.write().await;
    let mut response = SyncResponse {
        full_sync: request.sync_token == "*",
        sync_token: Uuid::new_v4().simple().to_string(),
        ..SyncResponse::default()
    };

    for command in &request.commands {
        let status = match command.kind.as_str() {
            "item_add" => match command.args.get("content").and_then(Value::as_str) {
                Some(content) => {
                    let id = store.allocate();
                    store.items.push(Item {
                        id,
                        content: content.to_string(),
                        due: command.args.get("due").cloned().unwrap_or(Value::Null),
                    });
                    response.temp_id_mapping.insert(command.temp_id, id);
                    json!("ok")
                }
                None => command_error(19, "Required argument is missing: content"),
            },
            "reminder_add" => {
                let parent = command
                    .args
                    .get("item_id")
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse::<Uuid>().ok())
                    .and_then(|temp| response.temp_id_mapping.get(&temp).copied());
                match parent {
                    Some(item_id) => {
                        let id = store.allocate();
                        store.reminders.push(Reminder {
                            id,
                            item_id,
                            due: command.args.get("due").cloned().unwrap_or(Value::Null),
                        });
                        response.temp_id_mapping.insert(command.temp_id, id);
                        json!("ok")
                    }
                    None => command_error(15, "Invalid temporary id"),
                }
            }
            _ => command_error(22, "Invalid command type"),
        };
        response.sync_status.insert(command.uuid, status);
    }

    store.requests.push(request);
    tracing::debug!(commands = response.sync_status.len(), "handled sync request");
    Ok(Json(response))
}
