//! Shared utilities for integration tests: an in-process JSON-RPC node.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Canned answer for one JSON-RPC method.
#[derive(Debug, Clone)]
pub enum RpcReply {
    Result(Value),
    Error { code: i64, message: String },
    Http(u16),
}

#[derive(Default)]
struct NodeState {
    replies: Mutex<HashMap<String, RpcReply>>,
    calls: Mutex<Vec<(String, Value)>>,
}

/// Programmable JSON-RPC node listening on an ephemeral local port.
pub struct MockNode {
    pub url: String,
    state: Arc<NodeState>,
}

impl MockNode {
    pub async fn start() -> Self {
        let state = Arc::new(NodeState::default());
        let app = Router::new()
            .route("/", post(handle))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn reply(&self, method: &str, reply: RpcReply) -> &Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(method.to_string(), reply);
        self
    }

    pub fn result(&self, method: &str, value: Value) -> &Self {
        self.reply(method, RpcReply::Result(value))
    }

    /// Params of every call to `method`, in arrival order.
    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls(method).len()
    }

    pub fn total_calls(&self) -> usize {
        self.state.calls.lock().unwrap().len()
    }
}

async fn handle(State(state): State<Arc<NodeState>>, Json(body): Json<Value>) -> Response {
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    let method = body
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let params = body.get("params").cloned().unwrap_or(Value::Null);

    state.calls.lock().unwrap().push((method.clone(), params));
    let reply = state.replies.lock().unwrap().get(&method).cloned();

    match reply {
        Some(RpcReply::Result(result)) => {
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })).into_response()
        }
        Some(RpcReply::Error { code, message }) => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }))
        .into_response(),
        Some(RpcReply::Http(status)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "node unavailable",
        )
            .into_response(),
        None => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": format!("Method not found: {}", method) }
        }))
        .into_response(),
    }
}
