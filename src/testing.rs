//! In-process stand-in for every collaborator, served on an ephemeral port.

use crate::config::{Endpoints, HttpSettings, StorefrontConfig};
use crate::pipeline::Storefront;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Canned collaborator behaviour. `None` answers HTTP 500.
#[derive(Default)]
pub struct MockPlan {
    pub listings: Option<Value>,
    pub profiles: Option<Value>,
    /// Documents by pointer; unknown pointers answer HTTP 500.
    pub metadata: HashMap<String, Value>,
    pub metadata_delay: Duration,
    pub payment: Option<Value>,
    /// Hex `eth_call` result; `None` answers a JSON-RPC error.
    pub rpc_result: Option<String>,
}

#[derive(Clone)]
struct MockState {
    plan: Arc<MockPlan>,
    hits: Arc<Mutex<Vec<String>>>,
    rpc_calls: Arc<Mutex<Vec<Value>>>,
}

pub struct MockUpstream {
    base_url: String,
    state: MockState,
}

impl MockUpstream {
    pub async fn spawn(plan: MockPlan) -> Self {
        let state = MockState {
            plan: Arc::new(plan),
            hits: Arc::new(Mutex::new(Vec::new())),
            rpc_calls: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/listings", get(listings))
            .route("/user/bulk", get(profiles))
            .route("/ipfs/{*pointer}", get(metadata))
            .route("/generate-payment-link/{id}", get(payment_link))
            .route("/rpc", post(rpc))
            .layer(middleware::from_fn_with_state(state.clone(), record_hit))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("mock addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn rpc_url(&self) -> String {
        format!("{}/rpc", self.base_url)
    }

    /// Path and query of every request, in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().expect("hits").clone()
    }

    pub fn hits_matching(&self, prefix: &str) -> Vec<String> {
        self.hits()
            .into_iter()
            .filter(|hit| hit.starts_with(prefix))
            .collect()
    }

    pub fn rpc_calls(&self) -> Vec<Value> {
        self.state.rpc_calls.lock().expect("rpc calls").clone()
    }

    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            port: 0,
            public_origin: "https://shop.test".into(),
            endpoints: Endpoints {
                indexer: self.base_url(),
                profiles: self.base_url(),
                ipfs_gateway: self.base_url(),
                payments: self.base_url(),
                rpc: self.rpc_url(),
            },
            contract_address: crate::config::DEFAULT_CONTRACT_ADDRESS
                .parse()
                .expect("default address"),
            http: HttpSettings::default(),
            metrics_key: None,
            openapi_key: None,
        }
    }

    pub fn storefront(&self) -> Storefront {
        Storefront::new(&self.config())
    }
}

async fn record_hit(State(state): State<MockState>, request: Request<Body>, next: Next) -> Response {
    let hit = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    state.hits.lock().expect("hits").push(hit);
    next.run(request).await
}

fn canned(value: &Option<Value>) -> Response {
    match value {
        Some(body) => Json(body.clone()).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn listings(State(state): State<MockState>) -> Response {
    canned(&state.plan.listings)
}

async fn profiles(State(state): State<MockState>) -> Response {
    canned(&state.plan.profiles)
}

async fn metadata(State(state): State<MockState>, Path(pointer): Path<String>) -> Response {
    if !state.plan.metadata_delay.is_zero() {
        tokio::time::sleep(state.plan.metadata_delay).await;
    }
    canned(&state.plan.metadata.get(&pointer).cloned())
}

async fn payment_link(State(state): State<MockState>) -> Response {
    canned(&state.plan.payment)
}

async fn rpc(State(state): State<MockState>, Json(call): Json<Value>) -> Response {
    state.rpc_calls.lock().expect("rpc calls").push(call.clone());
    let body = match &state.plan.rpc_result {
        Some(result) => json!({ "jsonrpc": "2.0", "id": call["id"], "result": result }),
        None => json!({
            "jsonrpc": "2.0",
            "id": call["id"],
            "error": { "code": 3, "message": "execution reverted" }
        }),
    };
    Json(body).into_response()
}

pub fn listing_json(id: u64, fid: u64, metadata: &str) -> Value {
    json!({
        "id": id,
        "seller": format!("0x{:040x}", fid),
        "fid": fid,
        "price": "1500000",
        "remainingSupply": 3,
        "metadata": metadata,
        "isActive": true,
        "totalSales": 1
    })
}

pub fn metadata_json(image_url: &str) -> Value {
    json!({
        "name": "Handmade mug",
        "description": "Stoneware, 350ml",
        "imageUrl": image_url,
        "location": "Lisbon",
        "supply": 5,
        "isOnline": false
    })
}
