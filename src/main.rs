mod config;
mod http;
mod metrics;
mod models;
mod pipeline;
mod price;
mod reservation;
#[cfg(test)]
mod testing;
mod upstream;
mod views;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use config::StorefrontConfig;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use models::{ApiError, ListingDetails, ListingsResponse};
use once_cell::sync::Lazy;
use pipeline::{Storefront, StorefrontError, StorefrontErrorKind};
use reservation::{PurchaseState, Reservation};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const PAYMENT_NOTICE: &str = "Could not generate a payment link. Please try again.";

static OPENAPI: Lazy<serde_json::Value> = Lazy::new(|| {
    serde_yaml::from_str(include_str!("../docs/openapi.yaml"))
        .unwrap_or_else(|_| json!({ "openapi": "3.0.3" }))
});

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    if let Err(err) = run().await {
        error!(target = "farbarter.api", "server crashed: {err:#}");
    }
}

async fn run() -> eyre::Result<()> {
    let config = StorefrontConfig::from_env()?;
    let prometheus_handle = PrometheusBuilder::new().install_recorder()?;
    let state = AppState {
        storefront: Storefront::new(&config),
        origin: config.public_origin.clone(),
        prometheus_handle,
        metrics_key: config.metrics_key.clone(),
        openapi_key: config.openapi_key.clone(),
    };

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!(
        target = "farbarter.api",
        indexer = %config.endpoints.indexer,
        contract = %config.contract_address,
        "listening on {addr}"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state).into_make_service()).await?;
    Ok(())
}

#[derive(Clone)]
struct AppState {
    storefront: Storefront,
    origin: String,
    prometheus_handle: PrometheusHandle,
    metrics_key: Option<String>,
    openapi_key: Option<String>,
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_headers(Any)
        .allow_methods(Any)
        .allow_origin(Any);

    let api = Router::new()
        .route("/listings", get(api_listings))
        .route("/listings/{id}", get(api_listing_details))
        .route("/listings/{id}/payment-link", post(api_payment_link));

    Router::new()
        .route("/", get(home))
        .route("/listings", get(listings_index))
        .route("/listings/{id}", get(listing_page))
        .route("/listings/{id}/buy", get(listing_page).post(buy))
        .nest("/api", api)
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Health and readiness check.
///
/// - Method: `GET`
/// - Path: `/health`
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "farbarter-storefront",
    }))
}

async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    crate::metrics::inc_requests("/");
    let listings = state
        .storefront
        .aggregate_listings()
        .await
        .map_err(AppError::Page)?;
    Ok(Html(views::render_home(&listings, &state.origin)))
}

async fn listings_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    crate::metrics::inc_requests("/listings");
    let listings = state
        .storefront
        .aggregate_listings()
        .await
        .map_err(AppError::Page)?;
    Ok(Html(views::render_index(&listings)))
}

/// Detail page; also the frame launch target at `/listings/{id}/buy`.
async fn listing_page(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    crate::metrics::inc_requests("/listings/{id}");
    let details = state
        .storefront
        .listing_details(&raw_id)
        .await
        .map_err(AppError::Page)?;
    let purchase = PurchaseState::resolve(&details, None, None, Utc::now());
    Ok(Html(views::render_detail(&details, &purchase, &state.origin)))
}

/// Reserve a payment link and re-render the detail page around it.
///
/// - Method: `POST`
/// - Path: `/listings/{id}/buy`
///
/// A payment-link failure renders a notice on the page instead of an error.
async fn buy(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    crate::metrics::inc_requests("/listings/{id}/buy");
    let details = state
        .storefront
        .listing_details(&raw_id)
        .await
        .map_err(AppError::Page)?;

    let now = Utc::now();
    let (reservation, notice) = if details.is_active && details.remaining_supply > 0 {
        match state.storefront.reserve(&raw_id, now).await {
            Ok(reservation) => (Some(reservation), None),
            Err(err) => {
                warn!(
                    target = "farbarter.api",
                    listing_id = details.listing_id,
                    error = %err,
                    "payment_link_unavailable"
                );
                (None, Some(PAYMENT_NOTICE.to_string()))
            }
        }
    } else {
        (None, None)
    };

    let purchase = PurchaseState::resolve(&details, reservation.as_ref(), notice, now);
    Ok(Html(views::render_detail(&details, &purchase, &state.origin)))
}

/// Every listing enriched with seller profile and image.
///
/// - Method: `GET`
/// - Path: `/api/listings`
async fn api_listings(State(state): State<AppState>) -> Result<Json<ListingsResponse>, AppError> {
    crate::metrics::inc_requests("/api/listings");
    let items = state
        .storefront
        .aggregate_listings()
        .await
        .map_err(AppError::Api)?;
    Ok(Json(ListingsResponse { items }))
}

async fn api_listing_details(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ListingDetails>, AppError> {
    crate::metrics::inc_requests("/api/listings/{id}");
    let details = state
        .storefront
        .listing_details(&raw_id)
        .await
        .map_err(AppError::Api)?;
    Ok(Json(details))
}

async fn api_payment_link(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Reservation>, AppError> {
    crate::metrics::inc_requests("/api/listings/{id}/payment-link");
    let reservation = state
        .storefront
        .reserve(&raw_id, Utc::now())
        .await
        .map_err(AppError::Api)?;
    Ok(Json(reservation))
}

fn presented_key_matches(headers: &HeaderMap, name: &str, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|presented| presented == expected)
}

async fn metrics_endpoint(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !presented_key_matches(&headers, "X-Metrics-Key", state.metrics_key.as_deref()) {
        return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.prometheus_handle.render(),
    )
        .into_response()
}

async fn openapi_json(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    if !presented_key_matches(&headers, "X-Docs-Key", state.openapi_key.as_deref()) {
        return Err(AppError::Unauthorized);
    }
    Ok(Json(OPENAPI.clone()))
}

async fn swagger_ui() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
<head>
  <meta charset='utf-8'/>
  <title>Farbarter Storefront API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: '/openapi.json', dom_id: '#swagger-ui' });
    };
  </script>
</body>
</html>"#,
    )
}

/// Pages get an HTML error view, API routes get `ApiError` JSON.
#[derive(Debug)]
enum AppError {
    Page(StorefrontError),
    Api(StorefrontError),
    Unauthorized,
}

fn status_for(err: &StorefrontError) -> StatusCode {
    match err.kind() {
        StorefrontErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        StorefrontErrorKind::Upstream => StatusCode::BAD_GATEWAY,
    }
}

fn log_failure(err: &StorefrontError) {
    match err.kind() {
        StorefrontErrorKind::InvalidInput => {
            info!(target = "farbarter.api", code = err.code(), error = %err, "request_rejected")
        }
        StorefrontErrorKind::Upstream => {
            error!(target = "farbarter.api", code = err.code(), error = %err, "request_failed")
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Page(err) => {
                log_failure(&err);
                let status = status_for(&err);
                let message = match &err {
                    StorefrontError::InvalidListingIdentifier(raw) => {
                        format!("`{raw}` is not a valid listing id")
                    }
                    StorefrontError::SourceUnavailable(_) => "Failed to load listings".to_string(),
                    _ => "Failed to fetch listing details".to_string(),
                };
                (status, Html(views::render_error(status.as_u16(), &message))).into_response()
            }
            AppError::Api(err) => {
                log_failure(&err);
                let payload = ApiError {
                    error: err.code().to_string(),
                    detail: Some(err.to_string()),
                };
                (status_for(&err), Json(payload)).into_response()
            }
            AppError::Unauthorized => {
                let payload = ApiError {
                    error: "unauthorized".to_string(),
                    detail: None,
                };
                (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = fmt().with_env_filter(filter).try_init();
}
