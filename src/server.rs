//! HTTP intake endpoint.
//!
//! The form page posts `application/x-www-form-urlencoded` data here; the
//! response body is a bare status token that the page maps to a message.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/` | Submit a borrow/return or issue report |
//! | `POST` | `/exec` | Same as `/`, for forms pointed at the old script URL |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Response Contract
//!
//! Always `200 OK` with a `text/plain` body of exactly `OK`,
//! `VALIDATION_ERROR`, or `SERVER_ERROR`. Diagnostics go to the log and to
//! the error rows in the sheet, never to the client.
//!
//! # Parameters
//!
//! Body fields win; query-string parameters fill in any field the body
//! lacks. A repeated parameter keeps its first value. A body that cannot be
//! decoded counts as an empty submission.

use axum::{
    extract::{ConnectInfo, FromRequest, Query, Request, State},
    http::header::USER_AGENT,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

use tablet_log_core::handler::IngestionHandler;
use tablet_log_core::models::{Status, Submission};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteRowStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    handler: Arc<IngestionHandler>,
}

/// Starts the intake server against the configured SQLite sheet.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store = Arc::new(SqliteRowStore::new(pool, config.sheet.name.clone()));
    let handler = IngestionHandler::new(config.intake_rules()?, store);
    run_server_with_handler(&config.server.bind, handler).await
}

/// Starts the intake server with a caller-supplied handler (and therefore
/// any [`RowStore`](tablet_log_core::store::RowStore) backend).
pub async fn run_server_with_handler(bind: &str, handler: IngestionHandler) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        "intake endpoint listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(
        listener,
        router(handler).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Builds the route table.
pub fn router(handler: IngestionHandler) -> Router {
    let state = AppState {
        handler: Arc::new(handler),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(handle_submit))
        .route("/exec", post(handle_submit))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST / ============

/// Handler for `POST /` and `POST /exec`.
///
/// Never rejects: extraction problems degrade to missing fields, and the
/// ingestion handler turns everything else into a status token.
async fn handle_submit(State(state): State<AppState>, request: Request) -> Response {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let header_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let from_query = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .map(|Query(pairs)| Submission::from_pairs(pairs))
        .unwrap_or_default();

    let from_body = match Form::<Vec<(String, String)>>::from_request(request, &state).await {
        Ok(Form(pairs)) => Submission::from_pairs(pairs),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable form body");
            Submission::default()
        }
    };

    let mut submission = from_body.merge_missing(from_query);
    if submission.user_agent.is_none() {
        submission.user_agent = header_agent;
    }

    let request_id = Uuid::new_v4();
    let status = state
        .handler
        .handle_from(&submission, client_ip.as_deref())
        .instrument(tracing::info_span!("submission", %request_id))
        .await;

    status_response(status)
}

fn status_response(status: Status) -> Response {
    status.as_str().into_response()
}
