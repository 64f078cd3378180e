use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    routing::{get, post},
    Router,
};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, TextEncoder};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};

use common_auth::{JwtVerifier, Role};

pub mod auth_handlers;
pub mod config;
pub mod memory;
pub mod payment_handlers;
pub mod postgres;
pub mod store;
pub mod tokens;
pub mod transfer;

use store::LedgerStore;
use tokens::TokenIssuer;

/// Roles allowed to record debtor payments.
pub const PAYMENT_ROLES: &[Role] = &[Role::Manager, Role::Admin, Role::SuperOwner, Role::Cashier];

static HTTP_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new(
            "http_errors_total",
            "Count of HTTP error responses emitted (status >= 400)",
        ),
        &["service", "code", "status"],
    )
    .expect("http_errors_total");
    let _ = prometheus::default_registry().register(Box::new(c.clone()));
    c
});

async fn track_http_errors(
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, axum::response::Response> {
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp
            .headers()
            .get("X-Error-Code")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        HTTP_ERRORS_TOTAL
            .with_label_values(&["receivables-service", code, status.as_str()])
            .inc();
    }
    Ok(resp)
}

async fn render_metrics() -> Result<String, StatusCode> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub ledger: Arc<dyn LedgerStore>,
    pub jwt_verifier: Arc<JwtVerifier>,
    pub issuer: Arc<TokenIssuer>,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_verifier.clone()
    }
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static("authorization"),
        ]);

    Router::new()
        .route("/login", post(auth_handlers::login_user))
        .route("/payments", post(payment_handlers::create_payment))
        .route("/healthz", get(|| async { "ok" }))
        .route("/internal/metrics", get(render_metrics))
        .route("/metrics", get(render_metrics))
        .with_state(state)
        .layer(axum::middleware::from_fn(track_http_errors))
        .layer(cors)
}
