//! api-server — JSON HTTP API over the URL action log.
//!
//! Exposes create/update/delete/track actions against the remote shortener
//! plus the read views (recent, current, history, per key) for the web layer.
//! - Auth: a shared `X-API-Key`; the acting owner comes from `X-User` or
//!   falls back to `API_USER`.
//! - Storage: SQLite (default, `sqlite` feature) or in-memory.
//! - CORS: Configurable via CORS_ALLOW_ORIGIN (origin string) for the frontend.
//!
//! Run:
//! ```bash
//! API_KEY=dev-secret SHORTENER_API_KEY=... cargo run -p api-server
//!
//! # throwaway log, json output
//! STORAGE_PROVIDER=memory LOG_FORMAT=json API_KEY=dev-secret SHORTENER_API_KEY=... \
//!   cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.
//!

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use axum::http::HeaderValue;
use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use domain::adapters::memory_store::InMemoryActionStore;
use domain::service::ActionService;
use domain::{Action, ActionResult, ActionStore, Clock, CoreError, Owner, Shortener, Slug};
use http_common::{ActionOut, QrOut, UpdateOut};
use serde::{Deserialize, Serialize};
use shortener_client::HttpShortener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Local store abstraction supporting memory or sqlite (feature-gated).
enum AnyStore {
    Memory(InMemoryActionStore),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite_adapter::SqliteActionStore),
}

impl ActionStore for AnyStore {
    fn append(&self, result: ActionResult, owner: &Owner, at: SystemTime) -> Result<Action, CoreError> {
        match self {
            AnyStore::Memory(s) => s.append(result, owner, at),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(s) => s.append(result, owner, at),
        }
    }

    fn query_recent(&self, owner: &Owner, limit: usize) -> Result<Vec<Action>, CoreError> {
        match self {
            AnyStore::Memory(s) => s.query_recent(owner, limit),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(s) => s.query_recent(owner, limit),
        }
    }

    fn query_by_key(&self, owner: &Owner, key: &Slug) -> Result<Vec<Action>, CoreError> {
        match self {
            AnyStore::Memory(s) => s.query_by_key(owner, key),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(s) => s.query_by_key(owner, key),
        }
    }

    fn query_all(&self, owner: &Owner) -> Result<Vec<Action>, CoreError> {
        match self {
            AnyStore::Memory(s) => s.query_all(owner),
            #[cfg(feature = "sqlite")]
            AnyStore::Sqlite(s) => s.query_all(owner),
        }
    }
}

#[derive(Clone)]
struct StdClock;
impl Clock for StdClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

type Service<C> = ActionService<AnyStore, C, StdClock>;

struct AppState<C: Shortener> {
    service: Arc<Service<C>>,
    api_key: Arc<str>,
    default_owner: Owner,
}

impl<C: Shortener> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            api_key: self.api_key.clone(),
            default_owner: self.default_owner.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_insecure();

    let store = match build_store(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to open action store");
            std::process::exit(1);
        }
    };
    let client = match HttpShortener::new(cfg.shortener_base_url.clone(), cfg.shortener_api_key.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to build shortener client");
            std::process::exit(1);
        }
    };
    let state = AppState {
        service: Arc::new(ActionService::with_links(store, client, StdClock, cfg.links.clone())),
        api_key: Arc::from(cfg.api_key.as_str()),
        default_owner: cfg.api_user.clone(),
    };

    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    let mut app = api_routes::<HttpShortener>()
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .with_state(state);

    // CORS - already validated in Config::from_env()
    let cors = if cfg.cors_allow_origin == HeaderValue::from_static("*") {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list([cfg.cors_allow_origin.clone()]))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::HeaderName::from_static("x-api-key"),
                axum::http::HeaderName::from_static("x-user"),
            ])
    };
    app = app.layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(%addr, "api-server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind port");
    axum::serve(listener, app).await.expect("server error");
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// Construct the action store based on config and feature flags.
fn build_store(cfg: &config::Config) -> Result<AnyStore, CoreError> {
    match cfg.storage_provider {
        #[cfg(feature = "sqlite")]
        config::StorageProvider::Sqlite => {
            info!(path = %cfg.db_path.display(), "using sqlite action store");
            sqlite_adapter::SqliteActionStore::open_creating_dirs(&cfg.db_path).map(AnyStore::Sqlite)
        }
        #[cfg(not(feature = "sqlite"))]
        config::StorageProvider::Sqlite => {
            warn!("built without the sqlite feature; using in-memory action store");
            Ok(AnyStore::Memory(InMemoryActionStore::new()))
        }
        config::StorageProvider::Memory => Ok(AnyStore::Memory(InMemoryActionStore::new())),
    }
}

fn api_routes<C: Shortener + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/api/urls", get(list_recent::<C>).post(create_url::<C>))
        .route("/api/urls/current", get(list_current::<C>))
        .route("/api/urls/history", get(list_history::<C>))
        .route(
            "/api/urls/:key",
            get(key_history::<C>).put(update_url::<C>).delete(delete_url::<C>),
        )
        .route("/api/urls/:key/track", get(track_url::<C>))
        .route("/api/urls/:key/qr", get(qr_for_key::<C>))
}

// ============================================================================
// Request plumbing
// ============================================================================

fn error_response(err: &CoreError) -> Response {
    let (status, _) = http_common::error_status(err);
    match err {
        CoreError::Transport(msg) => warn!(error = %msg, "shortener unreachable"),
        CoreError::Repository(msg) => error!(error = %msg, "action store failure"),
        CoreError::Validation(_) | CoreError::NotFound => {}
    }
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(http_common::core_error_json(err))).into_response()
}

/// Malformed or mistyped bodies get the same error shape as everything else.
fn body_rejected(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(http_common::json_error_with_message("bad_request", &rejection.body_text())),
    )
        .into_response()
}

/// Check the shared API key and work out which owner the request acts for.
fn authorize<C: Shortener>(state: &AppState<C>, headers: &HeaderMap) -> Result<Owner, Response> {
    let presented = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if presented != Some(&*state.api_key) {
        warn!("rejected request with missing or wrong api key");
        return Err((StatusCode::UNAUTHORIZED, Json(http_common::json_err("unauthorized"))).into_response());
    }
    match headers.get("x-user").and_then(|v| v.to_str().ok()) {
        Some(user) => Owner::new(user).map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(http_common::json_error_with_message("bad_request", "X-User must not be blank")),
            )
                .into_response()
        }),
        None => Ok(state.default_owner.clone()),
    }
}

fn actions_response(result: Result<Vec<Action>, CoreError>) -> Response {
    match result {
        Ok(actions) => Json(ListOut {
            items: http_common::actions_out(&actions),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Deserialize)]
struct CreateUrlReq {
    long_url: String,
    key: String,
}

#[derive(Deserialize)]
struct UpdateUrlReq {
    long_url: String,
}

#[derive(Serialize)]
struct CreatedOut {
    #[serde(flatten)]
    action: ActionOut,
    short_url: String,
}

#[derive(Serialize)]
struct ListOut {
    items: Vec<ActionOut>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_recent<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let owner = match authorize(&state, &headers) {
        Ok(o) => o,
        Err(r) => return r,
    };
    let limit = http_common::parse_limit_query(query.as_deref());
    actions_response(state.service.list_recent(&owner, limit))
}

async fn list_current<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Response {
    let owner = match authorize(&state, &headers) {
        Ok(o) => o,
        Err(r) => return r,
    };
    actions_response(state.service.list_current(&owner))
}

async fn list_history<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Response {
    let owner = match authorize(&state, &headers) {
        Ok(o) => o,
        Err(r) => return r,
    };
    actions_response(state.service.list_history(&owner))
}

async fn key_history<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Response {
    let owner = match authorize(&state, &headers) {
        Ok(o) => o,
        Err(r) => return r,
    };
    actions_response(state.service.get_key_history(&owner, &key))
}

async fn create_url<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    body: Result<Json<CreateUrlReq>, JsonRejection>,
) -> Response {
    let owner = match authorize(&state, &headers) {
        Ok(o) => o,
        Err(r) => return r,
    };
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return body_rejected(rejection),
    };
    match state.service.create_action(&owner, &req.long_url, &req.key).await {
        Ok(action) => {
            if !action.success() {
                warn!(key = %action.url_key, status = action.response_status, "shortener rejected create");
            }
            info!(key = %action.url_key, owner = owner.as_str(), "create logged");
            let out = CreatedOut {
                short_url: state.service.links().short_url(&action.url_key),
                action: ActionOut::from(&action),
            };
            (StatusCode::CREATED, Json(out)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn update_url<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Path(key): Path<String>,
    body: Result<Json<UpdateUrlReq>, JsonRejection>,
) -> Response {
    let owner = match authorize(&state, &headers) {
        Ok(o) => o,
        Err(r) => return r,
    };
    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => return body_rejected(rejection),
    };
    match state.service.update_action(&owner, &key, &req.long_url).await {
        Ok(outcome) => {
            if outcome.is_partial() {
                warn!(
                    key = %outcome.action.url_key,
                    delete_status = outcome.delete_step.response_status,
                    create_status = outcome.create_step.response_status,
                    "update only partially applied"
                );
            }
            info!(key = %outcome.action.url_key, status = outcome.action.response_status, "update logged");
            Json(UpdateOut::from(&outcome)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn delete_url<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Response {
    let owner = match authorize(&state, &headers) {
        Ok(o) => o,
        Err(r) => return r,
    };
    match state.service.delete_action(&owner, &key).await {
        Ok(action) => {
            info!(key = %action.url_key, status = action.response_status, "delete logged");
            Json(ActionOut::from(&action)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn track_url<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    match state.service.track_action(&key).await {
        Ok(payload) => Json(http_common::with_hit_count(payload)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn qr_for_key<C: Shortener + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    match state.service.qr_url(&key) {
        Ok(link) => Json(QrOut::from(&link)).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use domain::adapters::scripted_shortener::{RemoteCall, ScriptedShortener};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const KEY: &str = "test-api-key";

    fn app_with(client: Arc<ScriptedShortener>) -> Router {
        let state = AppState {
            service: Arc::new(ActionService::new(
                AnyStore::Memory(InMemoryActionStore::new()),
                client,
                StdClock,
            )),
            api_key: Arc::from(KEY),
            default_owner: Owner::new("api").unwrap(),
        };
        api_routes::<Arc<ScriptedShortener>>().with_state(state)
    }

    fn app() -> Router {
        app_with(Arc::new(ScriptedShortener::new()))
    }

    fn req(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", KEY)
            .header("content-type", "application/json");
        match body {
            Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let resp = router.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn keys(body: &Value) -> Vec<&str> {
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["url_key"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn malformed_bodies_get_json_errors() {
        let router = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/urls")
            .header("x-api-key", KEY)
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("bad_request"));

        let (status, body) = send(&router, req("POST", "/api/urls", Some(json!({"long_url": "https://e.com"})))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("bad_request"));
        assert!(body["error"]["message"].as_str().unwrap().contains("key"));

        let (status, body) = send(&router, req("PUT", "/api/urls/promo", Some(json!({"url": 5})))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("bad_request"));

        // Nothing reached the log.
        let (_, body) = send(&router, req("GET", "/api/urls", None)).await;
        assert!(keys(&body).is_empty());
    }

    #[tokio::test]
    async fn requires_api_key() {
        let router = app();
        let request = Request::builder().uri("/api/urls").body(Body::empty()).unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], json!("unauthorized"));

        let request = Request::builder()
            .uri("/api/urls")
            .header("x-api-key", "wrong")
            .body(Body::empty())
            .unwrap();
        assert_eq!(send(&router, request).await.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_update_delete_flow() {
        let router = app();

        let (status, created) = send(
            &router,
            req("POST", "/api/urls", Some(json!({"long_url": "https://example.com", "key": "promo"}))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["short_url"], json!("https://aws3.link/promo"));
        assert_eq!(created["action_type"], json!("create"));
        assert!(created["long_url"].as_str().unwrap().contains("utm_campaign=qr-code-stickers"));

        let (status, updated) = send(
            &router,
            req("PUT", "/api/urls/promo", Some(json!({"long_url": "https://example.com/v2"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["action"]["action_type"], json!("update"));
        assert_eq!(updated["partial"], json!(false));

        let (_, current) = send(&router, req("GET", "/api/urls/current", None)).await;
        assert_eq!(keys(&current), vec!["promo"]);
        assert_eq!(current["items"][0]["action_type"], json!("update"));

        let (status, deleted) = send(&router, req("DELETE", "/api/urls/promo", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["long_url"], Value::Null);

        let (_, current) = send(&router, req("GET", "/api/urls/current", None)).await;
        assert!(keys(&current).is_empty());

        let (status, per_key) = send(&router, req("GET", "/api/urls/promo", None)).await;
        assert_eq!(status, StatusCode::OK);
        let types: Vec<&str> = per_key["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["action_type"].as_str().unwrap())
            .collect();
        assert_eq!(types, vec!["delete", "update", "create"]);

        let (_, history) = send(&router, req("GET", "/api/urls/history", None)).await;
        assert_eq!(history["items"].as_array().unwrap().len(), 3);

        let (_, recent) = send(&router, req("GET", "/api/urls?limit=2", None)).await;
        assert_eq!(recent["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn partial_update_is_reported() {
        let router = app_with(Arc::new(ScriptedShortener::new().with_remove_status(404)));
        let (status, body) = send(
            &router,
            req("PUT", "/api/urls/fresh", Some(json!({"long_url": "https://example.com"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["partial"], json!(true));
        assert_eq!(body["delete_step"]["response_code"], json!(404));
        assert_eq!(body["create_step"]["success"], json!(true));
        assert_eq!(body["action"]["response_code"], json!(404));
        assert_eq!(body["action"]["success"], json!(false));
    }

    #[tokio::test]
    async fn validation_errors_make_no_remote_call() {
        let client = Arc::new(ScriptedShortener::new());
        let router = app_with(client.clone());

        let (status, body) = send(
            &router,
            req("POST", "/api/urls", Some(json!({"long_url": "https://example.com", "key": "bad_key"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("bad_request"));

        let (status, _) = send(
            &router,
            req("POST", "/api/urls", Some(json!({"long_url": "  ", "key": "ok"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn unreachable_shortener_is_bad_gateway() {
        let router = app_with(Arc::new(ScriptedShortener::new().with_unreachable_shorten()));
        let (status, body) = send(
            &router,
            req("POST", "/api/urls", Some(json!({"long_url": "https://example.com", "key": "x"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], json!("bad_gateway"));

        let (status, _) = send(&router, req("GET", "/api/urls/x", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let router = app();
        let mut create = req("POST", "/api/urls", Some(json!({"long_url": "https://a.com", "key": "mine"})));
        create.headers_mut().insert("x-user", HeaderValue::from_static("alice"));
        assert_eq!(send(&router, create).await.0, StatusCode::CREATED);

        let (_, default_view) = send(&router, req("GET", "/api/urls/current", None)).await;
        assert!(keys(&default_view).is_empty());

        let mut as_alice = req("GET", "/api/urls/current", None);
        as_alice.headers_mut().insert("x-user", HeaderValue::from_static("alice"));
        let (_, alice_view) = send(&router, as_alice).await;
        assert_eq!(keys(&alice_view), vec!["mine"]);
    }

    #[tokio::test]
    async fn track_adds_hit_count() {
        let client = Arc::new(ScriptedShortener::new().with_hits(json!([{"ip": "1.2.3.4"}, {"ip": "5.6.7.8"}])));
        let router = app_with(client.clone());
        let (status, body) = send(&router, req("GET", "/api/urls/promo/track", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hit_count"], json!(2));
        assert_eq!(client.calls(), vec![RemoteCall::Track { key: "promo".into() }]);

        // Tracking leaves no trace in the log.
        let (_, recent) = send(&router, req("GET", "/api/urls", None)).await;
        assert!(recent["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn qr_link_for_key() {
        let router = app();
        let (status, body) = send(&router, req("GET", "/api/urls/promo/qr", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["short_url"], json!("https://aws3.link/promo"));
        assert_eq!(
            body["qr_url"],
            json!("https://quickchart.io/qr?size=100&text=https://aws3.link/promo")
        );
    }
}
