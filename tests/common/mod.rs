#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::connect_info::MockConnectInfo,
    http::{Request, Response, header},
};
use biolink::config::Config;
use biolink::db::ProfileStore;
use biolink::router::{BiolinkState, biolink_router};
use serde_json::Value;
use std::{
    fs,
    net::SocketAddr,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

pub const PASSWORD: &str = "pwd";

/// Peer address every request of [`app_with`] appears to come from.
pub fn default_client() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40_000))
}

/// Throwaway on-disk SQLite database, removed on drop.
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "biolink-{tag}-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub fn test_config(db: &TempDb) -> Config {
    let mut cfg = Config::default();
    cfg.basic.database_url = db.url();
    cfg.basic.admin_password = PASSWORD.to_string();
    cfg
}

pub async fn state_with(cfg: &Config) -> (BiolinkState, ProfileStore) {
    let store = ProfileStore::connect(&cfg.basic.database_url, cfg.basic.owner_id)
        .await
        .expect("failed to open test database");
    let state = BiolinkState::new(store.clone(), cfg).expect("failed to build state");
    (state, store)
}

/// Router whose requests carry `client` as their peer address.
pub fn app_for_client(state: BiolinkState, client: SocketAddr) -> Router {
    biolink_router(state).layer(MockConnectInfo(client))
}

pub async fn app_with(cfg: &Config) -> (Router, ProfileStore) {
    let (state, store) = state_with(cfg).await;
    (app_for_client(state, default_client()), store)
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("request failed")
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_str(&body_text(resp).await).expect("response body was not JSON")
}

/// `name=value` pair of the session cookie set by `resp`.
pub fn session_pair(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("admin-auth="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub async fn login(app: &Router) -> String {
    let resp = send(
        app,
        json_request(
            "POST",
            "/admin/auth",
            None,
            &serde_json::json!({ "password": PASSWORD }),
        ),
    )
    .await;
    session_pair(&resp).expect("login did not set a session cookie")
}
