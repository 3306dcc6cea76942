use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::Config;
use crate::db::ProfileStore;
use crate::error::BiolinkError;
use crate::handlers::{admin_auth, contact, imaging, public, resources};
use crate::middleware::auth::admin_guard;
use crate::service::contact::Mailer;
use crate::service::page_cache::PageCache;

/// Admin uploads carry images as base64 data URIs.
pub const ADMIN_BODY_LIMIT: usize = 16 * 1024 * 1024;

const OUTBOUND_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct BiolinkState {
    pub store: ProfileStore,
    pub page_cache: Arc<PageCache>,
    pub client: reqwest::Client,
    pub mailer: Mailer,
    pub admin_password: Arc<str>,
    pub secure_cookie: bool,
    /// Login attempts per client address.
    pub login_limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    cookie_key: Key,
}

impl BiolinkState {
    pub fn new(store: ProfileStore, cfg: &Config) -> Result<Self, BiolinkError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("biolink/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(OUTBOUND_CONNECT_TIMEOUT)
            .timeout(OUTBOUND_TIMEOUT)
            .build()?;
        let attempts = NonZeroU32::new(cfg.basic.login_attempts_per_minute)
            .unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            store,
            page_cache: Arc::new(PageCache::new(cfg.page.revalidate())),
            mailer: Mailer::new(client.clone(), cfg.contact.clone()),
            client,
            admin_password: Arc::from(cfg.basic.admin_password.as_str()),
            secure_cookie: !cfg.basic.insecure_cookie,
            login_limiter: Arc::new(RateLimiter::keyed(Quota::per_minute(attempts))),
            cookie_key: cookie_key(cfg.basic.cookie_key.as_deref())?,
        })
    }
}

fn cookie_key(encoded: Option<&str>) -> Result<Key, BiolinkError> {
    let Some(encoded) = encoded else {
        warn!("no cookie_key configured; admin sessions end when the process restarts");
        return Ok(Key::generate());
    };
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| BiolinkError::Config(format!("cookie_key is not valid base64: {e}")))?;
    Key::try_from(bytes.as_slice())
        .map_err(|_| BiolinkError::Config("cookie_key must decode to at least 64 bytes".to_string()))
}

impl FromRef<BiolinkState> for Key {
    fn from_ref(state: &BiolinkState) -> Self {
        state.cookie_key.clone()
    }
}

/// The login limiter keys on the peer address, so serve with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn biolink_router(state: BiolinkState) -> Router {
    let protected = Router::new()
        .route("/admin", get(admin_auth::admin_page))
        .route("/admin/data", get(resources::get_admin_data))
        .route(
            "/admin/profile",
            get(resources::get_profile).put(resources::put_profile),
        )
        .route(
            "/admin/buttons",
            get(resources::get_buttons).put(resources::put_buttons),
        )
        .route(
            "/admin/links",
            get(resources::get_links).put(resources::put_links),
        )
        .route("/admin/crop", post(imaging::crop_export))
        .route("/admin/crop/preview", post(imaging::crop_preview))
        .route("/admin/dominant-color", post(imaging::dominant_color))
        .layer(DefaultBodyLimit::max(ADMIN_BODY_LIMIT))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    Router::new()
        .route("/", get(public::home_page))
        .route("/api/page", get(public::page_json))
        .route("/api/contact", post(contact::submit_contact))
        .route("/admin/login", get(admin_auth::login_page))
        .route("/admin/auth", post(admin_auth::authenticate))
        .route("/admin/logout", post(admin_auth::logout))
        .merge(protected)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_key_requires_enough_material() {
        let short = STANDARD.encode([7u8; 16]);
        assert!(matches!(
            cookie_key(Some(&short)),
            Err(BiolinkError::Config(_))
        ));
        assert!(matches!(
            cookie_key(Some("not base64!")),
            Err(BiolinkError::Config(_))
        ));

        let long = STANDARD.encode([7u8; 64]);
        assert!(cookie_key(Some(&long)).is_ok());
        assert!(cookie_key(None).is_ok());
    }
}
