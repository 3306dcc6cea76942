use crate::middleware::auth::{clear_session_cookie, session_cookie};
use crate::render::admin::{ADMIN_PAGE, LOGIN_PAGE};
use crate::{BiolinkError, router::BiolinkState};
use axum::{
    Json,
    extract::{ConnectInfo, State},
    response::{Html, IntoResponse},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub ok: bool,
    pub message: &'static str,
}

/// GET /admin/login
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// GET /admin (behind the guard)
pub async fn admin_page() -> Html<&'static str> {
    Html(ADMIN_PAGE)
}

/// Keyed limiter entries kept before idle clients are pruned.
const LIMITER_PRUNE_THRESHOLD: usize = 4096;

/// POST /admin/auth -> sets the session cookie when the password matches.
pub async fn authenticate(
    State(state): State<BiolinkState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    jar: PrivateCookieJar,
    Json(body): Json<AuthRequest>,
) -> Result<impl IntoResponse, BiolinkError> {
    let client = peer.ip();
    if state.login_limiter.len() > LIMITER_PRUNE_THRESHOLD {
        state.login_limiter.retain_recent();
    }
    if state.login_limiter.check_key(&client).is_err() {
        warn!(%client, "admin login rate limit hit");
        return Err(BiolinkError::RateLimited);
    }

    let matches = bool::from(body.password.as_bytes().ct_eq(state.admin_password.as_bytes()));
    if !matches {
        info!(%client, "admin authentication rejected");
        return Err(BiolinkError::InvalidPassword);
    }

    info!("admin authenticated");
    let jar = jar.add(session_cookie(state.secure_cookie));
    Ok((
        jar,
        Json(AuthResponse {
            ok: true,
            message: "Authentication successful",
        }),
    ))
}

/// POST /admin/logout -> expires the session cookie immediately.
pub async fn logout(State(state): State<BiolinkState>, jar: PrivateCookieJar) -> impl IntoResponse {
    info!("admin logout");
    let jar = jar.add(clear_session_cookie(state.secure_cookie));
    (
        jar,
        Json(AuthResponse {
            ok: true,
            message: "Logged out successfully",
        }),
    )
}
