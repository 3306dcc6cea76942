use axum::extract::Request;
use axum::http::{HeaderMap, header::ACCEPT};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use time::Duration;
use tracing::debug;

use crate::error::BiolinkError;

pub const AUTH_COOKIE: &str = "admin-auth";
pub const LOGIN_PATH: &str = "/admin/login";

/// Value stored in the encrypted session cookie. The password itself never
/// leaves the login request.
const SESSION_MARKER: &str = "authenticated";
const SESSION_TTL: Duration = Duration::hours(24);

/// True when the jar holds a session cookie this server issued.
/// Cookies that fail decryption are not returned by the jar at all.
pub fn is_authenticated(jar: &PrivateCookieJar) -> bool {
    jar.get(AUTH_COOKIE)
        .is_some_and(|c| c.value() == SESSION_MARKER)
}

/// Route layer in front of every protected admin route.
/// - authenticated: pass through
/// - JSON clients: 401
/// - everything else (page navigations): redirect to the login page
pub async fn admin_guard(jar: PrivateCookieJar, req: Request, next: Next) -> Response {
    if is_authenticated(&jar) {
        return next.run(req).await;
    }
    debug!(path = %req.uri().path(), "admin request without session");
    if wants_json(req.headers()) {
        return BiolinkError::Unauthorized.into_response();
    }
    Redirect::temporary(LOGIN_PATH).into_response()
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json") && !accept.contains("text/html"))
}

pub fn session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(AUTH_COOKIE, SESSION_MARKER))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(SESSION_TTL)
        .build()
}

pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .build()
}
