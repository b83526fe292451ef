/// Session middleware
///
/// Identity is resolved once per request from the signed session cookie
/// and injected into request extensions as [`SessionClaims`]; handlers
/// never consult ambient state. The cart router is the gated surface:
/// requests without a valid session fail there with 403, the status the
/// storefront has always treated as "not authenticated".
///
/// # Example
///
/// ```no_run
/// use axum::{middleware::from_fn_with_state, routing::get, Extension, Router};
/// use pawshop_shared::auth::session::SessionClaims;
/// # use pawshop_api::app::AppState;
/// # use pawshop_api::middleware::session::require_session;
///
/// async fn handler(Extension(session): Extension<SessionClaims>) -> String {
///     format!("Hello, {}!", session.username)
/// }
///
/// # fn build(state: AppState) -> Router {
/// Router::new()
///     .route("/", get(handler))
///     .layer(from_fn_with_state(state.clone(), require_session))
///     .with_state(state)
/// # }
/// ```

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;

use pawshop_shared::auth::session::{validate_session_token, SessionClaims, SESSION_COOKIE};

use crate::{app::AppState, error::ApiError};

/// Resolves the session cookie, or None when absent or invalid
pub fn session_from_jar(jar: &CookieJar, secret: &str) -> Option<SessionClaims> {
    let cookie = jar.get(SESSION_COOKIE)?;
    validate_session_token(cookie.value(), secret).ok()
}

/// Gating layer for routes that require an authenticated session
///
/// Inserts [`SessionClaims`] into request extensions on success and
/// fails with 403 otherwise.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = session_from_jar(&jar, state.session_secret())
        .ok_or_else(|| ApiError::Forbidden("Not authenticated".to_string()))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
