// rest/auth.rs — Admin access gate.
//
// Two states per device: UNTRUSTED and TRUSTED. A request is TRUSTED when its
// `admin_trust` cookie carries the expected digest; otherwise it must present
// the shared credential via HTTP Basic auth, which sets the 30-day cookie.
// Only the administrative paths are wrapped in this middleware — guest chat
// routes are never gated.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine as _;
use sha2::{Digest as _, Sha256};
use std::sync::Arc;

use crate::AppContext;

pub const TRUST_COOKIE: &str = "admin_trust";
const TRUST_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30; // 30 days
const CHALLENGE_REALM: &str = "Concierge Admin";

/// The trust-marker value: hex SHA-256 over `user:pass`. Binding the cookie
/// to the credential means rotating the password invalidates every trusted
/// device at once.
pub fn trust_digest(user: &str, pass: &str) -> String {
    hex::encode(Sha256::digest(format!("{user}:{pass}")))
}

/// Middleware for the administrative routes (`/`, `/add`, `/edit/*`).
pub async fn require_admin(State(ctx): State<Arc<AppContext>>, req: Request, next: Next) -> Response {
    // Fail closed when the credential is not configured.
    let (Some(user), Some(pass)) = (&ctx.config.admin_user, &ctx.config.admin_pass) else {
        return challenge();
    };
    let expected = trust_digest(user, pass);

    // TRUSTED device: cookie matches, skip the credential check entirely.
    if cookie_value(req.headers(), TRUST_COOKIE).is_some_and(|v| v == expected) {
        return next.run(req).await;
    }

    // UNTRUSTED: require Basic credentials, exact equality on both parts.
    if let Some((u, p)) = parse_basic_auth(req.headers()) {
        if u == *user && p == *pass {
            let mut response = next.run(req).await;
            let cookie = format!(
                "{TRUST_COOKIE}={expected}; Max-Age={TRUST_MAX_AGE_SECS}; Path=/; HttpOnly; SameSite=Lax"
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            return response;
        }
    }

    challenge()
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            format!("Basic realm=\"{CHALLENGE_REALM}\""),
        )],
        "Auth required.",
    )
        .into_response()
}

/// Decode `Authorization: Basic <base64(user:pass)>` into its two parts.
fn parse_basic_auth(headers: &axum::http::HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Extract one cookie's value from the Cookie header, if present.
fn cookie_value(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}
