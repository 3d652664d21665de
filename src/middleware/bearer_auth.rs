//! Bearer トークンの検証 (ヘッダ抽出 → 検証 → 拒否)
//!
//! - `Authorization: Bearer <jwt>` を検証し、sub を `AuthCtx` として
//!   request extensions に格納する
//! - 拒否は全て一律 401。種別 (missing/malformed/invalid) はログ側のみ

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};
use std::{error::Error as StdError, fmt};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::TokenError;
use crate::state::AppState;

/// Why the gate refused a request. Logged, never sent to the client.
#[derive(Debug)]
pub enum BearerError {
    /// No `Authorization` header, or an empty one.
    MissingCredential,
    /// Not exactly `Bearer <token>` (case-insensitive scheme, single space,
    /// non-empty token part).
    MalformedHeader,
    InvalidToken(TokenError),
}

impl fmt::Display for BearerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing authorization header"),
            Self::MalformedHeader => write!(f, "invalid authorization header format"),
            Self::InvalidToken(e) => write!(f, "invalid token: {}", e),
        }
    }
}

impl StdError for BearerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidToken(e) => Some(e),
            _ => None,
        }
    }
}

/// Apply the bearer-token gate to every route in `router`.
///
/// 例：
/// ```ignore
/// let protected = bearer_auth::apply(
///     Router::new().route("/protected", get(protected_route)),
///     state.clone(),
/// );
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、
    // `from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, bearer_middleware))
}

async fn bearer_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let subject = match extract_bearer(header_value)
        .and_then(|token| state.tokens.verify(token).map_err(BearerError::InvalidToken))
    {
        Ok(subject) => subject,
        Err(err) => {
            tracing::warn!(error = %err, "rejected request to protected route");
            return Err(AppError::Unauthorized);
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx { subject });

    Ok(next.run(req).await)
}

/// Pull the token out of an `Authorization` header value.
///
/// Exactly two parts split on a single space, scheme case-insensitively
/// `bearer`, token part non-empty.
fn extract_bearer(header_value: Option<&str>) -> Result<&str, BearerError> {
    let value = match header_value {
        Some(v) if !v.is_empty() => v,
        _ => return Err(BearerError::MissingCredential),
    };

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(BearerError::MalformedHeader),
    }
}
