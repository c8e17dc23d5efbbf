//! Bearer token authentication for the HTTP transport.
//!
//! Disabled unless at least one `--auth-token` is configured. Tokens are
//! compared in constant time and never logged in full.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

/// Accepted bearer tokens.
#[derive(Clone, Default)]
pub struct AuthConfig {
    tokens: Vec<String>,
}

impl AuthConfig {
    /// Build from configured tokens. Blank entries are rejected so a stray
    /// comma cannot silently leave the server open.
    pub fn from_tokens(tokens: &[String]) -> Result<Self, String> {
        let mut accepted: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.trim();
            if token.is_empty() {
                return Err("auth-token values must not be empty".to_string());
            }
            if !accepted.iter().any(|t| t == token) {
                accepted.push(token.to_string());
            }
        }
        Ok(Self { tokens: accepted })
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Check every token so timing does not reveal which one matched.
    fn accepts(&self, provided: &str) -> bool {
        self.tokens.iter().fold(false, |found, expected| {
            let same_len = expected.len() == provided.len();
            let equal = same_len && bool::from(expected.as_bytes().ct_eq(provided.as_bytes()));
            found | equal
        })
    }
}

// Token values never reach logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Missing,
    Malformed(&'static str),
    Invalid,
}

impl Rejection {
    fn message(self) -> &'static str {
        match self {
            Self::Missing => "Missing Bearer token in Authorization header",
            Self::Malformed(reason) => reason,
            Self::Invalid => "Invalid Bearer token",
        }
    }

    fn suggestion(self) -> &'static str {
        match self {
            Self::Missing | Self::Malformed(_) => "Send 'Authorization: Bearer <token>'",
            Self::Invalid => "Use one of the tokens configured with --auth-token",
        }
    }
}

/// Reject requests without a valid bearer token. A no-op when auth is disabled.
pub async fn auth_middleware(
    State(auth): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth.is_enabled() {
        return next.run(request).await;
    }

    match check(&auth, &request) {
        Ok(()) => {
            debug!("Request authenticated");
            next.run(request).await
        }
        Err(rejection) => {
            warn!(reason = rejection.message(), "Rejected unauthenticated request");
            unauthorized(rejection)
        }
    }
}

fn check(auth: &AuthConfig, request: &Request<Body>) -> Result<(), Rejection> {
    let token = bearer_token(request)?;
    if auth.accepts(token) {
        Ok(())
    } else {
        Err(Rejection::Invalid)
    }
}

fn bearer_token(request: &Request<Body>) -> Result<&str, Rejection> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(Rejection::Missing)?
        .to_str()
        .map_err(|_| Rejection::Malformed("Authorization header contains invalid characters"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(Rejection::Malformed("Expected 'Bearer <token>'"))?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Rejection::Malformed("Expected 'Bearer <token>'"));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(Rejection::Malformed("Bearer token is empty"));
    }
    Ok(token)
}

fn unauthorized(rejection: Rejection) -> Response {
    #[derive(Serialize)]
    struct ErrorBody<'a> {
        error: Detail<'a>,
    }

    #[derive(Serialize)]
    struct Detail<'a> {
        code: &'a str,
        message: &'a str,
        suggestion: &'a str,
    }

    let body = ErrorBody {
        error: Detail {
            code: "unauthorized",
            message: rejection.message(),
            suggestion: rejection.suggestion(),
        },
    };
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        axum::Json(body),
    )
        .into_response()
}
