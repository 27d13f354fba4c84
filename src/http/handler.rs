//! Redirect handler
//!
//! One store read per request, no other state.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use percent_encoding::percent_decode_str;

use crate::config::{Config, MissPolicy};
use crate::error::Result;
use crate::store::Store;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub bucket: Arc<str>,
    pub fallback: Arc<str>,
    pub miss_policy: MissPolicy,
}

/// What to answer for a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Mapped: 302 to the stored destination
    Redirect(String),
    /// Unmapped: 302 to the fallback location
    Fallback(String),
    /// Unmapped, answered with a plain 404
    NotFound,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        Self {
            store,
            bucket: Arc::from(config.bucket.as_str()),
            fallback: Arc::from(config.fallback_location.as_str()),
            miss_policy: config.miss_policy,
        }
    }

    /// Look up `path` and decide the response
    ///
    /// A stored empty value counts as unmapped. Under the redirect policy a
    /// request for the fallback location itself is a 404, not a loop.
    pub fn decide(&self, path: &str) -> Result<Decision> {
        let dest = self
            .store
            .get(&self.bucket, path.as_bytes())?
            .filter(|v| !v.is_empty());

        if let Some(dest) = dest {
            return Ok(Decision::Redirect(String::from_utf8_lossy(&dest).into_owned()));
        }

        Ok(match self.miss_policy {
            MissPolicy::Redirect if path != &*self.fallback => {
                Decision::Fallback(self.fallback.to_string())
            }
            _ => Decision::NotFound,
        })
    }
}

impl IntoResponse for Decision {
    fn into_response(self) -> Response {
        match self {
            Decision::Redirect(location) | Decision::Fallback(location) => found(&location),
            Decision::NotFound => (StatusCode::NOT_FOUND, "404 page not found\n").into_response(),
        }
    }
}

fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(location, "Stored destination is not a valid Location header");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "invalid redirect destination\n",
            )
                .into_response()
        }
    }
}

/// Fallback route: every path is a redirect lookup
///
/// The key is the percent-decoded request path. A path that does not decode
/// to UTF-8 is answered with 400.
pub async fn redirect(State(state): State<AppState>, uri: Uri) -> Response {
    let path = match percent_decode_str(uri.path()).decode_utf8() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(path = uri.path(), error = %e, "Undecodable request path");
            return (StatusCode::BAD_REQUEST, "400 bad request\n").into_response();
        }
    };
    let path: &str = &path;

    match state.decide(path) {
        Ok(decision) => {
            tracing::debug!(path, ?decision, "Redirect decision");
            decision.into_response()
        }
        Err(e) => {
            tracing::error!(path, error = %e, "Store read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
