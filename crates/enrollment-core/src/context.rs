//! Request-scoped trace token and timing.
//!
//! Every inbound request gets a [`RequestContext`]: the caller's `x-trace-id` when one
//! is supplied, otherwise a freshly generated token. Workflows receive the context
//! explicitly and forward the token on every cross-service validation call so one
//! logical operation can be followed across services in the logs.

use std::convert::Infallible;
use std::fmt;
use std::time::Instant;

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, Instrument};
use uuid::Uuid;

pub const TRACE_HEADER: &str = "x-trace-id";

const MAX_TRACE_LEN: usize = 128;

/// Correlation identifier shared by every call made for one logical operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(pub String);

impl TraceId {
    /// `TXN-<yyyymmddhhmmss>-<8 hex>`.
    pub fn generate() -> Self {
        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let unique = Uuid::new_v4().simple().to_string();
        Self(format!("TXN-{stamp}-{}", &unique[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    trace_id: TraceId,
    started: Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_trace(TraceId::generate())
    }

    pub fn with_trace(trace_id: TraceId) -> Self {
        Self {
            trace_id,
            started: Instant::now(),
        }
    }

    /// Adopts the caller's trace token when it is present and printable.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let inherited = headers
            .get(TRACE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty() && value.len() <= MAX_TRACE_LEN)
            .map(|value| TraceId(value.to_string()));

        match inherited {
            Some(trace_id) => Self::with_trace(trace_id),
            None => Self::new(),
        }
    }

    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| RequestContext::from_headers(&parts.headers)))
    }
}

/// Middleware logging request entry and exit, keyed by the trace token.
pub async fn trace_requests(mut request: Request, next: Next) -> Response {
    let context = RequestContext::from_headers(request.headers());
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    request.extensions_mut().insert(context.clone());

    let span = tracing::info_span!(
        "request",
        trace_id = %context.trace_id(),
        %method,
        %uri,
    );

    async move {
        info!("request started");
        let mut response = next.run(request).await;
        info!(
            status = response.status().as_u16(),
            elapsed_ms = context.elapsed_ms(),
            "request finished"
        );
        if let Ok(value) = HeaderValue::from_str(context.trace_id().as_str()) {
            response.headers_mut().insert(TRACE_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
