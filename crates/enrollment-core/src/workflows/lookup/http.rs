use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{info, warn};

use super::{EntityCheck, EntityKind, EntityLookup};
use crate::context::{RequestContext, TRACE_HEADER};

/// Validates entities by calling `GET {base_url}/{resource}/{id}` on the owning service.
#[derive(Debug, Clone)]
pub struct HttpEntityLookup {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpEntityLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, kind: EntityKind, id: i64) -> String {
        format!("{}/{}/{}", self.base_url, kind.resource(), id)
    }
}

#[async_trait]
impl EntityLookup for HttpEntityLookup {
    async fn validate(
        &self,
        ctx: &RequestContext,
        kind: EntityKind,
        id: i64,
    ) -> EntityCheck<Value> {
        let url = self.endpoint(kind, id);
        let started = Instant::now();

        let check = match self
            .client
            .get(&url)
            .header(TRACE_HEADER, ctx.trace_id().as_str())
            .send()
            .await
        {
            Ok(response) => match response.status() {
                StatusCode::OK => match response.json::<Value>().await {
                    Ok(payload) => EntityCheck::Found(payload),
                    Err(err) => EntityCheck::Unavailable {
                        reason: format!("unreadable {kind} payload: {err}"),
                    },
                },
                StatusCode::NOT_FOUND => EntityCheck::Missing,
                status => EntityCheck::Unavailable {
                    reason: format!("{kind} service answered {status}"),
                },
            },
            Err(err) if err.is_timeout() => EntityCheck::Unavailable {
                reason: format!(
                    "{kind} service timed out after {}ms",
                    self.timeout.as_millis()
                ),
            },
            Err(err) => EntityCheck::Unavailable {
                reason: format!("{kind} service unreachable: {err}"),
            },
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match &check {
            EntityCheck::Found(_) => {
                info!(trace_id = %ctx.trace_id(), %kind, id, elapsed_ms, "entity validated")
            }
            EntityCheck::Missing => {
                warn!(trace_id = %ctx.trace_id(), %kind, id, elapsed_ms, "entity not found")
            }
            EntityCheck::Unavailable { reason } => warn!(
                trace_id = %ctx.trace_id(),
                %kind,
                id,
                elapsed_ms,
                %reason,
                "entity could not be validated"
            ),
        }
        check
    }
}
