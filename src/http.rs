//! Shared HTTP plumbing for the upstream services
//!
//! Every outbound call goes through one client with a bounded timeout and a
//! transient-retry middleware using jittered exponential backoff.

use std::time::{Duration, Instant};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::Upstream;
use crate::{DeerGuideError, Result};

const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Build the shared client from the `[http]` settings
pub fn build_client(config: &HttpConfig) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| DeerGuideError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(250), Duration::from_secs(5))
        .jitter(Jitter::Bounded)
        .build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Send a request and return the body of a 2xx response.
///
/// Transport failures and non-2xx statuses become `Upstream` errors; decoding
/// the body is left to the caller so it can tell malformed payloads apart.
pub(crate) async fn fetch_body(request: RequestBuilder, upstream: Upstream) -> Result<String> {
    let started = Instant::now();

    let response = request.send().await.map_err(|e| {
        warn!(%upstream, error = %e, "Upstream request failed");
        DeerGuideError::upstream(upstream, e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!(%upstream, %status, "Upstream returned an error status");
        return Err(DeerGuideError::upstream(
            upstream,
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            ),
        ));
    }

    let body = response
        .text()
        .await
        .map_err(|e| DeerGuideError::upstream(upstream, format!("Failed to read body: {e}")))?;

    let elapsed = started.elapsed();
    debug!(%upstream, elapsed_ms = elapsed.as_millis() as u64, bytes = body.len(), "Upstream response received");
    if elapsed > SLOW_RESPONSE {
        warn!(%upstream, "Slow upstream response: {:.3}s", elapsed.as_secs_f64());
    }

    Ok(body)
}
