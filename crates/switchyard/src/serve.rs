// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `switchyard serve` command implementation.
//!
//! Reads one request per line from stdin and writes one result per line to
//! stdout, in input order. A line holding a JSON object is parsed as a
//! `RoutingRequest`; any other non-blank line is taken as the query text.
//! Up to `concurrency` requests are in flight at once.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{future, stream, StreamExt, TryStreamExt};
use serde_json::json;
use switchyard_config::model::SwitchyardConfig;
use switchyard_core::{RoutingRequest, SwitchyardError};
use switchyard_router::{build_router, Router};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::lifecycle::open_version_control;

/// Runs the `switchyard serve` command until stdin closes.
pub async fn run_serve(
    config: SwitchyardConfig,
    concurrency: usize,
    metrics_addr: Option<SocketAddr>,
) -> Result<(), SwitchyardError> {
    if let Some(addr) = metrics_addr {
        install_metrics(addr)?;
    }

    let version_control = open_version_control(&config).await?;
    let router = Arc::new(build_router(&config, version_control.slot())?);
    info!(
        production = ?version_control.production().map(|a| a.version),
        concurrency, "serving requests from stdin"
    );

    let served = serve_lines(
        Arc::clone(&router),
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        concurrency,
    )
    .await?;

    let stats = router.stats();
    info!(
        served,
        resolved = stats.resolved,
        unresolved = stats.unresolved,
        avg_latency_ms = stats.avg_latency_ms,
        "input closed, shutting down"
    );
    Ok(())
}

/// Answer every non-blank line of `reader` on `writer`. Returns the number
/// of responses written.
pub async fn serve_lines<R, W>(
    router: Arc<Router>,
    reader: R,
    mut writer: W,
    concurrency: usize,
) -> Result<usize, SwitchyardError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let lines = stream::unfold(Some(reader.lines()), |state| async move {
        let mut lines = state?;
        match lines.next_line().await {
            Ok(Some(line)) => Some((Ok(line), Some(lines))),
            Ok(None) => None,
            Err(err) => Some((Err(err), None)),
        }
    });

    let responses = lines
        .try_filter(|line| future::ready(!line.trim().is_empty()))
        .map_ok(|line| {
            let router = Arc::clone(&router);
            async move { Ok::<_, std::io::Error>(respond(&router, &line).await) }
        })
        .try_buffered(concurrency.max(1));
    let mut responses = std::pin::pin!(responses);

    let mut written = 0;
    while let Some(response) = responses.try_next().await? {
        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        written += 1;
    }
    writer.flush().await?;
    Ok(written)
}

async fn respond(router: &Router, line: &str) -> String {
    let request = match parse_request(line) {
        Ok(request) => request,
        Err(message) => {
            warn!(error = message.as_str(), "rejecting request line");
            return json!({ "error": message }).to_string();
        }
    };
    let result = router.resolve(&request).await;
    serde_json::to_string(&result)
        .unwrap_or_else(|e| json!({ "error": format!("failed to render result: {e}") }).to_string())
}

fn parse_request(line: &str) -> Result<RoutingRequest, String> {
    let trimmed = line.trim();
    if trimmed.starts_with('{') {
        serde_json::from_str(trimmed).map_err(|e| format!("invalid request: {e}"))
    } else {
        Ok(RoutingRequest::new(trimmed))
    }
}

#[cfg(feature = "prometheus")]
fn install_metrics(addr: SocketAddr) -> Result<(), SwitchyardError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| {
            SwitchyardError::Internal(format!("failed to install Prometheus exporter: {e}"))
        })?;
    switchyard_core::recording::register_metrics();
    info!(%addr, "prometheus exporter listening");
    Ok(())
}

#[cfg(not(feature = "prometheus"))]
fn install_metrics(addr: SocketAddr) -> Result<(), SwitchyardError> {
    warn!(%addr, "built without the prometheus feature, metrics listener not started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_become_queries() {
        let request = parse_request("  list files in docs ").unwrap();
        assert_eq!(request.query, "list files in docs");
        assert!(request.pinned_tier.is_none());
    }

    #[test]
    fn json_lines_are_full_requests() {
        let request =
            parse_request(r#"{"query": "open readme", "pinned_tier": "fallback"}"#).unwrap();
        assert_eq!(request.query, "open readme");
        assert_eq!(request.pinned_tier, Some(switchyard_core::TierId::Fallback));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = parse_request(r#"{"query": 3}"#).unwrap_err();
        assert!(err.starts_with("invalid request"));
    }
}
