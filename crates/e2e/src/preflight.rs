//! Reachability probe for the application under test

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Interval between probe attempts
const PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Wait until the base URL answers with a non-error status
pub async fn wait_for_reachable(base_url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout_duration {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                info!(url = base_url, attempts, "Application reachable");
                return Ok(());
            }
            Ok(resp) => {
                warn!("Preflight returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for application at {}...", base_url);
                }
                // Connection refused is expected while the app is starting
                if !e.is_connect() {
                    warn!("Preflight error: {}", e);
                }
            }
        }

        sleep(PROBE_INTERVAL).await;
    }

    Err(E2eError::Unreachable {
        url: base_url.to_string(),
        attempts,
    })
}
