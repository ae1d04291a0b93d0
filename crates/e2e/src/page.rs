//! Browser capability the walkthrough is written against
//!
//! Phases only ever talk to a [`Page`]; the Playwright driver is one
//! implementation, scripted doubles are another.

use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::E2eResult;
use crate::marker::{Marker, Target};

/// Interval between visibility polls in [`Page::wait_for_any`]
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A single open page in a browser session
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate, failing if the load does not finish within `timeout`
    async fn goto(&self, url: &str, timeout: Duration) -> E2eResult<()>;

    /// Number of elements currently matching the marker
    async fn count(&self, marker: &Marker) -> E2eResult<usize>;

    /// Whether the first match is visible right now
    async fn is_visible(&self, marker: &Marker) -> E2eResult<bool>;

    /// Wait for the first match to become visible. `Ok(false)` on timeout.
    async fn wait_for(&self, marker: &Marker, timeout: Duration) -> E2eResult<bool>;

    /// Replace an input's value
    async fn fill(&self, target: Target<'_>, value: &str) -> E2eResult<()>;

    async fn click(&self, target: Target<'_>) -> E2eResult<()>;

    async fn hover(&self, target: Target<'_>) -> E2eResult<()>;

    /// Type into an element one keystroke at a time
    async fn type_text(&self, target: Target<'_>, text: &str) -> E2eResult<()>;

    /// Press a key chord on the page, e.g. `Control+2`
    async fn press(&self, key: &str) -> E2eResult<()>;

    /// Full-page screenshot written to `path`
    async fn screenshot(&self, path: &Path) -> E2eResult<()>;

    /// Close the browser. Called exactly once per session.
    async fn close(&self) -> E2eResult<()>;

    /// Wait until any of `markers` is visible, returning its index
    async fn wait_for_any(&self, markers: &[&Marker], timeout: Duration) -> E2eResult<Option<usize>> {
        let deadline = Instant::now() + timeout;
        loop {
            for (index, marker) in markers.iter().enumerate() {
                if self.is_visible(marker).await? {
                    return Ok(Some(index));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Starts a browser session
#[async_trait]
pub trait Launcher: Send + Sync {
    type Page: Page + 'static;

    async fn launch(&self) -> E2eResult<Self::Page>;
}
