//! Second hard gate: the rich-text editor

use tracing::{error, info};

use crate::diagnostics::tags;
use crate::error::E2eResult;
use crate::markers;
use crate::phase::PhaseOutcome;
use crate::phases::PhaseContext;

pub async fn run(ctx: &PhaseContext<'_>) -> E2eResult<PhaseOutcome> {
    let page = ctx.page;

    info!("Waiting for editor");
    if page
        .wait_for(&markers::EDITOR_SURFACE, ctx.config.timeouts.editor())
        .await?
    {
        info!("Editor loaded");
        ctx.diagnostics.capture(page, tags::EDITOR_LOADED).await;
        return Ok(PhaseOutcome::Completed);
    }

    error!("Editor timeout");
    let screenshot = ctx.diagnostics.capture(page, tags::EDITOR_FAIL).await;
    Ok(PhaseOutcome::aborted("editor surface never appeared", screenshot))
}
