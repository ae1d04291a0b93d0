//! Breadcrumbs: type into a chapter and drop a breadcrumb widget

use tracing::info;

use crate::diagnostics::tags;
use crate::error::E2eResult;
use crate::markers;
use crate::phase::PhaseOutcome;
use crate::phases::PhaseContext;

pub async fn run(ctx: &PhaseContext<'_>) -> E2eResult<PhaseOutcome> {
    let page = ctx.page;
    let timeouts = &ctx.config.timeouts;
    let script = &ctx.config.script;

    info!("Navigating to editor");
    page.press(&script.editor_shortcut).await?;
    if !page.wait_for(&markers::EDITOR_SURFACE, timeouts.settle()).await? {
        return Ok(PhaseOutcome::warning("editor did not return after shortcut"));
    }

    page.click(markers::EDITOR_SURFACE.first()).await?;
    page.type_text(markers::EDITOR_SURFACE.first(), &script.breadcrumb_text).await?;

    info!("Adding breadcrumb");
    // The add control only renders while the chapter row is hovered
    page.hover(markers::CHAPTER_ITEM.first()).await?;
    if !page
        .wait_for(&markers::ADD_BREADCRUMB_BUTTON, timeouts.hover_reveal())
        .await?
    {
        ctx.diagnostics.capture(page, tags::NO_BREADCRUMB_BTN).await;
        return Ok(PhaseOutcome::warning("add breadcrumb button not visible"));
    }

    page.click(markers::ADD_BREADCRUMB_BUTTON.first()).await?;
    page.wait_for(&markers::BREADCRUMB_WIDGET, timeouts.settle()).await?;
    ctx.diagnostics.capture(page, tags::BREADCRUMB_ADDED).await;

    if page.is_visible(&markers::BREADCRUMB_HANDLE).await? {
        info!("Drag handle visible");
        Ok(PhaseOutcome::Completed)
    } else {
        Ok(PhaseOutcome::warning("breadcrumb drag handle not visible"))
    }
}
