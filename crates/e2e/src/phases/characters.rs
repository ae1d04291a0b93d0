//! Character Bible: switch panels, seed a character, expand its card

use tracing::info;

use crate::diagnostics::tags;
use crate::error::E2eResult;
use crate::markers;
use crate::phase::PhaseOutcome;
use crate::phases::{PhaseContext, Warnings};

pub async fn run(ctx: &PhaseContext<'_>) -> E2eResult<PhaseOutcome> {
    let page = ctx.page;
    let settle = ctx.config.timeouts.settle();
    let mut warnings = Warnings::default();

    info!("Navigating to characters");
    page.press(&ctx.config.script.characters_shortcut).await?;

    let switched = page
        .wait_for_any(&[&markers::ADD_CHARACTER_BUTTON, &markers::NO_CHARACTERS], settle)
        .await?;
    if switched.is_none() {
        ctx.diagnostics.capture(page, tags::CHAR_TAB_FAIL).await;
        warnings.push("could not switch to the characters panel");
    }

    if page.is_visible(&markers::NO_CHARACTERS).await? {
        info!("Adding character");
        page.click(markers::ADD_CHARACTER_BUTTON.first()).await?;
        page.fill(markers::CHARACTER_NAME_INPUT.first(), &ctx.config.script.character_name)
            .await?;
        page.click(markers::SAVE_CHARACTER_BUTTON.first()).await?;
        if !page.wait_for(&markers::EXPAND_TOGGLE, settle).await? {
            warnings.push("saved character card did not appear");
        }
    }

    info!("Expanding character card");
    if page.is_visible(&markers::EXPAND_TOGGLE).await? {
        page.click(markers::EXPAND_TOGGLE.first()).await?;
        if !page.wait_for(&markers::CARD_EXPANDED, settle).await? {
            warnings.push("character card did not report the expanded state");
        }
        ctx.diagnostics.capture(page, tags::CHARACTER_EXPANDED).await;
    } else {
        ctx.diagnostics.capture(page, tags::CHAR_EXPAND_FAIL).await;
        warnings.push("expand toggle not found");
    }

    Ok(warnings.into_outcome())
}
