//! Open an existing story, or start a new one

use tracing::info;

use crate::error::E2eResult;
use crate::markers;
use crate::phase::PhaseOutcome;
use crate::phases::PhaseContext;

/// Which way into the editor was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryEntry {
    Existing { available: usize },
    New,
}

/// Decide the branch from what the dashboard shows
pub fn choose(existing_cards: usize) -> StoryEntry {
    if existing_cards > 0 {
        StoryEntry::Existing { available: existing_cards }
    } else {
        StoryEntry::New
    }
}

/// Click exactly one entry point. Whether it led anywhere is checked by the
/// editor gate, not here.
pub async fn run(ctx: &PhaseContext<'_>) -> E2eResult<PhaseOutcome> {
    let page = ctx.page;

    match choose(page.count(&markers::STORY_CARD).await?) {
        StoryEntry::Existing { available } => {
            info!(available, "Opening existing story");
            page.click(markers::STORY_CARD.first()).await?;
        }
        StoryEntry::New => {
            info!("Starting a new story");
            page.click(markers::NEW_STORY_CTA.first()).await?;
        }
    }

    Ok(PhaseOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_prefers_existing() {
        assert_eq!(choose(0), StoryEntry::New);
        assert_eq!(choose(1), StoryEntry::Existing { available: 1 });
        assert_eq!(choose(5), StoryEntry::Existing { available: 5 });
    }
}
