//! Bewritten UI markers used by the walkthrough

use crate::marker::{Locator, Marker};

pub const APP_ROOT: Marker = Marker::new("app-root", Locator::Css("div#root"));

// Sign-in form
pub const EMAIL_INPUT: Marker = Marker::new(
    "email-input",
    Locator::Attr { tag: "input", name: "type", value: "email" },
);
pub const LOGIN_PASSWORD_INPUT: Marker = Marker::new(
    "login-password-input",
    Locator::Attr { tag: "input", name: "name", value: "password" },
);
pub const SIGN_IN_BUTTON: Marker = Marker::new(
    "sign-in-button",
    Locator::HasText { tag: "button", text: "Sign In" },
);

// Forced password change. The form's labels are not associated with their
// inputs, so fields are addressed by position: 0 current, 1 new, 2 confirm.
pub const PASSWORD_UPDATE_REQUIRED: Marker = Marker::new(
    "password-update-required",
    Locator::Text("Password Update Required"),
);
pub const PASSWORD_INPUT: Marker = Marker::new(
    "password-input",
    Locator::Attr { tag: "input", name: "type", value: "password" },
);
pub const CURRENT_PASSWORD_INDEX: usize = 0;
pub const NEW_PASSWORD_INDEX: usize = 1;
pub const CONFIRM_PASSWORD_INDEX: usize = 2;
pub const ROTATION_FIELD_COUNT: usize = 3;
pub const UPDATE_PASSWORD_BUTTON: Marker = Marker::new(
    "update-password-button",
    Locator::HasText { tag: "button", text: "Update Password" },
);

// Dashboard
pub const DASHBOARD_HEADING: Marker = Marker::new("dashboard-heading", Locator::Text("My Stories"));
pub const NEW_STORY_CTA: Marker = Marker::new("new-story-cta", Locator::Text("Start a new journey"));
pub const STORY_CARD: Marker = Marker::new("story-card", Locator::Text("Chapters"));

// Editor
pub const EDITOR_SURFACE: Marker = Marker::new(
    "editor-surface",
    Locator::Attr { tag: "div", name: "contenteditable", value: "true" },
);

// Character Bible
pub const ADD_CHARACTER_BUTTON: Marker = Marker::new(
    "add-character-button",
    Locator::HasText { tag: "button", text: "Add Character" },
);
pub const NO_CHARACTERS: Marker = Marker::new("no-characters", Locator::Text("No characters found"));
pub const CHARACTER_NAME_INPUT: Marker = Marker::new(
    "character-name-input",
    Locator::Attr { tag: "input", name: "placeholder", value: "Character Name" },
);
pub const SAVE_CHARACTER_BUTTON: Marker = Marker::new(
    "save-character-button",
    Locator::HasText { tag: "button", text: "Save Character" },
);
/// The card's expand/collapse control, in either state
pub const EXPAND_TOGGLE: Marker = Marker::new(
    "expand-toggle",
    Locator::AnyOf(&[
        Locator::Attr { tag: "button", name: "title", value: "Expand" },
        Locator::Attr { tag: "button", name: "title", value: "Collapse" },
    ]),
);
pub const CARD_EXPANDED: Marker = Marker::new(
    "card-expanded",
    Locator::Attr { tag: "button", name: "title", value: "Collapse" },
);

// Breadcrumbs
pub const CHAPTER_ITEM: Marker = Marker::new(
    "chapter-item",
    Locator::Css("div.group.flex.items-center.justify-between"),
);
pub const ADD_BREADCRUMB_BUTTON: Marker = Marker::new(
    "add-breadcrumb-button",
    Locator::Attr { tag: "button", name: "title", value: "Add Breadcrumb" },
);
pub const BREADCRUMB_WIDGET: Marker = Marker::new("breadcrumb-widget", Locator::Css(".breadcrumb-widget"));
pub const BREADCRUMB_HANDLE: Marker = Marker::new(
    "breadcrumb-handle",
    Locator::Within {
        scope: &Locator::Css(".breadcrumb-widget"),
        target: &Locator::Css(".breadcrumb-handle"),
    },
);
