//! Markers: named, observable UI signals
//!
//! A [`Marker`] pairs a stable name (used in logs and by test doubles) with a
//! [`Locator`] describing how to find it. Locators render to Playwright
//! selector strings; a locator with several alternatives matches the first
//! element satisfying any of them.

use std::fmt;

/// How a marker is found in the DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Raw CSS selector
    Css(&'static str),

    /// Element containing the given text
    Text(&'static str),

    /// `tag` element whose text contains `text`
    HasText { tag: &'static str, text: &'static str },

    /// `tag` element with an exact attribute value
    Attr {
        tag: &'static str,
        name: &'static str,
        value: &'static str,
    },

    /// First match of any alternative
    AnyOf(&'static [Locator]),

    /// `target` inside the first element matching `scope`
    Within {
        scope: &'static Locator,
        target: &'static Locator,
    },
}

impl Locator {
    /// Render to Playwright selectors, one per alternative
    pub fn selectors(&self) -> Vec<String> {
        match self {
            Locator::Css(css) => vec![css.to_string()],
            Locator::Text(text) => vec![format!("text={}", text)],
            Locator::HasText { tag, text } => {
                vec![format!("{}:has-text(\"{}\")", tag, escape(text))]
            }
            Locator::Attr { tag, name, value } => {
                vec![format!("{}[{}=\"{}\"]", tag, name, escape(value))]
            }
            Locator::AnyOf(alternatives) => {
                alternatives.iter().flat_map(Locator::selectors).collect()
            }
            Locator::Within { scope, target } => {
                let targets = target.selectors();
                scope
                    .selectors()
                    .iter()
                    .flat_map(|s| targets.iter().map(move |t| format!("{} >> nth=0 >> {}", s, t)))
                    .collect()
            }
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A named UI signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    name: &'static str,
    locator: Locator,
}

impl Marker {
    pub const fn new(name: &'static str, locator: Locator) -> Self {
        Self { name, locator }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn selectors(&self) -> Vec<String> {
        self.locator.selectors()
    }

    /// First match in DOM order
    pub fn first(&self) -> Target<'_> {
        self.nth(0)
    }

    /// Match at `index` in DOM order
    pub fn nth(&self, index: usize) -> Target<'_> {
        Target { marker: self, index }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One element out of a marker's matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub marker: &'a Marker,
    pub index: usize,
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.marker.name, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_selectors() {
        assert_eq!(Locator::Css("div#root").selectors(), vec!["div#root"]);
        assert_eq!(Locator::Text("My Stories").selectors(), vec!["text=My Stories"]);
        assert_eq!(
            Locator::HasText { tag: "button", text: "Sign In" }.selectors(),
            vec![r#"button:has-text("Sign In")"#]
        );
        assert_eq!(
            Locator::Attr { tag: "input", name: "type", value: "email" }.selectors(),
            vec![r#"input[type="email"]"#]
        );
    }

    #[test]
    fn test_any_of_keeps_alternative_order() {
        const TOGGLE: Locator = Locator::AnyOf(&[
            Locator::Attr { tag: "button", name: "title", value: "Expand" },
            Locator::Attr { tag: "button", name: "title", value: "Collapse" },
        ]);
        assert_eq!(
            TOGGLE.selectors(),
            vec![r#"button[title="Expand"]"#, r#"button[title="Collapse"]"#]
        );
    }

    #[test]
    fn test_within_scopes_to_first_match() {
        const HANDLE: Locator = Locator::Within {
            scope: &Locator::Css(".breadcrumb-widget"),
            target: &Locator::Css(".breadcrumb-handle"),
        };
        assert_eq!(
            HANDLE.selectors(),
            vec![".breadcrumb-widget >> nth=0 >> .breadcrumb-handle"]
        );
    }

    #[test]
    fn test_quotes_are_escaped() {
        let locator = Locator::HasText { tag: "span", text: r#"say "hi""# };
        assert_eq!(locator.selectors(), vec![r#"span:has-text("say \"hi\"")"#]);
    }

    #[test]
    fn test_target_display() {
        const CARD: Marker = Marker::new("story-card", Locator::Text("Chapters"));
        assert_eq!(CARD.first().to_string(), "story-card[0]");
        assert_eq!(CARD.nth(2).index, 2);
    }
}
