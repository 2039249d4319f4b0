//! Ordered selector fallback rules
//!
//! The markup for one logical field (a rating, a year, a character name)
//! drifts across page variants. A `SelectorSet` holds an ordered list of CSS
//! rules for the field and resolves to the first rule that actually matches,
//! so callers never branch on markup variants themselves.

use scraper::{ElementRef, Selector};

/// An ordered list of extraction rules for one logical field
pub struct SelectorSet {
    rules: Vec<Selector>,
}

impl SelectorSet {
    /// Builds a selector set from CSS rule strings, in fallback order.
    ///
    /// Rules that fail to parse are skipped; the production rule tables are
    /// covered by tests so a typo cannot slip through silently.
    pub fn new(rules: &[&str]) -> Self {
        Self {
            rules: rules
                .iter()
                .filter_map(|rule| Selector::parse(rule).ok())
                .collect(),
        }
    }

    /// Number of rules that compiled
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All matches of the first rule that matches anything under `scope`.
    ///
    /// Used for repeating entries (listing anchors, cast anchors) where the
    /// whole match list of one markup variant is wanted, not a mix of
    /// variants.
    pub fn all_matches<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for rule in &self.rules {
            let matches: Vec<ElementRef<'a>> = scope.select(rule).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    }

    /// Text of the first rule whose first match yields non-empty text under
    /// `scope`; `None` when every rule fails.
    pub fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        for rule in &self.rules {
            if let Some(element) = scope.select(rule).next() {
                let text = element_text(element);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }
}

/// Collapsed, trimmed text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(|chunk| chunk.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
