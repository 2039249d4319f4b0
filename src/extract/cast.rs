//! Detail page cast parser
//!
//! Pure parsing of a movie's detail page into raw cast records, page order
//! preserved and `order` assigned as a dense 1-based sequence.

use crate::extract::absolute_url;
use crate::extract::selectors::{element_text, SelectorSet};
use crate::records::RawCastMember;
use scraper::{ElementRef, Html};
use std::sync::OnceLock;
use url::Url;

fn actor_anchor_rules() -> &'static SelectorSet {
    static RULES: OnceLock<SelectorSet> = OnceLock::new();
    RULES.get_or_init(|| {
        SelectorSet::new(&[
            r#"a[data-testid="title-cast-item__actor"]"#,
            "table.cast_list td.primary_photo + td a",
        ])
    })
}

fn role_rules() -> &'static SelectorSet {
    static RULES: OnceLock<SelectorSet> = OnceLock::new();
    RULES.get_or_init(|| {
        SelectorSet::new(&[
            r#"a[data-testid="cast-item-characters-link"]"#,
            "ul li",
            "td.character",
        ])
    })
}

/// Parses up to `cap` cast entries for the movie with the given natural key.
///
/// Name is mandatory; anchors without readable text are dropped. Role label
/// and profile URL degrade to null when their selectors all miss.
pub fn parse_cast(html: &str, external_id: &str, base: &Url, cap: usize) -> Vec<RawCastMember> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut cast: Vec<RawCastMember> = Vec::new();

    for anchor in actor_anchor_rules().all_matches(root) {
        if cast.len() >= cap {
            break;
        }

        let name = element_text(anchor);
        if name.is_empty() {
            continue;
        }

        let profile_url = anchor
            .value()
            .attr("href")
            .map(|href| absolute_url(base, href));

        let role_label = cast_item_container(anchor).and_then(|scope| {
            role_rules()
                .first_text(scope)
                .filter(|label| label != &name)
        });

        cast.push(RawCastMember {
            external_id: external_id.to_string(),
            order: (cast.len() + 1) as u32,
            name,
            role_label,
            profile_url,
        });
    }

    cast
}

/// The enclosing cast item, scoping role lookups away from neighbors
fn cast_item_container<'a>(anchor: ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut fallback = None;
    for ancestor in anchor.ancestors().filter_map(ElementRef::wrap) {
        if ancestor.value().attr("data-testid") == Some("title-cast-item") {
            return Some(ancestor);
        }
        if fallback.is_none() && matches!(ancestor.value().name(), "div" | "tr") {
            fallback = Some(ancestor);
        }
    }
    fallback
}
