//! Listing page parser
//!
//! Pure HTML-in, records-out parsing of the ranked chart page. The chart
//! markup has gone through several redesigns; each field carries an ordered
//! fallback rule list covering the variants seen so far.

use crate::extract::selectors::{element_text, SelectorSet};
use crate::extract::absolute_url;
use crate::records::RawMovie;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

fn title_anchor_rules() -> &'static SelectorSet {
    static RULES: OnceLock<SelectorSet> = OnceLock::new();
    // Current chart markup first, the pre-redesign table layout second.
    RULES.get_or_init(|| SelectorSet::new(&["a.ipc-title-link-wrapper", "td.titleColumn a"]))
}

fn year_rules() -> &'static SelectorSet {
    static RULES: OnceLock<SelectorSet> = OnceLock::new();
    RULES.get_or_init(|| {
        SelectorSet::new(&[
            "span.cli-title-metadata-item",
            "span.sc-7ab21ed2-6",
            "span.secondaryInfo",
        ])
    })
}

fn score_rules() -> &'static SelectorSet {
    static RULES: OnceLock<SelectorSet> = OnceLock::new();
    RULES.get_or_init(|| {
        SelectorSet::new(&[
            "span.ipc-rating-star--rating",
            r#"div[data-testid="ratingGroup--imdb-rating"] span"#,
            "td.ratingColumn strong",
        ])
    })
}

/// Parses the listing page into raw movie records.
///
/// Entries without a parseable natural key are skipped; duplicate keys keep
/// the first occurrence; collection stops at `limit` unique entries. Any
/// entry whose rank was not observable on the page gets its 1-based position
/// in final collection order.
pub fn parse_listing(html: &str, base: &Url, limit: usize) -> Vec<RawMovie> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let mut movies: Vec<RawMovie> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for anchor in title_anchor_rules().all_matches(root) {
        if movies.len() >= limit {
            break;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains("/title/") {
            continue;
        }
        let Some(external_id) = parse_external_id(href) else {
            continue;
        };
        if seen.contains(&external_id) {
            continue;
        }
        let Some(item) = enclosing_list_item(anchor) else {
            continue;
        };

        let (rank, title) = split_rank_title(&element_text(anchor));
        let release_year = year_rules().first_text(item);
        let score = score_rules().first_text(item);
        let source_url = absolute_url(base, href);

        seen.insert(external_id.clone());
        movies.push(RawMovie {
            external_id,
            rank,
            title,
            release_year,
            score,
            source_url,
        });
    }

    // Deterministic backfill: rank unseen on the page becomes the entry's
    // 1-based position in collection order.
    for (index, movie) in movies.iter_mut().enumerate() {
        if movie.rank.is_none() {
            movie.rank = Some((index + 1) as u32);
        }
    }

    movies
}

/// Parses the `tt…` natural key out of a detail link
pub fn parse_external_id(href: &str) -> Option<String> {
    let start = href.find("/title/")? + "/title/".len();
    let id: String = href[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();

    if id.len() > 2 && id.starts_with("tt") && id[2..].chars().all(|c| c.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}

/// Splits the "12. Some Title" anchor text into rank and title
fn split_rank_title(raw: &str) -> (Option<u32>, String) {
    if let Some((prefix, rest)) = raw.split_once('.') {
        if let Ok(rank) = prefix.trim().parse::<u32>() {
            return (Some(rank), rest.trim().to_string());
        }
    }
    (None, raw.trim().to_string())
}

fn enclosing_list_item<'a>(anchor: ElementRef<'a>) -> Option<ElementRef<'a>> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "li" | "tr"))
}
