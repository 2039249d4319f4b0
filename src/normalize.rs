//! Normalization stage
//!
//! Pure coercion of raw extracted records into typed rows. Numeric-like text
//! parses with coerce-to-null semantics, strings are trimmed, rows missing
//! their natural key or mandatory text are silently dropped, duplicates keep
//! the first occurrence, and cast order is re-densified per movie after
//! filtering. Normalizing an already-normalized set is a no-op.

use crate::records::{CastMember, Movie, RawCastMember, RawMovie};
use std::collections::{HashMap, HashSet};

/// Normalizes raw extraction output into typed rows. Never fails; invalid
/// rows shorten the output instead of raising.
pub fn normalize(
    raw_movies: Vec<RawMovie>,
    raw_cast: Vec<RawCastMember>,
) -> (Vec<Movie>, Vec<CastMember>) {
    (normalize_movies(raw_movies), normalize_cast(raw_cast))
}

fn normalize_movies(raw_movies: Vec<RawMovie>) -> Vec<Movie> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut movies: Vec<Movie> = Vec::new();

    for raw in raw_movies {
        let external_id = raw.external_id.trim().to_string();
        let title = raw.title.trim().to_string();
        if external_id.is_empty() || title.is_empty() {
            continue;
        }
        if !seen.insert(external_id.clone()) {
            continue;
        }

        // The extractor backfills ranks; position covers records built
        // elsewhere (or an extractor bug) without ever producing rank 0.
        let position = movies.len() as u32 + 1;

        movies.push(Movie {
            external_id,
            rank: raw.rank.unwrap_or(position),
            title,
            release_year: raw.release_year.as_deref().and_then(coerce_year),
            score: raw.score.as_deref().and_then(coerce_score),
            source_url: raw.source_url.trim().to_string(),
        });
    }

    movies
}

fn normalize_cast(raw_cast: Vec<RawCastMember>) -> Vec<CastMember> {
    let mut seen: HashSet<(String, u32)> = HashSet::new();
    let mut next_order: HashMap<String, u32> = HashMap::new();
    let mut cast: Vec<CastMember> = Vec::new();

    for raw in raw_cast {
        let external_id = raw.external_id.trim().to_string();
        let name = raw.name.trim().to_string();
        if external_id.is_empty() || name.is_empty() {
            continue;
        }
        if !seen.insert((external_id.clone(), raw.order)) {
            continue;
        }

        let order = next_order
            .entry(external_id.clone())
            .and_modify(|n| *n += 1)
            .or_insert(1);

        cast.push(CastMember {
            external_id,
            order: *order,
            name,
            role_label: clean_optional(raw.role_label),
            profile_url: clean_optional(raw.profile_url),
        });
    }

    cast
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 4-digit year or null; tolerates the parenthesized legacy form "(1994)"
fn coerce_year(text: &str) -> Option<i32> {
    let inner = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();
    if inner.len() == 4 && inner.chars().all(|c| c.is_ascii_digit()) {
        inner.parse().ok()
    } else {
        None
    }
}

/// Floating-point score or null
fn coerce_score(text: &str) -> Option<f64> {
    text.trim().parse().ok().filter(|score: &f64| score.is_finite())
}
