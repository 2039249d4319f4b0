//! Record types flowing through the pipeline
//!
//! Raw records come out of extraction with their numeric-like fields still in
//! text form; the normalizer coerces them into the typed rows the storage
//! layer accepts. Nothing downstream of the normalizer touches raw records.

/// A movie entry as pulled off the listing page, before normalization.
///
/// `rank` is already numeric because the extractor backfills missing ranks
/// from collection order; year and score stay as matched text so a bad match
/// can degrade to null instead of aborting extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMovie {
    pub external_id: String,
    pub rank: Option<u32>,
    pub title: String,
    pub release_year: Option<String>,
    pub score: Option<String>,
    pub source_url: String,
}

/// A cast entry as pulled off a movie's detail page, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCastMember {
    pub external_id: String,
    pub order: u32,
    pub name: String,
    pub role_label: Option<String>,
    pub profile_url: Option<String>,
}

/// A normalized movie row, keyed by `external_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub external_id: String,
    pub rank: u32,
    pub title: String,
    pub release_year: Option<i32>,
    pub score: Option<f64>,
    pub source_url: String,
}

/// A normalized cast row, keyed by `(external_id, order)`.
///
/// `order` is a dense 1..K sequence per movie in on-page appearance order.
#[derive(Debug, Clone, PartialEq)]
pub struct CastMember {
    pub external_id: String,
    pub order: u32,
    pub name: String,
    pub role_label: Option<String>,
    pub profile_url: Option<String>,
}
