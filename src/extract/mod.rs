//! Extraction stage: drives the browser session and parses rendered pages
//!
//! One listing pass collects the ranked movie entries, then one detail pass
//! per movie collects its cast. Listing failures (timeout, blocked page)
//! abort the run; a cast failure is confined to its movie and the run
//! continues.

mod cast;
mod listing;
pub mod selectors;

pub use cast::parse_cast;
pub use listing::{parse_external_id, parse_listing};
pub use selectors::SelectorSet;

use crate::config::HarvestConfig;
use crate::records::{RawCastMember, RawMovie};
use crate::session::{BrowserSession, SessionError};
use crate::{CinerankError, Result};
use std::time::Duration;
use url::Url;

/// Marker phrases that identify an anti-automation verification page
const BLOCKED_MARKERS: &[&str] = &[
    "verify that you're not a robot",
    "javascript is disabled",
    "enable javascript",
    "robot check",
];

/// Returns true when the served markup is a verification page substituted
/// for the expected content.
pub fn looks_blocked(html: &str) -> bool {
    let lower = html.to_lowercase();
    BLOCKED_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Resolves an href against the page base, dropping any query string
pub(crate) fn absolute_url(base: &Url, href: &str) -> String {
    let path = href.split('?').next().unwrap_or(href);
    match base.join(path) {
        Ok(url) => url.to_string(),
        Err(_) => path.to_string(),
    }
}

/// Drives a browser session through the listing and detail pages
pub struct Extractor {
    config: HarvestConfig,
}

impl Extractor {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Extracts up to `max_movies` unique entries from the listing page.
    ///
    /// A readiness timeout or blocked page here is fatal to the run.
    pub async fn extract_listing<S: BrowserSession>(
        &self,
        session: &mut S,
    ) -> Result<Vec<RawMovie>> {
        let url = self.config.listing_url.clone();
        tracing::info!("Opening listing page: {}", url);

        let html = self.rendered_source(session, &url).await?;
        if looks_blocked(&html) {
            return Err(CinerankError::Blocked { url });
        }

        let base = Url::parse(&url)?;
        let movies = parse_listing(&html, &base, self.config.max_movies);
        tracing::info!("Extracted {} movies from listing", movies.len());

        Ok(movies)
    }

    /// Extracts up to `max_cast` cast entries for one movie.
    ///
    /// Errors here are recoverable at the caller: they abort this movie's
    /// cast only, never the run.
    pub async fn extract_cast<S: BrowserSession>(
        &self,
        session: &mut S,
        movie: &RawMovie,
    ) -> Result<Vec<RawCastMember>> {
        let url = movie.source_url.clone();
        tracing::debug!("Opening detail page for cast: {}", url);

        let html = self.rendered_source(session, &url).await?;
        if looks_blocked(&html) {
            return Err(CinerankError::Blocked { url });
        }

        let base = Url::parse(&url)?;
        let cast = parse_cast(&html, &movie.external_id, &base, self.config.max_cast);
        tracing::debug!(
            "Extracted {} cast members for {}",
            cast.len(),
            movie.external_id
        );

        Ok(cast)
    }

    /// Runs the full extraction pass: one listing fetch, then one cast fetch
    /// per movie, sequentially on the single session.
    pub async fn run<S: BrowserSession>(
        &self,
        session: &mut S,
    ) -> Result<(Vec<RawMovie>, Vec<RawCastMember>)> {
        let movies = self.extract_listing(session).await?;

        let mut cast = Vec::new();
        for movie in &movies {
            match self.extract_cast(session, movie).await {
                Ok(rows) => cast.extend(rows),
                Err(e) => {
                    tracing::warn!("Cast extraction failed for {}: {}", movie.external_id, e);
                }
            }
        }

        Ok((movies, cast))
    }

    /// Navigate, wait for readiness, settle, and return the rendered markup.
    async fn rendered_source<S: BrowserSession>(
        &self,
        session: &mut S,
        url: &str,
    ) -> Result<String> {
        session.navigate(url).await?;

        let wait = Duration::from_secs(self.config.wait_timeout_secs);
        match session.wait_until_ready(wait).await {
            Ok(()) => {}
            Err(SessionError::Timeout) => {
                return Err(CinerankError::Timeout {
                    url: url.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        // JS-heavy pages keep rendering after the body appears.
        if self.config.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
        }

        session.page_source().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_blocked_matches_known_markers() {
        assert!(looks_blocked(
            "<html><body>Please verify that you're not a robot.</body></html>"
        ));
        assert!(looks_blocked("<html><body>Robot Check</body></html>"));
        assert!(looks_blocked(
            "<html><body>JavaScript is disabled in this browser</body></html>"
        ));
    }

    #[test]
    fn test_looks_blocked_ignores_normal_content() {
        assert!(!looks_blocked(
            "<html><body><h1>Top rated movies</h1></body></html>"
        ));
        // Mentioning robots in content is not a verification page.
        assert!(!looks_blocked("<html><body>I, Robot (2004)</body></html>"));
    }

    #[test]
    fn test_absolute_url_strips_query_and_resolves() {
        let base = Url::parse("https://charts.example.com/chart/top/").unwrap();
        assert_eq!(
            absolute_url(&base, "/title/tt0111161/?ref_=chttp_t_1"),
            "https://charts.example.com/title/tt0111161/"
        );
        assert_eq!(
            absolute_url(&base, "https://other.example.com/name/nm1/"),
            "https://other.example.com/name/nm1/"
        );
    }
}
