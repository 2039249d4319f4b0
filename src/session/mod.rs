//! Browser session capability
//!
//! The pipeline needs exactly three things from a browser: navigate to a URL,
//! wait until the page has rendered something, and hand back the rendered
//! markup. `BrowserSession` captures that surface; `WebDriverSession` is the
//! production implementation over a remote WebDriver endpoint. Tests drive
//! the extractor with scripted in-memory sessions instead.

mod webdriver;

pub use webdriver::WebDriverSession;

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a browser session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("WebDriver endpoint error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver protocol error {error}: {message}")]
    Protocol { error: String, message: String },

    #[error("Malformed WebDriver response: {0}")]
    Malformed(String),

    #[error("Timed out waiting for the page to render")]
    Timeout,
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// The opaque browser capability the extractor drives.
///
/// Navigation is stateful; callers must issue these operations sequentially
/// on one session.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    /// Navigates the session to the given URL.
    async fn navigate(&mut self, url: &str) -> SessionResult<()>;

    /// Blocks until a basic readiness condition holds (a rendered `<body>`),
    /// bounded by `timeout`. Exceeding the bound is `SessionError::Timeout`.
    async fn wait_until_ready(&mut self, timeout: Duration) -> SessionResult<()>;

    /// Returns the rendered markup of the current page.
    async fn page_source(&mut self) -> SessionResult<String>;

    /// Releases the session. Callers must invoke this on every exit path.
    async fn close(self) -> SessionResult<()>;
}
