//! Remote WebDriver session over the W3C wire protocol
//!
//! Speaks plain HTTP + JSON to a remote endpoint (a selenium container in
//! the default setup): `POST /session` to open, `POST /session/{id}/url` to
//! navigate, `GET /session/{id}/source` for rendered markup, and
//! `DELETE /session/{id}` to release the browser.

use crate::session::{BrowserSession, SessionError, SessionResult};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// Poll interval for the readiness wait
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Slack added to the HTTP client timeout over the page-load timeout, so the
/// endpoint's own timeout fires first and arrives as a protocol error.
const CLIENT_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct NewSessionValue {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// A live session against a remote WebDriver endpoint
pub struct WebDriverSession {
    client: Client,
    base: String,
    session_id: String,
}

impl WebDriverSession {
    /// Opens a headless Chrome session at the given endpoint and applies the
    /// page-load timeout.
    pub async fn connect(endpoint: &str, page_load_timeout: Duration) -> SessionResult<Self> {
        let client = Client::builder()
            .timeout(page_load_timeout + CLIENT_TIMEOUT_SLACK)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let response = execute(
            &client,
            Method::POST,
            &format!("{base}/session"),
            Some(&chrome_capabilities()),
        )
        .await?;

        let session_id = parse_session_id(&response)?;
        tracing::debug!("WebDriver session {} opened at {}", session_id, base);

        let session = Self {
            client,
            base,
            session_id,
        };

        session
            .command(
                Method::POST,
                "timeouts",
                Some(json!({ "pageLoad": page_load_timeout.as_millis() as u64 })),
            )
            .await?;

        Ok(session)
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> SessionResult<Value> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.base, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.base, self.session_id, path)
        };
        execute(&self.client, method, &url, body.as_ref()).await
    }
}

impl BrowserSession for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> SessionResult<()> {
        let deadline = Instant::now() + timeout;
        let probe = json!({ "using": "css selector", "value": "body" });

        loop {
            match self
                .command(Method::POST, "element", Some(probe.clone()))
                .await
            {
                Ok(_) => return Ok(()),
                // Not rendered yet; keep polling until the deadline.
                Err(SessionError::Protocol { .. }) => {}
                Err(other) => return Err(other),
            }

            if Instant::now() >= deadline {
                return Err(SessionError::Timeout);
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn page_source(&mut self) -> SessionResult<String> {
        let response = self.command(Method::GET, "source", None).await?;
        response
            .pointer("/value")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| SessionError::Malformed("page source missing from response".to_string()))
    }

    async fn close(self) -> SessionResult<()> {
        self.command(Method::DELETE, "", None).await?;
        tracing::debug!("WebDriver session {} closed", self.session_id);
        Ok(())
    }
}

/// Issues one wire-protocol request and surfaces endpoint errors uniformly.
async fn execute(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> SessionResult<Value> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            SessionError::Timeout
        } else {
            SessionError::Http(e)
        }
    })?;

    let status = response.status();
    let text = response.text().await?;
    let json: Value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text)
            .map_err(|e| SessionError::Malformed(format!("invalid JSON from {url}: {e}")))?
    };

    if let Some(error) = json.pointer("/value/error").and_then(|v| v.as_str()) {
        let message = json
            .pointer("/value/message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown webdriver error");
        return Err(SessionError::Protocol {
            error: error.to_string(),
            message: message.to_string(),
        });
    }

    if !status.is_success() {
        return Err(SessionError::Malformed(format!(
            "HTTP {} from {}",
            status.as_u16(),
            url
        )));
    }

    Ok(json)
}

fn parse_session_id(response: &Value) -> SessionResult<String> {
    // Spec-compliant endpoints nest the id under "value"; some legacy ones
    // put it at the top level.
    let nested = response
        .pointer("/value")
        .cloned()
        .and_then(|v| serde_json::from_value::<NewSessionValue>(v).ok());

    if let Some(value) = nested {
        return Ok(value.session_id);
    }

    response
        .pointer("/sessionId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| SessionError::Malformed("session create missing sessionId".to_string()))
}

fn chrome_capabilities() -> Value {
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": {
                    "args": [
                        "--headless=new",
                        "--no-sandbox",
                        "--disable-dev-shm-usage",
                        "--window-size=1920,1080",
                        "--lang=en-US",
                        "--user-agent=Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    ]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_id_nested() {
        let response = json!({ "value": { "sessionId": "abc123", "capabilities": {} } });
        assert_eq!(parse_session_id(&response).unwrap(), "abc123");
    }

    #[test]
    fn test_parse_session_id_top_level() {
        let response = json!({ "sessionId": "legacy456" });
        assert_eq!(parse_session_id(&response).unwrap(), "legacy456");
    }

    #[test]
    fn test_parse_session_id_missing() {
        let response = json!({ "value": {} });
        assert!(matches!(
            parse_session_id(&response),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn test_capabilities_request_headless_chrome() {
        let caps = chrome_capabilities();
        assert_eq!(
            caps.pointer("/capabilities/alwaysMatch/browserName")
                .and_then(|v| v.as_str()),
            Some("chrome")
        );
        let args = caps
            .pointer("/capabilities/alwaysMatch/goog:chromeOptions/args")
            .and_then(|v| v.as_array())
            .unwrap();
        assert!(args.iter().any(|a| a.as_str() == Some("--headless=new")));
    }
}
