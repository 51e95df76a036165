//! SVG relay
//!
//! Browsers refuse to read cross-origin SVG text, so plot maps hosted on a CDN
//! are fetched server-side and handed back from our own origin.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use crate::SvgSource;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Relay failures, each mapping to a distinct HTTP status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("URL parameter is required")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream returned {status}")]
    Upstream { status: u16 },

    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Failed to read upstream body: {0}")]
    Body(String),
}

impl RelayError {
    /// Status the relay endpoint answers with
    pub fn status(&self) -> u16 {
        match self {
            RelayError::MissingUrl | RelayError::InvalidUrl(_) => 400,
            RelayError::Upstream { status } => *status,
            RelayError::Transport(_) | RelayError::Body(_) => 500,
        }
    }
}

/// A successfully relayed SVG
#[derive(Debug, Clone)]
pub struct RelayedSvg {
    pub url: Url,
    pub body: Vec<u8>,
}

impl RelayedSvg {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Stateless outbound SVG fetcher
#[derive(Clone)]
pub struct SvgRelay {
    http: reqwest::Client,
}

impl SvgRelay {
    pub fn new(user_agent: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Validate the `url` parameter: present, absolute, http(s).
    pub fn parse_target(raw: Option<&str>) -> Result<Url, RelayError> {
        let raw = raw.map(str::trim).filter(|u| !u.is_empty()).ok_or(RelayError::MissingUrl)?;
        let url = Url::parse(raw).map_err(|e| RelayError::InvalidUrl(format!("{raw}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(RelayError::InvalidUrl(format!("unsupported scheme {other}"))),
        }
    }

    pub async fn fetch(&self, raw: Option<&str>) -> Result<RelayedSvg, RelayError> {
        let url = Self::parse_target(raw)?;
        tracing::debug!(%url, "relaying svg");

        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT, SVG_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "svg relay transport failure");
                RelayError::Transport(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "svg relay upstream error");
            return Err(RelayError::Upstream { status: status.as_u16() });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| RelayError::Body(e.to_string()))?;
        Ok(RelayedSvg { url, body: body.to_vec() })
    }
}

#[async_trait]
impl SvgSource for SvgRelay {
    async fn fetch_svg(&self, url: &str) -> Result<String, RelayError> {
        self.fetch(Some(url)).await.map(|svg| svg.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use axum::routing::get;
    use axum::Router;

    async fn upstream() -> String {
        let app = Router::new()
            .route(
                "/map.svg",
                get(|| async { ([(header::CONTENT_TYPE, SVG_CONTENT_TYPE)], "<svg/>") }),
            )
            .route("/gone.svg", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn relay() -> SvgRelay {
        SvgRelay::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(SvgRelay::parse_target(None).unwrap_err(), RelayError::MissingUrl);
        assert_eq!(SvgRelay::parse_target(Some("  ")).unwrap_err(), RelayError::MissingUrl);
        assert!(matches!(
            SvgRelay::parse_target(Some("/relative.svg")),
            Err(RelayError::InvalidUrl(_))
        ));
        assert!(matches!(
            SvgRelay::parse_target(Some("file:///etc/passwd")),
            Err(RelayError::InvalidUrl(_))
        ));
        assert!(SvgRelay::parse_target(Some("https://cdn.example.com/a.svg")).is_ok());
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(RelayError::MissingUrl.status(), 400);
        assert_eq!(RelayError::Upstream { status: 404 }.status(), 404);
        assert_eq!(RelayError::Transport("refused".into()).status(), 500);
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let base = upstream().await;
        let relay = relay();
        let svg = relay.fetch(Some(&format!("{base}/map.svg"))).await.unwrap();
        assert_eq!(svg.text(), "<svg/>");
    }

    #[tokio::test]
    async fn test_fetch_forwards_upstream_status() {
        let base = upstream().await;
        let relay = relay();
        let err = relay.fetch(Some(&format!("{base}/gone.svg"))).await.unwrap_err();
        assert_eq!(err, RelayError::Upstream { status: 404 });
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let relay = relay();
        let err = relay.fetch_svg(&format!("http://{addr}/map.svg")).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
    }
}
