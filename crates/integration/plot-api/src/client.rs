//! Listing REST API client

use async_trait::async_trait;
use plot_config::PlotConfig;
use plot_core::{EnquiryRequest, Layout};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ApiError, EnquirySink, LayoutSource, Result};

/// Responses arrive either bare or wrapped in `{"data": ...}`
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// What the API acknowledged for an enquiry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnquiryReceipt {
    pub id: Option<String>,
    pub raw: serde_json::Value,
}

impl EnquiryReceipt {
    fn from_json(raw: serde_json::Value) -> Self {
        let id = raw
            .get("data")
            .and_then(|d| d.get("id"))
            .or_else(|| raw.get("id"))
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        Self { id, raw }
    }
}

/// Client for the listing platform API
#[derive(Clone)]
pub struct ListingClient {
    base: Url,
    http: reqwest::Client,
    token: Option<String>,
}

impl ListingClient {
    pub fn new(base_url: &str, token: Option<String>, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::with_client(base_url, token, http)
    }

    pub fn with_client(base_url: &str, token: Option<String>, http: reqwest::Client) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| ApiError::InvalidBase(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBase(base_url.to_string()));
        }
        Ok(Self { base, http, token })
    }

    pub fn from_config(config: &PlotConfig) -> Result<Self> {
        Self::new(&config.api_base_url, config.api_token.clone(), &config.user_agent)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        // 201/204 with no body still counts as accepted
        let raw = if text.trim().is_empty() { "null" } else { text.as_str() };
        let envelope: Envelope<T> =
            serde_json::from_str(raw).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.into_inner())
    }
}

#[async_trait]
impl LayoutSource for ListingClient {
    async fn fetch_layout(&self, id: &str) -> Result<Layout> {
        let url = self.endpoint(&["layouts", id])?;
        tracing::debug!(%url, "fetching layout");
        let resp = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl EnquirySink for ListingClient {
    async fn submit_enquiry(&self, request: &EnquiryRequest) -> Result<EnquiryReceipt> {
        let url = self.endpoint(&["enquiries"])?;
        tracing::info!(layout = %request.layout_id, slot = %request.slot_id, "submitting enquiry");
        let resp = self
            .authorize(self.http.post(url).json(request))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let raw: serde_json::Value = Self::decode(resp).await?;
        Ok(EnquiryReceipt::from_json(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn layout(Path(id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
        if id == "broken" {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        }
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        Json(json!({
            "data": {
                "id": id,
                "title": auth,
                "slots": [{"id": 1, "sectionTitle": "Plot 1", "status": "available"}]
            }
        }))
        .into_response()
    }

    async fn enquiry(Json(body): Json<Value>) -> impl IntoResponse {
        if body["message"] == "fail" {
            return (StatusCode::UNPROCESSABLE_ENTITY, "bad").into_response();
        }
        Json(json!({ "id": 77, "echo": body })).into_response()
    }

    async fn api() -> String {
        let app = Router::new()
            .route("/api/layouts/{id}", get(layout))
            .route("/api/enquiries", post(enquiry));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/")
    }

    fn client(base: &str, token: Option<&str>) -> ListingClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        ListingClient::with_client(base, token.map(str::to_string), http).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://api.example.com/v1", None);
        let url = c.endpoint(&["layouts", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://api.example.com/v1/layouts/a%20b");
        let c = client("http://api.example.com/v1/", None);
        assert_eq!(
            c.endpoint(&["enquiries"]).unwrap().as_str(),
            "http://api.example.com/v1/enquiries"
        );
    }

    #[test]
    fn test_invalid_base() {
        let http = reqwest::Client::new();
        assert!(matches!(
            ListingClient::with_client("mailto:someone@example.com", None, http),
            Err(ApiError::InvalidBase(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_layout_unwraps_envelope_and_sends_token() {
        let base = api().await;
        let layout = client(&base, Some("tok")).fetch_layout("L9").await.unwrap();
        assert_eq!(layout.id, "L9");
        assert_eq!(layout.title.as_deref(), Some("Bearer tok"));
        assert_eq!(layout.slots[0].id, "1");
    }

    #[test]
    fn test_receipt_id_lookup() {
        assert_eq!(EnquiryReceipt::from_json(json!({"id": "e1"})).id.as_deref(), Some("e1"));
        assert_eq!(
            EnquiryReceipt::from_json(json!({"data": {"id": 5}})).id.as_deref(),
            Some("5")
        );
        assert_eq!(EnquiryReceipt::from_json(Value::Null).id, None);
    }

    #[tokio::test]
    async fn test_fetch_layout_error_status() {
        let base = api().await;
        let err = client(&base, None).fetch_layout("broken").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_submit_enquiry() {
        let base = api().await;
        let c = client(&base, None);

        let ok = c
            .submit_enquiry(&EnquiryRequest::for_slot("L1", "s1", "hello"))
            .await
            .unwrap();
        assert_eq!(ok.id.as_deref(), Some("77"));
        assert_eq!(ok.raw["echo"]["type"], "LAYOUT");

        let err = c
            .submit_enquiry(&EnquiryRequest::for_slot("L1", "s1", "fail"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 422, .. }));
    }
}
