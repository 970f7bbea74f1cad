use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sitepoi_core::config::SourceSettings;
use sitepoi_core::error::{QueryFailureKind, Result, SitePoiError};
use sitepoi_core::models::{PoiQuery, RawPoi};
use sitepoi_core::ports::PoiSource;
use tracing::{debug, warn};

use crate::dto::OverpassResponse;
use crate::query::{build_query, describe};

const USER_AGENT: &str = concat!("sitepoi/", env!("CARGO_PKG_VERSION"));

/// Overpass API client
pub struct OverpassClient {
    /// Interpreter endpoint (e.g., "https://overpass-api.de/api/interpreter")
    endpoint: String,

    /// Timeout directive embedded in the query text
    timeout_secs: u64,

    /// HTTP client with the per-query timeout applied
    client: Client,
}

impl OverpassClient {
    /// Create a client from source settings
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SitePoiError::ConfigInvalid {
                key: "overpass_url".to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            timeout_secs: settings.timeout.as_secs(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PoiSource for OverpassClient {
    async fn fetch(&self, query: &PoiQuery) -> Result<Vec<RawPoi>> {
        let target = describe(query);
        let text = build_query(query, self.timeout_secs);

        debug!(query = %target, endpoint = %self.endpoint, "Sending Overpass query");

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", text)])
            .send()
            .await
            .map_err(|e| map_transport_error(&target, e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| map_transport_error(&target, e))?;
        if !status.is_success() {
            return Err(map_status_error(&target, status, body.as_ref()));
        }

        let decoded = OverpassResponse::parse(body.as_ref()).map_err(|e| {
            SitePoiError::query_failure(
                target.clone(),
                QueryFailureKind::Decode,
                format!("invalid Overpass JSON payload: {}", e),
            )
        })?;

        if let Some(remark) = decoded.remark.as_deref() {
            warn!(query = %target, remark, "Overpass returned a remark; results may be partial");
        }

        debug!(query = %target, elements = decoded.elements.len(), "Overpass query complete");
        Ok(decoded.elements)
    }

    fn name(&self) -> &str {
        "overpass"
    }
}

fn map_transport_error(target: &str, error: reqwest::Error) -> SitePoiError {
    let kind = if error.is_timeout() { QueryFailureKind::Timeout } else { QueryFailureKind::Transport };
    SitePoiError::query_failure(target, kind, error.to_string())
}

fn map_status_error(target: &str, status: StatusCode, body: &[u8]) -> SitePoiError {
    let kind = match status {
        StatusCode::TOO_MANY_REQUESTS => QueryFailureKind::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => QueryFailureKind::Timeout,
        _ => QueryFailureKind::Status(status.as_u16()),
    };

    let preview = body_preview(body);
    let reason = if preview.is_empty() { status.to_string() } else { preview };
    SitePoiError::query_failure(target, kind, reason)
}

/// Whitespace-collapsed prefix of an error body
fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body).split_whitespace().collect::<Vec<_>>().join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{}...", preview)
    } else {
        preview
    }
}
