use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, USER_AGENT},
    Url,
};
use tracing::debug;

use super::{entities::InsightsResponse, error::FetchError};

pub const DEFAULT_BASE_URL: &str = "https://api.wakatime.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const DAYS_PATH: [&str; 6] = ["api", "v1", "users", "current", "insights", "days"];

/// Anything able to answer one `insights/days/{range}` request. Retrying is not the concern of
/// the source, see [Fetcher](super::fetcher::Fetcher).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightsSource: Send + Sync {
    async fn get_days(&self, range: &str) -> Result<InsightsResponse, FetchError>;
}

/// Connection parameters, resolved once by the cli.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_key: String,
    pub base_url: Url,
    pub timeout: Duration,
}

impl FetchConfig {
    /// `range` becomes a single percent-encoded path segment.
    pub fn days_url(&self, range: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(DAYS_PATH)
            .push(range);
        Ok(url)
    }
}

/// The main realization of [InsightsSource] backed by reqwest.
pub struct HttpInsightsSource {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpInsightsSource {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl InsightsSource for HttpInsightsSource {
    async fn get_days(&self, range: &str) -> Result<InsightsResponse, FetchError> {
        let url = self.config.days_url(range)?;
        debug!("Requesting {url}");

        // WakaTime expects Basic base64("<api key>:")
        let response = self
            .client
            .get(url)
            .basic_auth(&self.config.api_key, Some(""))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("waka-heatmap/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
