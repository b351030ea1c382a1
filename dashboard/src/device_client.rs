use garden_common::{
    parse_latest, DeviceConfig, DeviceSnapshot, SnapshotError, PATH_AUTO, PATH_LATEST, PATH_WATER,
};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::Serialize;
use thiserror::Error;

/// Transport and status failures share one failure path for callers.
#[derive(Debug, Error)]
pub enum DeviceApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("device API answered HTTP {0}")]
    Status(u16),
    #[error(transparent)]
    Payload(#[from] SnapshotError),
}

#[derive(Debug, Serialize)]
struct AutoModeBody {
    enabled: bool,
}

#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: reqwest::Client,
    base_url: String,
}

impl DeviceClient {
    pub fn new(config: &DeviceConfig) -> Result<Self, DeviceApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `Ok(None)` means the device has not reported anything yet.
    pub async fn latest(&self) -> Result<Option<DeviceSnapshot>, DeviceApiError> {
        let response = self
            .client
            .get(self.url(PATH_LATEST))
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;
        let body = ensure_success(response)?.bytes().await?;
        Ok(parse_latest(&body)?)
    }

    pub async fn water_now(&self) -> Result<(), DeviceApiError> {
        let response = self.client.post(self.url(PATH_WATER)).send().await?;
        ensure_success(response)?;
        Ok(())
    }

    /// Success only confirms receipt; the device applying it shows up later
    /// in a snapshot.
    pub async fn set_auto_mode(&self, enabled: bool) -> Result<(), DeviceApiError> {
        let response = self
            .client
            .post(self.url(PATH_AUTO))
            .json(&AutoModeBody { enabled })
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, DeviceApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(DeviceApiError::Status(status.as_u16()))
    }
}
