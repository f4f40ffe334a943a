use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::domain::{Appliance, Signal};
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.nature.global";

/// Remote directory of appliances and their recorded signals, plus the
/// ability to fire one of them.
#[async_trait]
pub trait SignalDirectory: Send + Sync {
    async fn list_appliances(&self) -> Result<Vec<Appliance>>;
    async fn send_signal(&self, signal: &Signal) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct RemoClient {
    http: Client,
    base_url: Url,
    access_token: String,
}

impl RemoClient {
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: parse_base_url(base_url)?,
            access_token: access_token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid endpoint path '{path}'"))
    }
}

/// Normalizes the API root so relative joins keep any path prefix.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
    if url.cannot_be_a_base() {
        anyhow::bail!("api url '{raw}' cannot be used as a base");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl SignalDirectory for RemoClient {
    async fn list_appliances(&self) -> Result<Vec<Appliance>> {
        let url = self.endpoint("1/appliances")?;
        debug!(%url, "listing appliances");
        let appliances: Vec<Appliance> = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("GET /1/appliances")?
            .error_for_status()
            .map_err(describe_status)?
            .json()
            .await
            .context("decode appliance list")?;
        Ok(appliances)
    }

    async fn send_signal(&self, signal: &Signal) -> Result<()> {
        let url = self.endpoint(&format!("1/signals/{}/send", signal.id.as_str()))?;
        debug!(%url, signal = %signal.name, "sending signal");
        self.http
            .post(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("POST /1/signals/{}/send", signal.id.as_str()))?
            .error_for_status()
            .map_err(describe_status)?;
        Ok(())
    }
}

fn describe_status(err: reqwest::Error) -> anyhow::Error {
    match err.status() {
        Some(StatusCode::UNAUTHORIZED) => {
            anyhow::Error::new(err).context("access token was rejected")
        }
        Some(StatusCode::TOO_MANY_REQUESTS) => {
            anyhow::Error::new(err).context("remote api rate limit reached")
        }
        _ => anyhow::Error::new(err),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
