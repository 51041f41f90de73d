// Racing API data source over HTTP
use crate::application::error::{AppError, AppResult};
use crate::application::race_data_source::{RaceDataSource, RawRacePage};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NedsDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl NedsDataSource {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RaceDataSource for NedsDataSource {
    async fn fetch(&self, page_size: u32) -> AppResult<RawRacePage> {
        let url = format!("{}/rest/v1/racing/", self.base_url);
        let count = page_size.to_string();
        tracing::debug!("GET {} count={}", url, count);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[("method", "nextraces"), ("count", count.as_str())])
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Server {
                code: i32::from(status.as_u16()),
            });
        }

        response
            .json::<RawRacePage>()
            .await
            .map_err(classify_transport_error)
    }
}

fn classify_transport_error(err: reqwest::Error) -> AppError {
    if err.is_decode() {
        AppError::Serialization(err.to_string())
    } else if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
        AppError::Network(err.to_string())
    } else {
        AppError::Unknown(err.to_string())
    }
}
