use crate::core::PageSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 以瀏覽器 User-Agent 抓取價格頁面
pub struct HttpPageSource {
    client: Client,
    url: String,
}

impl HttpPageSource {
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self) -> Result<String> {
        tracing::debug!("Making request to: {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        tracing::debug!("Response status: {}", response.status());

        let body = response.error_for_status()?.text().await?;
        tracing::debug!("Fetched {} bytes of markup", body.len());
        Ok(body)
    }
}
