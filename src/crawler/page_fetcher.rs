use crate::crawler::crawl_error::CrawlError;
use crate::crawler::crawl_response::CrawlResponse;
use crate::crawler::url_normalizer::NormalizedUrl;
use std::collections::HashMap;

/// Fetches pages over HTTP; every status is returned, judging it is left to
/// the admission gate.
#[derive(Clone, Debug)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub async fn fetch(&self, url: &NormalizedUrl) -> Result<CrawlResponse, CrawlError> {
        let response = self.client.get(url.url().clone()).send().await?;

        let status_code = response.status().as_u16();
        let effective_url = response.url().to_string();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(CrawlResponse {
            status_code,
            effective_url,
            headers,
            body,
        })
    }
}
