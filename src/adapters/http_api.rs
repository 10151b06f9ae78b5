//! Source adapter for JSON search APIs.
//!
//! Covers boards exposing a plain HTTP search endpoint that returns a JSON
//! array of postings. One instance per board, built from the run config;
//! boards needing browser automation implement `Source` elsewhere.

use crate::domain::model::RawPosting;
use crate::domain::ports::Source;
use crate::utils::error::{SourceError, SourceResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub struct HttpApiSource {
    id: String,
    name: String,
    endpoint: String,
    /// Detail endpoint for summary-only postings; fetched as
    /// `{detail_endpoint}/{posting_id}` during enrichment.
    detail_endpoint: Option<String>,
    supports_location: bool,
    client: Client,
}

/// Wire shape of one posting in a search response.
#[derive(Debug, Deserialize)]
struct ApiPosting {
    title: String,
    url: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiDetail {
    description: String,
}

impl HttpApiSource {
    pub fn new(id: &str, name: &str, endpoint: &str, supports_location: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            detail_endpoint: None,
            supports_location,
            client: Client::new(),
        }
    }

    pub fn with_detail_endpoint(mut self, endpoint: &str) -> Self {
        self.detail_endpoint = Some(endpoint.to_string());
        self
    }

    fn check_status(&self, status: StatusCode) -> SourceResult<()> {
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::BlockedError {
                message: format!("HTTP {}", status.as_u16()),
            });
        }
        if !status.is_success() {
            return Err(SourceError::ParseError {
                message: format!("unexpected HTTP status {}", status.as_u16()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Source for HttpApiSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn supports_location_filter(&self) -> bool {
        self.supports_location
    }

    async fn search(
        &self,
        query: &str,
        location: Option<&str>,
        limit: usize,
    ) -> SourceResult<Vec<RawPosting>> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("limit", &limit.to_string())]);
        if let Some(location) = location {
            request = request.query(&[("location", location)]);
        }

        tracing::debug!(source = self.id.as_str(), query, "requesting search endpoint");
        let response = request.send().await?;
        self.check_status(response.status())?;

        let body = response.text().await?;
        let postings: Vec<ApiPosting> =
            serde_json::from_str(&body).map_err(|e| SourceError::ParseError {
                message: e.to_string(),
            })?;

        Ok(postings
            .into_iter()
            .take(limit)
            .map(|p| RawPosting {
                title: p.title,
                source: self.id.clone(),
                company: p.company,
                location: p.location,
                link: p.url,
                description: p.description,
                posting_id: p.id,
            })
            .collect())
    }

    async fn fetch_full_description(
        &self,
        posting: &RawPosting,
    ) -> SourceResult<Option<String>> {
        let (Some(endpoint), Some(posting_id)) = (&self.detail_endpoint, &posting.posting_id)
        else {
            return Ok(None);
        };

        let url = format!("{}/{}", endpoint.trim_end_matches('/'), posting_id);
        let response = self.client.get(&url).send().await?;
        self.check_status(response.status())?;

        let body = response.text().await?;
        let detail: ApiDetail =
            serde_json::from_str(&body).map_err(|e| SourceError::ParseError {
                message: e.to_string(),
            })?;
        Ok(Some(detail.description))
    }
}
