//! PoetryDB API client
//!
//! Fetches poems by author and line count from PoetryDB and turns the JSON
//! response into raw sonnet records.

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{RawSonnet, SonnetError, SonnetSource};
use crate::config::SourceRequest;

/// Errors that can occur when fetching sonnets
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    /// HTTP request failed or returned an error status
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// PoetryDB answered with an error object instead of poems
    #[error("PoetryDB returned status {status}: {reason}")]
    Api { status: u16, reason: String },

    /// The response body is not a list of poems
    #[error("Unexpected API response format: {0}")]
    UnexpectedResponse(String),

    /// A poem in the response cannot be used
    #[error("Invalid sonnet record: {0}")]
    InvalidRecord(#[from] SonnetError),

    /// The request URL cannot be built from the configured base URL
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Response body from PoetryDB
///
/// A successful lookup is a JSON array of poems. A lookup without results is
/// an object such as `{"status": 404, "reason": "Not found"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    Poems(Vec<RawSonnet>),
    Status { status: u16, reason: String },
}

/// Client for fetching sonnets from PoetryDB
#[derive(Debug, Clone)]
pub struct PoetryDbClient {
    /// HTTP client for making requests
    http_client: Client,
}

impl PoetryDbClient {
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
        }
    }

    /// Builds `<base_url>/author,linecount/<author>;<line_count>`
    pub fn request_url(request: &SourceRequest) -> Result<Url, RemoteFetchError> {
        let mut url = Url::parse(request.base_url())
            .map_err(|e| RemoteFetchError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| RemoteFetchError::InvalidUrl(request.base_url().to_string()))?
            .pop_if_empty()
            .push("author,linecount")
            .push(&format!("{};{}", request.author(), request.line_count()));

        Ok(url)
    }
}

impl Default for PoetryDbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SonnetSource for PoetryDbClient {
    fn fetch(&self, request: &SourceRequest) -> Result<Vec<RawSonnet>, RemoteFetchError> {
        let url = Self::request_url(request)?;
        debug!(%url, "Fetching sonnets from PoetryDB");

        let body = self
            .http_client
            .get(url)
            .send()?
            .error_for_status()?
            .text()?;

        parse_response(&body)
    }

    fn name(&self) -> &str {
        "PoetryDB"
    }
}

/// Parses a PoetryDB response body into raw records
///
/// Records are returned as sent; the loader turns them into `Sonnet`s.
pub fn parse_response(body: &str) -> Result<Vec<RawSonnet>, RemoteFetchError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| RemoteFetchError::UnexpectedResponse(e.to_string()))?;

    match response {
        ApiResponse::Poems(poems) => Ok(poems),
        ApiResponse::Status { status, reason } => Err(RemoteFetchError::Api { status, reason }),
    }
}
