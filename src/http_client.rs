//! Outbound HTTP plumbing: a shared, pooled `reqwest::Client` for
//! fetching recipe pages, and the Base64+gzip compressed-HTML codec
//! used by `POST /recipe`'s `html` field.

use std::io::Read;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::GzDecoder;

const USER_AGENT: &str = "cookbook-recipe-service/0.1 (+https://github.com/cookbook-app/recipe-service)";

/// Builds the process-wide client: pool capped at 200 total / 20 per
/// host, 2s connect timeout, 30s response timeout.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(20)
        .build()
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("fetching {url} returned status {status}")]
    BadStatus { url: String, status: u16 },
}

/// Fetches `url` with a 10s deadline, returning the raw response body.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(FetchError::BadStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.text().await.map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum DecompressError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid gzip stream: {0}")]
    Gzip(#[from] std::io::Error),
    #[error("decompressed stream is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Decodes `html` as Base64-of-gzip, per the compressed HTML format.
pub fn decompress_html(html: &str) -> Result<String, DecompressError> {
    let gzipped = BASE64.decode(html.trim())?;
    let mut decoder = GzDecoder::new(&gzipped[..]);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;
    Ok(String::from_utf8(raw)?)
}
