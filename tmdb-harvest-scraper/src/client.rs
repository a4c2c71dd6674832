use tokio::time::Duration;
use url::Url;

use tmdb_harvest_lib::TmdbId;

use crate::error::ScrapeError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for TMDB movie pages and poster images.
///
/// One instance is held for a whole run. Throttling is the pipeline's job;
/// this client issues requests as soon as it is asked.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TmdbClient {
    /// Create a client for movie pages under `base_url`
    /// (e.g. `https://www.themoviedb.org/movie/`).
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        user_agent: &str,
    ) -> Result<Self, ScrapeError> {
        let http = http_builder(timeout, user_agent).build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// Client for a local mock server: system proxies are ignored.
    #[cfg(test)]
    pub(crate) fn local(base_url: &str, timeout: Duration) -> Result<Self, ScrapeError> {
        let http = http_builder(Some(timeout), "test-agent").no_proxy().build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the detail page for a movie.
    pub fn movie_url(&self, tmdb_id: &TmdbId) -> Result<Url, ScrapeError> {
        Ok(self.base_url.join(tmdb_id.as_str())?)
    }

    /// Fetch the detail page. Returns the final URL (after redirects) and body.
    pub async fn movie_page(&self, tmdb_id: &TmdbId) -> Result<(Url, String), ScrapeError> {
        let url = self.movie_url(tmdb_id)?;
        let resp = self.get(&url).await?;
        let final_url = resp.url().clone();
        let body = resp.text().await.map_err(ScrapeError::from_request)?;
        if body.trim().is_empty() {
            return Err(ScrapeError::EmptyBody(url.to_string()));
        }
        Ok((final_url, body))
    }

    /// Download a binary resource such as a poster image.
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>, ScrapeError> {
        let resp = self.get(url).await?;
        let bytes = resp.bytes().await.map_err(ScrapeError::from_request)?;
        if bytes.is_empty() {
            return Err(ScrapeError::EmptyBody(url.to_string()));
        }
        Ok(bytes.to_vec())
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response, ScrapeError> {
        log::debug!("GET {}", url);
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(ScrapeError::from_request)?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }
}

fn http_builder(timeout: Option<Duration>, user_agent: &str) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
        .user_agent(user_agent)
}

/// Parse the base URL, making sure it ends in `/` so ids are appended
/// rather than replacing the last path segment.
fn normalize_base_url(raw: &str) -> Result<Url, ScrapeError> {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        Ok(Url::parse(trimmed)?)
    } else {
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}
