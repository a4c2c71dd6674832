use tmdb_harvest_lib::FetchFailure;

/// Errors that can occur while fetching a movie page or poster.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("No {what} found on {url}")]
    MissingElement { url: String, what: &'static str },

    #[error("Empty response body from {0}")]
    EmptyBody(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ScrapeError {
    /// Classify a reqwest error, splitting out timeouts.
    pub(crate) fn from_request(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

impl From<ScrapeError> for FetchFailure {
    fn from(e: ScrapeError) -> Self {
        let msg = e.to_string();
        match e {
            ScrapeError::Timeout(_) => FetchFailure::Timeout(msg),
            // Site unreachable or client unusable: abort the pass
            ScrapeError::Http(ref inner) if inner.is_connect() || inner.is_builder() => {
                FetchFailure::Infrastructure(msg)
            }
            ScrapeError::Http(_) | ScrapeError::Status { .. } | ScrapeError::EmptyBody(_) => {
                FetchFailure::Remote(msg)
            }
            ScrapeError::MissingElement { .. } | ScrapeError::Url(_) => {
                FetchFailure::MissingElement(msg)
            }
        }
    }
}
