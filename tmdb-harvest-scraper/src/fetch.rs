//! Pipeline fetchers for movie titles and poster images.

use tmdb_harvest_lib::{FetchFailure, Fetcher, MovieId, TmdbId};

use crate::client::TmdbClient;
use crate::error::ScrapeError;
use crate::extract::{extract_poster_url, extract_title};

/// Fetches the movie title from its detail page.
pub struct TitleFetcher {
    client: TmdbClient,
}

impl TitleFetcher {
    pub fn new(client: TmdbClient) -> Self {
        Self { client }
    }

    pub async fn fetch_title(&self, tmdb_id: &TmdbId) -> Result<String, ScrapeError> {
        let (url, body) = self.client.movie_page(tmdb_id).await?;
        extract_title(&body).ok_or_else(|| ScrapeError::MissingElement {
            url: url.to_string(),
            what: "title",
        })
    }
}

impl Fetcher for TitleFetcher {
    type Output = String;

    async fn fetch(&self, movie_id: MovieId, tmdb_id: &TmdbId) -> Result<String, FetchFailure> {
        self.fetch_title(tmdb_id).await.map_err(|e| {
            log::debug!("Title fetch for movie {} (tmdb {}) failed: {}", movie_id, tmdb_id, e);
            FetchFailure::from(e)
        })
    }
}

/// Fetches the detail page, then downloads the poster image it references.
pub struct PosterFetcher {
    client: TmdbClient,
}

impl PosterFetcher {
    pub fn new(client: TmdbClient) -> Self {
        Self { client }
    }

    pub async fn fetch_poster(&self, tmdb_id: &TmdbId) -> Result<Vec<u8>, ScrapeError> {
        let (url, body) = self.client.movie_page(tmdb_id).await?;
        let poster_url =
            extract_poster_url(&body, &url).ok_or_else(|| ScrapeError::MissingElement {
                url: url.to_string(),
                what: "poster image",
            })?;
        log::debug!("Poster for tmdb {}: {}", tmdb_id, poster_url);
        self.client.download(&poster_url).await
    }
}

impl Fetcher for PosterFetcher {
    type Output = Vec<u8>;

    async fn fetch(&self, movie_id: MovieId, tmdb_id: &TmdbId) -> Result<Vec<u8>, FetchFailure> {
        self.fetch_poster(tmdb_id).await.map_err(|e| {
            log::debug!("Poster fetch for movie {} (tmdb {}) failed: {}", movie_id, tmdb_id, e);
            FetchFailure::from(e)
        })
    }
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
