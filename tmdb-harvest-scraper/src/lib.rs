pub mod client;
pub mod error;
pub mod extract;
pub mod fetch;

pub use client::TmdbClient;
pub use error::ScrapeError;
pub use extract::{extract_poster_url, extract_title};
pub use fetch::{PosterFetcher, TitleFetcher};
