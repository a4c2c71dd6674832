//! Field extraction from TMDB movie detail pages.
//!
//! Both fields sit at fixed positions inside `#original_header`: the poster
//! in the first `div`, the title link in the second.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

const TITLE_PATH: &str =
    "#original_header > div:nth-of-type(2) > section > div:nth-of-type(1) > h2 > a";
const POSTER_PATH: &str =
    "#original_header > div:nth-of-type(1) > div > div:nth-of-type(1) > div > img";

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(TITLE_PATH).expect("static selector"));
static POSTER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(POSTER_PATH).expect("static selector"));

/// Movie title from a detail page, with whitespace collapsed.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let link = document.select(&TITLE_SELECTOR).next()?;
    let title = link.text().collect::<Vec<_>>().join(" ");
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() { None } else { Some(title) }
}

/// Absolute poster image URL from a detail page.
///
/// Prefers `src`; falls back to lazy-loading `data-src` and then to the
/// first candidate of `srcset`. Relative URLs resolve against `page_url`.
pub fn extract_poster_url(html: &str, page_url: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let img = document.select(&POSTER_SELECTOR).next()?;
    let element = img.value();

    let src = ["src", "data-src"]
        .iter()
        .filter_map(|attr| element.attr(attr))
        .map(str::trim)
        .find(|s| !s.is_empty() && !s.starts_with("data:"))
        .or_else(|| {
            element
                .attr("srcset")
                .and_then(|set| set.split(',').next())
                .and_then(|candidate| candidate.split_whitespace().next())
        })?;

    page_url.join(src).ok()
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
