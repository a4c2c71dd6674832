use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

const MOVIE_PAGE: &str = r#"<html><body>
<section id="original_header">
  <div><div><div><div><img src="/t/p/w300/fight-club.jpg" alt="Fight Club"></div></div></div></div>
  <div><section><div><h2><a href="/movie/550">Fight Club</a></h2></div></section></div>
</section>
</body></html>"#;

fn tmdb(id: &str) -> TmdbId {
    TmdbId::new(id).unwrap()
}

fn client_for(server: &MockServer) -> TmdbClient {
    TmdbClient::local(&format!("{}/movie/", server.uri()), Duration::from_secs(5)).unwrap()
}

async fn serve_page(server: &MockServer, id: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/movie/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[test]
fn test_failure_classification() {
    let missing = ScrapeError::MissingElement {
        url: "https://www.themoviedb.org/movie/1".to_string(),
        what: "title",
    };
    assert!(matches!(FetchFailure::from(missing), FetchFailure::MissingElement(_)));

    let status = ScrapeError::Status {
        status: 404,
        url: "https://www.themoviedb.org/movie/1".to_string(),
    };
    let failure = FetchFailure::from(status);
    assert!(matches!(failure, FetchFailure::Remote(ref m) if m.contains("404")));
    assert!(failure.is_per_item());
}

#[tokio::test]
async fn test_title_fetched_from_page() {
    let server = MockServer::start().await;
    serve_page(&server, "550", MOVIE_PAGE).await;

    let fetcher = TitleFetcher::new(client_for(&server));
    let title = fetcher.fetch(MovieId(2959), &tmdb("550")).await.unwrap();
    assert_eq!(title, "Fight Club");
}

#[tokio::test]
async fn test_title_missing_from_page() {
    let server = MockServer::start().await;
    serve_page(&server, "550", "<html><body><h1>Oops</h1></body></html>").await;

    let fetcher = TitleFetcher::new(client_for(&server));
    let failure = fetcher.fetch(MovieId(2959), &tmdb("550")).await.unwrap_err();
    assert!(matches!(failure, FetchFailure::MissingElement(_)));
    assert!(failure.is_per_item());
}

#[tokio::test]
async fn test_not_found_is_remote_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = TitleFetcher::new(client_for(&server));
    let failure = fetcher.fetch(MovieId(1), &tmdb("999999")).await.unwrap_err();
    assert!(matches!(failure, FetchFailure::Remote(ref m) if m.contains("404")));
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/550"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(MOVIE_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client =
        TmdbClient::local(&format!("{}/movie/", server.uri()), Duration::from_millis(200))
            .unwrap();
    let failure = TitleFetcher::new(client)
        .fetch(MovieId(2959), &tmdb("550"))
        .await
        .unwrap_err();
    assert!(matches!(failure, FetchFailure::Timeout(_)), "{failure:?}");
    assert!(failure.is_per_item());
}

#[tokio::test]
async fn test_refused_connection_is_infrastructure() {
    // Grab a free port, then close it so nothing is listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client =
        TmdbClient::local(&format!("http://127.0.0.1:{port}/movie/"), Duration::from_secs(5))
            .unwrap();

    let failure = TitleFetcher::new(client)
        .fetch(MovieId(1), &tmdb("862"))
        .await
        .unwrap_err();
    assert!(matches!(failure, FetchFailure::Infrastructure(_)), "{failure:?}");
    assert!(!failure.is_per_item());
}

#[tokio::test]
async fn test_poster_downloaded_after_page() {
    let server = MockServer::start().await;
    serve_page(&server, "550", MOVIE_PAGE).await;
    Mock::given(method("GET"))
        .and(path("/t/p/w300/fight-club.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .mount(&server)
        .await;

    let fetcher = PosterFetcher::new(client_for(&server));
    let image = fetcher.fetch(MovieId(2959), &tmdb("550")).await.unwrap();
    assert_eq!(image, vec![0xFF, 0xD8, 0xFF, 0xE0]);
}

#[tokio::test]
async fn test_empty_poster_is_remote_failure() {
    let server = MockServer::start().await;
    serve_page(&server, "550", MOVIE_PAGE).await;
    Mock::given(method("GET"))
        .and(path("/t/p/w300/fight-club.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let fetcher = PosterFetcher::new(client_for(&server));
    let failure = fetcher.fetch(MovieId(2959), &tmdb("550")).await.unwrap_err();
    assert!(matches!(failure, FetchFailure::Remote(ref m) if m.contains("Empty")));
}

#[tokio::test]
async fn test_missing_poster_image_does_not_download() {
    let server = MockServer::start().await;
    serve_page(&server, "550", "<html><body><section id=\"original_header\"></section></body></html>")
        .await;

    let fetcher = PosterFetcher::new(client_for(&server));
    let failure = fetcher.fetch(MovieId(2959), &tmdb("550")).await.unwrap_err();
    assert!(matches!(failure, FetchFailure::MissingElement(_)));
    // Only the page was requested
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
