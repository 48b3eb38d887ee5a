//! Redirect following: hop limits, relative and absolute locations, and
//! statuses that are not followed.

mod helpers;

use helpers::{blocking, builder};
use http_requests::RequestError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts `/hop/0 -> /hop/1 -> ... -> /hop/{redirects}` where the last hop serves `body`.
async fn mount_chain(server: &MockServer, redirects: usize, body: &str) {
    for hop in 0..redirects {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{hop}")))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("/hop/{}", hop + 1)),
            )
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/hop/{redirects}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_chain_within_limit_succeeds() {
    let server = MockServer::start().await;
    mount_chain(&server, 3, "arrived").await;

    let url = format!("{}/hop/0", server.uri());
    let (final_url, body) = blocking(move || {
        builder(url).redirect_limit(4).connect(|request| {
            let final_url = request.connection()?.url().path().to_string();
            Ok::<_, RequestError>((final_url, request.read_string(None)?))
        })
    })
    .await
    .expect("3 redirects fit in 4 attempts");

    assert_eq!(final_url, "/hop/3");
    assert_eq!(body, "arrived");
}

#[tokio::test]
async fn test_chain_beyond_limit_fails() {
    let server = MockServer::start().await;
    mount_chain(&server, 3, "arrived").await;

    let url = format!("{}/hop/0", server.uri());
    let err = blocking(move || builder(url).redirect_limit(3).read_string(None))
        .await
        .expect_err("3 redirects need 4 attempts");

    assert!(err.is_too_many_redirects());
    assert!(err.to_string().contains("too many redirects"));

    // Exactly `limit` connections were attempted
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_single_attempt_does_not_follow() {
    let server = MockServer::start().await;
    mount_chain(&server, 1, "arrived").await;

    let url = format!("{}/hop/0", server.uri());
    let err = blocking(move || builder(url).redirect_limit(1).read_bytes(None))
        .await
        .expect_err("the redirect needs a second attempt");

    assert!(err.is_too_many_redirects());
}

#[tokio::test]
async fn test_moved_permanently_with_absolute_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let url = format!("{}/old", server.uri());
    let body = blocking(move || builder(url).read_string(None))
        .await
        .expect("301 is followed");

    assert_eq!(body, "moved");
}

#[tokio::test]
async fn test_headers_repeat_on_every_hop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .and(header("user-agent", "hopper/1.0"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/end"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/end"))
        .and(header("user-agent", "hopper/1.0"))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/start", server.uri());
    let body = blocking(move || {
        builder(url)
            .user_agent("hopper/1.0")
            .accept("text/plain")
            .read_string(None)
    })
    .await
    .expect("both hops carry the headers");

    assert_eq!(body, "done");
}

#[tokio::test]
async fn test_redirect_without_location_fails_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let url = format!("{}/nowhere", server.uri());
    let err = blocking(move || builder(url).read_bytes(None))
        .await
        .expect_err("redirect without location");

    assert_eq!(err.status(), Some(302));
    assert!(!err.is_too_many_redirects());
}

#[tokio::test]
async fn test_temporary_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/temp"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "/elsewhere"))
        .mount(&server)
        .await;

    let url = format!("{}/temp", server.uri());
    let err = blocking(move || builder(url).read_bytes(None))
        .await
        .expect_err("307 is not followed");

    assert_eq!(err.status(), Some(307));
    assert!(err.to_string().contains("307"));
}

#[tokio::test]
async fn test_redirect_to_non_http_scheme_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "file:///etc/hostname"))
        .mount(&server)
        .await;

    let url = format!("{}/escape", server.uri());
    let err = blocking(move || builder(url).read_bytes(None))
        .await
        .expect_err("file redirects are refused");

    match err {
        RequestError::UnsupportedScheme { scheme, .. } => assert_eq!(scheme, "file"),
        other => panic!("Expected unsupported scheme, got {other:?}"),
    }
}
