//! Gzip negotiation and transparent decompression.

mod helpers;

use std::io::{Read, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use helpers::{blocking, builder};
use http_requests::{CancellationFlag, RequestError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("compress");
    encoder.finish().expect("finish gzip stream")
}

async fn gzip_server(plain: &str, content_encoding: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/packed"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", content_encoding)
                .set_body_bytes(gzip(plain.as_bytes())),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_gzip_body_is_decompressed() {
    let plain = "compressed payload ".repeat(200);
    let server = gzip_server(&plain, "gzip").await;

    let url = format!("{}/packed", server.uri());
    let flag = CancellationFlag::new();
    let progress = flag.clone();
    let text = blocking(move || builder(url).read_string(Some(&progress)))
        .await
        .expect("gzip body should decode");

    assert_eq!(text, plain);
    // The declared length is the compressed size, so progress is indeterminate
    assert!(flag.is_indeterminate());
}

#[tokio::test]
async fn test_gzip_encoding_match_is_case_insensitive() {
    let server = gzip_server("shouting", "GZIP").await;

    let url = format!("{}/packed", server.uri());
    let bytes = blocking(move || {
        builder(url).connect(|request| {
            let mut bytes = Vec::new();
            request.input_stream()?.read_to_end(&mut bytes)?;
            Ok::<_, RequestError>(bytes)
        })
    })
    .await
    .expect("gzip body should decode");

    assert_eq!(bytes, b"shouting");
}

#[tokio::test]
async fn test_gzip_disabled_returns_raw_bytes() {
    let server = gzip_server("left alone", "gzip").await;

    let url = format!("{}/packed", server.uri());
    let bytes = blocking(move || builder(url).gzip(false).read_bytes(None))
        .await
        .expect("raw body should be read");

    assert_eq!(bytes, gzip(b"left alone"));
}

#[tokio::test]
async fn test_gzip_is_advertised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/any", server.uri());
    let text = blocking(move || builder(url).read_string(None))
        .await
        .expect("identity body should be read");

    assert_eq!(text, "plain");
}
