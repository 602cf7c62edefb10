//! Integration tests for the lightweight redirect-chain resolver
//!
//! These tests use wiremock to serve the redirect page, the download page
//! and the challenge form endpoint.

mod common;

use common::test_config;
use egydead_dl::catalog::DownloadLink;
use egydead_dl::resolver::DoodResolver;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FINAL_LINK: &str = "https://cdn.dood.test/file.mp4?token=abc&expiry=123";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body)
}

async fn mount_landing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/dood/e/abc"))
        .respond_with(html(
            r#"<html><body><a class="btn" href="/dood/download/abc">Download Now</a></body></html>"#,
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_resolves_without_challenge() {
    let server = MockServer::start().await;
    let redirect = format!("{}/dood/e/abc", server.uri());
    mount_landing(&server).await;

    Mock::given(method("GET"))
        .and(path("/dood/download/abc"))
        .and(header("referer", redirect.as_str()))
        .respond_with(html(&format!(
            r#"<div><a class="btn" href="{}">Download file</a></div>"#,
            FINAL_LINK
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = DoodResolver::new(&test_config(&server.uri())).unwrap();
    let link = DownloadLink {
        server_name: "DoodStream".to_string(),
        quality_label: "720p".to_string(),
        redirect_url: redirect,
    };

    let media = resolver.resolve(&link).await.expect("should resolve");
    assert_eq!(media.final_url(), FINAL_LINK);
    assert_eq!(media.quality_name(), "720p");
}

#[tokio::test]
async fn test_submits_complete_challenge_form() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    // Field attributes in both orders
    Mock::given(method("GET"))
        .and(path("/dood/download/abc"))
        .respond_with(html(
            r#"<form method="POST" name="F1">
                 <input type="hidden" name="op" value="download2">
                 <input type="hidden" value="abc" name="id">
                 <input type="hidden" name="mode" value="free">
                 <input type="hidden" name="hash" value="h4sh">
               </form>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dood/download/abc"))
        .and(body_string_contains("op=download2"))
        .and(body_string_contains("id=abc"))
        .and(body_string_contains("mode=free"))
        .and(body_string_contains("hash=h4sh"))
        .respond_with(html(&format!(
            r#"<a href="{}">Download file</a>"#,
            FINAL_LINK
        )))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = DoodResolver::new(&test_config(&server.uri())).unwrap();
    let url = format!("{}/dood/e/abc", server.uri());

    assert_eq!(resolver.resolve_url(&url).await.as_deref(), Some(FINAL_LINK));
}

#[tokio::test]
async fn test_incomplete_challenge_uses_page_as_is() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    Mock::given(method("GET"))
        .and(path("/dood/download/abc"))
        .respond_with(html(&format!(
            r#"<form name="F1">
                 <input type="hidden" name="op" value="download2">
                 <input type="hidden" name="id" value="abc">
                 <input type="hidden" name="mode" value="free">
               </form>
               <a href="{}">mirror</a>"#,
            FINAL_LINK
        )))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = DoodResolver::new(&test_config(&server.uri())).unwrap();
    let url = format!("{}/dood/e/abc", server.uri());

    // Falls back to the token/expiry link on the unsubmitted page
    assert_eq!(resolver.resolve_url(&url).await.as_deref(), Some(FINAL_LINK));
}

#[tokio::test]
async fn test_missing_download_anchor_is_unresolved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dood/e/gone"))
        .respond_with(html("<p>File not found</p>"))
        .mount(&server)
        .await;

    let resolver = DoodResolver::new(&test_config(&server.uri())).unwrap();
    let url = format!("{}/dood/e/gone", server.uri());

    assert_eq!(resolver.resolve_url(&url).await, None);
}

#[tokio::test]
async fn test_http_error_is_unresolved() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    Mock::given(method("GET"))
        .and(path("/dood/download/abc"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let resolver = DoodResolver::new(&test_config(&server.uri())).unwrap();
    let url = format!("{}/dood/e/abc", server.uri());

    assert_eq!(resolver.resolve_url(&url).await, None);
}

#[tokio::test]
async fn test_repeat_resolution_is_stable() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    Mock::given(method("GET"))
        .and(path("/dood/download/abc"))
        .respond_with(html(&format!(r#"<a href="{}">Download file</a>"#, FINAL_LINK)))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = DoodResolver::new(&test_config(&server.uri())).unwrap();
    let url = format!("{}/dood/e/abc", server.uri());

    let first = resolver.resolve_url(&url).await;
    let second = resolver.resolve_url(&url).await;
    assert_eq!(first.as_deref(), Some(FINAL_LINK));
    assert_eq!(first, second);
}
