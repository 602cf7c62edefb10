//! Integration tests for catalog navigation and mirror extraction
//!
//! These tests use wiremock to stand in for the catalog site.

mod common;

use common::test_config;
use egydead_dl::catalog::{LinkExtractor, Navigator, NodeKind};
use egydead_dl::http::Fetcher;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn navigator(base: &str) -> Navigator {
    let config = test_config(base);
    let fetcher = Fetcher::from_config(&config, false).unwrap();
    Navigator::new(&config, fetcher).unwrap()
}

fn link_extractor(base: &str) -> LinkExtractor {
    let fetcher = Fetcher::from_config(&test_config(base), false).unwrap();
    LinkExtractor::new(fetcher).unwrap()
}

#[tokio::test]
async fn test_search_sends_encoded_query() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("s", "Example Movie"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<ul class="posts">
                 <li class="movieItem"><a href="{base}/example-movie/" title="Example Movie">
                   <h1 class="BottomTitle">Example Movie</h1></a></li>
                 <li class="movieItem"><a href="{base}/serie/example-show/">
                   <h1 class="BottomTitle">Example Show</h1></a></li>
               </ul>"#,
            base = base
        )))
        .expect(1)
        .mount(&server)
        .await;

    let results = navigator(&base).search("Example Movie").await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Example Movie");
    assert_eq!(results[0].url, format!("{}/example-movie/", base));
    assert_eq!(results[1].title, "Example Show");
}

#[tokio::test]
async fn test_search_failure_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(navigator(&server.uri()).search("anything").await.is_empty());
}

#[tokio::test]
async fn test_list_seasons_dedup_in_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/serie/example-show/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<div class="seasons">
                 <a href="{base}/season/example-show-season-2/">S2</a>
                 <a href="{base}/season/example-show-season-1/">S1</a>
                 <a href="{base}/season/example-show-season-2/">S2 again</a>
               </div>"#,
            base = base
        )))
        .mount(&server)
        .await;

    let seasons = navigator(&base)
        .list_seasons(&format!("{}/serie/example-show/", base))
        .await;

    assert_eq!(seasons.len(), 2);
    assert_eq!(seasons[0].display_name, "example show season 2");
    assert_eq!(seasons[1].display_name, "example show season 1");
    assert!(seasons.iter().all(|s| s.kind == NodeKind::Season));
}

#[tokio::test]
async fn test_series_episodes_sorted_without_index_link() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/serie/example-show/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<a href="{base}/episode/">All episodes</a>
               <a href="{base}/episode/example-show-episode-10/">10</a>
               <a href="{base}/episode/example-show-episode-2/">2</a>
               <a href="{base}/episode/example-show-episode-1/">1</a>"#,
            base = base
        )))
        .mount(&server)
        .await;

    let episodes = navigator(&base)
        .list_series_episodes(&format!("{}/serie/example-show/", base))
        .await;

    let urls: Vec<_> = episodes.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/episode/example-show-episode-1/", base),
            format!("{}/episode/example-show-episode-2/", base),
            format!("{}/episode/example-show-episode-10/", base),
        ]
    );
}

#[tokio::test]
async fn test_collection_items_skip_episodes() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/assembly/example-collection/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<ul>
                 <li class="movieItem"> <a href="{base}/example-part-1/" title="Example Part 1"></a></li>
                 <li class="movieItem"> <a href="{base}/episode/stray-episode-1/" title="Stray"></a></li>
                 <li class="movieItem"> <a href="{base}/example-part-2/" title="Example Part 2"></a></li>
               </ul>"#,
            base = base
        )))
        .mount(&server)
        .await;

    let items = navigator(&base)
        .list_collection(&format!("{}/assembly/example-collection/", base))
        .await;

    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Example Part 1", "Example Part 2"]);
}

#[tokio::test]
async fn test_download_links_posted_with_view_marker() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("POST"))
        .and(path("/example-movie/"))
        .and(body_string_contains("View=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<ul class="donwload-servers-list">
                 <li><span class="ser-name">تحميل متعدد</span><em>1080p</em>
                     <a href="https://agg.test/r/abc">تحميل</a></li>
                 <li><span class="ser-name">DoodStream</span><em>720p</em>
                     <a href="https://dood.test/d/abc">تحميل</a></li>
               </ul>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let links = link_extractor(&base)
        .get_download_links(&format!("{}/example-movie/", base))
        .await;

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].server_name, "تحميل متعدد");
    assert_eq!(links[0].quality_label, "1080p");
    assert_eq!(links[0].redirect_url, "https://agg.test/r/abc");
    assert_eq!(links[1].server_name, "DoodStream");
}

#[tokio::test]
async fn test_download_links_transport_error_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let links = link_extractor(&server.uri())
        .get_download_links(&format!("{}/missing/", server.uri()))
        .await;
    assert!(links.is_empty());
}
