//! Integration tests for the multi-quality aggregator resolver
//!
//! The browser side is a scripted in-memory site (see `common`).

mod common;

use common::{test_config, MockElement, MockPage, MockSite};
use egydead_dl::prompt::ScriptedPrompter;
use egydead_dl::resolver::AggregatorResolver;

const CDN_LINK: &str = "https://s1.premilkyway.com/v/file1.mp4";

fn resolver(site: &MockSite) -> AggregatorResolver {
    AggregatorResolver::new(&test_config("https://catalog.test"), site.launcher()).unwrap()
}

/// Landing page listing two quality tiers, each with its own trigger
fn two_tier_site() -> MockSite {
    MockSite::new(vec![
        ("https://agg.test/r/abc", MockPage::redirect("https://agg.test/d/file1")),
        (
            "https://agg.test/d/file1",
            MockPage::new(vec![
                MockElement::link("Full HD quality", "/f/file1_h"),
                MockElement::link("HD quality", "/f/file1_n"),
            ]),
        ),
        (
            "https://agg.test/f/file1_h",
            MockPage::new(vec![MockElement::link("Download 700MB", "#")
                .with_class("btn-primary")
                .on_click("https://agg.test/f/file1_h/ready")]),
        ),
        (
            "https://agg.test/f/file1_n",
            MockPage::new(vec![
                MockElement::button("Download 400MB").on_click("https://agg.test/f/file1_n/ready")
            ]),
        ),
        (
            "https://agg.test/f/file1_h/ready",
            MockPage::new(vec![
                MockElement::link("Help", "https://agg.test/help"),
                MockElement::link("Direct", CDN_LINK),
            ]),
        ),
        (
            "https://agg.test/f/file1_n/ready",
            MockPage::new(vec![MockElement::link(
                "Direct",
                "https://cdn.agg.test/v/file1_720.mp4",
            )]),
        ),
    ])
}

#[tokio::test]
async fn test_preference_selects_full_hd() {
    let site = two_tier_site();
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

    let media = resolver(&site)
        .resolve("https://agg.test/r/abc", Some("1080"), &mut prompter)
        .await
        .expect("should resolve");

    assert_eq!(media.final_url(), CDN_LINK);
    assert_eq!(media.quality_name(), "Full HD (1080p)");
    assert!(prompter.prompts().is_empty());
    assert_eq!(site.launches(), 1);
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_prompt_picks_quality_by_index() {
    let site = two_tier_site();
    let mut prompter = ScriptedPrompter::new(["9", "2"]);

    let media = resolver(&site)
        .resolve("https://agg.test/r/abc", None, &mut prompter)
        .await
        .expect("should resolve");

    assert_eq!(media.quality_name(), "HD (720p)");
    assert_eq!(media.final_url(), "https://cdn.agg.test/v/file1_720.mp4");
    // Invalid answer re-asked once
    assert_eq!(prompter.prompts().len(), 2);
    assert!(prompter
        .shown()
        .iter()
        .any(|line| line == "1. Full HD (1080p) - 700MB"));
    assert!(prompter.shown().iter().any(|line| line == "2. HD (720p) - 400MB"));
}

#[tokio::test]
async fn test_closed_input_is_unresolved_and_closes_session() {
    let site = two_tier_site();
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

    let media = resolver(&site)
        .resolve("https://agg.test/r/abc", None, &mut prompter)
        .await;

    assert!(media.is_none());
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_reveal_button_exposes_qualities() {
    let site = MockSite::new(vec![
        (
            "https://agg.test/d/file2",
            MockPage::new(vec![MockElement::button("Create Download Link")
                .on_click("https://agg.test/d/file2/revealed")]),
        ),
        (
            "https://agg.test/d/file2/revealed",
            MockPage::new(vec![MockElement::link(
                "SD quality",
                "https://agg.test/f/file2_l",
            )]),
        ),
        (
            "https://agg.test/f/file2_l",
            MockPage::new(vec![
                MockElement::link("Download (250 MB)", "#").on_click("https://agg.test/f/file2_l/ready")
            ]),
        ),
        (
            "https://agg.test/f/file2_l/ready",
            MockPage::new(vec![MockElement::link("Get", "https://cdn.agg.test/file2.mp4")]),
        ),
    ]);
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

    let media = resolver(&site)
        .resolve("https://agg.test/d/file2", None, &mut prompter)
        .await
        .expect("should resolve after reveal");

    assert_eq!(media.quality_name(), "SD (480p/360p)");
    assert_eq!(media.final_url(), "https://cdn.agg.test/file2.mp4");
}

#[tokio::test]
async fn test_constructed_urls_when_no_labels() {
    let site = MockSite::new(vec![
        ("https://agg.test/r/xyz", MockPage::redirect("https://agg.test/d/xyz")),
        ("https://agg.test/d/xyz", MockPage::new(Vec::new())),
        (
            "https://agg.test/f/xyz_h",
            MockPage::new(vec![
                MockElement::div("g-recaptcha").on_click("https://agg.test/f/xyz_h/ready")
            ]),
        ),
        (
            "https://agg.test/f/xyz_h/ready",
            MockPage::new(vec![MockElement::link("file", "https://cdn.agg.test/xyz.mp4")]),
        ),
    ]);
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

    let media = resolver(&site)
        .resolve("https://agg.test/r/xyz", None, &mut prompter)
        .await
        .expect("constructed Full HD should resolve");

    assert_eq!(media.quality_name(), "Full HD (Constructed)");
    assert_eq!(media.final_url(), "https://cdn.agg.test/xyz.mp4");

    let visited = site.visited();
    assert!(visited.contains(&"https://agg.test/f/xyz_n".to_string()));
    assert!(visited.contains(&"https://agg.test/f/xyz".to_string()));
}

#[tokio::test]
async fn test_falls_back_to_original_page() {
    let signed = format!(
        "https://files.agg.test/dl/xyz.mp4?signature={}&expires=1700000000",
        "a".repeat(100)
    );
    let site = MockSite::new(vec![
        ("https://agg.test/d/xyz", MockPage::new(Vec::new())),
        ("https://agg.test/f/xyz_h", MockPage::new(Vec::new())),
        ("https://agg.test/f/xyz_n", MockPage::new(Vec::new())),
        ("https://agg.test/f/xyz", MockPage::new(Vec::new())),
        (
            "https://agg.test/xyz",
            MockPage::new(vec![MockElement::button("Download").on_click("https://agg.test/xyz/ready")]),
        ),
        (
            "https://agg.test/xyz/ready",
            MockPage::new(vec![
                MockElement::link("short", "https://files.agg.test/preview.mp4"),
                MockElement::link("file", &signed),
            ]),
        ),
    ]);
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

    let media = resolver(&site)
        .resolve("https://agg.test/d/xyz", None, &mut prompter)
        .await
        .expect("fallback should resolve");

    assert_eq!(media.quality_name(), "Single Quality / Direct");
    assert_eq!(media.final_url(), signed);
}

#[tokio::test]
async fn test_no_media_link_is_unresolved() {
    let site = MockSite::new(vec![
        (
            "https://agg.test/d/file3",
            MockPage::new(vec![MockElement::link("HD quality", "/f/file3_n")]),
        ),
        (
            "https://agg.test/f/file3_n",
            MockPage::new(vec![MockElement::button("Download 1.2 GB")
                .on_click("https://agg.test/f/file3_n/ready")]),
        ),
        (
            "https://agg.test/f/file3_n/ready",
            MockPage::new(vec![MockElement::link("Ad", "https://ads.example/landing")]),
        ),
    ]);
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

    let media = resolver(&site)
        .resolve("https://agg.test/d/file3", None, &mut prompter)
        .await;

    assert!(media.is_none());
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_landing_failure_closes_session() {
    let site = MockSite::new(Vec::new());
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

    let media = resolver(&site)
        .resolve("https://agg.test/missing", None, &mut prompter)
        .await;

    assert!(media.is_none());
    assert_eq!(site.launches(), 1);
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_launch_failure_is_unresolved() {
    let site = MockSite::failing();
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());

    let media = resolver(&site)
        .resolve("https://agg.test/r/abc", None, &mut prompter)
        .await;

    assert!(media.is_none());
    assert_eq!(site.closes(), 0);
}
