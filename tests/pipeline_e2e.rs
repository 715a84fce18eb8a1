// tests/pipeline_e2e.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;

use hotfeed_publisher::annotate::{fallback_annotation, Annotator};
use hotfeed_publisher::config::Pacing;
use hotfeed_publisher::fetch::Fetcher;
use hotfeed_publisher::ingest;
use hotfeed_publisher::ingest::types::{
    SourceDescriptor, SourceItem, SourceKind, SourceProvider,
};
use hotfeed_publisher::publish::splice;

fn desc(category: &str, name: &str, glyph: &str) -> SourceDescriptor {
    SourceDescriptor {
        category: category.to_string(),
        display_name: name.to_string(),
        endpoint: "https://example.test/x".to_string(),
        detail_endpoint: None,
        item_cap: 10,
        glyph: glyph.to_string(),
        kind: SourceKind::Feed,
    }
}

struct StubProvider {
    desc: SourceDescriptor,
    items: Vec<SourceItem>,
}

#[async_trait]
impl SourceProvider for StubProvider {
    async fn fetch_latest(&self, _fetcher: &Fetcher) -> Result<Vec<SourceItem>> {
        Ok(self.items.clone())
    }
    fn descriptor(&self) -> &SourceDescriptor {
        &self.desc
    }
}

struct DeadProvider {
    desc: SourceDescriptor,
}

#[async_trait]
impl SourceProvider for DeadProvider {
    async fn fetch_latest(&self, _fetcher: &Fetcher) -> Result<Vec<SourceItem>> {
        Err(anyhow!("status 503 Service Unavailable"))
    }
    fn descriptor(&self) -> &SourceDescriptor {
        &self.desc
    }
}

fn item(title: &str, heat: Option<u64>) -> SourceItem {
    SourceItem {
        title: title.to_string(),
        link: None,
        heat,
        excerpt: None,
    }
}

#[tokio::test]
async fn failed_source_is_excluded_but_others_survive() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(DeadProvider {
            desc: desc("财经", "坏掉的源", "📈"),
        }),
        Box::new(StubProvider {
            desc: desc("科技", "好的源", "📦"),
            items: vec![item("第一条", None), item("第二条", None)],
        }),
    ];

    let out = ingest::run_once(
        &Fetcher::new(),
        &Annotator::disabled(),
        &providers,
        &Pacing::none(),
    )
    .await;

    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|i| i.origin_label == "好的源"));
}

#[tokio::test]
async fn all_sources_failing_yields_an_empty_aggregate() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(DeadProvider {
            desc: desc("财经", "a", "📈"),
        }),
        Box::new(DeadProvider {
            desc: desc("时政", "b", "📰"),
        }),
    ];

    let out = ingest::run_once(
        &Fetcher::new(),
        &Annotator::disabled(),
        &providers,
        &Pacing::none(),
    )
    .await;

    // The caller skips publishing entirely on an empty aggregate, so the
    // target document never changes in this scenario.
    assert!(out.is_empty());
}

#[tokio::test]
async fn rank_scores_decrease_unless_heat_wins() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(StubProvider {
            desc: desc("时政", "新闻源", "📰"),
            items: vec![item("头条", None), item("二条", None)],
        }),
        Box::new(StubProvider {
            desc: desc("科技", "社区源", "📦"),
            items: vec![item("社区热帖", Some(4213))],
        }),
    ];

    let out = ingest::run_once(
        &Fetcher::new(),
        &Annotator::disabled(),
        &providers,
        &Pacing::none(),
    )
    .await;

    assert_eq!(out.len(), 3);
    // Positional scores for the feed items...
    assert_eq!(out[0].rank_score, 95);
    assert_eq!(out[1].rank_score, 94);
    // ...intrinsic heat verbatim for the community item, order untouched.
    assert_eq!(out[2].rank_score, 4213);
    assert_eq!(out[2].origin_label, "社区源");
    // Ids are assigned in arrival order.
    assert_eq!(
        out.iter().map(|i| i.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn launch_item_with_dead_annotator_gets_launch_glyph_and_fallback() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(StubProvider {
        desc: desc("科技", "科技热榜", "📦"),
        items: vec![item("Show HN: My New Tool", None)],
    })];

    // Annotation endpoint unreachable for the whole run.
    let out = ingest::run_once(
        &Fetcher::new(),
        &Annotator::disabled(),
        &providers,
        &Pacing::none(),
    )
    .await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].glyph, "🚀");
    assert_eq!(
        out[0].annotation,
        fallback_annotation("科技", "Show HN: My New Tool", None)
    );
    assert!(!out[0].annotation.is_empty());
}

#[tokio::test]
async fn aggregate_splices_into_the_page() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(StubProvider {
        desc: desc("科技", "社区源", "📦"),
        items: vec![item("Laser Projection Keyboard V2", Some(901))],
    })];

    let out = ingest::run_once(
        &Fetcher::new(),
        &Annotator::disabled(),
        &providers,
        &Pacing::none(),
    )
    .await;

    let page = include_str!("fixtures/page.html");
    let updated = splice(page, &out).expect("splice ok");
    assert!(updated.contains("title: 'Laser Projection Keyboard V2'"));
    assert!(updated.contains("sales: '901 ⬆️'"));
    assert!(!updated.contains("Stale Item From Last Run"));
}
