// src/ingest/mod.rs
pub mod providers;
pub mod types;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::annotate::Annotator;
use crate::config::Pacing;
use crate::fetch::Fetcher;
use types::{glyph_for_title, NormalizedItem, SourceProvider};

/// Base for positional rank scores. The first item of the run gets the
/// highest score; the page renders in arrival order, not score order.
const RANK_BASE: i64 = 95;

/// Run the whole fetch→normalize→annotate pass once, in registry order.
/// A failing source contributes zero items and never aborts the run; an
/// empty return tells the caller to skip publishing entirely.
pub async fn run_once(
    fetcher: &Fetcher,
    annotator: &Annotator,
    providers: &[Box<dyn SourceProvider>],
    pacing: &Pacing,
) -> Vec<NormalizedItem> {
    let mut out: Vec<NormalizedItem> = Vec::new();

    for (si, provider) in providers.iter().enumerate() {
        let desc = provider.descriptor();
        if si > 0 {
            sleep(pacing.between_sources).await;
        }
        info!(source = %desc.display_name, category = %desc.category, "fetching source");

        let items = match provider.fetch_latest(fetcher).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, source = %desc.display_name, "source failed; skipping");
                continue;
            }
        };
        info!(source = %desc.display_name, count = items.len(), "source yielded items");

        for item in items {
            if !out.is_empty() {
                sleep(pacing.between_items).await;
            }
            let annotation = annotator
                .annotate(&item.title, &desc.category, item.excerpt.as_deref(), item.heat)
                .await;

            let position = out.len();
            // Intrinsic popularity wins over the positional score when the
            // source reports one; ordering stays fetch order either way.
            let rank_score = match item.heat {
                Some(h) => h as i64,
                None => RANK_BASE - position as i64,
            };

            out.push(NormalizedItem {
                id: (position + 1) as u32,
                category: desc.category.clone(),
                glyph: glyph_for_title(&item.title, &desc.glyph),
                title: item.title,
                link: item.link,
                origin_label: desc.display_name.clone(),
                heat: item.heat,
                rank_score,
                annotation,
            });
        }
    }

    info!(total = out.len(), "aggregate complete");
    out
}
