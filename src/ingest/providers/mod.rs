// src/ingest/providers/mod.rs
pub mod feed_rss;
pub mod hn_api;
pub mod reddit_api;

use crate::ingest::types::{SourceDescriptor, SourceKind, SourceProvider};

pub use feed_rss::FeedSource;
pub use hn_api::FanoutSource;
pub use reddit_api::ListingSource;

/// Build one provider per registry entry, selected by payload shape.
pub fn build_providers(registry: &[SourceDescriptor]) -> Vec<Box<dyn SourceProvider>> {
    registry
        .iter()
        .cloned()
        .map(|desc| -> Box<dyn SourceProvider> {
            match desc.kind {
                SourceKind::Feed => Box::new(FeedSource::new(desc)),
                SourceKind::ApiListing => Box::new(ListingSource::new(desc)),
                SourceKind::ApiFanout => Box::new(FanoutSource::new(desc)),
            }
        })
        .collect()
}
