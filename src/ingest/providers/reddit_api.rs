// src/ingest/providers/reddit_api.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::fetch::Fetcher;
use crate::ingest::types::{
    sanitize_field, SourceDescriptor, SourceItem, SourceProvider, TITLE_MAX_CHARS, UNTITLED,
};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    score: Option<u64>,
    url: Option<String>,
}

/// JSON listing source: one document already carrying the items, in the
/// Reddit `data.children[].data` envelope. Missing keys fall back to
/// documented defaults instead of failing.
pub struct ListingSource {
    desc: SourceDescriptor,
}

impl ListingSource {
    pub fn new(desc: SourceDescriptor) -> Self {
        Self { desc }
    }

    pub fn parse_items(bytes: &[u8], desc: &SourceDescriptor) -> Result<Vec<SourceItem>> {
        let listing: Listing = serde_json::from_slice(bytes)
            .with_context(|| format!("parsing {} listing json", desc.display_name))?;

        let mut out = Vec::new();
        for child in listing.data.children {
            if out.len() >= desc.item_cap {
                break;
            }
            let post = child.data;
            let title = post
                .title
                .as_deref()
                .map(|t| sanitize_field(t, TITLE_MAX_CHARS))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string());

            out.push(SourceItem {
                title,
                link: post.url.filter(|u| !u.is_empty()),
                heat: Some(post.score.unwrap_or(0)),
                excerpt: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for ListingSource {
    async fn fetch_latest(&self, fetcher: &Fetcher) -> Result<Vec<SourceItem>> {
        let payload = fetcher
            .fetch_bytes(&self.desc.display_name, &self.desc.endpoint)
            .await?;
        Self::parse_items(&payload.bytes, &self.desc)
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.desc
    }
}
