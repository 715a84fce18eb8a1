// src/ingest/providers/hn_api.rs
//! Fan-out JSON source: one index call yielding an ordered list of opaque
//! ids, then one detail call per id. Detail resolution is sequential for
//! now; a bounded worker pool could replace the loop without touching the
//! parse contract.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::fetch::Fetcher;
use crate::ingest::types::{
    sanitize_field, SourceDescriptor, SourceItem, SourceProvider, TITLE_MAX_CHARS, UNTITLED,
};

#[derive(Debug, Deserialize)]
struct Story {
    title: Option<String>,
    score: Option<u64>,
    url: Option<String>,
}

pub struct FanoutSource {
    desc: SourceDescriptor,
}

impl FanoutSource {
    pub fn new(desc: SourceDescriptor) -> Self {
        Self { desc }
    }

    /// Phase 1 payload: a flat JSON array of numeric ids.
    pub fn parse_index(bytes: &[u8], desc: &SourceDescriptor) -> Result<Vec<u64>> {
        serde_json::from_slice(bytes)
            .with_context(|| format!("parsing {} index json", desc.display_name))
    }

    /// Phase 2 payload: one story document. Deleted stories come back as
    /// JSON `null` and resolve to `None`.
    pub fn parse_detail(bytes: &[u8], desc: &SourceDescriptor) -> Result<Option<SourceItem>> {
        let story: Option<Story> = serde_json::from_slice(bytes)
            .with_context(|| format!("parsing {} detail json", desc.display_name))?;
        let Some(story) = story else {
            return Ok(None);
        };

        let title = story
            .title
            .as_deref()
            .map(|t| sanitize_field(t, TITLE_MAX_CHARS))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        Ok(Some(SourceItem {
            title,
            link: story.url.filter(|u| !u.is_empty()),
            heat: Some(story.score.unwrap_or(0)),
            excerpt: None,
        }))
    }

    fn detail_url(&self, id: u64) -> Result<String> {
        let template = self
            .desc
            .detail_endpoint
            .as_deref()
            .ok_or_else(|| anyhow!("{} has no detail endpoint template", self.desc.display_name))?;
        Ok(template.replace("{id}", &id.to_string()))
    }
}

#[async_trait]
impl SourceProvider for FanoutSource {
    async fn fetch_latest(&self, fetcher: &Fetcher) -> Result<Vec<SourceItem>> {
        let payload = fetcher
            .fetch_bytes(&self.desc.display_name, &self.desc.endpoint)
            .await?;
        let ids = Self::parse_index(&payload.bytes, &self.desc)?;

        let mut out = Vec::new();
        for id in ids.into_iter().take(self.desc.item_cap) {
            let url = self.detail_url(id)?;
            let detail = match fetcher.fetch_bytes(&self.desc.display_name, &url).await {
                Ok(p) => p,
                Err(e) => {
                    // One unreachable detail does not sink the source.
                    tracing::warn!(error = %e, id, "detail fetch failed; skipping");
                    continue;
                }
            };
            match Self::parse_detail(&detail.bytes, &self.desc) {
                Ok(Some(item)) => out.push(item),
                Ok(None) => tracing::debug!(id, "detail is deleted; skipping"),
                Err(e) => tracing::warn!(error = %e, id, "detail parse failed; skipping"),
            }
        }
        Ok(out)
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.desc
    }
}
