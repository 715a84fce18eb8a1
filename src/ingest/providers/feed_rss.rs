// src/ingest/providers/feed_rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::decode::decode_payload;
use crate::error::PipelineError;
use crate::fetch::Fetcher;
use crate::ingest::types::{
    sanitize_field, SourceDescriptor, SourceItem, SourceProvider, TITLE_MAX_CHARS,
};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

/// RSS/XML feed source. The payload is decoded through the encoding
/// cascade before parsing, since these feeds routinely lie about (or omit)
/// their charset.
pub struct FeedSource {
    desc: SourceDescriptor,
}

impl FeedSource {
    pub fn new(desc: SourceDescriptor) -> Self {
        Self { desc }
    }

    /// Parse a decoded feed document into up to `item_cap` items. An entry
    /// without a title is malformed: skipped and logged, never fatal.
    pub fn parse_items(xml: &str, desc: &SourceDescriptor) -> Result<Vec<SourceItem>> {
        let xml_clean = scrub_html_entities_for_xml(xml);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing {} feed xml", desc.display_name))?;

        let mut out = Vec::new();
        for it in rss.channel.item {
            if out.len() >= desc.item_cap {
                break;
            }
            let title = it
                .title
                .as_deref()
                .map(|t| sanitize_field(t, TITLE_MAX_CHARS))
                .filter(|t| !t.is_empty());
            let title = match title {
                Some(t) => t,
                None => {
                    let err = PipelineError::MalformedSource {
                        origin: desc.display_name.clone(),
                        reason: "entry without title".to_string(),
                    };
                    tracing::warn!(error = %err, "skipping feed entry");
                    continue;
                }
            };

            let excerpt = it
                .description
                .as_deref()
                .map(first_sentence)
                .filter(|s| !s.is_empty());

            out.push(SourceItem {
                title,
                link: it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
                heat: None,
                excerpt,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for FeedSource {
    async fn fetch_latest(&self, fetcher: &Fetcher) -> Result<Vec<SourceItem>> {
        let payload = fetcher
            .fetch_bytes(&self.desc.display_name, &self.desc.endpoint)
            .await?;
        let xml = decode_payload(&payload.bytes, payload.charset_hint.as_deref());
        Self::parse_items(&xml, &self.desc)
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.desc
    }
}

// Feeds routinely embed HTML entities the XML parser does not know.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\u{201C}")
        .replace("&rdquo;", "\u{201D}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&rsquo;", "\u{2019}")
        .replace("&hellip;", "…")
}

/// First sentence of a description, sanitized, for use as a prompt excerpt.
fn first_sentence(description: &str) -> String {
    let clean = sanitize_field(description, 120);
    clean
        .split_inclusive(['。', '！', '？', '.', '!', '?'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}
