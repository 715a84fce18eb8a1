// src/ingest/types.rs
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::fetch::Fetcher;

/// Hard caps on published text fields. The page embeds every field in a
/// single-quoted literal, so length is bounded and quote characters are
/// stripped at sanitization time.
pub const TITLE_MAX_CHARS: usize = 80;
pub const ANNOTATION_MAX_CHARS: usize = 48;

/// Placeholder for API entries that arrive without a title.
pub const UNTITLED: &str = "(untitled)";

/// Shape of a source's payload; selects the provider built for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// RSS/XML feed document.
    Feed,
    /// Single JSON document already containing the items (Reddit-style).
    ApiListing,
    /// JSON index of ids plus one detail call per id (Hacker News-style).
    ApiFanout,
}

/// One registry entry. Immutable, defined at configuration time.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDescriptor {
    pub category: String,
    pub display_name: String,
    pub endpoint: String,
    /// Only used by `ApiFanout`: detail URL template with an `{id}` slot.
    #[serde(default)]
    pub detail_endpoint: Option<String>,
    pub item_cap: usize,
    pub glyph: String,
    pub kind: SourceKind,
}

/// Uniform record a provider distills one raw entry into. The run-scoped
/// fields (id, rank, annotation) are filled in by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceItem {
    /// Sanitized, length-capped title.
    pub title: String,
    pub link: Option<String>,
    /// Intrinsic popularity (upvotes/points) when the source reports one.
    pub heat: Option<u64>,
    /// Sanitized first sentence of the entry description, for prompting.
    pub excerpt: Option<String>,
}

/// Fully assembled item as handed to the publisher. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub id: u32,
    pub category: String,
    pub title: String,
    pub link: Option<String>,
    pub origin_label: String,
    pub glyph: String,
    pub heat: Option<u64>,
    pub rank_score: i64,
    /// Never empty: either the AI hint or a deterministic fallback.
    pub annotation: String,
}

#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Pull and normalize up to `item_cap` items for this source.
    async fn fetch_latest(&self, fetcher: &Fetcher) -> Result<Vec<SourceItem>>;
    /// Registry entry this provider was built from.
    fn descriptor(&self) -> &SourceDescriptor;
}

/// Make a raw field safe for the page's embedded single-quoted records:
/// decode entities, strip markup, drop quote/backslash characters, fold
/// whitespace, and cap the length with an ellipsis.
pub fn sanitize_field(raw: &str, max_chars: usize) -> String {
    let decoded = html_escape::decode_html_entities(raw).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&decoded, "");

    let mut out = String::with_capacity(stripped.len());
    let mut prev_space = false;
    for ch in stripped.chars() {
        let c = match ch {
            // These would terminate or escape the record's string literal.
            '\'' | '"' | '\\' | '`' => continue,
            '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}' | '\u{00AB}' | '\u{00BB}' => continue,
            '\r' | '\n' | '\t' | '\u{00A0}' => ' ',
            c => c,
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    let trimmed = out.trim_end();

    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let mut capped: String = trimmed.chars().take(max_chars.saturating_sub(1)).collect();
        capped.push('…');
        capped
    }
}

/// Keyword cues in the title override the source's default glyph.
pub fn glyph_for_title(title: &str, default_glyph: &str) -> String {
    let lower = title.to_lowercase();
    if lower.contains("show hn") || lower.contains("launch") {
        "🚀".to_string()
    } else if lower.contains("light") || lower.contains("lamp") {
        "💡".to_string()
    } else if lower.contains("game") {
        "🎮".to_string()
    } else {
        default_glyph.to_string()
    }
}
