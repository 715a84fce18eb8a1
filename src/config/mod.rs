// src/config/mod.rs
//! Process configuration: annotation-service settings and pacing resolved
//! once from the environment at startup, and the source registry loaded
//! from an optional TOML file with built-in defaults as the fallback.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use crate::ingest::types::{SourceDescriptor, SourceKind};

const ENV_SOURCES_PATH: &str = "HOTFEED_SOURCES_PATH";
const ENV_PAGE_PATH: &str = "HOTFEED_PAGE_PATH";
const ENV_API_KEY: &str = "HOTFEED_AI_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "OPENAI_API_KEY";
const ENV_BASE_URL: &str = "HOTFEED_AI_BASE_URL";
const ENV_MODEL: &str = "HOTFEED_AI_MODEL";
const ENV_ITEM_PACING_MS: &str = "HOTFEED_ITEM_PACING_MS";
const ENV_SOURCE_PACING_MS: &str = "HOTFEED_SOURCE_PACING_MS";
const ENV_THROTTLE_BACKOFF_MS: &str = "HOTFEED_THROTTLE_BACKOFF_MS";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PAGE: &str = "index.html";

/// Annotation-service settings, resolved once and passed by reference into
/// the Annotator. `api_key: None` means the whole run degrades to
/// deterministic annotations.
#[derive(Debug, Clone)]
pub struct AnnotatorSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl AnnotatorSettings {
    pub fn from_env() -> Self {
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .or_else(|| std::env::var(ENV_API_KEY_FALLBACK).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let base_url =
            std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self {
            api_key,
            base_url,
            model,
            timeout: Duration::from_secs(8),
        }
    }
}

/// Cooperative throttling between consecutive external calls. Dropping
/// these sleeps causes cascading rate-limit failures downstream.
#[derive(Debug, Clone)]
pub struct Pacing {
    pub between_items: Duration,
    pub between_sources: Duration,
    /// Extra delay after the annotation endpoint returns 429.
    pub throttle_backoff: Duration,
}

impl Pacing {
    pub fn from_env() -> Self {
        Self {
            between_items: env_duration_ms(ENV_ITEM_PACING_MS, 1_500),
            between_sources: env_duration_ms(ENV_SOURCE_PACING_MS, 2_000),
            throttle_backoff: env_duration_ms(ENV_THROTTLE_BACKOFF_MS, 2_500),
        }
    }

    /// No sleeps at all; used by tests.
    pub fn none() -> Self {
        Self {
            between_items: Duration::ZERO,
            between_sources: Duration::ZERO,
            throttle_backoff: Duration::ZERO,
        }
    }
}

fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

/// Target page path: `$HOTFEED_PAGE_PATH`, else `index.html` in the
/// working directory.
pub fn page_path() -> PathBuf {
    std::env::var(ENV_PAGE_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_PAGE))
}

/// Load the source registry: explicit TOML path from the env var when set,
/// else the built-in defaults.
pub fn load_registry() -> Result<Vec<SourceDescriptor>> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        return load_registry_from(Path::new(&p));
    }
    Ok(default_registry())
}

pub fn load_registry_from(path: &Path) -> Result<Vec<SourceDescriptor>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading source registry from {}", path.display()))?;
    parse_registry(&content)
}

fn parse_registry(s: &str) -> Result<Vec<SourceDescriptor>> {
    #[derive(Deserialize)]
    struct RegistryFile {
        sources: Vec<SourceDescriptor>,
    }
    let file: RegistryFile = toml::from_str(s).context("parsing source registry toml")?;
    ensure!(!file.sources.is_empty(), "source registry is empty");
    for desc in &file.sources {
        ensure!(
            desc.item_cap >= 1,
            "source {} has item_cap 0",
            desc.display_name
        );
        if desc.kind == SourceKind::ApiFanout {
            ensure!(
                desc.detail_endpoint.is_some(),
                "fan-out source {} needs a detail_endpoint template",
                desc.display_name
            );
        }
    }
    Ok(file.sources)
}

/// The registry shipped with the binary; one entry per content origin.
pub fn default_registry() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor {
            category: "财经".to_string(),
            display_name: "华尔街见闻".to_string(),
            endpoint: "https://dedicated.wallstreetcn.com/rss.xml".to_string(),
            detail_endpoint: None,
            item_cap: 3,
            glyph: "📈".to_string(),
            kind: SourceKind::Feed,
        },
        SourceDescriptor {
            category: "时政".to_string(),
            display_name: "BBC 中文".to_string(),
            endpoint: "https://feeds.bbci.co.uk/zhongwen/simp/rss.xml".to_string(),
            detail_endpoint: None,
            item_cap: 3,
            glyph: "📰".to_string(),
            kind: SourceKind::Feed,
        },
        SourceDescriptor {
            category: "科技".to_string(),
            display_name: "Hacker News".to_string(),
            endpoint: "https://hacker-news.firebaseio.com/v0/topstories.json".to_string(),
            detail_endpoint: Some(
                "https://hacker-news.firebaseio.com/v0/item/{id}.json".to_string(),
            ),
            item_cap: 5,
            glyph: "📦".to_string(),
            kind: SourceKind::ApiFanout,
        },
        SourceDescriptor {
            category: "科技".to_string(),
            display_name: "Reddit".to_string(),
            endpoint: "https://www.reddit.com/r/shutupandtakemymoney/top.json?t=week&limit=10"
                .to_string(),
            detail_endpoint: None,
            item_cap: 5,
            glyph: "📦".to_string(),
            kind: SourceKind::ApiListing,
        },
    ]
}
