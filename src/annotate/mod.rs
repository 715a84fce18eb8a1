// src/annotate/mod.rs
//! Per-item annotation against an external text-generation endpoint.
//! The surface is infallible: every failure branch maps to a deterministic
//! fallback built from locally available fields, so callers always get a
//! usable, sanitized string.

pub mod openai;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use crate::config::AnnotatorSettings;
use crate::ingest::types::{sanitize_field, ANNOTATION_MAX_CHARS};

/// Placeholder used when the endpoint throttles us; distinct from the
/// generic degraded-mode fallback so readers can tell the two apart.
pub const RATE_LIMITED_FALLBACK: &str = "热度飙升，AI 分析排队中";

/// Why a single annotation call produced no usable text. Consumed inside
/// this module; the aggregator never sees it.
#[derive(Debug)]
pub enum AnnotateError {
    RateLimited,
    Status(u16),
    Transport(String),
    EmptyReply,
}

impl fmt::Display for AnnotateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotateError::RateLimited => write!(f, "rate limited (429)"),
            AnnotateError::Status(code) => write!(f, "status {code}"),
            AnnotateError::Transport(msg) => write!(f, "transport: {msg}"),
            AnnotateError::EmptyReply => write!(f, "empty reply"),
        }
    }
}

#[async_trait]
pub trait AnnotateBackend: Send + Sync {
    /// One completion round-trip: system framing + user content in, raw
    /// annotation text out.
    async fn complete(&self, system: &str, user: &str) -> Result<String, AnnotateError>;
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Role and requested focus for one category of content. Prompt selection
/// is this lookup, not branching scattered through the call sites.
struct PromptTemplate {
    role: &'static str,
    focus: &'static str,
}

const FINANCE: PromptTemplate = PromptTemplate {
    role: "你是资深财经分析师",
    focus: "用一句话点出这条财经新闻对普通投资者的影响",
};
const POLITICS: PromptTemplate = PromptTemplate {
    role: "你是时政新闻编辑",
    focus: "用一句话概括这条时政新闻的核心看点",
};
const TECH: PromptTemplate = PromptTemplate {
    role: "你是科技产品观察员",
    focus: "用一句话说明这个产品或话题为什么值得关注",
};
const GENERIC: PromptTemplate = PromptTemplate {
    role: "你是内容编辑",
    focus: "用一句话概括这条内容的亮点",
};

fn template_for(category: &str) -> &'static PromptTemplate {
    match category {
        "财经" => &FINANCE,
        "时政" => &POLITICS,
        "科技" => &TECH,
        _ => &GENERIC,
    }
}

/// Build the (system, user) prompt pair for one item.
fn build_prompt(category: &str, title: &str, excerpt: Option<&str>) -> (String, String) {
    let tpl = template_for(category);
    let system = format!("{}。只输出一句话，不超过20个字，不要使用引号或表情符号。", tpl.role);
    let user = match excerpt {
        Some(ex) => format!("{}。标题：{}。摘要:{}", tpl.focus, title, ex),
        None => format!("{}。标题：{}", tpl.focus, title),
    };
    (system, user)
}

/// Deterministic degraded-mode annotation from local fields only.
pub fn fallback_annotation(category: &str, title: &str, heat: Option<u64>) -> String {
    let text = match heat {
        Some(h) if h > 0 => format!("{category}热帖，{h} 人顶起"),
        _ => format!("{category}速览：{title}"),
    };
    sanitize_field(&text, ANNOTATION_MAX_CHARS)
}

pub struct Annotator {
    backend: Option<Box<dyn AnnotateBackend>>,
    throttle_backoff: Duration,
}

impl Annotator {
    /// Build from resolved settings. A missing API key is not fatal: the
    /// whole run degrades to deterministic annotations, logged once here.
    pub fn new(settings: &AnnotatorSettings, throttle_backoff: Duration) -> Self {
        let backend: Option<Box<dyn AnnotateBackend>> = match &settings.api_key {
            Some(key) => Some(Box::new(openai::OpenAiBackend::new(settings, key.clone()))),
            None => {
                warn!("no annotation API key in environment; running with deterministic annotations");
                None
            }
        };
        Self {
            backend,
            throttle_backoff,
        }
    }

    /// Degraded mode regardless of environment.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            throttle_backoff: Duration::ZERO,
        }
    }

    /// Inject a backend directly; used by tests.
    pub fn with_backend(backend: Box<dyn AnnotateBackend>, throttle_backoff: Duration) -> Self {
        Self {
            backend: Some(backend),
            throttle_backoff,
        }
    }

    /// Annotate one item. Always returns a non-empty, sanitized string of
    /// at most `ANNOTATION_MAX_CHARS` characters.
    pub async fn annotate(
        &self,
        title: &str,
        category: &str,
        excerpt: Option<&str>,
        heat: Option<u64>,
    ) -> String {
        let Some(backend) = &self.backend else {
            return fallback_annotation(category, title, heat);
        };

        let (system, user) = build_prompt(category, title, excerpt);
        match backend.complete(&system, &user).await {
            Ok(text) => {
                let clean = sanitize_field(&text, ANNOTATION_MAX_CHARS);
                if clean.is_empty() {
                    fallback_annotation(category, title, heat)
                } else {
                    clean
                }
            }
            Err(AnnotateError::RateLimited) => {
                warn!(backend = backend.name(), %category, "annotation endpoint throttled; backing off");
                sleep(self.throttle_backoff).await;
                RATE_LIMITED_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, %category, "annotation failed; using fallback");
                fallback_annotation(category, title, heat)
            }
        }
    }
}
