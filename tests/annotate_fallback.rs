// tests/annotate_fallback.rs
use std::time::Duration;

use async_trait::async_trait;
use hotfeed_publisher::annotate::{
    fallback_annotation, AnnotateBackend, AnnotateError, Annotator, RATE_LIMITED_FALLBACK,
};
use hotfeed_publisher::ingest::types::ANNOTATION_MAX_CHARS;

struct FixedBackend(String);

#[async_trait]
impl AnnotateBackend for FixedBackend {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AnnotateError> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct FailingBackend(AnnotateError);

#[async_trait]
impl AnnotateBackend for FailingBackend {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AnnotateError> {
        Err(match &self.0 {
            AnnotateError::RateLimited => AnnotateError::RateLimited,
            AnnotateError::Status(c) => AnnotateError::Status(*c),
            AnnotateError::Transport(m) => AnnotateError::Transport(m.clone()),
            AnnotateError::EmptyReply => AnnotateError::EmptyReply,
        })
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

fn annotator(backend: impl AnnotateBackend + 'static) -> Annotator {
    Annotator::with_backend(Box::new(backend), Duration::ZERO)
}

#[tokio::test]
async fn successful_reply_is_sanitized_and_capped() {
    let raw = format!("这个 \"产品\" 很有意思，\n值得关注，理由{}", "很长".repeat(30));
    let out = annotator(FixedBackend(raw))
        .annotate("标题", "科技", None, None)
        .await;
    assert!(!out.contains('"') && !out.contains('\n'));
    assert!(out.chars().count() <= ANNOTATION_MAX_CHARS);
}

#[tokio::test]
async fn rate_limit_gets_its_own_placeholder() {
    let out = annotator(FailingBackend(AnnotateError::RateLimited))
        .annotate("标题", "科技", None, Some(500))
        .await;
    assert_eq!(out, RATE_LIMITED_FALLBACK);
    assert!(!out.is_empty());
}

#[tokio::test]
async fn server_error_falls_back_deterministically() {
    let out = annotator(FailingBackend(AnnotateError::Status(500)))
        .annotate("My New Tool", "科技", None, None)
        .await;
    assert_eq!(out, fallback_annotation("科技", "My New Tool", None));
}

#[tokio::test]
async fn heat_shapes_the_fallback() {
    let out = annotator(FailingBackend(AnnotateError::Transport("refused".into())))
        .annotate("My New Tool", "科技", None, Some(4213))
        .await;
    assert_eq!(out, "科技热帖，4213 人顶起");
}

#[tokio::test]
async fn empty_reply_never_yields_an_empty_annotation() {
    let out = annotator(FixedBackend("  \n  ".to_string()))
        .annotate("My New Tool", "财经", None, None)
        .await;
    assert_eq!(out, fallback_annotation("财经", "My New Tool", None));
    assert!(!out.is_empty());
}

#[tokio::test]
async fn disabled_annotator_always_uses_the_fallback() {
    let out = Annotator::disabled()
        .annotate("Show HN: My New Tool", "科技", None, None)
        .await;
    assert_eq!(out, "科技速览：Show HN: My New Tool");
}
