// src/publish.rs
//! Rewrites the page's embedded-data region. Everything outside the two
//! anchor lines is preserved byte-for-byte; the file itself is only
//! touched after the whole new document has been produced.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::error::PipelineError;
use crate::ingest::types::NormalizedItem;

pub const START_ANCHOR: &str = "// DATA_START";
pub const END_ANCHOR: &str = "// DATA_END";

// Indentation of the records inside the page's script block.
const RECORD_INDENT: &str = "                ";
const FIELD_INDENT: &str = "                    ";

/// Serialize one item as a record literal in the page's embedded syntax.
/// Fields were sanitized upstream, so single-quoted literals stay intact.
fn render_record(item: &NormalizedItem) -> String {
    let sales = match item.heat {
        Some(h) if h > 0 => format!("{h} ⬆️"),
        _ => format!("{} 🔥", Local::now().format("%m-%d")),
    };

    let mut rec = String::new();
    rec.push_str(RECORD_INDENT);
    rec.push_str("{\n");
    rec.push_str(FIELD_INDENT);
    rec.push_str(&format!(
        "id: {}, platform: '{}', title: '{}', price: '$??', sales: '{}', score: {}, emoji: '{}',\n",
        item.id, item.origin_label, item.title, sales, item.rank_score, item.glyph
    ));
    if let Some(link) = &item.link {
        rec.push_str(FIELD_INDENT);
        rec.push_str(&format!("link: '{link}',\n"));
    }
    rec.push_str(FIELD_INDENT);
    rec.push_str(&format!("aiReason: '{}'\n", item.annotation));
    rec.push_str(RECORD_INDENT);
    rec.push_str("},\n");
    rec
}

/// Replace exactly the text between the two anchors with the serialized
/// items. Pure with respect to everything outside the marked region, and
/// idempotent for a fixed item list.
pub fn splice(document: &str, items: &[NormalizedItem]) -> Result<String, PipelineError> {
    let start = document
        .find(START_ANCHOR)
        .ok_or(PipelineError::AnchorNotFound {
            anchor: START_ANCHOR,
        })?;
    let region_start = start + START_ANCHOR.len();
    let end_rel =
        document[region_start..]
            .find(END_ANCHOR)
            .ok_or(PipelineError::AnchorNotFound { anchor: END_ANCHOR })?;
    let region_end = region_start + end_rel;

    let mut body = String::from("\n");
    for item in items {
        body.push_str(&render_record(item));
    }
    body.push_str(RECORD_INDENT);

    let mut out = String::with_capacity(document.len() + body.len());
    out.push_str(&document[..region_start]);
    out.push_str(&body);
    out.push_str(&document[region_end..]);
    Ok(out)
}

/// Read the page, splice the region, and commit the result. The write goes
/// through a sibling temp file and a rename, so a failure mid-way leaves
/// the original document as it was.
pub fn publish_to_file(path: &Path, items: &[NormalizedItem]) -> Result<()> {
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("reading target page {}", path.display()))?;
    let updated = splice(&document, items)?;

    let tmp = path.with_extension("html.tmp");
    std::fs::write(&tmp, &updated)
        .with_context(|| format!("writing temp page {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("replacing target page {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, title: &str, heat: Option<u64>) -> NormalizedItem {
        NormalizedItem {
            id,
            category: "科技".to_string(),
            title: title.to_string(),
            link: Some("https://example.test/a".to_string()),
            origin_label: "Hacker News".to_string(),
            glyph: "🚀".to_string(),
            heat,
            rank_score: heat.map(|h| h as i64).unwrap_or(95),
            annotation: "科技速览：something".to_string(),
        }
    }

    const DOC: &str = "<html>\nbefore\n// DATA_START\nOLD\n// DATA_END\nafter\n</html>";

    #[test]
    fn old_region_is_fully_replaced() {
        let out = splice(DOC, &[item(1, "Show HN My New Tool", Some(321))]).unwrap();
        assert!(!out.contains("OLD"));
        assert!(out.contains("title: 'Show HN My New Tool'"));
        assert!(out.contains("sales: '321 ⬆️'"));
    }

    #[test]
    fn content_outside_anchors_is_untouched() {
        let out = splice(DOC, &[item(1, "t", None)]).unwrap();
        assert!(out.starts_with("<html>\nbefore\n// DATA_START"));
        assert!(out.ends_with("// DATA_END\nafter\n</html>"));
    }

    #[test]
    fn splice_is_idempotent() {
        let items = vec![item(1, "t", Some(10)), item(2, "u", None)];
        let once = splice(DOC, &items).unwrap();
        let twice = splice(&once, &items).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_start_anchor_is_reported() {
        let err = splice("no markers here", &[]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::AnchorNotFound {
                anchor: START_ANCHOR
            }
        ));
    }

    #[test]
    fn missing_end_anchor_is_reported() {
        let err = splice("x\n// DATA_START\ny", &[]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::AnchorNotFound { anchor: END_ANCHOR }
        ));
    }

    #[test]
    fn record_has_expected_field_order() {
        let out = render_record(&item(3, "t", Some(5)));
        let id_pos = out.find("id: 3").unwrap();
        let platform_pos = out.find("platform:").unwrap();
        let reason_pos = out.find("aiReason:").unwrap();
        assert!(id_pos < platform_pos && platform_pos < reason_pos);
    }
}
