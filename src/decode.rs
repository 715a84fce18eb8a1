// src/decode.rs
//! Best-effort text decoding for feed payloads whose declared encoding is
//! absent or wrong. Candidates are tried in order; the final lossy pass
//! guarantees this never fails.

use encoding_rs::{Encoding, GB18030, UTF_8};

/// Decode `bytes` using the transport-reported charset first, then strict
/// UTF-8, then GB18030 (the regional legacy encoding feeds here still
/// ship), falling back to lossy UTF-8 as the last resort.
pub fn decode_payload(bytes: &[u8], charset_hint: Option<&str>) -> String {
    if let Some(label) = charset_hint {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            let (text, _, had_errors) = enc.decode(bytes);
            if !had_errors {
                return text.into_owned();
            }
        }
    }

    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }

    let (text, _, had_errors) = GB18030.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }

    String::from_utf8_lossy(bytes).into_owned()
}
