//! Parsing of the raw cookie string (`a=1; b=2`).

use crate::cookies::record::DocumentCookie;
use crate::cookies::validator::{is_key_char, is_value_char};

/// Parse a raw cookie string into ordered pairs.
///
/// Segments that hold no `key=value` pair are skipped, so `""` and `" ; "`
/// both give an empty list.
pub fn parse(raw: &str) -> Vec<DocumentCookie> {
    raw.split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let pair = parse_segment(segment);
            if pair.is_none() {
                tracing::debug!(segment = %segment, "skipping malformed cookie segment");
            }
            pair
        })
        .collect()
}

/// Capture the first `key=value` in `segment`.
///
/// The key is the run of `[A-Za-z0-9_-]` directly before an `=`; the value
/// runs until the next reserved character or the end of the segment.
pub fn parse_segment(segment: &str) -> Option<DocumentCookie> {
    for (eq, _) in segment.match_indices('=') {
        let head = &segment[..eq];
        let key_start = head
            .char_indices()
            .rev()
            .find(|(_, c)| !is_key_char(*c))
            .map_or(0, |(i, c)| i + c.len_utf8());

        if key_start == eq {
            continue;
        }

        let tail = &segment[eq + 1..];
        let value_end = tail
            .char_indices()
            .find(|(_, c)| !is_value_char(*c))
            .map_or(tail.len(), |(i, _)| i);

        return Some(DocumentCookie {
            key: head[key_start..].to_string(),
            value: tail[..value_end].to_string(),
        });
    }

    None
}
