//! Header block splitting.
//!
//! A header is the text between a first line of `---` and the next line of
//! `---`. Everything after the closing marker is the body.

/// Marker line that opens and closes the header block.
pub const HEADER_MARKER: &str = "---";

/// A document split into header text and body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub header: &'a str,
    pub body: &'a str,
}

/// Split `content` into header and body.
///
/// Returns `None` when the document does not open with a marker line or the
/// header is never closed.
#[must_use]
pub fn split_header(content: &str) -> Option<SplitDocument<'_>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != HEADER_MARKER {
        return None;
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == HEADER_MARKER {
            let header = &content[header_start..offset];
            let body = &content[offset + line.len()..];
            return Some(SplitDocument { header, body });
        }
        offset += line.len();
    }
    None
}
