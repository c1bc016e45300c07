//! Attribute parsing
//!
//! Scans the tag text after an element name into attribute spans. The
//! scan is permissive: values may be single-quoted, double-quoted,
//! unquoted, or absent entirely, and different attributes of one element
//! may mix all of these. Spans index into the buffer that is scanned, so
//! the caller hands over the element's raw key storage and the results
//! stay valid for the element's lifetime.
//!
//! Inside quotes a backslash makes the following byte literal and is
//! itself dropped (the value is compacted in place). This is not XML
//! quoting; it is kept for compatibility with the documents this reader
//! is meant to ingest.

use crate::tree::node::{Attribute, Span};

/// Parse attributes from `buf[from..]`, writing escape compactions back
/// into the buffer. Returns the attributes in document order.
pub(crate) fn parse_attributes(buf: &mut [u8], from: usize) -> Vec<Attribute> {
    let mut attrs = Vec::new();
    let mut pos = from;

    while pos < buf.len() {
        // skip leading whitespace
        while pos < buf.len() && is_whitespace(buf[pos]) {
            pos += 1;
        }

        // name is everything up to '=' or whitespace
        let name_start = pos;
        while pos < buf.len() && buf[pos] != b'=' && !is_whitespace(buf[pos]) {
            pos += 1;
        }
        if pos == name_start {
            break;
        }
        let name = Span::new(name_start, pos - name_start);

        // whitespace before a possible '='
        while pos < buf.len() && is_whitespace(buf[pos]) {
            pos += 1;
        }

        let mut value = None;
        if pos < buf.len() && buf[pos] == b'=' {
            pos += 1;
            while pos < buf.len() && is_whitespace(buf[pos]) {
                pos += 1;
            }
            if pos >= buf.len() {
                // '=' with nothing after it ends the scan without an attribute
                break;
            }

            let quote = buf[pos];
            if quote == b'\'' || quote == b'"' {
                pos += 1;
                let (span, next) = quoted_value(buf, pos, quote);
                value = Some(span);
                pos = next;
            } else {
                let start = pos;
                while pos < buf.len() && !is_whitespace(buf[pos]) {
                    pos += 1;
                }
                value = Some(Span::new(start, pos - start));
            }
        }

        attrs.push(Attribute { name, value });
    }

    attrs
}

/// Scan a quoted value starting at `start` (first byte after the quote).
///
/// Returns the value span and the resume position. An unterminated quote
/// yields an empty value and a resume position at the end of the buffer,
/// ending the scan.
fn quoted_value(buf: &mut [u8], start: usize, quote: u8) -> (Span, usize) {
    // locate the closing quote, escapes skip the next byte
    let mut i = start;
    let mut escaped = false;
    let end = loop {
        if i >= buf.len() {
            break None;
        }
        match buf[i] {
            b'\\' => {
                escaped = true;
                i += 2;
            }
            b if b == quote => break Some(i),
            _ => i += 1,
        }
    };

    match end {
        Some(end) => {
            let len = if escaped {
                compact_escapes(buf, start, end)
            } else {
                end - start
            };
            (Span::new(start, len), end + 1)
        }
        None => (Span::new(start, 0), buf.len()),
    }
}

/// Remove escape bytes from `buf[start..end]` in place; bytes between
/// the compacted value and `end` become garbage outside every span.
fn compact_escapes(buf: &mut [u8], start: usize, end: usize) -> usize {
    let mut write = start;
    let mut read = start;
    while read < end {
        let mut b = buf[read];
        if b == b'\\' && read + 1 < end {
            read += 1;
            b = buf[read];
        }
        buf[write] = b;
        write += 1;
        read += 1;
    }
    write - start
}

/// Whitespace as the tokenizer sees it
#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
