//! Locate the next CRLF-terminated line in a byte buffer.

use bytes::Bytes;

use crate::error::{ErrorCode, HttpDecodeError};

/// Outcome of a [`find_line`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineResult {
    /// No CRLF found yet within the bound; caller should wait for more input.
    NeedMore,
    /// A complete line was found.
    Found {
        /// The line contents, excluding the terminating CRLF.
        line: Bytes,
        /// Total bytes consumed from the front of the buffer, including CRLF.
        consumed: usize,
    },
}

/// Search `buf` for the first CRLF (`\r\n`) pair.
///
/// Bare CR and bare LF outside of a CRLF pair are treated as ordinary bytes
/// at this layer; stricter discipline is the caller's responsibility.
///
/// A line (the bytes preceding the CRLF) longer than `max_len` fails with
/// [`ErrorCode::LineTooLarge`] — the caller is expected to rewrite this code
/// to a more specific one (e.g. `START_LINE_TOO_LARGE`) where appropriate.
pub fn find_line(buf: &Bytes, max_len: usize) -> Result<LineResult, HttpDecodeError> {
    // Search window: at most max_len + 2 bytes need to be inspected, since a
    // CRLF starting any later than `max_len` already implies an oversized line.
    let scan_end = buf.len().min(max_len.saturating_add(2));
    let window = &buf[..scan_end];

    if let Some(pos) = memchr_crlf(window) {
        let line = buf.slice(..pos);
        return Ok(LineResult::Found {
            line,
            consumed: pos + 2,
        });
    }

    // No CRLF within the first `max_len + 2` bytes. A valid line (content
    // length <= max_len) would have its CR at index <= max_len and its LF
    // right after, so once that many bytes are in hand without a match the
    // line is provably oversized. Until then, wait for more input.
    if buf.len() > max_len + 1 {
        return Err(HttpDecodeError::new(
            ErrorCode::LineTooLarge,
            format!("line exceeds maximum of {max_len} bytes before CRLF"),
        ));
    }

    Ok(LineResult::NeedMore)
}

/// Find the byte offset of the first `\r\n` in `data`, if any.
fn memchr_crlf(data: &[u8]) -> Option<usize> {
    if data.len() < 2 {
        return None;
    }
    data.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_simple_line() {
        let buf = Bytes::from_static(b"hello\r\nrest");
        match find_line(&buf, 1024).unwrap() {
            LineResult::Found { line, consumed } => {
                assert_eq!(&line[..], b"hello");
                assert_eq!(consumed, 7);
            }
            LineResult::NeedMore => panic!("expected Found"),
        }
    }

    #[test]
    fn empty_line_at_position_zero() {
        let buf = Bytes::from_static(b"\r\nrest");
        match find_line(&buf, 1024).unwrap() {
            LineResult::Found { line, consumed } => {
                assert_eq!(line.len(), 0);
                assert_eq!(consumed, 2);
            }
            LineResult::NeedMore => panic!("expected Found"),
        }
    }

    #[test]
    fn needs_more_without_crlf() {
        let buf = Bytes::from_static(b"partial line");
        assert_eq!(find_line(&buf, 1024).unwrap(), LineResult::NeedMore);
    }

    #[test]
    fn bare_cr_and_lf_are_ordinary_bytes() {
        let buf = Bytes::from_static(b"has\ra\nbare\r\n");
        match find_line(&buf, 1024).unwrap() {
            LineResult::Found { line, consumed } => {
                assert_eq!(&line[..], b"has\ra\nbare");
                assert_eq!(consumed, 12);
            }
            LineResult::NeedMore => panic!("expected Found"),
        }
    }

    #[test]
    fn too_large_when_no_crlf_within_bound() {
        let buf = Bytes::from_static(b"0123456789");
        let err = find_line(&buf, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::LineTooLarge);
    }

    #[test]
    fn too_large_when_line_itself_exceeds_bound_even_with_crlf() {
        let buf = Bytes::from_static(b"0123456789\r\n");
        let err = find_line(&buf, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::LineTooLarge);
    }

    #[test]
    fn does_not_prematurely_reject_a_cr_straddling_the_bound() {
        // Content is exactly at the bound; only the CR has arrived so far.
        // This must not be mistaken for an oversized line.
        let buf = Bytes::from_static(b"01234\r");
        assert_eq!(find_line(&buf, 5).unwrap(), LineResult::NeedMore);
    }

    #[test]
    fn line_exactly_at_bound_is_accepted() {
        let buf = Bytes::from_static(b"01234\r\n");
        match find_line(&buf, 5).unwrap() {
            LineResult::Found { line, .. } => assert_eq!(line.len(), 5),
            LineResult::NeedMore => panic!("expected Found"),
        }
    }
}
