//! Parser and encoder configuration.
//!
//! All limits are per-state, supplied explicitly at construction time —
//! there is no global configuration or singleton.

/// Configurable limits for [`crate::decoder::MessageDecoder`] and the
/// sub-parsers it composes. All sizes are in bytes unless noted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Upper bound on the start-line length, exclusive of the CRLF.
    pub max_start_line_bytes: usize,
    /// Upper bound on any single header line.
    pub max_header_line_bytes: usize,
    /// Upper bound on a header name after trimming.
    pub max_header_name_bytes: usize,
    /// Upper bound on a header value after trimming.
    pub max_header_value_bytes: usize,
    /// Cumulative upper bound across all header lines.
    pub max_header_bytes: usize,
    /// Upper bound on the number of header entries.
    pub max_header_count: usize,
    /// Upper bound on the hex digit count of a chunk size.
    pub max_chunk_size_hex_digits: usize,
    /// Upper bound on a single chunk's decoded length.
    pub max_chunk_size: usize,
    /// Upper bound on chunk extension text; `0` disables extensions entirely.
    pub max_chunk_extension_len: usize,
    /// Upper bound on trailer count.
    pub max_trailers: usize,
    /// Upper bound on the trailer block byte length.
    pub max_trailer_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_start_line_bytes: 16 * 1024,
            max_header_line_bytes: 8 * 1024,
            max_header_name_bytes: 256,
            max_header_value_bytes: 8 * 1024,
            max_header_bytes: 16 * 1024,
            max_header_count: 100,
            max_chunk_size_hex_digits: 8,
            max_chunk_size: 1024 * 1024,
            max_chunk_extension_len: 100,
            max_trailers: 32,
            max_trailer_size: 8 * 1024,
        }
    }
}

/// Hop-by-hop header names the encoder strips before emitting a message,
/// per RFC 9110 §7.6.1. `Transfer-Encoding` is recomputed by the encoder
/// itself rather than passed through, so it is stripped unconditionally too.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Configuration for [`crate::encoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Segmentation unit for streaming chunked output.
    pub chunk_size: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: 8 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ParserConfig::default();
        assert_eq!(cfg.max_start_line_bytes, 16 * 1024);
        assert_eq!(cfg.max_header_line_bytes, 8 * 1024);
        assert_eq!(cfg.max_header_name_bytes, 256);
        assert_eq!(cfg.max_header_value_bytes, 8 * 1024);
        assert_eq!(cfg.max_header_bytes, 16 * 1024);
        assert_eq!(cfg.max_header_count, 100);
        assert_eq!(cfg.max_chunk_size_hex_digits, 8);
        assert_eq!(cfg.max_chunk_size, 1024 * 1024);
        assert_eq!(cfg.max_chunk_extension_len, 100);
    }

    #[test]
    fn encoder_default_chunk_size() {
        assert_eq!(EncoderConfig::default().chunk_size, 8 * 1024);
    }

    #[test]
    fn overriding_a_single_limit_keeps_the_rest() {
        let cfg = ParserConfig {
            max_header_count: 2,
            ..ParserConfig::default()
        };
        assert_eq!(cfg.max_header_count, 2);
        assert_eq!(cfg.max_header_bytes, ParserConfig::default().max_header_bytes);
    }
}
