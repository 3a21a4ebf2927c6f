//! Chunked transfer-coding decoding (spec §4.5).
//!
//! Phases: chunk-size line -> chunk-data -> trailing CRLF -> (repeat) ->
//! terminal zero-size chunk -> optional trailer block -> done.

use bytes::{Bytes, BytesMut};

use crate::config::ParserConfig;
use crate::error::{truncate_for_diagnostic, ErrorCode, HttpDecodeError};
use crate::headers::{HeaderDecoder, HeaderMap};
use crate::line::{find_line, LineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ChunkSizeLine,
    ChunkData { remaining: usize },
    ChunkDataCrlf,
    Trailer,
    Done,
}

/// Decodes a chunked message body, emitting decoded data chunks and, at the
/// end, any trailer fields.
#[derive(Debug, Clone)]
pub struct ChunkedBodyDecoder {
    phase: Phase,
    residual: BytesMut,
    trailer_decoder: Option<HeaderDecoder>,
}

/// Outcome of feeding bytes into a [`ChunkedBodyDecoder`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkedBodyOutput {
    /// Decoded chunk-data bytes newly available from this call.
    pub data: Bytes,
    /// Whether the terminal chunk and trailer block have both been seen.
    pub complete: bool,
    /// The trailer fields, populated only once `complete` is `true`.
    pub trailers: Option<HeaderMap>,
}

impl ChunkedBodyDecoder {
    /// Start a new decoder positioned at the first chunk-size line.
    pub fn new() -> Self {
        Self {
            phase: Phase::ChunkSizeLine,
            residual: BytesMut::new(),
            trailer_decoder: None,
        }
    }

    /// Whether the body has been fully decoded (terminal chunk + trailers).
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Feed `data` into the decoder. Returns all chunk-data bytes decoded in
    /// this call (possibly spanning several chunks) plus completion status.
    /// Any bytes past the end of the body (e.g. a pipelined next message) are
    /// retained internally and available via
    /// [`ChunkedBodyDecoder::take_trailing_residual`] once `complete` is seen.
    ///
    /// # Panics
    ///
    /// Panics if called again after completion was already reported.
    pub fn feed(
        &mut self,
        data: &[u8],
        config: &ParserConfig,
    ) -> Result<ChunkedBodyOutput, HttpDecodeError> {
        assert!(
            self.phase != Phase::Done,
            "ChunkedBodyDecoder::feed called after completion"
        );

        self.residual.extend_from_slice(data);
        let mut decoded = BytesMut::new();
        let mut trailers = None;

        loop {
            match self.phase {
                Phase::ChunkSizeLine => {
                    let buf = Bytes::copy_from_slice(&self.residual);
                    let bound = config.max_chunk_size_hex_digits + config.max_chunk_extension_len + 2;
                    match find_line(&buf, bound)? {
                        LineResult::NeedMore => break,
                        LineResult::Found { line, consumed } => {
                            let _ = self.residual.split_to(consumed);
                            let size = parse_chunk_size_line(&line, config)?;
                            if size == 0 {
                                self.phase = Phase::Trailer;
                                self.trailer_decoder = Some(HeaderDecoder::new());
                            } else {
                                self.phase = Phase::ChunkData { remaining: size };
                            }
                        }
                    }
                }
                Phase::ChunkData { remaining } => {
                    if self.residual.is_empty() {
                        break;
                    }
                    let take = remaining.min(self.residual.len());
                    decoded.extend_from_slice(&self.residual[..take]);
                    let _ = self.residual.split_to(take);
                    let left = remaining - take;
                    if left == 0 {
                        self.phase = Phase::ChunkDataCrlf;
                    } else {
                        self.phase = Phase::ChunkData { remaining: left };
                        break;
                    }
                }
                Phase::ChunkDataCrlf => {
                    if self.residual.len() < 2 {
                        break;
                    }
                    if &self.residual[..2] != b"\r\n" {
                        return Err(HttpDecodeError::new(
                            ErrorCode::InvalidChunkSizeLineEnding,
                            "chunk data not followed by CRLF".to_string(),
                        ));
                    }
                    let _ = self.residual.split_to(2);
                    self.phase = Phase::ChunkSizeLine;
                }
                Phase::Trailer => {
                    let dec = self.trailer_decoder.as_mut().expect("trailer decoder present");
                    let remaining_bytes = self.residual.split().freeze();
                    let trailer_config = ParserConfig {
                        max_header_count: config.max_trailers,
                        max_header_bytes: config.max_trailer_size,
                        max_header_line_bytes: config.max_header_line_bytes,
                        max_header_name_bytes: config.max_header_name_bytes,
                        max_header_value_bytes: config.max_header_value_bytes,
                        ..config.clone()
                    };
                    let out = dec.decode(&remaining_bytes, &trailer_config).map_err(|e| {
                        if e.code == ErrorCode::HeaderTooMany {
                            HttpDecodeError::new(ErrorCode::TrailerTooLarge, e.message)
                        } else if e.code == ErrorCode::HeaderTooLarge
                            || e.code == ErrorCode::HeaderNameTooLarge
                            || e.code == ErrorCode::HeaderValueTooLarge
                        {
                            HttpDecodeError::new(ErrorCode::TrailerTooLarge, e.message)
                        } else {
                            HttpDecodeError::new(ErrorCode::InvalidTrailer, e.message)
                        }
                    })?;
                    // Put back any bytes the header decoder did not consume
                    // (it buffers internally; recover via take_residual only
                    // once done).
                    if out.done {
                        let leftover = dec.take_residual_after_done();
                        self.residual.extend_from_slice(&leftover);
                        let mut map = self.trailer_decoder.take().expect("trailer decoder present").into_map();
                        // Trailers fold duplicate names by concatenation,
                        // unlike headers which keep an ordered value list.
                        map.collapse_duplicates(", ");
                        trailers = Some(map);
                        self.phase = Phase::Done;
                        break;
                    } else {
                        break;
                    }
                }
                Phase::Done => break,
            }
        }

        let complete = self.phase == Phase::Done;
        Ok(ChunkedBodyOutput {
            data: decoded.freeze(),
            complete,
            trailers,
        })
    }

    /// Bytes left over after the terminal chunk and trailer block — the
    /// start of the next pipelined message, if any. Only meaningful once
    /// completion has been reported.
    pub fn take_trailing_residual(&mut self) -> Bytes {
        self.residual.split().freeze()
    }
}

impl Default for ChunkedBodyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim leading/trailing ASCII space and horizontal tab.
fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let is_ws = |b: &u8| *b == b' ' || *b == b'\t';
    let start = bytes.iter().position(|b| !is_ws(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_ws(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Parse a chunk-size line: `hex-digits [ ; chunk-ext ]`.
fn parse_chunk_size_line(line: &[u8], config: &ParserConfig) -> Result<usize, HttpDecodeError> {
    let (size_part, ext_part) = match line.iter().position(|&b| b == b';') {
        Some(idx) => (&line[..idx], Some(&line[idx + 1..])),
        None => (line, None),
    };
    let size_part = trim_ascii_whitespace(size_part);

    if size_part.is_empty() {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidChunkSize,
            "chunk size line has no hex digits".to_string(),
        ));
    }
    if size_part.len() > config.max_chunk_size_hex_digits {
        return Err(HttpDecodeError::new(
            ErrorCode::ChunkSizeTooLarge,
            format!(
                "chunk size hex digit count exceeds maximum of {}",
                config.max_chunk_size_hex_digits
            ),
        ));
    }
    if !size_part.iter().all(u8::is_ascii_hexdigit) {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidChunkSize,
            format!(
                "chunk size is not valid hex: '{}'",
                truncate_for_diagnostic(&String::from_utf8_lossy(size_part))
            ),
        ));
    }

    if let Some(ext) = ext_part {
        if config.max_chunk_extension_len == 0 {
            return Err(HttpDecodeError::new(
                ErrorCode::UnsupportedChunkExtension,
                "chunk extensions are not supported by this configuration".to_string(),
            ));
        }
        if ext.len() > config.max_chunk_extension_len {
            return Err(HttpDecodeError::new(
                ErrorCode::ChunkExtensionTooLarge,
                format!(
                    "chunk extension exceeds maximum of {} bytes",
                    config.max_chunk_extension_len
                ),
            ));
        }
    }

    let size_str = std::str::from_utf8(size_part).expect("hex digits are ASCII");
    let size = usize::from_str_radix(size_str, 16).map_err(|_| {
        HttpDecodeError::new(
            ErrorCode::InvalidChunkSize,
            format!("chunk size overflows usize: '{size_str}'"),
        )
    })?;

    if size > config.max_chunk_size {
        return Err(HttpDecodeError::new(
            ErrorCode::ChunkSizeTooLarge,
            format!(
                "chunk size {} exceeds maximum of {}",
                size, config.max_chunk_size
            ),
        ));
    }

    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn decodes_a_single_chunk_and_terminator() {
        let mut dec = ChunkedBodyDecoder::new();
        let out = dec.feed(b"5\r\nhello\r\n0\r\n\r\n", &cfg()).unwrap();
        assert_eq!(&out.data[..], b"hello");
        assert!(out.complete);
        assert!(out.trailers.unwrap().is_empty());
    }

    #[test]
    fn decodes_multiple_chunks() {
        let mut dec = ChunkedBodyDecoder::new();
        let out = dec
            .feed(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n", &cfg())
            .unwrap();
        assert_eq!(&out.data[..], b"Wikipedia");
        assert!(out.complete);
    }

    #[test]
    fn splits_across_many_small_feeds() {
        let mut dec = ChunkedBodyDecoder::new();
        let whole = b"5\r\nhello\r\n0\r\n\r\n";
        let mut collected = Vec::new();
        let mut complete = false;
        for byte in whole {
            let out = dec.feed(&[*byte], &cfg()).unwrap();
            collected.extend_from_slice(&out.data);
            if out.complete {
                complete = true;
            }
        }
        assert_eq!(collected, b"hello");
        assert!(complete);
    }

    #[test]
    fn parses_trailers() {
        let mut dec = ChunkedBodyDecoder::new();
        let out = dec
            .feed(b"3\r\nfoo\r\n0\r\nX-Checksum: abc123\r\n\r\n", &cfg())
            .unwrap();
        assert!(out.complete);
        let trailers = out.trailers.unwrap();
        assert_eq!(trailers.get_first("x-checksum"), Some("abc123"));
    }

    #[test]
    fn rejects_chunk_data_without_crlf() {
        let mut dec = ChunkedBodyDecoder::new();
        let err = dec.feed(b"3\r\nfooXX", &cfg()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidChunkSizeLineEnding);
    }

    #[test]
    fn rejects_non_hex_chunk_size() {
        let mut dec = ChunkedBodyDecoder::new();
        let err = dec.feed(b"ZZ\r\n", &cfg()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidChunkSize);
    }

    #[test]
    fn accepts_chunk_extensions() {
        let mut dec = ChunkedBodyDecoder::new();
        let out = dec
            .feed(b"5;ext=val\r\nhello\r\n0\r\n\r\n", &cfg())
            .unwrap();
        assert_eq!(&out.data[..], b"hello");
        assert!(out.complete);
    }

    #[test]
    fn accepts_whitespace_around_extension_separators() {
        let mut dec = ChunkedBodyDecoder::new();
        let out = dec
            .feed(b"5  ;  ext=val  \r\nhello\r\n0\r\n\r\n", &cfg())
            .unwrap();
        assert_eq!(&out.data[..], b"hello");
        assert!(out.complete);
    }

    #[test]
    fn rejects_extensions_when_disabled() {
        let mut dec = ChunkedBodyDecoder::new();
        let config = ParserConfig {
            max_chunk_extension_len: 0,
            ..cfg()
        };
        let err = dec.feed(b"5;ext=val\r\nhello\r\n", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedChunkExtension);
    }

    #[test]
    fn rejects_chunk_size_over_limit() {
        let mut dec = ChunkedBodyDecoder::new();
        let config = ParserConfig {
            max_chunk_size: 4,
            ..cfg()
        };
        let err = dec.feed(b"5\r\n", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::ChunkSizeTooLarge);
    }

    #[test]
    #[should_panic]
    fn feed_after_done_panics() {
        let mut dec = ChunkedBodyDecoder::new();
        dec.feed(b"0\r\n\r\n", &cfg()).unwrap();
        let _ = dec.feed(b"more", &cfg());
    }
}
