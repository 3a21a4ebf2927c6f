//! The closed error taxonomy shared by every decoder and sub-parser.
//!
//! Each [`ErrorCode`] belongs to exactly one [`ErrorCategory`] and carries a
//! [`Disposition`] advising the transport layer whether the connection can
//! keep serving the next message or must be force-closed.

use std::fmt;

/// A closed enumeration of every parse/encode failure this crate can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidSyntax,
    InvalidHeader,
    InvalidTrailer,
    InvalidStartLine,
    InvalidStatusCode,
    InvalidChunkSize,
    LineTooLarge,
    StartLineTooLarge,
    HeaderTooLarge,
    HeaderNameTooLarge,
    HeaderValueTooLarge,
    HeaderTooMany,
    MessageTooLarge,
    ChunkSizeTooLarge,
    ChunkExtensionTooLarge,
    TrailerTooLarge,
    UnsupportedChunkExtension,
    UnsupportedFeature,
    UnsupportedHttpVersion,
    BodyLengthMismatch,
    InvalidChunkSizeLineEnding,
    TooManyStateTransitions,
    ParseTimeout,
    BufferLimitExceeded,
    InternalError,
}

/// The six top-level error categories named in the error catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Syntax,
    SizeLimit,
    Unsupported,
    State,
    Resource,
    Internal,
}

/// Advice to the transport layer on how to react to a stored error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// The current message is rejected; the connection may serve the next one.
    RejectMessage,
    /// The connection must be force-closed.
    CloseConnection,
    /// The condition can be silently ignored by the transport.
    Ignore,
}

impl ErrorCode {
    /// The category this code belongs to.
    pub const fn category(self) -> ErrorCategory {
        use ErrorCategory::*;
        match self {
            Self::InvalidSyntax
            | Self::InvalidHeader
            | Self::InvalidTrailer
            | Self::InvalidStartLine
            | Self::InvalidStatusCode
            | Self::InvalidChunkSize => Syntax,

            Self::LineTooLarge
            | Self::StartLineTooLarge
            | Self::HeaderTooLarge
            | Self::HeaderNameTooLarge
            | Self::HeaderValueTooLarge
            | Self::HeaderTooMany
            | Self::MessageTooLarge
            | Self::ChunkSizeTooLarge
            | Self::ChunkExtensionTooLarge
            | Self::TrailerTooLarge => SizeLimit,

            Self::UnsupportedChunkExtension
            | Self::UnsupportedFeature
            | Self::UnsupportedHttpVersion => Unsupported,

            Self::BodyLengthMismatch
            | Self::InvalidChunkSizeLineEnding
            | Self::TooManyStateTransitions => State,

            Self::ParseTimeout | Self::BufferLimitExceeded => Resource,

            Self::InternalError => Internal,
        }
    }

    /// The disposition advised for a freshly constructed error of this code.
    pub const fn default_disposition(self) -> Disposition {
        use Disposition::*;
        match self {
            Self::InvalidSyntax
            | Self::InvalidHeader
            | Self::InvalidTrailer
            | Self::InvalidStartLine
            | Self::InvalidStatusCode
            | Self::InvalidChunkSize
            | Self::LineTooLarge
            | Self::StartLineTooLarge
            | Self::HeaderTooLarge
            | Self::HeaderNameTooLarge
            | Self::HeaderValueTooLarge
            | Self::HeaderTooMany
            | Self::MessageTooLarge
            | Self::ChunkSizeTooLarge
            | Self::ChunkExtensionTooLarge
            | Self::TrailerTooLarge
            | Self::UnsupportedChunkExtension
            | Self::UnsupportedFeature
            | Self::UnsupportedHttpVersion => RejectMessage,

            Self::BodyLengthMismatch
            | Self::InvalidChunkSizeLineEnding
            | Self::TooManyStateTransitions
            | Self::ParseTimeout
            | Self::BufferLimitExceeded
            | Self::InternalError => CloseConnection,
        }
    }

    /// A short machine-stable name, used in diagnostics and the CLI.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidSyntax => "INVALID_SYNTAX",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::InvalidTrailer => "INVALID_TRAILER",
            Self::InvalidStartLine => "INVALID_START_LINE",
            Self::InvalidStatusCode => "INVALID_STATUS_CODE",
            Self::InvalidChunkSize => "INVALID_CHUNK_SIZE",
            Self::LineTooLarge => "LINE_TOO_LARGE",
            Self::StartLineTooLarge => "START_LINE_TOO_LARGE",
            Self::HeaderTooLarge => "HEADER_TOO_LARGE",
            Self::HeaderNameTooLarge => "HEADER_NAME_TOO_LARGE",
            Self::HeaderValueTooLarge => "HEADER_VALUE_TOO_LARGE",
            Self::HeaderTooMany => "HEADER_TOO_MANY",
            Self::MessageTooLarge => "MESSAGE_TOO_LARGE",
            Self::ChunkSizeTooLarge => "CHUNK_SIZE_TOO_LARGE",
            Self::ChunkExtensionTooLarge => "CHUNK_EXTENSION_TOO_LARGE",
            Self::TrailerTooLarge => "TRAILER_TOO_LARGE",
            Self::UnsupportedChunkExtension => "UNSUPPORTED_CHUNK_EXTENSION",
            Self::UnsupportedFeature => "UNSUPPORTED_FEATURE",
            Self::UnsupportedHttpVersion => "UNSUPPORTED_HTTP_VERSION",
            Self::BodyLengthMismatch => "BODY_LENGTH_MISMATCH",
            Self::InvalidChunkSizeLineEnding => "INVALID_CHUNK_SIZE_LINE_ENDING",
            Self::TooManyStateTransitions => "TOO_MANY_STATE_TRANSITIONS",
            Self::ParseTimeout => "PARSE_TIMEOUT",
            Self::BufferLimitExceeded => "BUFFER_LIMIT_EXCEEDED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bound applied to any variable-length fragment embedded in a diagnostic
/// message, so that error text itself never becomes unbounded.
const MAX_DIAGNOSTIC_FRAGMENT: usize = 64;

/// Truncate `s` to [`MAX_DIAGNOSTIC_FRAGMENT`] bytes (on a char boundary),
/// appending an ellipsis marker when truncation occurred.
pub fn truncate_for_diagnostic(s: &str) -> String {
    if s.len() <= MAX_DIAGNOSTIC_FRAGMENT {
        return s.to_string();
    }
    let mut end = MAX_DIAGNOSTIC_FRAGMENT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// An error produced while decoding or encoding an HTTP/1.x message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct HttpDecodeError {
    /// The closed error code.
    pub code: ErrorCode,
    /// A human-readable, diagnostic-bounded message.
    pub message: String,
    /// Whether this error is terminal for the connection (`true`) or only
    /// for the current message (`false`). Defaults from the code's
    /// [`Disposition`] but may be overridden.
    pub fatal: bool,
    /// Rendered text of an underlying cause, if any.
    pub cause: Option<String>,
}

impl HttpDecodeError {
    /// Construct an error using the code's default disposition.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let fatal = matches!(code.default_disposition(), Disposition::CloseConnection);
        Self {
            code,
            message: message.into(),
            fatal,
            cause: None,
        }
    }

    /// Construct an error with an explicit fatal flag, overriding the
    /// code's default disposition.
    pub fn with_fatal(code: ErrorCode, message: impl Into<String>, fatal: bool) -> Self {
        Self {
            code,
            message: message.into(),
            fatal,
            cause: None,
        }
    }

    /// Attach a rendered cause to this error.
    #[must_use]
    pub fn caused_by(mut self, cause: impl fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// The error's category, derived from its code.
    pub const fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// The advisory disposition for this specific error instance.
    pub const fn disposition(&self) -> Disposition {
        if self.fatal {
            Disposition::CloseConnection
        } else {
            Disposition::RejectMessage
        }
    }
}
