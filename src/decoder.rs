//! Top-level incremental message decoder (spec §5), composing the start-line,
//! header, and body sub-parsers into a single `feed`-driven state machine.

use bytes::{Bytes, BytesMut};

use crate::body::chunked::ChunkedBodyDecoder;
use crate::body::fixed::FixedLengthBodyDecoder;
use crate::config::ParserConfig;
use crate::error::{ErrorCode, HttpDecodeError};
use crate::event::Event;
use crate::framing::{determine_body_strategy, BodyStrategy, MessageRole};
use crate::headers::{HeaderDecoder, HeaderMap};
use crate::line::{find_line, LineResult};
use crate::startline::{parse_request_line, parse_response_line, StartLine};

/// Which half of an HTTP exchange a [`MessageDecoder`] is parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Request,
    /// `request_was_head` tracks the corresponding request's method, which
    /// affects whether this response carries a body regardless of its
    /// headers (RFC 9112 §6.3).
    Response { request_was_head: bool },
}

#[derive(Debug)]
enum Phase {
    StartLine,
    Headers(HeaderDecoder),
    BodyFixed(FixedLengthBodyDecoder),
    BodyChunked(ChunkedBodyDecoder),
    BodyCloseDelimited,
    Upgrade,
    Finished,
}

/// Shared state machine backing [`RequestDecoder`] and [`ResponseDecoder`].
#[derive(Debug)]
struct MessageDecoder {
    config: ParserConfig,
    role: Role,
    phase: Phase,
    pending: BytesMut,
    start_line: Option<StartLine>,
    errored: bool,
}

impl MessageDecoder {
    fn new(config: ParserConfig, role: Role) -> Self {
        Self {
            config,
            role,
            phase: Phase::StartLine,
            pending: BytesMut::new(),
            start_line: None,
            errored: false,
        }
    }

    fn feed(&mut self, data: &[u8]) -> Result<Vec<Event>, HttpDecodeError> {
        assert!(!self.errored, "feed called after a prior decode error");
        assert!(
            !matches!(self.phase, Phase::Finished),
            "feed called after the message was already finished"
        );

        self.pending.extend_from_slice(data);
        let mut events = Vec::new();

        let result = self.drive(&mut events);
        if result.is_err() {
            self.errored = true;
        }
        result?;
        Ok(events)
    }

    /// Signal that the transport connection has reached EOF. For a
    /// close-delimited body this finalizes it normally; for a fixed-length
    /// or chunked body still in progress, EOF before the declared length (or
    /// terminal chunk) was reached is a framing failure, not a clean finish.
    fn finish(&mut self) -> Result<Vec<Event>, HttpDecodeError> {
        assert!(!self.errored, "finish called after a prior decode error");
        let mut events = Vec::new();
        match &self.phase {
            Phase::BodyCloseDelimited => {
                events.push(Event::BodyComplete {
                    trailers: HeaderMap::new(),
                });
                events.push(Event::MessageComplete);
                self.phase = Phase::Finished;
            }
            Phase::BodyFixed(dec) if !dec.is_complete() => {
                let remaining = dec.remaining();
                self.errored = true;
                self.phase = Phase::Finished;
                return Err(HttpDecodeError::new(
                    ErrorCode::BodyLengthMismatch,
                    format!(
                        "connection closed with {remaining} declared body byte(s) still unread"
                    ),
                ));
            }
            Phase::BodyChunked(dec) if !dec.is_complete() => {
                self.errored = true;
                self.phase = Phase::Finished;
                return Err(HttpDecodeError::new(
                    ErrorCode::BodyLengthMismatch,
                    "connection closed before the chunked body terminal chunk was seen"
                        .to_string(),
                ));
            }
            _ => {}
        }
        Ok(events)
    }

    fn drive(&mut self, events: &mut Vec<Event>) -> Result<(), HttpDecodeError> {
        loop {
            // Each arm below processes as much of `self.pending` as it can
            // in one call; if the phase is still the same variant
            // afterwards, the handler made no further progress and is
            // waiting on more input, so the loop must stop rather than
            // re-invoke the same handler against the (now-empty) residual.
            let phase_before = std::mem::discriminant(&self.phase);
            match &mut self.phase {
                Phase::StartLine => {
                    let buf = Bytes::copy_from_slice(&self.pending);
                    let line_result = find_line(&buf, self.config.max_start_line_bytes).map_err(
                        |e| {
                            if e.code == ErrorCode::LineTooLarge {
                                HttpDecodeError::new(ErrorCode::StartLineTooLarge, e.message)
                            } else {
                                e
                            }
                        },
                    )?;
                    match line_result {
                        LineResult::NeedMore => return Ok(()),
                        LineResult::Found { line, consumed } => {
                            let _ = self.pending.split_to(consumed);
                            let start_line = match self.role {
                                Role::Request => StartLine::Request(parse_request_line(&line)?),
                                Role::Response { .. } => {
                                    StartLine::Response(parse_response_line(&line)?)
                                }
                            };
                            events.push(Event::StartLineParsed(start_line.clone()));
                            self.start_line = Some(start_line);
                            self.phase = Phase::Headers(HeaderDecoder::new());
                        }
                    }
                }
                Phase::Headers(_) => self.drive_headers(events)?,
                Phase::BodyFixed(_) => self.drive_fixed_body(events),
                Phase::BodyChunked(_) => self.drive_chunked_body(events)?,
                Phase::BodyCloseDelimited => {
                    let data = self.pending.split().freeze();
                    if !data.is_empty() {
                        events.push(Event::BodyData(data));
                    }
                    return Ok(());
                }
                Phase::Upgrade | Phase::Finished => {
                    let data = self.pending.split().freeze();
                    if !data.is_empty() {
                        events.push(Event::BodyData(data));
                    }
                    return Ok(());
                }
            }

            if std::mem::discriminant(&self.phase) == phase_before {
                return Ok(());
            }
        }
    }

    fn drive_headers(&mut self, events: &mut Vec<Event>) -> Result<(), HttpDecodeError> {
        let Phase::Headers(dec) = &mut self.phase else {
            unreachable!()
        };
        let input = self.pending.split().freeze();
        let out = dec.decode(&input, &self.config)?;
        for line in out.lines {
            events.push(Event::HeaderLine {
                name: line.name,
                value: line.value,
            });
        }

        if !out.done {
            return Ok(());
        }

        let Phase::Headers(mut dec) = std::mem::replace(&mut self.phase, Phase::Finished) else {
            unreachable!()
        };
        let leftover = dec.take_residual_after_done();
        self.finalize_headers(dec.into_map(), leftover, events)
    }

    fn finalize_headers(
        &mut self,
        headers: HeaderMap,
        leftover: Bytes,
        events: &mut Vec<Event>,
    ) -> Result<(), HttpDecodeError> {
        self.pending.extend_from_slice(&leftover);

        let (message_role, no_body_by_rule, version) = match (&self.role, &self.start_line) {
            (Role::Request, Some(StartLine::Request(rl))) => {
                (MessageRole::Request, false, rl.version)
            }
            (Role::Response { request_was_head }, Some(StartLine::Response(sl))) => {
                let no_body = *request_was_head
                    || (100..200).contains(&sl.status)
                    || sl.status == 204
                    || sl.status == 304;
                (MessageRole::Response { status: sl.status }, no_body, sl.version)
            }
            _ => unreachable!("start line must be parsed before headers complete"),
        };

        let strategy =
            determine_body_strategy(&headers, message_role, no_body_by_rule, version)?;

        events.push(Event::HeadersComplete(headers));

        match strategy {
            BodyStrategy::Chunked => {
                self.phase = Phase::BodyChunked(ChunkedBodyDecoder::new());
            }
            BodyStrategy::FixedLength(0) => {
                events.push(Event::BodyComplete {
                    trailers: HeaderMap::new(),
                });
                events.push(Event::MessageComplete);
                self.phase = Phase::Finished;
            }
            BodyStrategy::FixedLength(n) => {
                self.phase = Phase::BodyFixed(FixedLengthBodyDecoder::new(n));
            }
            BodyStrategy::None => {
                events.push(Event::BodyComplete {
                    trailers: HeaderMap::new(),
                });
                events.push(Event::MessageComplete);
                self.phase = Phase::Finished;
            }
            BodyStrategy::CloseDelimited => {
                self.phase = Phase::BodyCloseDelimited;
            }
            BodyStrategy::Upgrade => {
                events.push(Event::MessageComplete);
                self.phase = Phase::Upgrade;
            }
        }

        Ok(())
    }

    fn drive_fixed_body(&mut self, events: &mut Vec<Event>) {
        let Phase::BodyFixed(dec) = &mut self.phase else {
            unreachable!()
        };
        let input = self.pending.split().freeze();
        let (out, rest) = dec.feed(&input);
        let rest = Bytes::copy_from_slice(rest);
        if !out.data.is_empty() {
            events.push(Event::BodyData(out.data));
        }
        if out.complete {
            self.pending.extend_from_slice(&rest);
            events.push(Event::BodyComplete {
                trailers: HeaderMap::new(),
            });
            events.push(Event::MessageComplete);
            self.phase = Phase::Finished;
        }
    }

    fn drive_chunked_body(&mut self, events: &mut Vec<Event>) -> Result<(), HttpDecodeError> {
        let Phase::BodyChunked(dec) = &mut self.phase else {
            unreachable!()
        };
        let input = self.pending.split().freeze();
        let out = dec.feed(&input, &self.config)?;
        if !out.data.is_empty() {
            events.push(Event::BodyData(out.data));
        }
        if out.complete {
            let Phase::BodyChunked(dec) = std::mem::replace(&mut self.phase, Phase::Finished)
            else {
                unreachable!()
            };
            let mut dec = dec;
            let leftover = dec.take_trailing_residual();
            self.pending.extend_from_slice(&leftover);
            events.push(Event::BodyComplete {
                trailers: out.trailers.unwrap_or_default(),
            });
            events.push(Event::MessageComplete);
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Upgrade)
    }

    fn is_message_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    fn take_trailing_bytes(&mut self) -> Bytes {
        self.pending.split().freeze()
    }
}

/// Decodes a single incoming HTTP/1.x request, start line through body.
///
/// Construct one decoder per message: once [`RequestDecoder::is_finished`]
/// returns `true`, recover any leftover bytes with
/// [`RequestDecoder::take_trailing_bytes`] and feed them into a fresh
/// decoder for the next pipelined request.
#[derive(Debug)]
pub struct RequestDecoder {
    inner: MessageDecoder,
}

impl RequestDecoder {
    /// Construct a new request decoder with the given limits.
    pub fn new(config: ParserConfig) -> Self {
        Self {
            inner: MessageDecoder::new(config, Role::Request),
        }
    }

    /// Feed newly received bytes, returning the events they complete.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Event>, HttpDecodeError> {
        self.inner.feed(data)
    }

    /// Signal that the connection has reached EOF before this request
    /// finished. Requests have no close-delimited body, so this only ever
    /// surfaces a [`crate::error::ErrorCode::BodyLengthMismatch`] error for a
    /// declared (fixed or chunked) body the client never completed; it is a
    /// no-op if the request had already finished.
    pub fn finish(&mut self) -> Result<Vec<Event>, HttpDecodeError> {
        self.inner.finish()
    }

    /// Whether the decoder will accept no further input (message complete).
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Whether the current message is complete (equivalent to
    /// [`RequestDecoder::is_finished`] for requests, which have no upgrade
    /// phase of their own).
    pub fn is_message_finished(&self) -> bool {
        self.inner.is_message_finished()
    }

    /// Bytes fed but not yet consumed by this message — the start of the
    /// next pipelined request, if any.
    pub fn take_trailing_bytes(&mut self) -> Bytes {
        self.inner.take_trailing_bytes()
    }
}

/// Decodes a single incoming HTTP/1.x response, start line through body.
///
/// Because response framing can depend on the corresponding request's
/// method (e.g. a response to `HEAD` never has a body regardless of its
/// headers), the caller must say whether that request was a `HEAD`.
#[derive(Debug)]
pub struct ResponseDecoder {
    inner: MessageDecoder,
}

impl ResponseDecoder {
    /// Construct a new response decoder with the given limits.
    ///
    /// `request_was_head` must reflect the method of the request this
    /// response answers.
    pub fn new(config: ParserConfig, request_was_head: bool) -> Self {
        Self {
            inner: MessageDecoder::new(
                config,
                Role::Response {
                    request_was_head,
                },
            ),
        }
    }

    /// Feed newly received bytes, returning the events they complete.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Event>, HttpDecodeError> {
        self.inner.feed(data)
    }

    /// Signal that the connection has reached EOF, finalizing a
    /// close-delimited body if one was in progress.
    pub fn finish(&mut self) -> Result<Vec<Event>, HttpDecodeError> {
        self.inner.finish()
    }

    /// Whether the decoder will accept no further input — `true` once the
    /// message is complete, or once an upgrade response has been seen (after
    /// which bytes are opaque to HTTP framing).
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Whether the current message is complete.
    pub fn is_message_finished(&self) -> bool {
        self.inner.is_message_finished()
    }

    /// Bytes fed but not yet consumed by this message.
    pub fn take_trailing_bytes(&mut self) -> Bytes {
        self.inner.take_trailing_bytes()
    }
}
