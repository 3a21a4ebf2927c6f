use wireframe::{decode_request, decode_response, Event, ParserConfig, RequestDecoder};

#[test]
fn decodes_a_simple_get_request() {
    let req = decode_request(
        b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n",
        ParserConfig::default(),
    )
    .expect("should decode");
    assert_eq!(req.method, "GET");
    assert_eq!(req.target, "/index.html");
    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.headers.len(), 1);
    assert_eq!(req.headers[0].name, "Host");
    assert_eq!(req.headers[0].value, "example.com");
    assert!(req.body.is_empty());
}

#[test]
fn decodes_get_with_query_string() {
    let req = decode_request(
        b"GET /api/users?page=1&limit=10 HTTP/1.1\r\nHost: api.example.com\r\nAccept: application/json\r\n\r\n",
        ParserConfig::default(),
    )
    .expect("should decode");
    assert_eq!(req.target, "/api/users?page=1&limit=10");
    assert_eq!(req.headers[1].value, "application/json");
}

#[test]
fn decodes_http_10_version() {
    let req = decode_request(
        b"GET /legacy HTTP/1.0\r\nHost: old.example.com\r\n\r\n",
        ParserConfig::default(),
    )
    .unwrap();
    assert_eq!(req.version, "HTTP/1.0");
}

#[test]
fn decodes_a_fixed_length_post_body() {
    let req = decode_request(
        b"POST /submit HTTP/1.1\r\nContent-Length: 13\r\n\r\nHello, world!",
        ParserConfig::default(),
    )
    .unwrap();
    assert_eq!(&req.body[..], b"Hello, world!");
}

#[test]
fn decodes_a_chunked_post_body_with_trailer() {
    let req = decode_request(
        b"POST /upload HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n\
4\r\nWiki\r\n5\r\npedia\r\n0\r\nX-Digest: deadbeef\r\n\r\n",
        ParserConfig::default(),
    )
    .unwrap();
    assert_eq!(&req.body[..], b"Wikipedia");
}

#[test]
fn request_arriving_one_byte_at_a_time_decodes_identically() {
    let whole = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
    let mut decoder = RequestDecoder::new(ParserConfig::default());
    let mut body = Vec::new();
    for byte in whole {
        let events = decoder.feed(&[*byte]).unwrap();
        for event in events {
            if let Event::BodyData(data) = event {
                body.extend_from_slice(&data);
            }
        }
    }
    assert!(decoder.is_finished());
    assert_eq!(body, b"hello");
}

#[test]
fn request_split_at_every_possible_boundary_decodes_identically() {
    let whole: &[u8] = b"GET /p HTTP/1.1\r\nHost: h\r\nX-A: 1\r\n\r\n";
    for split_at in 0..=whole.len() {
        let (first, second) = whole.split_at(split_at);
        let mut decoder = RequestDecoder::new(ParserConfig::default());
        let mut events = decoder.feed(first).unwrap();
        if !decoder.is_finished() {
            events.extend(decoder.feed(second).unwrap());
        }
        assert!(
            decoder.is_finished(),
            "failed to finish with split at {split_at}"
        );
        assert!(events.iter().any(|e| matches!(e, Event::MessageComplete)));
    }
}

#[test]
fn pipelined_requests_are_decoded_one_at_a_time() {
    let mut decoder = RequestDecoder::new(ParserConfig::default());
    decoder
        .feed(b"GET /first HTTP/1.1\r\n\r\nGET /second HTTP/1.1\r\n\r\n")
        .unwrap();
    assert!(decoder.is_finished());
    let leftover = decoder.take_trailing_bytes();

    let mut next = RequestDecoder::new(ParserConfig::default());
    let events = next.feed(&leftover).unwrap();
    assert!(next.is_finished());
    let start = events
        .into_iter()
        .find_map(|e| match e {
            wireframe::Event::StartLineParsed(wireframe::StartLine::Request(rl)) => {
                Some(rl.path.to_vec())
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(start, b"/second");
}

#[test]
fn rejects_a_request_missing_a_host_colon() {
    let err = decode_request(b"GET / HTTP/1.1\r\nHostexample.com\r\n\r\n", ParserConfig::default())
        .unwrap_err();
    assert_eq!(err.code, wireframe::ErrorCode::InvalidHeader);
}

#[test]
fn rejects_conflicting_content_length_and_transfer_encoding() {
    let err = decode_request(
        b"POST / HTTP/1.1\r\nContent-Length: 3\r\nTransfer-Encoding: chunked\r\n\r\nabc",
        ParserConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.code, wireframe::ErrorCode::InvalidSyntax);
}

#[test]
fn enforces_header_count_limit() {
    let config = ParserConfig {
        max_header_count: 2,
        ..ParserConfig::default()
    };
    let err = decode_request(
        b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n",
        config,
    )
    .unwrap_err();
    assert_eq!(err.code, wireframe::ErrorCode::HeaderTooMany);
}

#[test]
fn decodes_a_response_with_a_fixed_length_body() {
    let resp = decode_response(
        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK",
        ParserConfig::default(),
        false,
    )
    .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.reason, "OK");
    assert_eq!(&resp.body[..], b"OK");
}

#[test]
fn decodes_a_204_response_with_no_body() {
    let resp = decode_response(
        b"HTTP/1.1 204 No Content\r\n\r\n",
        ParserConfig::default(),
        false,
    )
    .unwrap();
    assert!(resp.body.is_empty());
}

#[test]
fn decodes_a_head_response_ignoring_content_length() {
    let resp = decode_response(
        b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n",
        ParserConfig::default(),
        true,
    )
    .unwrap();
    assert!(resp.body.is_empty());
}
