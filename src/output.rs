//! Human- and machine-readable rendering of decoded messages, used by the
//! CLI tool.

use crate::message::{DecodedRequest, DecodedResponse};

/// Serialize a [`DecodedRequest`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_request_json(request: &DecodedRequest, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(request).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(request).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render a [`DecodedRequest`] in a human-readable debug format.
pub fn format_request_debug(request: &DecodedRequest) -> String {
    let mut out = String::with_capacity(256);

    out.push_str("=== HTTP Request ===\n");
    out.push_str(&format!("Method:  {}\n", request.method));
    out.push_str(&format!("Target:  {}\n", request.target));
    out.push_str(&format!("Version: {}\n", request.version));

    out.push_str(&format!("\n--- Headers ({}) ---\n", request.headers.len()));
    for header in &request.headers {
        out.push_str(&format!("  {}: {}\n", header.name, header.value));
    }

    render_body(&mut out, &request.body);
    out.push_str("====================\n");
    out
}

/// Render only the request line and headers (no body).
pub fn format_request_headers_only(request: &DecodedRequest) -> String {
    let mut out = String::with_capacity(64 + request.headers.len() * 40);

    out.push_str(&format!(
        "{} {} {}\n",
        request.method, request.target, request.version
    ));

    for header in &request.headers {
        out.push_str(&format!("{}: {}\n", header.name, header.value));
    }

    out
}

/// Serialize a [`DecodedResponse`] to a JSON string.
pub fn format_response_json(response: &DecodedResponse, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(response)
            .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(response).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render a [`DecodedResponse`] in a human-readable debug format.
pub fn format_response_debug(response: &DecodedResponse) -> String {
    let mut out = String::with_capacity(256);

    out.push_str("=== HTTP Response ===\n");
    out.push_str(&format!("Version: {}\n", response.version));
    out.push_str(&format!("Status:  {} {}\n", response.status, response.reason));

    out.push_str(&format!("\n--- Headers ({}) ---\n", response.headers.len()));
    for header in &response.headers {
        out.push_str(&format!("  {}: {}\n", header.name, header.value));
    }

    render_body(&mut out, &response.body);
    out.push_str("=====================\n");
    out
}

fn render_body(out: &mut String, body: &[u8]) {
    if body.is_empty() {
        out.push_str("\n--- No Body ---\n");
        return;
    }
    out.push_str(&format!("\n--- Body ({} bytes) ---\n", body.len()));
    match std::str::from_utf8(body) {
        Ok(s) => out.push_str(s),
        Err(_) => out.push_str(&format!("<binary data: {} bytes>", body.len())),
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::message::decode_request;

    #[test]
    fn formats_headers_only() {
        let req = decode_request(
            b"GET /x HTTP/1.1\r\nHost: h\r\n\r\n",
            ParserConfig::default(),
        )
        .unwrap();
        let rendered = format_request_headers_only(&req);
        assert_eq!(rendered, "GET /x HTTP/1.1\nHost: h\n");
    }

    #[test]
    fn formats_json() {
        let req = decode_request(
            b"GET /x HTTP/1.1\r\nHost: h\r\n\r\n",
            ParserConfig::default(),
        )
        .unwrap();
        let rendered = format_request_json(&req, false);
        assert!(rendered.contains("\"method\":\"GET\""));
    }

    #[test]
    fn formats_debug_with_no_body() {
        let req = decode_request(b"GET / HTTP/1.1\r\n\r\n", ParserConfig::default()).unwrap();
        assert!(format_request_debug(&req).contains("No Body"));
    }
}
