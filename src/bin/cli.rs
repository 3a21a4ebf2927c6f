use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};
use tracing_subscriber::EnvFilter;

use wireframe::{
    decode_request, decode_response, format_request_debug, format_request_headers_only,
    format_request_json, format_response_debug, format_response_json, ParserConfig,
};

/// WireFrame CLI — strict HTTP/1.x message decoder.
///
/// Reads a raw HTTP request or response from a file, --raw string, or stdin
/// and outputs a structured representation in the chosen format.
///
/// Escape sequences (\r, \n, \t, \\) in the --raw value are interpreted so
/// you can pass a full HTTP message as a single shell argument.
#[derive(ClapParser)]
#[command(name = "wireframe-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a file containing a raw HTTP message.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw HTTP message string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Decode the input as a response rather than a request.
    #[arg(long)]
    response: bool,

    /// When decoding a response, treat it as answering a HEAD request
    /// (affects body framing). Ignored unless --response is set.
    #[arg(long)]
    head: bool,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Maximum cumulative header block size in bytes.
    #[arg(long, default_value = "16384")]
    max_header_bytes: usize,

    /// Maximum number of headers allowed.
    #[arg(long, default_value = "100")]
    max_headers: usize,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
    /// Start-line + headers only (requests only)
    Headers,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.file.is_none() && cli.raw.is_none() && std::io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let data = match read_input(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    if data.is_empty() {
        eprintln!("Error: empty input");
        process::exit(1);
    }

    let config = ParserConfig {
        max_header_bytes: cli.max_header_bytes,
        max_header_count: cli.max_headers,
        ..ParserConfig::default()
    };

    if cli.response {
        run_response(&cli, &data, config);
    } else {
        run_request(&cli, &data, config);
    }
}

fn run_request(cli: &Cli, data: &[u8], config: ParserConfig) {
    let request = match decode_request(data, config) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(code = %e.code, "failed to decode request");
            eprintln!("Decode error: {e}");
            process::exit(2);
        }
    };

    let output = match cli.format {
        OutputFormat::Json => format_request_json(&request, cli.pretty),
        OutputFormat::Debug => format_request_debug(&request),
        OutputFormat::Headers => format_request_headers_only(&request),
    };

    print!("{output}");
}

fn run_response(cli: &Cli, data: &[u8], config: ParserConfig) {
    let response = match decode_response(data, config, cli.head) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(code = %e.code, "failed to decode response");
            eprintln!("Decode error: {e}");
            process::exit(2);
        }
    };

    let output = match cli.format {
        OutputFormat::Json => format_response_json(&response, cli.pretty),
        OutputFormat::Debug | OutputFormat::Headers => format_response_debug(&response),
    };

    print!("{output}");
}

/// Read raw HTTP bytes from --raw, a file, or stdin.
fn read_input(cli: &Cli) -> Result<Vec<u8>, std::io::Error> {
    if let Some(raw) = &cli.raw {
        return Ok(unescape(raw).into_bytes());
    }
    match &cli.file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Expand C-style escape sequences (`\r`, `\n`, `\t`, `\\`) in a string.
///
/// Any other `\X` sequence is kept as-is (both the backslash and `X`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
