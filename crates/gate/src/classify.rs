//! Request Classifier — peeks the request head without consuming it,
//! extracts (method, path), and enforces the optional shared secret
//! (spec.md §4.6).

use tokio::net::TcpStream;
use tokio::time::{sleep, Duration};

use crate::error::GateError;

/// Upper bound on how much of the request head we peek at (spec.md §4.6).
const PEEK_CAP: usize = 64 * 1024;
/// Short backoff between peek attempts when the socket hasn't delivered
/// a full head yet, mirroring `original_source/gate.py::_readall`'s
/// single retry-after-sleep shape, generalized into a bounded loop.
const PEEK_RETRY_DELAY: Duration = Duration::from_millis(10);
const PEEK_MAX_ATTEMPTS: usize = 20;

pub struct Classified {
    pub method: String,
    pub path: String,
}

/// Peek the socket (non-destructively) until a full header section is
/// available or we decide no more is coming, parse the request line,
/// and — if `api_key` is set — require a matching `X-API-Key` header.
///
/// The underlying `TcpStream::peek` never removes bytes from the kernel
/// receive buffer, so the Stream Proxy's first read sees the same bytes
/// again: nothing needs to be replayed by hand.
pub async fn classify(stream: &TcpStream, api_key: Option<&str>) -> Result<Classified, GateError> {
    let peeked = peek_head(stream, api_key.is_some()).await;

    let (method, path) = parse_request_line(&peeked).ok_or(GateError::BadRequest)?;

    if let Some(expected) = api_key {
        if !has_valid_api_key(&peeked, expected) {
            return Err(GateError::Unauthorized);
        }
    }

    Ok(Classified { method, path })
}

/// Peek up to `PEEK_CAP` bytes, retrying briefly if nothing is available
/// yet. When a secret check is required, keeps peeking until a full
/// header section (`\r\n\r\n`) is present or attempts are exhausted,
/// since the secret header might arrive in a later read.
async fn peek_head(stream: &TcpStream, need_full_headers: bool) -> Vec<u8> {
    let mut buf = vec![0u8; PEEK_CAP];
    let mut last = Vec::new();

    for _ in 0..PEEK_MAX_ATTEMPTS {
        match stream.peek(&mut buf).await {
            Ok(0) => {
                sleep(PEEK_RETRY_DELAY).await;
                continue;
            }
            Ok(n) => {
                last = buf[..n].to_vec();
                let have_request_line = last.windows(2).any(|w| w == b"\r\n");
                let have_full_headers = find_headers_end(&last).is_some();
                if have_full_headers || (have_request_line && !need_full_headers) {
                    break;
                }
            }
            Err(_) => break,
        }
        sleep(PEEK_RETRY_DELAY).await;
    }

    last
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Parse the HTTP request line (`METHOD SP target SP version CRLF`).
/// `path` is taken verbatim — no query-string stripping, no
/// normalization (spec.md §4.6).
pub fn parse_request_line(peek: &[u8]) -> Option<(String, String)> {
    let line_end = peek.windows(2).position(|w| w == b"\r\n")?;
    let line = std::str::from_utf8(&peek[..line_end]).ok()?;
    let mut parts = line.split(' ');
    let method = parts.next()?.to_uppercase();
    let path = parts.next()?.to_string();
    if method.is_empty() || path.is_empty() {
        return None;
    }
    Some((method, path))
}

/// Check for `X-API-Key: <secret>`, tolerating the space-less form
/// (spec.md §4.6, §8 boundary case).
fn has_valid_api_key(peek: &[u8], expected: &str) -> bool {
    let Some(end) = find_headers_end(peek) else {
        return false;
    };
    let Ok(head) = std::str::from_utf8(&peek[..end]) else {
        return false;
    };
    let with_space = format!("X-API-Key: {expected}");
    let without_space = format!("X-API-Key:{expected}");
    head.lines()
        .any(|l| l.eq_ignore_ascii_case(&with_space) || l.eq_ignore_ascii_case(&without_space))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_request_line() {
        let peek = b"POST /asr HTTP/1.1\r\nHost: x\r\n\r\n";
        let (method, path) = parse_request_line(peek).unwrap();
        assert_eq!(method, "POST");
        assert_eq!(path, "/asr");
    }

    #[test]
    fn method_is_uppercased() {
        let peek = b"post /asr HTTP/1.1\r\n\r\n";
        let (method, _) = parse_request_line(peek).unwrap();
        assert_eq!(method, "POST");
    }

    #[test]
    fn path_is_taken_verbatim_with_query_string() {
        let peek = b"GET /asr?x=1 HTTP/1.1\r\n\r\n";
        let (_, path) = parse_request_line(peek).unwrap();
        assert_eq!(path, "/asr?x=1");
    }

    #[test]
    fn malformed_request_line_returns_none() {
        assert!(parse_request_line(b"garbage\r\n\r\n").is_none());
        assert!(parse_request_line(b"").is_none());
    }

    #[test]
    fn api_key_with_space_accepted() {
        let peek = b"POST /asr HTTP/1.1\r\nX-API-Key: abc\r\n\r\n";
        assert!(has_valid_api_key(peek, "abc"));
    }

    #[test]
    fn api_key_without_space_accepted() {
        let peek = b"POST /asr HTTP/1.1\r\nX-API-Key:abc\r\n\r\n";
        assert!(has_valid_api_key(peek, "abc"));
    }

    #[test]
    fn missing_api_key_rejected() {
        let peek = b"POST /asr HTTP/1.1\r\nHost: x\r\n\r\n";
        assert!(!has_valid_api_key(peek, "abc"));
    }

    #[test]
    fn wrong_api_key_rejected() {
        let peek = b"POST /asr HTTP/1.1\r\nX-API-Key: wrong\r\n\r\n";
        assert!(!has_valid_api_key(peek, "abc"));
    }

    #[test]
    fn incomplete_header_section_rejected() {
        let peek = b"POST /asr HTTP/1.1\r\nX-API-Key: abc";
        assert!(!has_valid_api_key(peek, "abc"));
    }
}
