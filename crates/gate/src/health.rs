//! Health Prober — polls a backend's health endpoint until a success
//! within a deadline (spec.md §4.2).
//!
//! Hand-rolled HTTP/1.0 GET over a raw `TcpStream`: no HTTP client
//! dependency, same "raw TCP + manual HTTP" idiom used elsewhere in this
//! ecosystem for lightweight liveness probes.

use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Per-probe connect+request timeout (spec.md §5).
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);
/// Delay between probe attempts (spec.md §4.2).
const PROBE_INTERVAL: Duration = Duration::from_millis(50);

/// Poll `127.0.0.1:<port><health_path>` every ~50ms until a 2xx response
/// arrives or `deadline` elapses. Any connection error or non-2xx is
/// retried silently.
pub async fn wait_healthy(port: u16, health_path: &str, deadline: Duration) -> bool {
    let start = Instant::now();
    loop {
        if probe_once(port, health_path).await {
            return true;
        }
        if start.elapsed() >= deadline {
            return false;
        }
        tokio::time::sleep(PROBE_INTERVAL).await;
    }
}

async fn probe_once(port: u16, health_path: &str) -> bool {
    match timeout(PROBE_TIMEOUT, probe(port, health_path)).await {
        Ok(Ok(status)) => (200..300).contains(&status),
        _ => false,
    }
}

async fn probe(port: u16, health_path: &str) -> std::io::Result<u16> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await?;
    let request = format!(
        "GET {health_path} HTTP/1.0\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await?;

    let mut buf = Vec::with_capacity(256);
    let mut chunk = [0u8; 256];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(2).any(|w| w == b"\r\n") || buf.len() >= 12 {
            break;
        }
    }

    parse_status_line(&buf).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "no status line")
    })
}

fn parse_status_line(buf: &[u8]) -> Option<u16> {
    let line_end = buf.windows(2).position(|w| w == b"\r\n")?;
    let line = std::str::from_utf8(&buf[..line_end]).ok()?;
    // "HTTP/1.1 200 OK" -> take the middle field.
    let code_str = line.split_whitespace().nth(1)?;
    code_str.parse().ok()
}
