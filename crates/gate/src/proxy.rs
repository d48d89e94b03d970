//! Stream Proxy — bidirectional byte forwarding between the client and a
//! backend socket (spec.md §4.8). HTTP-oblivious: no status parsing, no
//! Content-Length accounting.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::GateError;
use crate::runtime::BACKEND_DIAL_TIMEOUT;

/// Dial the backend and run the proxy until both directions finish.
/// Since classification only peeked the request, the client socket still
/// holds its full, unconsumed byte stream — the first client->backend
/// read here picks it back up from the beginning.
pub async fn proxy(mut client: TcpStream, port: u16) -> Result<(), GateError> {
    let mut backend = timeout(BACKEND_DIAL_TIMEOUT, TcpStream::connect(("127.0.0.1", port)))
        .await
        .map_err(|_| GateError::BadGateway("connect timed out".to_string()))?
        .map_err(|e| GateError::BadGateway(e.to_string()))?;

    let (mut client_r, mut client_w) = client.split();
    let (mut backend_r, mut backend_w) = backend.split();

    let client_to_backend = pump(&mut client_r, &mut backend_w);
    let backend_to_client = pump(&mut backend_r, &mut client_w);

    tokio::join!(client_to_backend, backend_to_client);
    Ok(())
}

/// Copy bytes from `src` to `dst` until EOF or error, then half-shutdown
/// `dst`'s write side — mandatory for HTTP request/response framing to
/// survive backends that rely on FIN to end a response.
async fn pump<R, W>(src: &mut R, dst: &mut W)
where
    R: tokio::io::AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match src.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        if dst.write_all(&buf[..n]).await.is_err() {
            break;
        }
    }
    let _ = dst.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn proxy_forwards_bytes_both_ways() {
        let backend_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let backend_port = backend_listener.local_addr().unwrap().port();

        let backend_task = tokio::spawn(async move {
            let (mut sock, _) = backend_listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let n = sock.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"ping");
            sock.write_all(b"pong").await.unwrap();
            sock.shutdown().await.unwrap();
        });

        let client_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client_addr = client_listener.local_addr().unwrap();

        let server_side = tokio::spawn(async move {
            let (sock, _) = client_listener.accept().await.unwrap();
            proxy(sock, backend_port).await.unwrap();
        });

        let mut client_sock = TcpStream::connect(client_addr).await.unwrap();
        client_sock.write_all(b"ping").await.unwrap();
        client_sock.shutdown().await.unwrap();

        let mut response = Vec::new();
        client_sock.read_to_end(&mut response).await.unwrap();
        assert_eq!(response, b"pong");

        backend_task.await.unwrap();
        server_side.await.unwrap();
    }

    #[tokio::test]
    async fn proxy_returns_bad_gateway_when_backend_missing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client_addr = client_listener.local_addr().unwrap();
        let accept_task = tokio::spawn(async move { client_listener.accept().await.unwrap().0 });
        let _client_sock = TcpStream::connect(client_addr).await.unwrap();
        let accepted = accept_task.await.unwrap();

        let result = proxy(accepted, port).await;
        assert!(matches!(result, Err(GateError::BadGateway(_))));
    }
}
