//! Listener — accept loop on the bind address, spawning one handler task
//! per connection (spec.md §4.10).

use tokio::net::{TcpListener, TcpSocket};

use crate::controller;
use crate::state::SharedState;

/// Generous accept backlog (spec.md §4.10: "≥ 128").
const BACKLOG: u32 = 1024;

/// Bind `(bind_host, port)` with `SO_REUSEADDR` enabled and run the
/// accept loop forever, spawning an independent task per connection.
pub async fn run(state: SharedState) -> std::io::Result<()> {
    let addr = format!("{}:{}", state.config.bind_host, state.config.host_port);
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let socket = if socket_addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(socket_addr)?;
    let listener = socket.listen(BACKLOG)?;

    tracing::info!(addr = %socket_addr, "gate listening");

    accept_loop(listener, state).await
}

async fn accept_loop(listener: TcpListener, state: SharedState) -> std::io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::debug!(peer = %peer, "accepted connection");
                let state = state.clone();
                tokio::spawn(async move {
                    controller::handle(state, stream).await;
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "accept failed, continuing");
            }
        }
    }
}
