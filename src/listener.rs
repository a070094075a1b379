//! Single-client command listener.
//!
//! One connection is accepted, read, dispatched, answered and closed before
//! the next `accept`. Reads and writes carry no timeout, so a silent client
//! stalls the loop until it hangs up.

use crate::{
    constants::*,
    controller::ServoController,
    error::ControlError,
    pwm::PwmPin,
    types::Command,
};
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, info, warn};

/// The static control page served on every response.
pub const PAGE: &str = include_str!("page.html");

/// What happened to one accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// The client sent nothing; the connection was dropped without a response.
    Abandoned,
    /// A request was parsed and answered. Carries the parsed command.
    Responded(Command),
}

pub struct CommandListener {
    listener: TcpListener,
}

impl CommandListener {
    pub async fn bind(addr: SocketAddr) -> Result<Self, ControlError> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(LISTEN_BACKLOG)?;
        info!(address = %listener.local_addr()?, "Server listening");
        Ok(CommandListener { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ControlError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves connections forever. Per-connection faults are logged and skipped.
    pub async fn serve<P: PwmPin>(&self, servo: &mut ServoController<P>) -> Infallible {
        loop {
            if let Err(e) = self.serve_next(servo).await {
                warn!(error = %e, "Error in serve loop");
            }
        }
    }

    /// Accepts and fully handles the next connection.
    pub async fn serve_next<P: PwmPin>(&self, servo: &mut ServoController<P>) -> Result<Served, ControlError> {
        let (mut stream, peer) = self.listener.accept().await?;
        debug!(%peer, "Client connected");
        // `stream` is dropped, and the connection closed, on every path out.
        let served = handle_connection(&mut stream, servo).await?;
        if let Served::Responded(_) = served {
            stream.shutdown().await?;
        }
        Ok(served)
    }
}

async fn handle_connection<P: PwmPin>(
    stream: &mut TcpStream,
    servo: &mut ServoController<P>,
) -> Result<Served, ControlError> {
    let mut buf = [0u8; REQUEST_BUFFER_SIZE];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        return Ok(Served::Abandoned);
    }

    let request = String::from_utf8_lossy(&buf[..n]);
    debug!(request = %request.lines().next().unwrap_or_default(), "Request");

    let command = Command::parse(&request);
    if let Err(e) = crate::dispatch::dispatch(&command, servo) {
        warn!(?command, error = %e, "Command rejected");
    }

    stream.write_all(RESPONSE_HEADER.as_bytes()).await?;
    stream.write_all(PAGE.as_bytes()).await?;
    Ok(Served::Responded(command))
}
