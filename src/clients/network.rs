//! The sockets the clients send and receive through.
//!
//! The clients never touch the operating system directly, they go through a
//! [`Network`]. [`TokioNetwork`] is the real one; tests can supply their own
//! to script what the "server" sends back.
use async_trait::async_trait;
use log::warn;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

/// Largest possible UDP payload, so oversized responses are seen in full.
const MAX_DATAGRAM_SIZE: usize = 65535;

/// A connectionless socket used for a single exchange.
#[async_trait]
pub trait DatagramSocket: Send {
    /// Sends `buf` as one datagram to `server`.
    async fn send(&mut self, buf: &[u8], server: SocketAddr, timeout: Duration) -> io::Result<()>;

    /// Waits for the next datagram from the server.
    async fn recv(&mut self, timeout: Duration) -> io::Result<Vec<u8>>;
}

/// A connected stream socket.
#[async_trait]
pub trait StreamSocket: Send {
    /// Writes all of `buf`.
    async fn write(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Reads exactly `count` bytes.
    async fn read(&mut self, count: usize) -> io::Result<Vec<u8>>;
}

/// Opens the sockets used by the clients.
#[async_trait]
pub trait Network: Send + Sync {
    type Datagram: DatagramSocket;
    type Stream: StreamSocket;

    /// Returns a new datagram socket suitable for talking to `server`.
    async fn bind(&self, server: SocketAddr) -> io::Result<Self::Datagram>;

    /// Connects a new stream to `server`.
    async fn connect(&self, server: SocketAddr, timeout: Duration) -> io::Result<Self::Stream>;
}

/// A [`Network`] backed by tokio's UDP and TCP sockets.
#[derive(Clone, Debug, Default)]
pub struct TokioNetwork {}

pub struct TokioDatagram {
    socket: UdpSocket,
    server: SocketAddr,
}

pub struct TokioStream {
    stream: TcpStream,
}

fn timed_out(what: &str, server: SocketAddr) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("timeout {} {}", what, server),
    )
}

#[async_trait]
impl Network for TokioNetwork {
    type Datagram = TokioDatagram;
    type Stream = TokioStream;

    async fn bind(&self, server: SocketAddr) -> io::Result<TokioDatagram> {
        // Bind to ephemeral port (0 = OS assigns)
        let bind_addr: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr).await?;
        Ok(TokioDatagram { socket, server })
    }

    async fn connect(&self, server: SocketAddr, timeout: Duration) -> io::Result<TokioStream> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect(server))
            .await
            .map_err(|_| timed_out("connecting to", server))??;

        // We send discrete messages, so we can send as soon as possible.
        stream.set_nodelay(true)?;

        Ok(TokioStream { stream })
    }
}

#[async_trait]
impl DatagramSocket for TokioDatagram {
    async fn send(&mut self, buf: &[u8], server: SocketAddr, timeout: Duration) -> io::Result<()> {
        self.server = server;

        tokio::time::timeout(timeout, self.socket.send_to(buf, server))
            .await
            .map_err(|_| timed_out("sending to", server))??;

        Ok(())
    }

    async fn recv(&mut self, timeout: Duration) -> io::Result<Vec<u8>> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut buf = vec![0; MAX_DATAGRAM_SIZE];

        loop {
            let (len, from) = tokio::time::timeout_at(deadline, self.socket.recv_from(&mut buf))
                .await
                .map_err(|_| timed_out("waiting for a response from", self.server))??;

            // Only accept datagrams from the server we sent to.
            if from != self.server {
                warn!(
                    "ignoring {} byte datagram from unexpected source {} (expected {})",
                    len, from, self.server
                );
                continue;
            }

            buf.truncate(len);
            return Ok(buf);
        }
    }
}

#[async_trait]
impl StreamSocket for TokioStream {
    async fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf).await
    }

    async fn read(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0; count];
        self.stream.read_exact(&mut buf).await?;
        Ok(buf)
    }
}
