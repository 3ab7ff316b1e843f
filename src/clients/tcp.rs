use crate::bail;
use crate::clients::network::{Network, StreamSocket, TokioNetwork};
use crate::clients::stats::StatsBuilder;
use crate::clients::{wait, Exchanger};
use crate::dns::peek_header;
use crate::types::Protocol;
use crate::Error;
use crate::Message;
use crate::Result;
use async_trait::async_trait;
use log::{debug, warn};
use std::convert::TryFrom;
use std::io;
use std::net::SocketAddr;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A TCP DNS Client.
///
/// Each exchange opens a new connection to the first server, writes the
/// query with a two byte length prefix, and reads length prefixed responses
/// until one with a matching id arrives.
///
/// # Example
///
/// ```rust,no_run
/// use dnsclient::clients::{Exchanger, TcpClient};
/// use dnsclient::Message;
/// use dnsclient::Type;
///
/// #[tokio::main]
/// async fn main() -> Result<(), dnsclient::Error> {
///     let query = Message::query(0xbeef, "bramp.net", Type::A)?;
///
///     let response = TcpClient::new("8.8.8.8:53")?
///        .exchange(&query)
///        .await?;
///
///     println!("{}", response);
///     Ok(())
/// }
/// ```
///
/// See <https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.2>
pub struct TcpClient<N = TokioNetwork> {
    servers: Vec<SocketAddr>,
    network: Arc<N>,

    connect_timeout: Duration,
    timeout: Duration,
    cancel: CancellationToken,
}

impl TcpClient {
    /// Creates a new TcpClient bound to the specific servers.
    ///
    /// # Errors
    ///
    /// Fails if the servers can't be resolved to socket addresses, or there
    /// are none.
    pub fn new<A: ToSocketAddrs>(servers: A) -> Result<Self> {
        Self::new_with_network(servers, TokioNetwork::default())
    }
}

impl<N: Network> TcpClient<N> {
    /// Creates a new TcpClient that connects through `network`.
    pub fn new_with_network<A: ToSocketAddrs>(servers: A, network: N) -> Result<Self> {
        Ok(Self::from_parts(to_servers(servers)?, Arc::new(network)))
    }

    pub(crate) fn from_parts(servers: Vec<SocketAddr>, network: Arc<N>) -> Self {
        TcpClient {
            servers,
            network,

            connect_timeout: Duration::new(5, 0),
            timeout: Duration::new(5, 0),
            cancel: CancellationToken::new(),
        }
    }

    /// How long to wait for the connection to be established.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// How long to wait for the response, once connected.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ends any in-flight exchange with [`Error::Cancelled`] once `cancel` is
    /// cancelled.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sends an already encoded query, and returns the response whose id is `id`.
    pub(crate) async fn exchange_bytes(&self, id: u16, req: &[u8]) -> Result<Message> {
        let server = self.servers[0];

        // Two byte length prefix followed by the message, sent as one write.
        let len = match u16::try_from(req.len()) {
            Ok(len) => len,
            Err(_) => bail!(Format, "query is too long for TCP ({} bytes)", req.len()),
        };
        let mut frame = Vec::with_capacity(2 + req.len());
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(req);

        let connect_deadline = Instant::now() + self.connect_timeout;
        let mut stream = wait(
            self.network.connect(server, self.connect_timeout),
            connect_deadline,
            &self.cancel,
        )
        .await?;

        let deadline = Instant::now() + self.timeout;
        let stats = StatsBuilder::start(req.len());

        debug!("sending {} byte query {:#06x} to {} over TCP", req.len(), id, server);
        wait(stream.write(&frame), deadline, &self.cancel).await?;

        loop {
            let prefix = self.read_exact(&mut stream, 2, deadline).await?;
            let len = u16::from_be_bytes([prefix[0], prefix[1]]);
            let buf = self.read_exact(&mut stream, len.into(), deadline).await?;

            match peek_header(&buf) {
                Some((resp_id, _)) if resp_id == id => {
                    let mut resp = Message::from_slice(&buf)?;
                    resp.stats = Some(stats.end(server, Protocol::Tcp, buf.len()));
                    return Ok(resp);
                }
                Some((resp_id, _)) => warn!(
                    "discarding TCP response from {} with id {:#06x}, expected {:#06x}",
                    server, resp_id, id
                ),
                None => bail!(Malformed, "{} byte TCP response is too short", buf.len()),
            }
        }
    }

    async fn read_exact(
        &self,
        stream: &mut N::Stream,
        count: usize,
        deadline: Instant,
    ) -> Result<Vec<u8>> {
        let buf = wait(stream.read(count), deadline, &self.cancel).await?;
        if buf.len() != count {
            return Err(Error::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short read, wanted {} bytes got {}", count, buf.len()),
            )));
        }

        Ok(buf)
    }
}

#[async_trait]
impl<N: Network> Exchanger for TcpClient<N> {
    /// Sends the query [`Message`] to the first server via TCP and returns the result.
    async fn exchange(&self, query: &Message) -> Result<Message> {
        let req = query.to_vec()?;
        self.exchange_bytes(query.id, &req).await
    }
}

pub(crate) fn to_servers<A: ToSocketAddrs>(servers: A) -> Result<Vec<SocketAddr>> {
    let servers: Vec<SocketAddr> = servers.to_socket_addrs()?.collect();
    if servers.is_empty() {
        bail!(Format, "no server addresses given");
    }

    Ok(servers)
}
