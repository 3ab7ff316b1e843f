use crate::clients::network::{DatagramSocket, Network, TokioNetwork};
use crate::clients::stats::StatsBuilder;
use crate::clients::tcp::{to_servers, TcpClient};
use crate::clients::{wait, Exchanger};
use crate::dns::peek_header;
use crate::types::Protocol;
use crate::Error;
use crate::Message;
use crate::Result;
use async_trait::async_trait;
use log::{debug, warn};
use std::net::SocketAddr;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default largest response accepted over UDP, before retrying with TCP.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 4096;

/// A UDP DNS Client, that retries truncated responses over TCP.
///
/// # Example
///
/// ```rust,no_run
/// use dnsclient::clients::{Exchanger, UdpClient};
/// use dnsclient::Message;
/// use dnsclient::Type;
///
/// #[tokio::main]
/// async fn main() -> Result<(), dnsclient::Error> {
///     let query = Message::query(0xbeef, "bramp.net", Type::A)?;
///
///     let response = UdpClient::new("8.8.8.8:53")?
///        .exchange(&query)
///        .await?;
///
///     println!("{}", response);
///     Ok(())
/// }
/// ```
///
/// Queries go to the first server. A timeout is not retried, that is left to
/// the caller.
///
/// See <https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.1>
pub struct UdpClient<N = TokioNetwork> {
    servers: Vec<SocketAddr>,
    network: Arc<N>,

    timeout: Duration,
    max_payload_size: usize,
    cancel: CancellationToken,

    tcp: TcpClient<N>,
}

/// The stages of a single exchange.
///
/// ```text
/// Idle -> SentUdp -> Completed
///                 -> Truncated -> Completed | Failed
///                 -> Failed
/// ```
///
/// Leaving `Truncated` makes the whole TCP exchange, so there is no separate
/// state for it.
enum ExchangeState<S> {
    Idle,
    SentUdp {
        socket: S,
        server: SocketAddr,
        deadline: Instant,
        stats: StatsBuilder,
    },
    Truncated,
    Completed(Message),
    Failed(Error),
}

impl UdpClient {
    /// Creates a new UdpClient bound to the specific servers.
    ///
    /// # Errors
    ///
    /// Fails if the servers can't be resolved to socket addresses, or there
    /// are none.
    pub fn new<A: ToSocketAddrs>(servers: A) -> Result<Self> {
        Self::new_with_network(servers, TokioNetwork::default())
    }
}

impl<N: Network> UdpClient<N> {
    /// Creates a new UdpClient that sends (and falls back to TCP) through `network`.
    pub fn new_with_network<A: ToSocketAddrs>(servers: A, network: N) -> Result<Self> {
        let servers = to_servers(servers)?;
        let network = Arc::new(network);

        Ok(UdpClient {
            tcp: TcpClient::from_parts(servers.clone(), network.clone()),

            servers,
            network,

            timeout: Duration::new(5, 0),
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            cancel: CancellationToken::new(),
        })
    }

    /// How long to wait for a response, over UDP and over TCP.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.tcp = self.tcp.with_timeout(timeout);
        self
    }

    /// How long to wait for the TCP connection, if one is needed.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.tcp = self.tcp.with_connect_timeout(timeout);
        self
    }

    /// Largest query or response sent over UDP. Anything bigger goes over TCP.
    pub fn with_max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Ends any in-flight exchange with [`Error::Cancelled`] once `cancel` is
    /// cancelled.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.tcp = self.tcp.with_cancellation(cancel.clone());
        self.cancel = cancel;
        self
    }

    async fn step(
        &self,
        state: ExchangeState<N::Datagram>,
        id: u16,
        req: &[u8],
    ) -> ExchangeState<N::Datagram> {
        match state {
            ExchangeState::Idle => {
                if req.len() > self.max_payload_size {
                    debug!(
                        "{} byte query {:#06x} is too large for UDP, using TCP",
                        req.len(),
                        id
                    );
                    return ExchangeState::Truncated;
                }

                self.send(id, req)
                    .await
                    .unwrap_or_else(ExchangeState::Failed)
            }

            ExchangeState::SentUdp {
                mut socket,
                server,
                deadline,
                stats,
            } => match self.receive(&mut socket, id, deadline).await {
                Ok(None) => ExchangeState::Truncated,
                Ok(Some(buf)) => match Message::from_slice(&buf) {
                    Ok(mut resp) => {
                        resp.stats = Some(stats.end(server, Protocol::Udp, buf.len()));
                        ExchangeState::Completed(resp)
                    }
                    Err(e) => ExchangeState::Failed(e),
                },
                Err(e) => ExchangeState::Failed(e),
            },

            ExchangeState::Truncated => match self.tcp.exchange_bytes(id, req).await {
                Ok(resp) => ExchangeState::Completed(resp),
                Err(e) => ExchangeState::Failed(e),
            },

            done @ ExchangeState::Completed(_) | done @ ExchangeState::Failed(_) => done,
        }
    }

    async fn send(&self, id: u16, req: &[u8]) -> Result<ExchangeState<N::Datagram>> {
        let server = self.servers[0];
        let deadline = Instant::now() + self.timeout;

        let mut socket = wait(self.network.bind(server), deadline, &self.cancel).await?;

        debug!("sending {} byte query {:#06x} to {} over UDP", req.len(), id, server);
        let stats = StatsBuilder::start(req.len());
        wait(socket.send(req, server, self.timeout), deadline, &self.cancel).await?;

        Ok(ExchangeState::SentUdp {
            socket,
            server,
            deadline,
            stats,
        })
    }

    /// Waits for the datagram answering `id`. Returns None if the answer
    /// needs to be fetched again over TCP.
    async fn receive(
        &self,
        socket: &mut N::Datagram,
        id: u16,
        deadline: Instant,
    ) -> Result<Option<Vec<u8>>> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let buf = wait(socket.recv(remaining), deadline, &self.cancel).await?;

            match peek_header(&buf) {
                None => warn!("discarding {} byte datagram, too short for a header", buf.len()),

                Some((resp_id, _)) if resp_id != id => warn!(
                    "discarding response with id {:#06x}, expected {:#06x}",
                    resp_id, id
                ),

                Some((_, true)) => {
                    debug!("response {:#06x} is truncated, retrying over TCP", id);
                    return Ok(None);
                }

                Some(_) if buf.len() > self.max_payload_size => {
                    debug!(
                        "{} byte response {:#06x} is larger than {}, retrying over TCP",
                        buf.len(),
                        id,
                        self.max_payload_size
                    );
                    return Ok(None);
                }

                Some(_) => return Ok(Some(buf)),
            }
        }
    }
}

#[async_trait]
impl<N: Network> Exchanger for UdpClient<N> {
    /// Sends the query [`Message`] to the first server via UDP, falling back
    /// to TCP if needed, and returns the result.
    async fn exchange(&self, query: &Message) -> Result<Message> {
        let req = query.to_vec()?;

        let mut state = ExchangeState::Idle;
        loop {
            state = match self.step(state, query.id, &req).await {
                ExchangeState::Completed(resp) => return Ok(resp),
                ExchangeState::Failed(e) => return Err(e),
                next => next,
            };
        }
    }
}
