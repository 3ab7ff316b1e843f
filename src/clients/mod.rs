//! DNS clients, and a [`Resolver`] built on top of them.
use crate::Error;
use crate::Message;
use crate::Result;
use async_trait::async_trait;
use std::future::Future;
use std::io;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub use self::ids::{IdGenerator, RandomIds, SequentialIds};
pub use self::network::{DatagramSocket, Network, StreamSocket, TokioNetwork};
pub use self::tcp::TcpClient;

cfg_feature! {
    #![feature = "udp"]
    pub use self::resolver::Resolver;
    pub use self::udp::UdpClient;

    mod resolver;
    mod udp;
}

mod ids;
pub mod network;
mod stats;
mod tcp;

pub const GOOGLE_IPV4_PRIMARY: &str = "8.8.8.8:53";
pub const GOOGLE_IPV4_SECONDARY: &str = "8.8.4.4:53";
pub const GOOGLE_IPV6_PRIMARY: &str = "[2001:4860:4860::8888]:53";
pub const GOOGLE_IPV6_SECONDARY: &str = "[2001:4860:4860::8844]:53";

pub const GOOGLE: [&str; 4] = [
    GOOGLE_IPV4_PRIMARY,
    GOOGLE_IPV4_SECONDARY,
    GOOGLE_IPV6_PRIMARY,
    GOOGLE_IPV6_SECONDARY,
];

/// Exchanger takes a query and returns the matching response.
///
/// Implementations only return a response whose id matches the query's.
/// They do not retry on timeouts, that is left to the caller.
#[async_trait]
pub trait Exchanger: Send + Sync {
    async fn exchange(&self, query: &Message) -> Result<Message>;
}

/// Waits for `fut` until `deadline`, or until `cancel` is triggered.
///
/// I/O errors are converted with `Error::from`, so a socket level timeout is
/// reported the same as the deadline passing.
pub(crate) async fn wait<F, T>(fut: F, deadline: Instant, cancel: &CancellationToken) -> Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = tokio::time::timeout_at(deadline, fut) => match res {
            Ok(res) => res.map_err(Error::from),
            Err(_) => Err(Error::TimedOut),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait() {
        let cancel = CancellationToken::new();
        let soon = Instant::now() + Duration::from_millis(20);

        let got = wait(async { Ok(1) }, soon, &cancel).await;
        assert!(matches!(got, Ok(1)));

        let never = std::future::pending::<io::Result<()>>();
        assert!(matches!(wait(never, soon, &cancel).await, Err(Error::TimedOut)));

        let refused = async { Err::<(), _>(io::Error::from(io::ErrorKind::ConnectionRefused)) };
        assert!(matches!(wait(refused, soon, &cancel).await, Err(Error::Transport(_))));

        cancel.cancel();
        let later = Instant::now() + Duration::from_secs(60);
        let never = std::future::pending::<io::Result<()>>();
        assert!(matches!(wait(never, later, &cancel).await, Err(Error::Cancelled)));
    }
}
