use crate::bail;
use crate::clients::ids::{IdGenerator, RandomIds};
use crate::clients::udp::UdpClient;
use crate::clients::Exchanger;
use crate::name::Name;
use crate::types::*;
use crate::Error;
use crate::Message;
use crate::Resource;
use crate::Result;
use log::debug;
use std::net::IpAddr;
use std::net::ToSocketAddrs;
use std::sync::Arc;

/// A stub resolver, answering questions by asking a recursive server.
///
/// Every call builds a fresh query with its own transaction id, so a single
/// Resolver may be used concurrently.
pub struct Resolver<E = UdpClient> {
    client: E,
    ids: Arc<dyn IdGenerator>,
}

impl Resolver {
    /// Creates a new Resolver that sends queries to `servers` over UDP
    /// (falling back to TCP).
    pub fn new<A: ToSocketAddrs>(servers: A) -> Result<Resolver<UdpClient>> {
        Ok(Resolver::new_with_client(UdpClient::new(servers)?))
    }
}

impl<E> Resolver<E>
where
    E: Exchanger,
{
    /// Creates a new Resolver that sends queries with `client`.
    pub fn new_with_client(client: E) -> Resolver<E> {
        Resolver {
            client,
            ids: Arc::new(RandomIds),
        }
    }

    /// Uses `ids` to pick the transaction id of each query, instead of
    /// random ids.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn client(&self) -> &E {
        &self.client
    }

    /// Sends a recursive query for `domain` and returns the response.
    ///
    /// # Errors
    ///
    /// Besides the errors from the client, fails with [`Error::Server`] if
    /// the response code is anything but `NoError`.
    pub async fn resolve(&self, domain: &str, r#type: Type) -> Result<Message> {
        self.resolve_name(domain.parse()?, r#type).await
    }

    async fn resolve_name(&self, name: Name, r#type: Type) -> Result<Message> {
        let id = self.ids.next_id();
        debug!("resolving {} {} with id {:#06x}", name, r#type, id);

        let query = Message::query_name(id, name, r#type);

        let response = self.client.exchange(&query).await?;
        if response.id != query.id {
            bail!(Malformed, "response id {:#06x} does not match query {:#06x}", response.id, query.id);
        }

        match response.rcode {
            Rcode::NoError => Ok(response),
            rcode => Err(Error::Server(rcode)),
        }
    }

    /// Returns the answers of type `type` for `domain`. [`Type::ANY`] keeps
    /// every answer.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NoMatchingRecords`] if no answer has that type.
    pub async fn records(&self, domain: &str, r#type: Type) -> Result<Vec<Record>> {
        let response = self.resolve(domain, r#type).await?;
        matching(response, r#type)
    }

    /// Resolves a name into its IP addresses, with a single A or AAAA query.
    ///
    /// See [rfc1035#section-7] and [rfc1034#section-5].
    ///
    /// [rfc1035#section-7]: https://datatracker.ietf.org/doc/html/rfc1035#section-7
    /// [rfc1034#section-5]: https://datatracker.ietf.org/doc/html/rfc1034#section-5
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Format`] if `type` is not A or AAAA, and with
    /// [`Error::NoMatchingRecords`] if the response holds no addresses. A
    /// response with only a CNAME is such a response.
    pub async fn lookup(&self, domain: &str, r#type: Type) -> Result<Vec<IpAddr>> {
        if r#type != Type::A && r#type != Type::AAAA {
            bail!(Format, "can only look up addresses, not {}", r#type);
        }

        let records = self.records(domain, r#type).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| match record.resource {
                Resource::A(ip4) => Some(IpAddr::V4(ip4)),
                Resource::AAAA(ip6) => Some(IpAddr::V6(ip6)),
                _ => None,
            })
            .collect())
    }

    /// Resolves a name into all its IPv4 and IPv6 addresses, sending the A
    /// and AAAA queries at the same time.
    ///
    /// Succeeds if either query finds addresses.
    pub async fn lookup_host(&self, domain: &str) -> Result<Vec<IpAddr>> {
        let (v4, v6) = tokio::join!(
            self.lookup(domain, Type::A),
            self.lookup(domain, Type::AAAA)
        );

        let mut addrs = Vec::new();
        for result in vec![v4, v6] {
            match result {
                Ok(found) => addrs.extend(found),
                Err(Error::NoMatchingRecords) => (),
                Err(e) => return Err(e),
            }
        }

        if addrs.is_empty() {
            return Err(Error::NoMatchingRecords);
        }

        Ok(addrs)
    }

    /// Finds the name for an IP address, using its PTR record.
    ///
    /// The name is returned without the trailing dot, for example
    /// `"dns.google"`.
    pub async fn reverse(&self, addr: IpAddr) -> Result<String> {
        let response = self.resolve_name(Name::reverse(addr), Type::PTR).await?;

        for answer in response.answers {
            if let Resource::PTR(name) = answer.resource {
                return Ok(name.to_unrooted_string());
            }
        }

        Err(Error::NoMatchingRecords)
    }
}

fn matching(response: Message, r#type: Type) -> Result<Vec<Record>> {
    let records: Vec<Record> = response
        .answers
        .into_iter()
        .filter(|record| r#type == Type::ANY || record.r#type() == r#type)
        .collect();

    if records.is_empty() {
        return Err(Error::NoMatchingRecords);
    }

    Ok(records)
}
