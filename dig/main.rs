// Simple dig style command line.
// dig [@server] [+udp|+tcp] [-x address] [type] {domain}
mod util;

use dnsclient::clients::{Exchanger, IdGenerator, RandomIds, TcpClient, UdpClient};
use dnsclient::clients::GOOGLE_IPV4_PRIMARY;
use dnsclient::types::*;
use dnsclient::Name;
use log::debug;
use std::env;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::net::ToSocketAddrs;
use std::process;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

#[derive(Debug, Display, EnumString, PartialEq)]
enum Client {
    Udp,
    Tcp,
}

// A simple type alias so as to DRY.
type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, PartialEq)]
struct Args {
    client: Client,
    servers: Vec<String>,

    /// Query this types
    r#type: Type,

    /// Across all these domains
    domains: Vec<Name>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args> {
    let mut result = Args {
        client: Client::Udp,
        servers: Vec::new(),

        r#type: Type::A,
        domains: Vec::new(),
    };

    let mut type_or_domain = Vec::<String>::new();
    let mut reverse = Vec::<IpAddr>::new();

    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "+udp" => result.client = Client::Udp,
            "+tcp" => result.client = Client::Tcp,

            "-x" => match args.next() {
                Some(addr) => reverse.push(addr.parse()?),
                None => return Err("-x needs an address".into()),
            },

            _ => {
                if arg.starts_with('+') || arg.starts_with('-') {
                    return Err(format!("Unknown flag: {}", arg).into());
                }

                if let Some(server) = arg.strip_prefix('@') {
                    result.servers.push(with_port(server))
                } else {
                    type_or_domain.push(arg)
                }
            }
        }
    }

    let mut found_type = false;

    // To be useful, we allow users to say `dig A bramp.net` or `dig bramp.net A`
    for arg in type_or_domain {
        if !found_type {
            // Use the first type we found and assume the rest are domains.
            if let Ok(r#type) = Type::from_str(&arg) {
                result.r#type = r#type;
                found_type = true;
                continue;
            }
        }

        result.domains.push(arg.parse()?)
    }

    if !reverse.is_empty() {
        result.r#type = Type::PTR;
        result
            .domains
            .extend(reverse.into_iter().map(Name::reverse));
    }

    if result.domains.is_empty() {
        // By default query the root domain
        result.domains.push(Name::root());
        if !found_type {
            result.r#type = Type::NS;
        }
    }

    if result.servers.is_empty() {
        result.servers.push(GOOGLE_IPV4_PRIMARY.to_string());
    }

    Ok(result)
}

/// Adds the DNS port to a server given without one.
fn with_port(server: &str) -> String {
    if server.parse::<SocketAddr>().is_ok() {
        return server.to_string();
    }

    match server.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, 53).to_string(),
        Err(_) => format!("{}:53", server),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: dig [@server] [+udp|+tcp] [-x address] [type] {{domain}}");
            process::exit(1);
        }
    };
    debug!("{:?}", args);

    let servers = args
        .servers
        .iter()
        .map(|s| s.to_socket_addrs())
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect::<Vec<SocketAddr>>();
    let client: Box<dyn Exchanger> = match args.client {
        Client::Udp => Box::new(UdpClient::new(&servers[..])?),
        Client::Tcp => Box::new(TcpClient::new(&servers[..])?),
    };

    let ids = RandomIds;
    for domain in args.domains {
        let query = Message::query_name(ids.next_id(), domain, args.r#type);

        println!("query:");
        print!("{}", util::hexdump(&query.to_vec()?));
        println!();
        println!("{}", query);

        let resp = client.exchange(&query).await?;

        println!("response:");
        println!("{}", resp);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(s: &str) -> Result<Args> {
        parse_args(s.split_whitespace().map(String::from))
    }

    #[test]
    fn test_parse_args() {
        let got = args("@1.1.1.1 +tcp MX bramp.net").unwrap();
        assert_eq!(
            got,
            Args {
                client: Client::Tcp,
                servers: vec!["1.1.1.1:53".to_string()],
                r#type: Type::MX,
                domains: vec!["bramp.net".parse().unwrap()],
            }
        );
    }

    #[test]
    fn test_parse_args_defaults() {
        let got = args("").unwrap();
        assert_eq!(got.client, Client::Udp);
        assert_eq!(got.servers, vec![GOOGLE_IPV4_PRIMARY.to_string()]);
        assert_eq!(got.r#type, Type::NS);
        assert_eq!(got.domains, vec![Name::root()]);
    }

    #[test]
    fn test_parse_args_reverse() {
        let got = args("-x 8.8.4.4").unwrap();
        assert_eq!(got.r#type, Type::PTR);
        assert_eq!(got.domains, vec!["4.4.8.8.in-addr.arpa".parse::<Name>().unwrap()]);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args("+doh bramp.net").is_err());
        assert!(args("-x").is_err());
        assert!(args("-x not-an-ip").is_err());
    }

    #[test]
    fn test_with_port() {
        assert_eq!(with_port("8.8.8.8"), "8.8.8.8:53");
        assert_eq!(with_port("8.8.8.8:5353"), "8.8.8.8:5353");
        assert_eq!(with_port("2001:4860:4860::8888"), "[2001:4860:4860::8888]:53");
        assert_eq!(with_port("dns.google"), "dns.google:53");
    }
}
