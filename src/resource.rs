//! Typed resource record data (RDATA), see [rfc1035#section-3.3].
//!
//! [rfc1035#section-3.3]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3
use crate::bail;
use crate::errors::Result;
use crate::io::DNSReadExt;
use crate::name::Name;
use crate::types::Type;
use bytes::BufMut;
use std::convert::TryInto;
use std::io::Cursor;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

/// The data of a resource record, keyed by record type.
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Resource {
    /// IPv4 Address.
    A(Ipv4Addr),

    /// IPv6 Address.
    AAAA(Ipv6Addr),

    CNAME(Name),
    NS(Name),
    PTR(Name),

    MX(MX),
    SOA(SOA),

    /// Any other record type, kept as the opaque bytes from the wire.
    Unknown { r#type: u16, data: Vec<u8> },
}

/// Mail exchange (MX) record.
#[derive(Clone, Debug, PartialEq)]
pub struct MX {
    /// The preference given to this RR among others at the same owner.
    /// Lower values are preferred.
    pub preference: u16,

    /// A host willing to act as a mail exchange for the owner name.
    pub exchange: Name,
}

/// Start of Authority (SOA) record.
#[derive(Clone, Debug, PartialEq)]
pub struct SOA {
    /// The name server that was the original or primary source of data for
    /// this zone.
    pub mname: Name,

    /// The mailbox of the person responsible for this zone, with the `@`
    /// encoded as the first dot.
    pub rname: Name,

    /// The unsigned 32 bit version number of the original copy of the zone.
    pub serial: u32,

    /// Interval before the zone should be refreshed.
    pub refresh: Duration,

    /// Interval that should elapse before a failed refresh should be retried.
    pub retry: Duration,

    /// Upper limit on the time interval that can elapse before the zone is no
    /// longer authoritative.
    pub expire: Duration,

    /// The minimum TTL field that should be exported with any RR from this zone.
    pub minimum: Duration,
}

impl SOA {
    /// Returns the responsible person's mailbox as an email address, e.g.
    /// `dns-admin.google.com.` becomes `dns-admin@google.com`.
    pub fn email(&self) -> String {
        let mut labels = self.rname.labels().map(String::from_utf8_lossy);
        match labels.next() {
            None => String::new(),
            Some(user) => {
                let domain: Vec<_> = labels.collect();
                format!("{}@{}", user, domain.join("."))
            }
        }
    }
}

impl Resource {
    /// Returns the record type of this resource.
    pub fn r#type(&self) -> Type {
        match self {
            Resource::A(_) => Type::A,
            Resource::AAAA(_) => Type::AAAA,
            Resource::CNAME(_) => Type::CNAME,
            Resource::NS(_) => Type::NS,
            Resource::PTR(_) => Type::PTR,
            Resource::MX(_) => Type::MX,
            Resource::SOA(_) => Type::SOA,
            Resource::Unknown { r#type, .. } => Type::from(*r#type),
        }
    }

    /// Parses `len` bytes of record data of the given type, starting at the
    /// cursor's position.
    ///
    /// The cursor must span the whole message, as names within the data may
    /// point anywhere earlier in the message. On success the cursor is left
    /// exactly `len` bytes further on.
    pub(crate) fn parse(cur: &mut Cursor<&[u8]>, r#type: Type, len: usize) -> Result<Resource> {
        let start = cur.position() as usize;
        let end = start + len;

        if end > cur.get_ref().len() {
            bail!(
                Malformed,
                "{} record data at offset {} runs past end of message",
                r#type,
                start
            );
        }

        let resource = match r#type {
            Type::A => {
                if len != 4 {
                    bail!(Malformed, "invalid A record length ({}) expected 4", len);
                }
                Resource::A(Ipv4Addr::from(cur.read_array::<4>()?))
            }
            Type::AAAA => {
                if len != 16 {
                    bail!(Malformed, "invalid AAAA record length ({}) expected 16", len);
                }
                Resource::AAAA(Ipv6Addr::from(cur.read_array::<16>()?))
            }

            Type::NS => Resource::NS(cur.read_name()?),
            Type::CNAME => Resource::CNAME(cur.read_name()?),
            Type::PTR => Resource::PTR(cur.read_name()?),

            Type::MX => Resource::MX(MX {
                preference: cur.read_be_u16()?,
                exchange: cur.read_name()?,
            }),

            Type::SOA => Resource::SOA(SOA {
                mname: cur.read_name()?,
                rname: cur.read_name()?,
                serial: cur.read_be_u32()?,
                refresh: Duration::from_secs(cur.read_be_u32()?.into()),
                retry: Duration::from_secs(cur.read_be_u32()?.into()),
                expire: Duration::from_secs(cur.read_be_u32()?.into()),
                minimum: Duration::from_secs(cur.read_be_u32()?.into()),
            }),

            // ANY is only valid in a question, but keep whatever was sent.
            Type::ANY | Type::Unknown(_) => Resource::Unknown {
                r#type: r#type.into(),
                data: cur.read_bytes(len)?,
            },
        };

        let pos = cur.position() as usize;
        if pos != end {
            bail!(
                Malformed,
                "{} record data length ({}) did not match the parsed length ({})",
                r#type,
                len,
                pos - start
            );
        }

        Ok(resource)
    }

    /// Appends the record data to `buf`. Names are written uncompressed.
    pub fn write(&self, buf: &mut Vec<u8>) {
        match self {
            Resource::A(ip) => buf.put_slice(&ip.octets()),
            Resource::AAAA(ip) => buf.put_slice(&ip.octets()),

            Resource::CNAME(name) | Resource::NS(name) | Resource::PTR(name) => name.write(buf),

            Resource::MX(mx) => {
                buf.put_u16(mx.preference);
                mx.exchange.write(buf);
            }

            Resource::SOA(soa) => {
                soa.mname.write(buf);
                soa.rname.write(buf);
                buf.put_u32(soa.serial);
                for d in &[soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    buf.put_u32(duration_to_u32(*d));
                }
            }

            Resource::Unknown { data, .. } => buf.put_slice(data),
        }
    }

    /// Returns the length of the record data when written by [`Resource::write`].
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Resource::A(_) => 4,
            Resource::AAAA(_) => 16,
            Resource::CNAME(name) | Resource::NS(name) | Resource::PTR(name) => name.len(),
            Resource::MX(mx) => 2 + mx.exchange.len(),
            Resource::SOA(soa) => soa.mname.len() + soa.rname.len() + 5 * 4,
            Resource::Unknown { data, .. } => data.len(),
        }
    }
}

/// Durations on the wire are unsigned 32 bit seconds; longer ones are clamped.
pub(crate) fn duration_to_u32(d: Duration) -> u32 {
    d.as_secs().try_into().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use pretty_assertions::assert_eq;

    fn parse(buf: &[u8], start: usize, r#type: Type) -> Result<Resource> {
        let mut cur = Cursor::new(buf);
        cur.set_position(start as u64);
        Resource::parse(&mut cur, r#type, buf.len() - start)
    }

    #[test]
    fn test_parse_a() {
        assert_eq!(
            parse(&[93, 184, 216, 34], 0, Type::A).unwrap(),
            Resource::A(Ipv4Addr::new(93, 184, 216, 34))
        );
        assert!(matches!(parse(&[1, 2, 3], 0, Type::A), Err(Error::Malformed(_))));
        assert!(matches!(parse(&[1, 2, 3, 4, 5], 0, Type::A), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_parse_aaaa() {
        let ip: Ipv6Addr = "2606:2800:220:1:248:1893:25c8:1946".parse().unwrap();
        assert_eq!(parse(&ip.octets(), 0, Type::AAAA).unwrap(), Resource::AAAA(ip));
        assert!(matches!(parse(&[0; 4], 0, Type::AAAA), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_parse_mx_compressed() {
        // "google.com." at 0, then MX data: preference 10, "smtp" + pointer to 0.
        let buf = b"\x06google\x03com\x00\x00\x0a\x04smtp\xC0\x00";
        assert_eq!(
            parse(buf, 12, Type::MX).unwrap(),
            Resource::MX(MX {
                preference: 10,
                exchange: "smtp.google.com".parse().unwrap(),
            })
        );
    }

    #[test]
    fn test_parse_soa() {
        let mut buf = Vec::new();
        let soa = SOA {
            mname: "ns1.google.com".parse().unwrap(),
            rname: "dns-admin.google.com".parse().unwrap(),
            serial: 379031418,
            refresh: Duration::from_secs(900),
            retry: Duration::from_secs(900),
            expire: Duration::from_secs(1800),
            minimum: Duration::from_secs(60),
        };
        Resource::SOA(soa.clone()).write(&mut buf);
        assert_eq!(buf.len(), Resource::SOA(soa.clone()).len());

        assert_eq!(parse(&buf, 0, Type::SOA).unwrap(), Resource::SOA(soa.clone()));
        assert_eq!(soa.email(), "dns-admin@google.com");

        // Missing the minimum field.
        assert!(matches!(
            parse(&buf[..buf.len() - 4], 0, Type::SOA),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_name_longer_than_data() {
        let mut cur = Cursor::new(&b"\x03www\x00"[..]);
        assert!(matches!(
            Resource::parse(&mut cur, Type::CNAME, 3),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_unknown() {
        // TXT is not parsed, so is kept as opaque bytes.
        let buf = b"\x05hello";
        let got = parse(buf, 0, Type::from(16)).unwrap();
        assert_eq!(
            got,
            Resource::Unknown {
                r#type: 16,
                data: buf.to_vec()
            }
        );
        assert_eq!(got.r#type(), Type::Unknown(16));
    }

    #[test]
    fn test_parse_past_end() {
        let mut cur = Cursor::new(&[1, 2][..]);
        assert!(matches!(
            Resource::parse(&mut cur, Type::A, 4),
            Err(Error::Malformed(_))
        ));
    }
}
