//! Implements the Display trait for the various types, so they output
//! in `dig` style.
// Refer to https://github.com/tigeli/bind-utils/blob/master/bin/dig/dig.c for reference.

use crate::resource::MX;
use crate::resource::SOA;
use crate::Message;
use crate::Question;
use crate::Record;
use crate::Resource;
use crate::Stats;
use chrono::prelude::*;
use std::fmt;
use std::fmt::Display;

/// Displays this message in a format resembling `dig` output.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_header(f)?;

        // The question section is always shown, even when empty.
        writeln!(f, ";; QUESTION SECTION:")?;
        self.questions.iter().try_for_each(|q| q.fmt(f))?;
        writeln!(f)?;

        fmt_section(f, "ANSWER", &self.answers)?;
        fmt_section(f, "AUTHORITY", &self.authoritys)?;
        fmt_section(f, "ADDITIONAL", &self.additionals)?;

        match &self.stats {
            Some(stats) => stats.fmt(f),
            None => Ok(()),
        }
    }
}

fn fmt_section(f: &mut fmt::Formatter, title: &str, records: &[Record]) -> fmt::Result {
    if records.is_empty() {
        return Ok(());
    }

    writeln!(f, ";; {} SECTION:", title)?;
    records.iter().try_for_each(|r| r.fmt(f))?;
    writeln!(f)
}

impl Message {
    fn fmt_header(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {}, status: {}, id: {}",
            self.opcode, self.rcode, self.id,
        )?;

        let flags: String = [
            (self.qr.to_bool(), " qr"),
            (self.aa, " aa"),
            (self.tc, " tc"),
            (self.rd, " rd"),
            (self.ra, " ra"),
            (self.ad, " ad"),
            (self.cd, " cd"),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect();

        writeln!(
            f,
            ";; flags:{}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            flags,
            self.questions.len(),
            self.answers.len(),
            self.authoritys.len(),
            self.additionals.len(),
        )?;

        writeln!(f)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, ";; Query time: {} msec", self.duration.as_millis())?;
        writeln!(f, ";; SERVER: {}#{}({})", self.server.ip(), self.server.port(), self.protocol)?;

        let start: chrono::DateTime<Local> = self.start.into();
        // ;; WHEN: Sat Jun 12 12:14:21 PDT 2021
        writeln!(f, ";; WHEN: {}", start.format("%a %b %-d %H:%M:%S %z %-Y"))?;
        writeln!(
            f,
            ";; MSG SIZE sent: {} rcvd: {}",
            self.request_size, self.response_size
        )
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";{name:<23} {class:4} {type:6}",
            name = self.name.to_string(),
            class = self.class.to_string(),
            r#type = self.r#type.to_string(),
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{name:<20} {ttl:>4} {class:4} {type:6} {resource}",
            name = self.name.to_string(),
            ttl = self.ttl.as_secs(),
            class = self.class.to_string(),
            r#type = self.r#type().to_string(),
            resource = self.resource,
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::A(ip) => ip.fmt(f),
            Resource::AAAA(ip) => ip.fmt(f),

            Resource::NS(name) => name.fmt(f),
            Resource::CNAME(name) => name.fmt(f),
            Resource::PTR(name) => name.fmt(f),

            Resource::SOA(soa) => soa.fmt(f),
            Resource::MX(mx) => mx.fmt(f),

            // Generic form from rfc3597.
            Resource::Unknown { data, .. } => {
                write!(f, "\\# {}", data.len())?;
                if !data.is_empty() {
                    write!(f, " ")?;
                    for b in data {
                        write!(f, "{:02x}", b)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // "10 aspmx.l.google.com."
        write!(
            f,
            "{preference} {exchange}",
            preference = self.preference,
            exchange = self.exchange,
        )
    }
}

impl fmt::Display for SOA {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // "ns1.google.com. dns-admin.google.com. 376337657 900 900 1800 60"
        write!(
            f,
            "{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}",
            mname = self.mname,
            rname = self.rname,
            serial = self.serial,
            refresh = self.refresh.as_secs(),
            retry = self.retry.as_secs(),
            expire = self.expire.as_secs(),
            minimum = self.minimum.as_secs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::Message;
    use crate::Resource;
    use crate::Type;
    use crate::MX;
    use crate::SOA;
    use core::time::Duration;
    use pretty_assertions::assert_eq;

    lazy_static! {
        static ref DISPLAY_TESTS : Vec<(Resource, &'static str)> = {
            vec![
                (
                    Resource::A("172.217.164.100".parse().unwrap()),
                    "172.217.164.100",
                ),
                (
                    Resource::AAAA("2607:f8b0:4005:805::2004".parse().unwrap()),
                    "2607:f8b0:4005:805::2004",
                ),
                (
                    Resource::CNAME("code.l.google.com.".parse().unwrap()),
                    "code.l.google.com.",
                ),
                (
                    Resource::NS("ns4.google.com.".parse().unwrap()),
                    "ns4.google.com.",
                ),
                (Resource::PTR("dns.google.".parse().unwrap()), "dns.google."),
                (
                    Resource::SOA(SOA {
                        mname: "ns1.google.com.".parse().unwrap(),
                        rname: "dns-admin.google.com.".parse().unwrap(),

                        serial: 379031418,

                        refresh: Duration::from_secs(900),
                        retry: Duration::from_secs(900),
                        expire: Duration::from_secs(1800),
                        minimum: Duration::from_secs(60),
                    }),
                    "ns1.google.com. dns-admin.google.com. 379031418 900 900 1800 60",
                ),
                (
                    Resource::MX(MX {
                        preference: 10,
                        exchange: "aspmx.l.google.com.".parse().unwrap(),
                    }),
                    "10 aspmx.l.google.com.",
                ),
            ]
        };
    }

    #[test]
    fn test_display() {
        for (resource, display) in (*DISPLAY_TESTS).iter() {
            assert_eq!(format!("{}", resource), *display);
        }
    }

    #[test]
    fn test_display_unknown() {
        let txt = Resource::Unknown {
            r#type: 16,
            data: b"\x02hi".to_vec(),
        };
        assert_eq!(txt.to_string(), "\\# 3 026869");

        let empty = Resource::Unknown {
            r#type: 10,
            data: Vec::new(),
        };
        assert_eq!(empty.to_string(), "\\# 0");
    }

    #[test]
    fn test_from_str() {
        for (resource, display) in (*DISPLAY_TESTS).iter() {
            match Resource::from_str(resource.r#type(), display) {
                Ok(got) => assert_eq!(&got, resource),
                Err(err) => panic!(
                    "from_str({}, '{}') failed: {}",
                    resource.r#type(),
                    display,
                    err
                ),
            }
        }
    }

    /// Test resource->display->from_string to make sure we can round trip between types.
    #[test]
    fn test_identity() {
        for (resource, _) in (*DISPLAY_TESTS).iter() {
            let display = format!("{}", resource);
            match Resource::from_str(resource.r#type(), &display) {
                Ok(got) => assert_eq!(&got, resource),
                Err(err) => panic!(
                    "from_str({}, '{}') failed: {}",
                    resource.r#type(),
                    display,
                    err
                ),
            }
        }
    }

    #[test]
    fn test_display_message() {
        let mut m = Message::query(0xabcd, "example.com", Type::A).unwrap();
        m.answers.push(crate::Record::new(
            "example.com".parse().unwrap(),
            crate::Class::Internet,
            Duration::from_secs(300),
            Resource::A("93.184.216.34".parse().unwrap()),
        ));

        let got = m.to_string();
        assert!(got.starts_with(";; ->>HEADER<<- opcode: Query, status: NoError, id: 43981\n"));
        assert!(got.contains(";; flags: rd; QUERY: 1, ANSWER: 1, AUTHORITY: 0, ADDITIONAL: 0\n"));
        assert!(got.contains(";example.com.            IN   A     \n"));
        assert!(got.contains("example.com.          300 IN   A      93.184.216.34\n"));
    }
}
