//! Domain names, and their wire encoding as defined by [rfc1035#section-3.1].
//!
//! [rfc1035#section-3.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.1
use crate::bail;
use crate::errors::{Error, Result};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A domain name, stored as an ordered list of labels.
///
/// Names are immutable once built. They are constructed from their textual
/// dotted form (for outgoing queries), or parsed out of a message (for
/// incoming responses). Comparison ignores ASCII case, as DNS does.
///
/// ```rust
/// use dnsclient::Name;
///
/// let name: Name = "www.example.com".parse().unwrap();
/// assert_eq!(name.to_string(), "www.example.com.");
/// assert_eq!(name.len(), 17);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Name {
    // Each label is 1..=63 bytes. The encoded name (length prefixes, labels
    // and the trailing root label) is at most 255 bytes.
    labels: Vec<Vec<u8>>,
}

impl Name {
    /// Maximum length of an encoded name, including length prefixes. [RFC1035]
    pub const MAX_LEN: usize = 255;

    /// Restricts the length of a domain label to 63 characters. [RFC1034]
    pub const MAX_LABEL_LEN: usize = 63;

    /// The top two bits of a length byte that mark a compression pointer.
    const POINTER: u8 = 0b1100_0000;

    /// Returns the root name ".".
    pub fn root() -> Name {
        Name::default()
    }

    /// Builds a name from its labels, most specific first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if any label is empty or longer than 63
    /// bytes, or the encoded name would be longer than 255 bytes.
    pub fn from_labels<I, L>(labels: I) -> Result<Name>
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        let labels: Vec<Vec<u8>> = labels.into_iter().map(Into::into).collect();
        for label in &labels {
            Name::check_label(label)?;
        }

        let name = Name { labels };
        if name.len() > Name::MAX_LEN {
            bail!(
                Format,
                "domain name '{}' is too long ({} bytes, maximum is {})",
                name,
                name.len(),
                Name::MAX_LEN
            );
        }

        Ok(name)
    }

    fn check_label(label: &[u8]) -> Result<()> {
        // Dig's example errors
        // 'aaa....a' is not a legal name (label too long)
        // 'a....a' is not a legal name (empty label)
        if label.is_empty() {
            bail!(Format, "empty labels are not valid");
        }

        if label.len() > Name::MAX_LABEL_LEN {
            bail!(
                Format,
                "label '{}' is longer than {} bytes",
                String::from_utf8_lossy(label),
                Name::MAX_LABEL_LEN
            );
        }

        Ok(())
    }

    /// Builds the name used for reverse (PTR) lookups of the address.
    ///
    /// IPv4 addresses map to `d.c.b.a.in-addr.arpa.`, IPv6 addresses to
    /// their 32 nibbles in reverse order under `ip6.arpa.`.
    pub fn reverse(addr: IpAddr) -> Name {
        let mut labels: Vec<Vec<u8>> = match addr {
            IpAddr::V4(ip) => ip
                .octets()
                .iter()
                .rev()
                .map(|octet| octet.to_string().into_bytes())
                .collect(),

            IpAddr::V6(ip) => ip
                .octets()
                .iter()
                .rev()
                .flat_map(|octet| [octet & 0x0F, octet >> 4])
                .map(|nibble| format!("{:x}", nibble).into_bytes())
                .collect(),
        };

        let suffix: &[&str] = match addr {
            IpAddr::V4(_) => &["in-addr", "arpa"],
            IpAddr::V6(_) => &["ip6", "arpa"],
        };
        labels.extend(suffix.iter().map(|s| s.as_bytes().to_vec()));

        // At most 34 short labels, so always within the limits.
        Name { labels }
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over the labels, most specific first. The root label is not included.
    pub fn labels(&self) -> impl Iterator<Item = &[u8]> {
        self.labels.iter().map(Vec::as_slice)
    }

    /// Returns the number of bytes this name takes when encoded without compression.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.labels.iter().map(|label| label.len() + 1).sum::<usize>() + 1
    }

    /// Returns the dotted form without the trailing root dot, for example
    /// `dns.google`. The root name is returned as `.`.
    pub fn to_unrooted_string(&self) -> String {
        let mut s = self.to_string();
        if !self.is_root() {
            s.pop();
        }
        s
    }

    /// Appends the uncompressed wire encoding of this name to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        for label in &self.labels {
            // Checked at construction to be at most 63.
            buf.push(label.len() as u8);
            buf.extend_from_slice(label);
        }
        buf.push(0);
    }

    /// Returns the uncompressed wire encoding of this name.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        self.write(&mut buf);
        buf
    }

    /// Parses a name starting at `offset` within the whole message `buf`,
    /// following compression pointers as needed.
    ///
    /// Returns the name, and the offset just past the name's own bytes. That
    /// is after the terminating zero, or after the first pointer, regardless
    /// of where the pointer led.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] if the name runs past the end of the
    /// buffer, is too long, uses a reserved label type, or contains a pointer
    /// that does not point strictly before the run of labels it belongs to.
    /// The latter guarantees every pointer chain terminates. As a second bound
    /// no more pointers are followed than there are bytes in the message.
    pub fn parse(buf: &[u8], offset: usize) -> Result<(Name, usize)> {
        let mut labels = Vec::new();
        let mut len = 1; // The root label
        let mut pos = offset;

        // Start of the current run of labels, moved each time a pointer is followed.
        let mut run_start = offset;
        let mut next = None;
        let mut hops = 0;

        loop {
            let b = match buf.get(pos) {
                Some(b) => *b,
                None => bail!(Malformed, "name at offset {} runs past end of message", offset),
            };

            match b & Name::POINTER {
                0x00 if b == 0 => {
                    pos += 1;
                    break;
                }

                // A normal label.
                0x00 => {
                    let start = pos + 1;
                    let end = start + b as usize;
                    let label = match buf.get(start..end) {
                        Some(label) => label,
                        None => bail!(Malformed, "label at offset {} runs past end of message", pos),
                    };

                    len += label.len() + 1;
                    if len > Name::MAX_LEN {
                        bail!(Malformed, "name at offset {} is longer than {} bytes", offset, Name::MAX_LEN);
                    }

                    labels.push(label.to_vec());
                    pos = end;
                }

                // Compression
                Name::POINTER => {
                    let b2 = match buf.get(pos + 1) {
                        Some(b2) => *b2,
                        None => bail!(Malformed, "pointer at offset {} runs past end of message", pos),
                    };
                    let ptr = ((b & !Name::POINTER) as usize) << 8 | b2 as usize;

                    if next.is_none() {
                        next = Some(pos + 2);
                    }

                    hops += 1;
                    if hops > buf.len() {
                        bail!(Malformed, "too many compression pointers in name at offset {}", offset);
                    }

                    // Make sure we don't get into a loop.
                    if ptr >= run_start {
                        bail!(
                            Malformed,
                            "invalid compression pointer at offset {} to offset {}",
                            pos,
                            ptr
                        );
                    }

                    run_start = ptr;
                    pos = ptr;
                }

                // 0x40 and 0x80 are reserved (rfc6891 deprecated the extended label type).
                _ => bail!(Malformed, "unsupported label type {:#04x} at offset {}", b, pos),
            }
        }

        Ok((Name { labels }, next.unwrap_or(pos)))
    }
}

impl FromStr for Name {
    type Err = Error;

    /// Parses a domain name in dotted form. The trailing dot is optional.
    /// Unicode names are puny encoded first.
    fn from_str(s: &str) -> Result<Self> {
        let ascii;
        let s = if s.is_ascii() {
            s
        } else {
            ascii = match idna::domain_to_ascii(s) {
                Ok(ascii) => ascii,
                Err(e) => bail!(Format, "invalid domain name '{}': {}", s, e),
            };
            ascii.as_str()
        };

        if s.is_empty() || s == "." {
            return Ok(Name::root());
        }

        Name::from_labels(s.split_terminator('.').map(str::as_bytes))
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(&other.labels)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for Name {}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }

        for label in &self.labels {
            for b in label {
                match b {
                    b'.' | b'\\' => write!(f, "\\{}", *b as char)?,
                    0x21..=0x7E => write!(f, "{}", *b as char)?,
                    _ => write!(f, "\\{:03}", b)?,
                }
            }
            write!(f, ".")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_str() {
        assert_eq!(Name::from_str("").unwrap().to_string(), ".");
        assert_eq!(Name::from_str(".").unwrap().to_string(), ".");
        assert_eq!(Name::from_str("com").unwrap().to_string(), "com.");
        assert_eq!(Name::from_str("com.").unwrap().to_string(), "com.");
        assert_eq!(Name::from_str("a.b.com").unwrap().to_string(), "a.b.com.");
        assert_eq!(Name::from_str("a.b.com.").unwrap().to_string(), "a.b.com.");

        assert_eq!(
            Name::from_str("académie-française.fr").unwrap().to_string(),
            "xn--acadmie-franaise-npb1a.fr."
        );
    }

    #[test]
    fn test_from_str_errors() {
        assert!(matches!(Name::from_str("a..com"), Err(Error::Format(_))));
        assert!(matches!(Name::from_str(".com"), Err(Error::Format(_))));

        let label = "a".repeat(63);
        assert!(Name::from_str(&label).is_ok());

        let label = "a".repeat(64);
        assert!(matches!(Name::from_str(&label), Err(Error::Format(_))));

        // 4 labels of 63 bytes, encodes to 4 * 64 + 1 = 257 bytes.
        let long = vec!["b".repeat(63); 4].join(".");
        assert!(matches!(Name::from_str(&long), Err(Error::Format(_))));

        // 3 labels of 63, plus one of 61, encodes to exactly 255 bytes.
        let max = format!("{}.{}", vec!["c".repeat(63); 3].join("."), "d".repeat(61));
        assert_eq!(Name::from_str(&max).unwrap().len(), Name::MAX_LEN);
    }

    #[test]
    fn test_eq_ignores_case() {
        assert_eq!(
            Name::from_str("WWW.Example.COM").unwrap(),
            Name::from_str("www.example.com.").unwrap()
        );
        assert_ne!(
            Name::from_str("www.example.com").unwrap(),
            Name::from_str("example.com").unwrap()
        );
    }

    #[test]
    fn test_write() {
        let name = Name::from_str("www.example.com").unwrap();
        assert_eq!(name.to_vec(), b"\x03www\x07example\x03com\x00".to_vec());
        assert_eq!(name.len(), name.to_vec().len());

        assert_eq!(Name::root().to_vec(), vec![0]);
    }

    #[test]
    fn test_parse_roundtrip() {
        for s in &[".", "com.", "example.com.", "a.b.c.d.e.f.g.", "xn--74h.com."] {
            let name = Name::from_str(s).unwrap();
            let buf = name.to_vec();
            let (got, next) = Name::parse(&buf, 0).unwrap();

            assert_eq!(got, name);
            assert_eq!(got.to_string(), *s);
            assert_eq!(next, buf.len());
        }
    }

    #[test]
    fn test_parse_compressed() {
        // "com." at 0, then "example" followed by a pointer back to "com".
        let buf = b"\x03com\x00\x07example\xC0\x00\x01\x02";

        let (name, next) = Name::parse(buf, 5).unwrap();
        assert_eq!(name.to_string(), "example.com.");
        assert_eq!(next, 15); // Just after the pointer, not after "com".

        let uncompressed = b"\x07example\x03com\x00";
        let (want, _) = Name::parse(uncompressed, 0).unwrap();
        assert_eq!(name, want);
    }

    #[test]
    fn test_parse_chained_pointers() {
        // "com" at 0, "example" + ptr(0) at 5, "www" + ptr(5) at 15.
        let buf = b"\x03com\x00\x07example\xC0\x00\x03www\xC0\x05";
        let (name, next) = Name::parse(buf, 15).unwrap();
        assert_eq!(name.to_string(), "www.example.com.");
        assert_eq!(next, buf.len());
    }

    #[test]
    fn test_parse_pointer_loops() {
        // Pointer to itself.
        assert!(matches!(Name::parse(b"\xC0\x00", 0), Err(Error::Malformed(_))));

        // Label then a pointer back to the start of the same name.
        assert!(matches!(Name::parse(b"\x03abc\xC0\x00", 0), Err(Error::Malformed(_))));

        // Pointer forward.
        assert!(matches!(Name::parse(b"\xC0\x02\x00", 0), Err(Error::Malformed(_))));

        // Two names pointing at each other.
        let buf = b"\x01a\xC0\x04\x01b\xC0\x00";
        assert!(matches!(Name::parse(buf, 4), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_parse_truncated() {
        assert!(matches!(Name::parse(b"", 0), Err(Error::Malformed(_))));
        assert!(matches!(Name::parse(b"\x03co", 0), Err(Error::Malformed(_))));
        assert!(matches!(Name::parse(b"\x03com", 0), Err(Error::Malformed(_))));
        assert!(matches!(Name::parse(b"\x03com\x00\xC0", 5), Err(Error::Malformed(_))));
        assert!(matches!(Name::parse(b"\x40abc\x00", 0), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_display_escapes() {
        let name = Name::from_labels(vec![b"a.b".to_vec(), b"c d".to_vec(), b"e".to_vec()]).unwrap();
        assert_eq!(name.to_string(), "a\\.b.c\\032d.e.");
    }

    #[test]
    fn test_reverse() {
        assert_eq!(
            Name::reverse("8.8.4.4".parse().unwrap()).to_string(),
            "4.4.8.8.in-addr.arpa."
        );
        assert_eq!(
            Name::reverse("2001:db8::567:89ab".parse().unwrap()).to_string(),
            "b.a.9.8.7.6.5.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa."
        );
    }

    #[test]
    fn test_to_unrooted_string() {
        assert_eq!(Name::from_str("dns.google.").unwrap().to_unrooted_string(), "dns.google");
        assert_eq!(Name::root().to_unrooted_string(), ".");
    }
}
