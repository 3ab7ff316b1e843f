use crate::name::Name;
use crate::resource::Resource;
use std::convert::TryFrom;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use std::time::SystemTime;
use strum_macros::{Display, EnumString};

/// DNS Message that serves as the root of all DNS requests and responses.
///
/// The section counts in the header are not stored, they are always the
/// lengths of the section vectors.
///
/// # Examples
///
/// For constructing a message and encoding:
///
/// ```rust
/// use dnsclient::Message;
/// use dnsclient::types::*;
///
/// // Construct a simple query.
/// let mut m = Message::default();
/// m.id = 0xeccb;
/// m.rd = true;
/// m.add_question("example.com", Type::A, Class::Internet).unwrap();
///
/// // Encode the query as a Vec<u8>.
/// let req = m.to_vec().expect("failed to encode DNS request");
///
/// // Take a Vec<u8> and turn it back into a message.
/// let m = Message::from_slice(&req).expect("invalid message");
/// assert_eq!(m.id, 0xeccb);
/// assert_eq!(m.questions.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    /// 16-bit identifier assigned by the program that generates any kind of
    /// query. This identifier is copied into the corresponding reply and can be
    /// used by the requester to match up replies to outstanding queries.
    pub id: u16,

    /// Recursion Desired - this bit directs the name server to pursue the query
    /// recursively.
    pub rd: bool,

    /// Truncation - specifies that this message was truncated.
    pub tc: bool,

    /// Authoritative Answer - Specifies that the responding name server is an
    /// authority for the domain name in question section.
    pub aa: bool,

    /// Specifies kind of query in this message. 0 represents a standard query.
    /// See <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5>
    pub opcode: Opcode,

    /// Specifies whether this message is a query (0), or a response (1).
    pub qr: QR,

    /// Response code.
    pub rcode: Rcode,

    /// Checking Disabled. See [RFC4035] and [RFC6840].
    ///
    /// [rfc4035]: https://datatracker.ietf.org/doc/html/rfc4035
    /// [rfc6840]: https://datatracker.ietf.org/doc/html/rfc6840
    pub cd: bool,

    /// Authentic Data. See [RFC4035] and [RFC6840].
    ///
    /// [rfc4035]: https://datatracker.ietf.org/doc/html/rfc4035
    /// [rfc6840]: https://datatracker.ietf.org/doc/html/rfc6840
    pub ad: bool,

    /// Z Reserved for future use. You must set this field to 0.
    pub z: bool,

    /// Recursion Available - this be is set or cleared in a response, and
    /// denotes whether recursive query support is available in the name server.
    pub ra: bool,

    /// The questions.
    pub questions: Vec<Question>,

    /// The answer records.
    pub answers: Vec<Record>,

    /// The authoritive records.
    pub authoritys: Vec<Record>,

    /// The additional records.
    pub additionals: Vec<Record>,

    /// Details about the exchange that returned this message. Only set on
    /// responses returned by the clients.
    pub stats: Option<Stats>,
}

/// DNS Question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Question {
    pub name: Name,
    pub r#type: Type,
    pub class: Class,
}

/// Resource Record (RR)
///
/// `data_length` and `data` hold the record data exactly as it arrived, so
/// names inside `data` may be compression pointers into the enclosing
/// message. Records built with [`Record::new`] carry the uncompressed
/// encoding of `resource`.
#[derive(Clone, Debug)]
pub struct Record {
    pub name: Name,
    pub class: Class,

    /// The number of seconds that the resource record may be cached
    /// before the source of the information should again be consulted.
    /// Zero is interpreted to mean that the RR can only be used for the
    /// transaction in progress.
    pub ttl: Duration,

    pub resource: Resource,

    /// Length of the raw record data (RDLENGTH).
    pub data_length: u16,

    /// Raw record data (RDATA).
    pub data: Vec<u8>,

    /// Bytes the owner name took on the wire.
    pub(crate) name_length: usize,
}

impl Record {
    pub fn new(name: Name, class: Class, ttl: Duration, resource: Resource) -> Record {
        let mut data = Vec::with_capacity(resource.len());
        resource.write(&mut data);

        Record {
            name_length: name.len(),
            name,
            class,
            ttl,
            resource,
            // Record::write rejects data this long.
            data_length: u16::try_from(data.len()).unwrap_or(u16::MAX),
            data,
        }
    }

    pub fn r#type(&self) -> Type {
        self.resource.r#type()
    }
}

// Only the decoded fields are compared, `data` changes with compression.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.class == other.class
            && self.ttl == other.ttl
            && self.resource == other.resource
    }
}

/// Which transport carried an exchange.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Protocol {
    #[strum(serialize = "UDP")]
    Udp,
    #[strum(serialize = "TCP")]
    Tcp,
}

/// Statistics about a single request/response exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    /// When the request was sent.
    pub start: SystemTime,

    /// How long until the response was received.
    pub duration: Duration,

    /// The server the response came from.
    pub server: SocketAddr,

    /// The transport that carried the response.
    pub protocol: Protocol,

    /// Size of the encoded request in bytes.
    pub request_size: usize,

    /// Size of the encoded response in bytes.
    pub response_size: usize,
}

#[derive(Copy, Clone, Debug, EnumString, PartialEq)]
pub enum QR {
    Query = 0,
    Response = 1,
}

impl Default for QR {
    fn default() -> Self {
        QR::Query
    }
}

impl QR {
    pub fn from_bool(b: bool) -> QR {
        match b {
            false => QR::Query,
            true => QR::Response,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            QR::Query => false,
            QR::Response => true,
        }
    }
}

/// Kind of query carried by a message. Only `Query` is ever sent by the
/// clients, the rest are decoded so foreign messages still parse.
///
/// See <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5>
#[derive(Copy, Clone, Debug, EnumString, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Opcode {
    Query,
    IQuery, // Obsolete, rfc3425
    Status,
    Notify, // rfc1996
    Update, // rfc2136
    DSO,    // rfc8490

    /// Any unassigned opcode, displayed as `OPCODE{n}`. 4 bits on the wire.
    #[strum(disabled)]
    Unknown(u8),
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Query
    }
}

impl From<u8> for Opcode {
    fn from(value: u8) -> Self {
        match value {
            0 => Opcode::Query,
            1 => Opcode::IQuery,
            2 => Opcode::Status,
            4 => Opcode::Notify,
            5 => Opcode::Update,
            6 => Opcode::DSO,
            n => Opcode::Unknown(n),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        match opcode {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::DSO => 6,
            Opcode::Unknown(n) => n,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::Query => write!(f, "Query"),
            Opcode::IQuery => write!(f, "IQuery"),
            Opcode::Status => write!(f, "Status"),
            Opcode::Notify => write!(f, "Notify"),
            Opcode::Update => write!(f, "Update"),
            Opcode::DSO => write!(f, "DSO"),
            Opcode::Unknown(n) => write!(f, "OPCODE{}", n),
        }
    }
}

/// Response code of a message. Anything but `NoError` is reported by the
/// resolver as [`crate::Error::Server`].
///
/// See <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6>
#[derive(Copy, Clone, Debug, EnumString, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Rcode {
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,

    // Dynamic update (rfc2136) codes.
    YXDomain,
    YXRRSet,
    NXRRSet,
    NotAuth,
    NotZone,

    DSOTYPENI, // rfc8490

    /// Any unassigned code, displayed as `RCODE{n}`. 4 bits on the wire,
    /// extended rcodes need EDNS which isn't supported.
    #[strum(disabled)]
    Unknown(u8),
}

impl Default for Rcode {
    fn default() -> Self {
        Rcode::NoError
    }
}

impl From<u8> for Rcode {
    fn from(value: u8) -> Self {
        match value {
            0 => Rcode::NoError,
            1 => Rcode::FormErr,
            2 => Rcode::ServFail,
            3 => Rcode::NXDomain,
            4 => Rcode::NotImp,
            5 => Rcode::Refused,
            6 => Rcode::YXDomain,
            7 => Rcode::YXRRSet,
            8 => Rcode::NXRRSet,
            9 => Rcode::NotAuth,
            10 => Rcode::NotZone,
            11 => Rcode::DSOTYPENI,
            n => Rcode::Unknown(n),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(rcode: Rcode) -> Self {
        match rcode {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NXDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::YXDomain => 6,
            Rcode::YXRRSet => 7,
            Rcode::NXRRSet => 8,
            Rcode::NotAuth => 9,
            Rcode::NotZone => 10,
            Rcode::DSOTYPENI => 11,
            Rcode::Unknown(n) => n,
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rcode::NoError => write!(f, "NoError"),
            Rcode::FormErr => write!(f, "FormErr"),
            Rcode::ServFail => write!(f, "ServFail"),
            Rcode::NXDomain => write!(f, "NXDomain"),
            Rcode::NotImp => write!(f, "NotImp"),
            Rcode::Refused => write!(f, "Refused"),
            Rcode::YXDomain => write!(f, "YXDomain"),
            Rcode::YXRRSet => write!(f, "YXRRSet"),
            Rcode::NXRRSet => write!(f, "NXRRSet"),
            Rcode::NotAuth => write!(f, "NotAuth"),
            Rcode::NotZone => write!(f, "NotZone"),
            Rcode::DSOTYPENI => write!(f, "DSOTYPENI"),
            Rcode::Unknown(n) => write!(f, "RCODE{}", n),
        }
    }
}

/// Resource Record Type, for example, A, CNAME or SOA.
///
/// Types without a dedicated variant are kept as [`Type::Unknown`], so
/// parsing never fails solely because of an unrecognised type.
// When adding a Type, a parsing function must be added in resource.rs.
#[derive(Copy, Clone, Debug, EnumString, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Type {
    /// (Default) IPv4 Address.
    A,

    /// Authoritative name server.
    NS,

    /// Canonical name for an alias.
    CNAME,

    /// Start of a zone of authority.
    SOA,

    /// Domain name pointer.
    PTR,

    /// Mail exchange.
    MX,

    /// IPv6 Address.
    AAAA,

    /// Any record type.
    /// Only valid as a Question Type.
    ANY,

    /// Any other type, displayed as `TYPE{n}` per [rfc3597].
    ///
    /// [rfc3597]: https://datatracker.ietf.org/doc/html/rfc3597
    #[strum(disabled)]
    Unknown(u16),
}

impl Default for Type {
    fn default() -> Self {
        Type::A
    }
}

impl From<u16> for Type {
    fn from(value: u16) -> Self {
        match value {
            1 => Type::A,
            2 => Type::NS,
            5 => Type::CNAME,
            6 => Type::SOA,
            12 => Type::PTR,
            15 => Type::MX,
            28 => Type::AAAA,
            255 => Type::ANY,
            n => Type::Unknown(n),
        }
    }
}

impl From<Type> for u16 {
    fn from(r#type: Type) -> Self {
        match r#type {
            Type::A => 1,
            Type::NS => 2,
            Type::CNAME => 5,
            Type::SOA => 6,
            Type::PTR => 12,
            Type::MX => 15,
            Type::AAAA => 28,
            Type::ANY => 255,
            Type::Unknown(n) => n,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::A => write!(f, "A"),
            Type::NS => write!(f, "NS"),
            Type::CNAME => write!(f, "CNAME"),
            Type::SOA => write!(f, "SOA"),
            Type::PTR => write!(f, "PTR"),
            Type::MX => write!(f, "MX"),
            Type::AAAA => write!(f, "AAAA"),
            Type::ANY => write!(f, "ANY"),
            Type::Unknown(n) => write!(f, "TYPE{}", n),
        }
    }
}

/// Resource Record Class, for example Internet.
#[derive(Copy, Clone, Debug, EnumString, PartialEq, Eq)]
pub enum Class {
    /// (Default) The Internet (IN), see [rfc1035].
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "IN")]
    Internet,

    /// CSNET (CS), obsolete (used only for examples in some obsolete RFCs).
    #[strum(serialize = "CS")]
    CsNet,

    /// Chaosnet (CH), obsolete LAN protocol created at MIT in the mid-1970s.
    #[strum(serialize = "CH")]
    Chaos,

    /// Hesiod (HS), an information service developed by MIT's Project Athena.
    #[strum(serialize = "HS")]
    Hesiod,

    /// NONE [RFC2136]
    #[strum(serialize = "NONE")]
    None,

    /// * (ANY) See [rfc1035]
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "*")]
    Any,

    /// Any other class, displayed as `CLASS{n}`. The OPT pseudo record
    /// reuses this field for the UDP payload size.
    #[strum(disabled)]
    Unknown(u16),
}

impl Default for Class {
    fn default() -> Self {
        Class::Internet
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        match value {
            1 => Class::Internet,
            2 => Class::CsNet,
            3 => Class::Chaos,
            4 => Class::Hesiod,
            254 => Class::None,
            255 => Class::Any,
            n => Class::Unknown(n),
        }
    }
}

impl From<Class> for u16 {
    fn from(class: Class) -> Self {
        match class {
            Class::Internet => 1,
            Class::CsNet => 2,
            Class::Chaos => 3,
            Class::Hesiod => 4,
            Class::None => 254,
            Class::Any => 255,
            Class::Unknown(n) => n,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Class::Internet => write!(f, "IN"),
            Class::CsNet => write!(f, "CS"),
            Class::Chaos => write!(f, "CH"),
            Class::Hesiod => write!(f, "HS"),
            Class::None => write!(f, "NONE"),
            Class::Any => write!(f, "*"),
            Class::Unknown(n) => write!(f, "CLASS{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_type_numbers() {
        for n in 0..=300u16 {
            assert_eq!(u16::from(Type::from(n)), n);
        }
        assert_eq!(Type::from(28), Type::AAAA);
        assert_eq!(Type::from(16), Type::Unknown(16));
        assert_eq!(Type::Unknown(16).to_string(), "TYPE16");
    }

    #[test]
    fn test_type_from_str() {
        assert_eq!(Type::from_str("MX").unwrap(), Type::MX);
        assert_eq!(Type::from_str("AAAA").unwrap(), Type::AAAA);
        assert!(Type::from_str("Unknown").is_err());
    }

    #[test]
    fn test_class_numbers() {
        for n in 0..=300u16 {
            assert_eq!(u16::from(Class::from(n)), n);
        }
        assert_eq!(Class::from(1).to_string(), "IN");
        assert_eq!(Class::from(4096).to_string(), "CLASS4096");
        assert_eq!(Class::from_str("IN").unwrap(), Class::Internet);
    }

    #[test]
    fn test_rcode_numbers() {
        for n in 0..16u8 {
            assert_eq!(u8::from(Rcode::from(n)), n);
            assert_eq!(u8::from(Opcode::from(n)), n);
        }
        assert_eq!(Rcode::from(3), Rcode::NXDomain);
        assert_eq!(Rcode::from(12), Rcode::Unknown(12));
        assert_eq!(Rcode::Unknown(12).to_string(), "RCODE12");
        assert_eq!(Rcode::NXDomain.to_string(), "NXDomain");
        assert_eq!(Rcode::from_str("ServFail").unwrap(), Rcode::ServFail);

        assert_eq!(Opcode::from(3), Opcode::Unknown(3));
        assert_eq!(Opcode::Unknown(3).to_string(), "OPCODE3");
        assert_eq!(Opcode::Query.to_string(), "Query");
    }
}
