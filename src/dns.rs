use crate::bail;
use crate::errors::{truncated, Result};
use crate::io::{DNSReadExt, SeekExt};
use crate::name::Name;
use crate::resource::{duration_to_u32, Resource};
use crate::types::*;
use byteorder::ReadBytesExt;
use bytes::BufMut;
use std::convert::TryFrom;
use std::io::Cursor;
use std::time::Duration;

/// Length of the fixed message header.
pub const HEADER_LEN: usize = 12;

/// Fixed fields that follow the name in a resource record (type, class, ttl, rdlength).
const RECORD_FIXED_LEN: usize = 10;

// A helper class to hold state while the parsing is happening.
pub(crate) struct MessageParser<'a> {
    cur: Cursor<&'a [u8]>,

    m: Message,
}

#[derive(Copy, Clone, PartialEq)]
enum RecordSection {
    Answers,
    Authorities,
    Additionals,
}

impl<'a> MessageParser<'a> {
    fn new(buf: &[u8]) -> MessageParser {
        MessageParser {
            cur: Cursor::new(buf),
            m: Message::default(),
        }
    }

    /// Consume the MessageParser and returned the resulting Message.
    fn parse(mut self) -> Result<Message> {
        self.m.id = self.cur.read_be_u16()?;

        let b = self.cur.read_u8().map_err(truncated)?;
        self.m.qr = QR::from_bool(0b1000_0000 & b != 0);
        self.m.opcode = Opcode::from((0b0111_1000 & b) >> 3);
        self.m.aa = (0b0000_0100 & b) != 0;
        self.m.tc = (0b0000_0010 & b) != 0;
        self.m.rd = (0b0000_0001 & b) != 0;

        let b = self.cur.read_u8().map_err(truncated)?;
        self.m.ra = (0b1000_0000 & b) != 0;
        self.m.z = (0b0100_0000 & b) != 0; // Unused
        self.m.ad = (0b0010_0000 & b) != 0;
        self.m.cd = (0b0001_0000 & b) != 0;
        self.m.rcode = Rcode::from(0b0000_1111 & b);

        let qd_count = self.cur.read_be_u16()?;
        let an_count = self.cur.read_be_u16()?;
        let ns_count = self.cur.read_be_u16()?;
        let ar_count = self.cur.read_be_u16()?;

        self.read_questions(qd_count)?;
        self.read_records(an_count, RecordSection::Answers)?;
        self.read_records(ns_count, RecordSection::Authorities)?;
        self.read_records(ar_count, RecordSection::Additionals)?;

        if self.cur.remaining() > 0 {
            bail!(
                Malformed,
                "finished parsing with {} bytes left over",
                self.cur.remaining()
            );
        }

        Ok(self.m)
    }

    fn read_questions(&mut self, count: u16) -> Result<()> {
        // Don't trust the count for the allocation, each question is at least 5 bytes.
        self.m
            .questions
            .reserve_exact(usize::from(count).min(self.cur.remaining() / 5));

        for _ in 0..count {
            let name = self.cur.read_name()?;
            let r#type = self.cur.read_type()?;
            let class = self.cur.read_class()?;

            self.m.questions.push(Question {
                name,
                r#type,
                class,
            });
        }

        Ok(())
    }

    fn read_records(&mut self, count: u16, section: RecordSection) -> Result<()> {
        let records = match section {
            RecordSection::Answers => &mut self.m.answers,
            RecordSection::Authorities => &mut self.m.authoritys,
            RecordSection::Additionals => &mut self.m.additionals,
        };
        records.reserve_exact(usize::from(count).min(self.cur.remaining() / 11));

        for _ in 0..count {
            let start = self.cur.position() as usize;
            let name = self.cur.read_name()?;
            let name_length = self.cur.position() as usize - start;

            let r#type = self.cur.read_type()?;
            let class = self.cur.read_class()?;
            let ttl = self.cur.read_be_u32()?;
            let len = self.cur.read_be_u16()?;

            // Resource::parse leaves the cursor exactly at the end of the data.
            let data_start = self.cur.position() as usize;
            let resource = Resource::parse(&mut self.cur, r#type, len.into())?;
            let data = self.cur.get_ref()[data_start..self.cur.position() as usize].to_vec();

            records.push(Record {
                name,
                class,
                ttl: Duration::from_secs(ttl.into()),
                resource,
                data_length: len,
                data,
                name_length,
            });
        }

        Ok(())
    }
}

/// Reads only the id and flags of a message, without parsing the sections.
///
/// Returns `None` if the buffer is too short to hold a header.
#[cfg_attr(not(feature = "tcp"), allow(dead_code))]
pub(crate) fn peek_header(buf: &[u8]) -> Option<(u16, bool)> {
    if buf.len() < HEADER_LEN {
        return None;
    }

    let id = u16::from_be_bytes([buf[0], buf[1]]);
    let tc = (buf[2] & 0b0000_0010) != 0;
    Some((id, tc))
}

impl Message {
    /// Decodes a whole message from `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if any section runs past the end
    /// of the buffer, a name contains a bad compression pointer, or bytes are
    /// left over after the last counted record. A partially parsed message is
    /// never returned.
    pub fn from_slice(buf: &[u8]) -> Result<Message> {
        MessageParser::new(buf).parse()
    }

    /// Adds a question for `domain` to this message.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Format`] if the domain is not a valid name.
    pub fn add_question(&mut self, domain: &str, r#type: Type, class: Class) -> Result<()> {
        let name: Name = domain.parse()?;

        self.questions.push(Question {
            name,
            r#type,
            class,
        });

        Ok(())
    }

    /// Returns a recursive standard query for a single question.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Format`] if the domain is not a valid name.
    pub fn query(id: u16, domain: &str, r#type: Type) -> Result<Message> {
        Ok(Message::query_name(id, domain.parse()?, r#type))
    }

    /// Same as [`Message::query`], for an already parsed name.
    pub fn query_name(id: u16, name: Name, r#type: Type) -> Message {
        Message {
            id,
            qr: QR::Query,
            opcode: Opcode::Query,
            rd: true,

            questions: vec![Question {
                name,
                r#type,
                class: Class::Internet,
            }],

            ..Default::default()
        }
    }

    /// Returns this DNS Message as a Vec<u8> ready to be sent, as defined by [rfc1035](https://datatracker.ietf.org/doc/html/rfc1035).
    ///
    /// The section counts are computed from the section lengths. Names are
    /// never compressed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Format`] if a section holds more than 65535
    /// entries.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut req = Vec::<u8>::with_capacity(512);

        req.put_u16(self.id);

        let mut b = 0_u8;
        b |= if self.qr.to_bool() { 0b1000_0000 } else { 0 };
        b |= (u8::from(self.opcode) << 3) & 0b0111_1000;
        b |= if self.aa { 0b0000_0100 } else { 0 };
        b |= if self.tc { 0b0000_0010 } else { 0 };
        b |= if self.rd { 0b0000_0001 } else { 0 };
        req.put_u8(b);

        let mut b = 0_u8;
        b |= if self.ra { 0b1000_0000 } else { 0 };
        b |= if self.z { 0b0100_0000 } else { 0 };
        b |= if self.ad { 0b0010_0000 } else { 0 };
        b |= if self.cd { 0b0001_0000 } else { 0 };
        b |= u8::from(self.rcode) & 0b0000_1111;
        req.put_u8(b);

        req.put_u16(Message::count("question", self.questions.len())?);
        req.put_u16(Message::count("answer", self.answers.len())?);
        req.put_u16(Message::count("authority", self.authoritys.len())?);
        req.put_u16(Message::count("additional", self.additionals.len())?);

        for question in &self.questions {
            question.write(&mut req);
        }

        for record in self
            .answers
            .iter()
            .chain(&self.authoritys)
            .chain(&self.additionals)
        {
            record.write(&mut req)?;
        }

        Ok(req)
    }

    fn count(section: &str, len: usize) -> Result<u16> {
        match u16::try_from(len) {
            Ok(n) => Ok(n),
            Err(_) => bail!(Format, "too many {} records ({})", section, len),
        }
    }
}

impl Question {
    /// Appends the wire encoding of this question to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        self.name.write(buf);
        buf.put_u16(self.r#type.into());
        buf.put_u16(self.class.into());
    }
}

impl Record {
    /// Appends the wire encoding of this record to `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Format`] if the record data is longer than
    /// 65535 bytes.
    pub fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        let len = match u16::try_from(self.resource.len()) {
            Ok(len) => len,
            Err(_) => bail!(Format, "{} record data is too long ({} bytes)", self.r#type(), self.resource.len()),
        };

        self.name.write(buf);
        buf.put_u16(self.r#type().into());
        buf.put_u16(self.class.into());
        buf.put_u32(duration_to_u32(self.ttl));
        buf.put_u16(len);
        self.resource.write(buf);

        Ok(())
    }

    /// Returns the number of bytes this record takes when written by
    /// [`Record::write`]: the name, the fixed fields, and the record data.
    ///
    /// Names are written uncompressed, so for a decoded record this may be
    /// larger than [`Record::wire_len`].
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.name.len() + RECORD_FIXED_LEN + self.resource.len()
    }

    /// Returns the number of bytes this record took in the message it was
    /// decoded from: the owner name as sent, the fixed fields, and
    /// `data_length`. For a record built with [`Record::new`] this is the
    /// same as [`Record::len`].
    pub fn wire_len(&self) -> usize {
        self.name_length + RECORD_FIXED_LEN + usize::from(self.data_length)
    }
}
