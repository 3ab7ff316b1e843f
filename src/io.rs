//! Various traits to help parsing of DNS messages.

use crate::errors::{truncated, Result};
use crate::name::Name;
use crate::types::{Class, Type};
use byteorder::{ReadBytesExt, BE};
use std::io::Cursor;
use std::io::Read;

pub(crate) trait SeekExt {
    /// Returns the number of bytes remaining to be consumed.
    /// This is used as a way to check for malformed input.
    fn remaining(&self) -> usize;
}

impl<'a> SeekExt for Cursor<&'a [u8]> {
    fn remaining(&self) -> usize {
        let pos = self.position() as usize;
        self.get_ref().len().saturating_sub(pos)
    }
}

/// Extensions to a `Cursor` over a whole DNS message, to read some DNS
/// specific types. Running out of bytes is reported as a malformed message.
pub(crate) trait DNSReadExt {
    /// Reads a domain name, following compression pointers anywhere earlier
    /// in the message. Leaves the cursor just after the name's own bytes.
    fn read_name(&mut self) -> Result<Name>;

    /// Reads a DNS Type.
    fn read_type(&mut self) -> Result<Type>;

    /// Reads a DNS Class.
    fn read_class(&mut self) -> Result<Class>;

    fn read_be_u16(&mut self) -> Result<u16>;
    fn read_be_u32(&mut self) -> Result<u32>;

    /// Reads exactly `len` bytes.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Reads exactly `N` bytes into an array.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]>;
}

impl<'a> DNSReadExt for Cursor<&'a [u8]> {
    fn read_name(&mut self) -> Result<Name> {
        let (name, next) = Name::parse(self.get_ref(), self.position() as usize)?;
        self.set_position(next as u64);

        Ok(name)
    }

    fn read_type(&mut self) -> Result<Type> {
        Ok(self.read_be_u16()?.into())
    }

    fn read_class(&mut self) -> Result<Class> {
        Ok(self.read_be_u16()?.into())
    }

    fn read_be_u16(&mut self) -> Result<u16> {
        self.read_u16::<BE>().map_err(truncated)
    }

    fn read_be_u32(&mut self) -> Result<u32> {
        self.read_u32::<BE>().map_err(truncated)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; len];
        self.read_exact(&mut buf).map_err(truncated)?;
        Ok(buf)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0; N];
        self.read_exact(&mut buf).map_err(truncated)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    #[test]
    fn test_read_past_end() {
        let mut cur = Cursor::new(&b"\x00\x01\x02"[..]);
        assert_eq!(cur.read_be_u16().unwrap(), 1);
        assert_eq!(cur.remaining(), 1);
        assert!(matches!(cur.read_be_u16(), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_read_name_moves_past_pointer() {
        let buf = &b"\x03com\x00\xC0\x00\x00\x0F"[..];
        let mut cur = Cursor::new(buf);
        cur.set_position(5);

        assert_eq!(cur.read_name().unwrap().to_string(), "com.");
        assert_eq!(cur.read_type().unwrap(), Type::MX);
        assert_eq!(cur.remaining(), 0);
    }
}
