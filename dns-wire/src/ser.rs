//! A bounds-checked reader and writer for the DNS wire format.
//!
//! Various notes about the wire format:
//!
//! - All integers are in big endian format.
//! - Names consist of a series of labels, each prefixed with a length byte.
//! - Names end with a zero byte.
//! - Names are compressed by using a pointer to a previous name.
//! - This means that we need access to the entire buffer.

use super::Error;

use core::mem;

/// An object that is able to be serialized to or deserialized from a series of bytes.
pub(crate) trait Serialize<'a> {
    /// The number of bytes needed to serialize this object.
    fn serialized_len(&self) -> usize;

    /// Serialize this object into a series of bytes.
    fn serialize(&self, bytes: &mut [u8]) -> Result<usize, Error>;

    /// Deserialize this object from a series of bytes.
    fn deserialize(&mut self, cursor: Cursor<'a>) -> Result<Cursor<'a>, Error>;
}

/// A cursor into a series of bytes.
///
/// The cursor always keeps the whole message around, since compressed names
/// refer back to absolute offsets inside of it.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Cursor<'a> {
    /// The bytes being read.
    bytes: &'a [u8],

    /// The index into the bytes that we've read so far.
    cursor: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor from a series of bytes.
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Get the original bytes that this cursor was created from.
    pub(crate) fn original(&self) -> &'a [u8] {
        self.bytes
    }

    /// Get the slice of remaining bytes.
    pub(crate) fn remaining(&self) -> &'a [u8] {
        self.bytes.get(self.cursor..).unwrap_or(&[])
    }

    /// Get the length of the slice of remaining bytes.
    pub(crate) fn len(&self) -> usize {
        self.bytes.len().saturating_sub(self.cursor)
    }

    /// Get the absolute position of this cursor.
    pub(crate) fn position(&self) -> usize {
        self.cursor
    }

    /// Get a new cursor at the given absolute position.
    pub(crate) fn at(&self, pos: usize) -> Self {
        Self {
            bytes: self.bytes,
            cursor: pos,
        }
    }

    /// Advance the cursor by the given number of bytes.
    pub(crate) fn advance(mut self, n: usize) -> Result<Self, Error> {
        if n > self.len() {
            return Err(self.read_error(n));
        }

        self.cursor += n;
        Ok(self)
    }

    /// Take the next `n` bytes, returning them along with the advanced cursor.
    pub(crate) fn take(self, n: usize) -> Result<(&'a [u8], Self), Error> {
        let slice = self
            .remaining()
            .get(..n)
            .ok_or_else(|| self.read_error(n))?;
        Ok((slice, self.advance(n)?))
    }

    /// Error for when a read of `n` bytes failed.
    pub(crate) fn read_error(&self, n: usize) -> Error {
        Error::Truncated {
            tried_to_read: self.cursor.saturating_add(n),
            available: self.bytes.len(),
        }
    }
}

/// Make sure `bytes` has room for `needed` bytes.
pub(crate) fn ensure_space(bytes: &[u8], needed: usize) -> Result<(), Error> {
    if bytes.len() < needed {
        return Err(Error::NotEnoughWriteSpace {
            tried_to_write: needed,
            available: bytes.len(),
        });
    }

    Ok(())
}

macro_rules! serialize_num {
    ($($num_ty: ident),*) => {
        $(
            impl<'a> Serialize<'a> for $num_ty {
                fn serialized_len(&self) -> usize {
                    mem::size_of::<$num_ty>()
                }

                fn serialize(&self, bytes: &mut [u8]) -> Result<usize, Error> {
                    ensure_space(bytes, mem::size_of::<$num_ty>())?;

                    let value = (*self).to_be_bytes();
                    bytes[..mem::size_of::<$num_ty>()].copy_from_slice(&value);

                    Ok(mem::size_of::<$num_ty>())
                }

                fn deserialize(&mut self, bytes: Cursor<'a>) -> Result<Cursor<'a>, Error> {
                    let (raw, bytes) = bytes.take(mem::size_of::<$num_ty>())?;

                    let mut value = [0; mem::size_of::<$num_ty>()];
                    value.copy_from_slice(raw);
                    *self = $num_ty::from_be_bytes(value);

                    Ok(bytes)
                }
            }
        )*
    }
}

serialize_num! {
    u8, u16, u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_integers() {
        let bytes = [0x12, 0x34, 0xde, 0xad, 0xbe, 0xef];
        let cursor = Cursor::new(&bytes);

        let mut short = 0u16;
        let cursor = short.deserialize(cursor).unwrap();
        assert_eq!(short, 0x1234);

        let mut long = 0u32;
        let cursor = long.deserialize(cursor).unwrap();
        assert_eq!(long, 0xdead_beef);
        assert_eq!(cursor.len(), 0);
    }

    #[test]
    fn short_read_is_reported() {
        let bytes = [0x00, 0x01, 0x02];
        let cursor = Cursor::new(&bytes).advance(2).unwrap();

        let mut value = 0u16;
        match value.deserialize(cursor) {
            Err(Error::Truncated {
                tried_to_read,
                available,
            }) => {
                assert_eq!(tried_to_read, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn cursor_past_the_end_has_nothing_remaining() {
        let bytes = [1, 2, 3];
        let cursor = Cursor::new(&bytes).at(10);
        assert!(cursor.remaining().is_empty());
        assert_eq!(cursor.len(), 0);
        assert!(cursor.take(1).is_err());
    }

    #[test]
    fn write_needs_room() {
        let mut buf = [0u8; 1];
        assert!(matches!(
            0xabcdu16.serialize(&mut buf),
            Err(Error::NotEnoughWriteSpace {
                tried_to_write: 2,
                available: 1
            })
        ));

        let mut buf = [0u8; 2];
        assert_eq!(0xabcdu16.serialize(&mut buf).unwrap(), 2);
        assert_eq!(buf, [0xab, 0xcd]);
    }
}
