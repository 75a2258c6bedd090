//! Domain names and their wire encoding.
//!
//! A name is sent as a sequence of length-prefixed labels ending in a zero byte,
//! so `www.sandiego.edu` becomes `(3)www(8)sandiego(3)edu(0)`. Inside of a message,
//! any suffix of a name may be replaced by a two byte pointer to an earlier
//! occurrence of that suffix (RFC 1035, Section 4.1.4).

use super::ser::{ensure_space, Cursor, Serialize};
use super::{Error, NameError};

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::iter;
use core::str;

/// The longest label that may appear in a name.
pub const MAX_LABEL_LEN: usize = 63;

/// The longest a name may be once encoded.
pub const MAX_NAME_LEN: usize = 255;

/// The number of compression pointers we follow before giving up on a name.
pub const MAX_POINTER_HOPS: usize = 128;

/// Top two bits of a length byte that mark a compression pointer.
const PTR_MASK: u8 = 0b1100_0000;

/// A dotted domain name, such as `mail.sandiego.edu`.
///
/// The root name is represented by the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomainName(String);

impl DomainName {
    /// Get the dotted representation of this name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get an iterator over the labels of this name.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split('.').filter(|label| !label.is_empty())
    }

    /// Unwrap into the dotted representation.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for DomainName {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<String> for DomainName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> Serialize<'a> for DomainName {
    fn serialized_len(&self) -> usize {
        encoded_len(&self.0)
    }

    fn serialize(&self, bytes: &mut [u8]) -> Result<usize, Error> {
        encode_into(&self.0, bytes)
    }

    fn deserialize(&mut self, cursor: Cursor<'a>) -> Result<Cursor<'a>, Error> {
        let (name, next) = decode(cursor.original(), cursor.position())?;
        self.0 = name;
        Ok(cursor.at(next))
    }
}

/// A single element of an encoded name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LabelSegment<'a> {
    /// The empty terminator.
    Empty,

    /// A literal label.
    Label(&'a [u8]),

    /// A pointer to a previous name.
    Pointer(u16),
}

impl Default for LabelSegment<'_> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<'a> Serialize<'a> for LabelSegment<'a> {
    fn serialized_len(&self) -> usize {
        match self {
            Self::Empty => 1,
            Self::Pointer(_) => 2,
            Self::Label(s) => 1 + s.len(),
        }
    }

    fn serialize(&self, bytes: &mut [u8]) -> Result<usize, Error> {
        match self {
            Self::Empty => {
                ensure_space(bytes, 1)?;
                bytes[0] = 0;
                Ok(1)
            }
            Self::Pointer(ptr) => {
                ensure_space(bytes, 2)?;

                // Apply the pointer mask to the first byte.
                let [mut b1, b2] = ptr.to_be_bytes();
                b1 |= PTR_MASK;
                bytes[0] = b1;
                bytes[1] = b2;
                Ok(2)
            }
            Self::Label(s) => {
                let len = s.len();

                if len > MAX_LABEL_LEN {
                    return Err(Error::LabelTooLong(len));
                }

                ensure_space(bytes, len + 1)?;
                bytes[0] = len as u8;
                bytes[1..=len].copy_from_slice(s);
                Ok(len + 1)
            }
        }
    }

    fn deserialize(&mut self, cursor: Cursor<'a>) -> Result<Cursor<'a>, Error> {
        let offset = cursor.position();
        let malformed = |reason| Error::MalformedName { offset, reason };

        // The type is determined by the top two bits of the first byte.
        let b1 = *cursor
            .remaining()
            .first()
            .ok_or_else(|| malformed(NameError::OutOfBounds))?;

        match b1 & PTR_MASK {
            PTR_MASK => {
                // A pointer is 14 bits: the low six of this byte, then all of the next.
                let b2 = *cursor
                    .remaining()
                    .get(1)
                    .ok_or_else(|| malformed(NameError::OutOfBounds))?;
                *self = Self::Pointer(u16::from_be_bytes([b1 & !PTR_MASK, b2]));
                Ok(cursor.at(offset + 2))
            }
            0 if b1 == 0 => {
                *self = Self::Empty;
                Ok(cursor.at(offset + 1))
            }
            0 => {
                let len = b1 as usize;
                let label = cursor
                    .remaining()
                    .get(1..=len)
                    .ok_or_else(|| malformed(NameError::OutOfBounds))?;
                *self = Self::Label(label);
                Ok(cursor.at(offset + 1 + len))
            }
            _ => Err(malformed(NameError::ReservedLabelType(b1))),
        }
    }
}

/// Split a dotted name into its label segments, ending with the terminator.
///
/// Empty segments are skipped, so a trailing dot is accepted and the empty
/// string yields just the terminator.
fn segments(name: &str) -> impl Iterator<Item = LabelSegment<'_>> + '_ {
    let bytes = name.as_bytes();
    let mut last_index = 0;

    memchr::memchr_iter(b'.', bytes)
        .chain(iter::once(bytes.len()))
        .filter_map(move |index| {
            let item = &bytes[last_index..index];
            last_index = index.saturating_add(1);

            if item.is_empty() {
                None
            } else {
                Some(LabelSegment::Label(item))
            }
        })
        .chain(iter::once(LabelSegment::Empty))
}

/// The number of bytes `name` takes up when encoded without compression.
pub fn encoded_len(name: &str) -> usize {
    segments(name)
        .map(|segment| segment.serialized_len())
        .fold(0, |a, b| a.saturating_add(b))
}

/// Encode `name` into the start of `bytes`, returning the number of bytes written.
///
/// # Errors
///
/// - [`Error::LabelTooLong`] if any label is longer than 63 bytes.
/// - [`Error::NameTooLong`] if the encoded name is longer than 255 bytes.
/// - [`Error::NotEnoughWriteSpace`] if `bytes` is too short.
pub fn encode_into(name: &str, bytes: &mut [u8]) -> Result<usize, Error> {
    if let Some(len) = segments(name).find_map(|segment| match segment {
        LabelSegment::Label(label) if label.len() > MAX_LABEL_LEN => Some(label.len()),
        _ => None,
    }) {
        return Err(Error::LabelTooLong(len));
    }

    let len = encoded_len(name);
    if len > MAX_NAME_LEN {
        return Err(Error::NameTooLong(len));
    }
    ensure_space(bytes, len)?;

    segments(name).try_fold(0, |offset, segment| {
        Ok(offset + segment.serialize(&mut bytes[offset..])?)
    })
}

/// Encode `name` into a freshly allocated buffer.
///
/// ```
/// let encoded = dns_wire::name::encode("www.sandiego.edu").unwrap();
/// assert_eq!(encoded, b"\x03www\x08sandiego\x03edu\x00");
/// ```
pub fn encode(name: &str) -> Result<Vec<u8>, Error> {
    let mut bytes = vec![0; encoded_len(name)];
    let len = encode_into(name, &mut bytes)?;
    bytes.truncate(len);
    Ok(bytes)
}

/// Decode the name starting at `start` in `message`.
///
/// Returns the dotted name along with the offset of the first byte after it. When
/// the name ends in a compression pointer, that is the byte right after the
/// pointer, regardless of where the pointer led.
///
/// Pointers must point strictly backwards from where they sit, which guarantees
/// that decoding terminates. [`MAX_POINTER_HOPS`] bounds the work regardless.
///
/// # Errors
///
/// Fails with [`Error::MalformedName`] if a length byte uses a reserved type,
/// a label or pointer runs off the end of the message, a pointer does not point
/// backwards, the name grows past 255 bytes or a label is not valid UTF-8.
pub fn decode(message: &[u8], start: usize) -> Result<(String, usize), Error> {
    let mut cursor = Cursor::new(message).at(start);
    let mut name = String::new();
    let mut resume = None;
    let mut hops = 0;
    let mut encoded = 0usize;

    loop {
        let offset = cursor.position();
        let mut segment = LabelSegment::Empty;
        cursor = segment.deserialize(cursor)?;

        match segment {
            LabelSegment::Empty => break,
            LabelSegment::Label(label) => {
                encoded += label.len() + 1;
                if encoded + 1 > MAX_NAME_LEN {
                    return Err(Error::MalformedName {
                        offset,
                        reason: NameError::TooLong,
                    });
                }

                let label = str::from_utf8(label).map_err(|err| Error::MalformedName {
                    offset,
                    reason: NameError::InvalidUtf8(err),
                })?;
                name.push_str(label);
                name.push('.');
            }
            LabelSegment::Pointer(target) => {
                let target = target as usize;

                if target >= offset {
                    return Err(Error::MalformedName {
                        offset,
                        reason: NameError::ForwardPointer { target },
                    });
                }

                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(Error::MalformedName {
                        offset,
                        reason: NameError::TooManyPointers,
                    });
                }

                // Only the first pointer decides where the caller picks up.
                resume.get_or_insert(cursor.position());
                cursor = cursor.at(target);
            }
        }
    }

    name.pop();
    Ok((name, resume.unwrap_or_else(|| cursor.position())))
}
