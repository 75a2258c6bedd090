//! The DNS wire format for a stub resolver, [sans I/O].
//!
//! [sans I/O]: https://sans-io.readthedocs.io/
//!
//! This crate builds single-question queries and picks the answer out of the
//! response, handling name compression (RFC 1035, Section 4.1.4) along the way.
//! It does no I/O of its own; the bytes are expected to be carried over UDP
//! or some other transport by the caller.
//!
//! Decoding never panics. Every read is bounds-checked and reported as an
//! [`Error`], and compression pointers must point backwards in the message,
//! so hostile input can't make the decoder loop.
//!
//! This crate is `no_std`, but needs an allocator for the names it decodes.
//! It is also `#![forbid(unsafe_code)]`.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use dns_wire::{build_query, parse_response, ResourceType};
//! use std::net::UdpSocket;
//!
//! // Ask for the A record of www.sandiego.edu.
//! let query = build_query("www.sandiego.edu", 0x42, ResourceType::A)?;
//!
//! let socket = UdpSocket::bind("0.0.0.0:0")?;
//! socket.send_to(&query, "1.2.3.4:53")?;
//!
//! let mut buf = vec![0; 4096];
//! let len = socket.recv(&mut buf)?;
//!
//! let answer = parse_response(&buf[..len], 0x42, ResourceType::A)?;
//! println!("Answer: {}", answer);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `std` (enabled by default) - Implements `std::error::Error` for the error types.
//!   Disable this feature to use on `no_std` targets.

#![forbid(
    unsafe_code,
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    future_incompatible
)]
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use core::convert::TryFrom;
use core::fmt;
use core::str;

#[cfg(feature = "std")]
use std::error::Error as StdError;

/// Macro to implement `Serialize` for a struct.
macro_rules! serialize {
    (
        $(#[$outer:meta])*
        pub struct $name:ident $(<$lt: lifetime>)? {
            $(
                $(#[$inner:meta])*
                $vis: vis $field:ident: $ty:ty,
            )*
        }
    ) => {
        $(#[$outer])*
        pub struct $name $(<$lt>)? {
            $(
                $(#[$inner])*
                $vis $field: $ty,
            )*
        }

        impl<'a> Serialize<'a> for $name $(<$lt>)? {
            fn serialized_len(&self) -> usize {
                let mut len = 0;
                $(
                    len += self.$field.serialized_len();
                )*
                len
            }

            fn serialize(&self, cursor: &mut [u8]) -> Result<usize, Error> {
                let mut index = 0;
                $(
                    index += self.$field.serialize(&mut cursor[index..])?;
                )*
                Ok(index)
            }

            fn deserialize(&mut self, mut cursor: Cursor<'a>) -> Result<Cursor<'a>, Error> {
                $(
                    cursor = self.$field.deserialize(cursor)?;
                )*
                Ok(cursor)
            }
        }
    };
}

mod ser;
use ser::{Cursor, Serialize};

pub mod message;
pub mod name;
mod query;
mod response;

pub use message::{Header, Question, ResourceRecord, CLASS_IN};
pub use name::{DomainName, LabelSegment};
pub use query::{build_query, QueryBuilder};
pub use response::{parse_response, Answer, RecordData};

/// An enum with a bevy of given variants.
macro_rules! num_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$inner:meta])*
                $variant:ident = $value:expr,
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        // New codes may be added in the future.
        #[non_exhaustive]
        pub enum $name {
            $(
                $(#[$inner])*
                $variant = $value,
            )*
        }

        impl TryFrom<u16> for $name {
            type Error = InvalidCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $(
                        $value => Ok($name::$variant),
                    )*
                    _ => Err(InvalidCode(value)),
                }
            }
        }

        impl From<$name> for u16 {
            fn from(value: $name) -> Self {
                value as u16
            }
        }
    };
}

/// An error that may occur while building a query or reading a response.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// We are trying to write to a buffer, but the buffer doesn't have enough space.
    NotEnoughWriteSpace {
        /// The number of bytes we tried to write.
        tried_to_write: usize,

        /// The number of bytes that were available in the buffer.
        available: usize,
    },

    /// The message ended before we could read the entire value.
    Truncated {
        /// The offset we needed to read up to.
        tried_to_read: usize,

        /// The number of bytes in the message.
        available: usize,
    },

    /// A label was longer than 63 bytes.
    LabelTooLong(usize),

    /// A name was longer than 255 bytes once encoded.
    NameTooLong(usize),

    /// A name in the message could not be decoded.
    MalformedName {
        /// The offset of the offending length byte.
        offset: usize,

        /// What was wrong with it.
        reason: NameError,
    },

    /// The response does not belong to our query.
    TransactionMismatch {
        /// The ID we sent.
        expected: u16,

        /// The ID we got back.
        found: u16,
    },

    /// The server answered with a nonzero response code.
    ServerError(u8),

    /// The server set the truncation flag; the answer did not fit in the datagram.
    ResponseTruncated,

    /// The response had no answers.
    NoAnswers,

    /// None of the answers were of the requested type.
    NoMatchingRecord,

    /// The record data had the wrong shape for its type.
    InvalidRecordData {
        /// The type of the record.
        ty: u16,

        /// The length of its data.
        len: usize,
    },

    /// We don't know how to interpret records of this type.
    UnsupportedType(u16),

    /// Record data was too long for its 16-bit length field.
    RecordDataTooLong(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotEnoughWriteSpace {
                tried_to_write,
                available,
            } => {
                write!(
                    f,
                    "not enough write space: tried to write {} bytes, but only {} were available",
                    tried_to_write, available
                )
            }
            Error::Truncated {
                tried_to_read,
                available,
            } => {
                write!(
                    f,
                    "truncated message: tried to read up to byte {}, but only {} were available",
                    tried_to_read, available
                )
            }
            Error::LabelTooLong(len) => {
                write!(f, "label too long: label was {} bytes long", len)
            }
            Error::NameTooLong(len) => {
                write!(f, "name too long: name was {} bytes long", len)
            }
            Error::MalformedName { offset, reason } => {
                write!(f, "malformed name at offset {}: {}", offset, reason)
            }
            Error::TransactionMismatch { expected, found } => {
                write!(
                    f,
                    "transaction mismatch: expected ID {}, got {}",
                    expected, found
                )
            }
            Error::ServerError(code) => match ResponseCode::try_from(u16::from(*code)) {
                Ok(name) => write!(f, "server error: {:?} ({})", name, code),
                Err(_) => write!(f, "server error: code {}", code),
            },
            Error::ResponseTruncated => f.write_str("response was truncated by the server"),
            Error::NoAnswers => f.write_str("response contained no answers"),
            Error::NoMatchingRecord => f.write_str("no answer of the requested type"),
            Error::InvalidRecordData { ty, len } => {
                write!(
                    f,
                    "invalid record data: {} bytes is not valid for type {}",
                    len, ty
                )
            }
            Error::UnsupportedType(ty) => {
                write!(f, "unsupported record type: {}", ty)
            }
            Error::RecordDataTooLong(len) => {
                write!(f, "record data too long: {} bytes does not fit in 16 bits", len)
            }
        }
    }
}

#[cfg(feature = "std")]
impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::MalformedName { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Why a name could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NameError {
    /// The length byte started with the reserved bit patterns `01` or `10`.
    ReservedLabelType(u8),

    /// A label or pointer ran past the end of the message.
    OutOfBounds,

    /// A compression pointer did not point backwards.
    ForwardPointer {
        /// Where the pointer pointed.
        target: usize,
    },

    /// Too many compression pointers were followed.
    TooManyPointers,

    /// The name was longer than 255 bytes.
    TooLong,

    /// A label was not valid UTF-8.
    InvalidUtf8(str::Utf8Error),
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::ReservedLabelType(byte) => {
                write!(f, "reserved label type in length byte {:#04x}", byte)
            }
            NameError::OutOfBounds => f.write_str("name runs past the end of the message"),
            NameError::ForwardPointer { target } => {
                write!(f, "compression pointer to offset {} does not point backwards", target)
            }
            NameError::TooManyPointers => f.write_str("too many compression pointers"),
            NameError::TooLong => f.write_str("name is longer than 255 bytes"),
            NameError::InvalidUtf8(err) => write!(f, "invalid UTF-8: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl StdError for NameError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            NameError::InvalidUtf8(err) => Some(err),
            _ => None,
        }
    }
}

/// The flags associated with a DNS message.
#[derive(Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Flags(u16);

impl Flags {
    // Values used to manipulate the inside.
    const RAW_QR: u16 = 1 << 15;
    const RAW_OPCODE_SHIFT: u16 = 11;
    const RAW_OPCODE_MASK: u16 = 0b1111;
    const RAW_AA: u16 = 1 << 10;
    const RAW_TC: u16 = 1 << 9;
    const RAW_RD: u16 = 1 << 8;
    const RAW_RA: u16 = 1 << 7;
    const RAW_RCODE_SHIFT: u16 = 0;
    const RAW_RCODE_MASK: u16 = 0b1111;

    /// Create a new, empty set of flags.
    ///
    /// This is a standard iterative query.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create flags from their raw value.
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Get the query/response flag.
    pub fn qr(&self) -> MessageType {
        if self.0 & Self::RAW_QR != 0 {
            MessageType::Reply
        } else {
            MessageType::Query
        }
    }

    /// Set the message's query/response flag.
    pub fn set_qr(&mut self, qr: MessageType) -> &mut Self {
        self.set_bit(Self::RAW_QR, qr == MessageType::Reply)
    }

    /// Get the opcode.
    pub fn opcode(&self) -> Result<Opcode, InvalidCode> {
        Opcode::try_from((self.0 >> Self::RAW_OPCODE_SHIFT) & Self::RAW_OPCODE_MASK)
    }

    /// Get whether this message is authoritative.
    pub fn authoritative(&self) -> bool {
        self.0 & Self::RAW_AA != 0
    }

    /// Set whether this message is authoritative.
    pub fn set_authoritative(&mut self, authoritative: bool) -> &mut Self {
        self.set_bit(Self::RAW_AA, authoritative)
    }

    /// Get whether this message is truncated.
    pub fn truncated(&self) -> bool {
        self.0 & Self::RAW_TC != 0
    }

    /// Set whether this message is truncated.
    pub fn set_truncated(&mut self, truncated: bool) -> &mut Self {
        self.set_bit(Self::RAW_TC, truncated)
    }

    /// Get whether recursion is desired.
    pub fn recursive(&self) -> bool {
        self.0 & Self::RAW_RD != 0
    }

    /// Set whether recursion is desired.
    pub fn set_recursive(&mut self, recursive: bool) -> &mut Self {
        self.set_bit(Self::RAW_RD, recursive)
    }

    /// Get whether recursion is available for this message.
    pub fn recursion_available(&self) -> bool {
        self.0 & Self::RAW_RA != 0
    }

    /// Set whether recursion is available for this message.
    pub fn set_recursion_available(&mut self, recursion_available: bool) -> &mut Self {
        self.set_bit(Self::RAW_RA, recursion_available)
    }

    /// Get the raw four bit response code.
    pub fn rcode(&self) -> u8 {
        ((self.0 >> Self::RAW_RCODE_SHIFT) & Self::RAW_RCODE_MASK) as u8
    }

    /// Get the response code.
    pub fn response_code(&self) -> Result<ResponseCode, InvalidCode> {
        ResponseCode::try_from(u16::from(self.rcode()))
    }

    /// Set the response code.
    pub fn set_response_code(&mut self, response_code: ResponseCode) -> &mut Self {
        self.0 &= !(Self::RAW_RCODE_MASK << Self::RAW_RCODE_SHIFT);
        self.0 |= ((response_code as u16) & Self::RAW_RCODE_MASK) << Self::RAW_RCODE_SHIFT;
        self
    }

    /// Get the raw value of these flags.
    pub fn raw(self) -> u16 {
        self.0
    }

    fn set_bit(&mut self, bit: u16, value: bool) -> &mut Self {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }

        self
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();

        list.entry(&self.qr());
        match self.opcode() {
            Ok(opcode) => list.entry(&opcode),
            Err(err) => list.entry(&err),
        };

        if self.authoritative() {
            list.entry(&"authoritative");
        }

        if self.truncated() {
            list.entry(&"truncated");
        }

        if self.recursive() {
            list.entry(&"recursive");
        }

        if self.recursion_available() {
            list.entry(&"recursion available");
        }

        match self.response_code() {
            Ok(code) => list.entry(&code),
            Err(err) => list.entry(&err),
        };

        list.finish()
    }
}

impl<'a> Serialize<'a> for Flags {
    fn serialized_len(&self) -> usize {
        2
    }

    fn serialize(&self, buf: &mut [u8]) -> Result<usize, Error> {
        self.0.serialize(buf)
    }

    fn deserialize(&mut self, bytes: Cursor<'a>) -> Result<Cursor<'a>, Error> {
        u16::deserialize(&mut self.0, bytes)
    }
}

/// Whether a message is a query or a reply.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageType {
    /// The message is a query.
    Query,

    /// The message is a reply.
    Reply,
}

num_enum! {
    /// The operation code for the query.
    pub enum Opcode {
        /// A standard query.
        Query = 0,

        /// A reverse query.
        IQuery = 1,

        /// A server status request.
        Status = 2,

        /// A notification of zone change.
        Notify = 4,

        /// A dynamic update.
        Update = 5,

        /// DSO query.
        Dso = 6,
    }
}

num_enum! {
    /// The response code for a query.
    pub enum ResponseCode {
        /// There was no error in the query.
        NoError = 0,

        /// The query was malformed.
        FormatError = 1,

        /// The server failed to fulfill the query.
        ServerFailure = 2,

        /// The name does not exist.
        NameError = 3,

        /// The query is not implemented.
        NotImplemented = 4,

        /// The query is refused.
        Refused = 5,

        /// A name exists when it should not.
        YxDomain = 6,

        /// A record set exists when it should not.
        YxRrSet = 7,

        /// A record set that should exist does not.
        NxRrSet = 8,

        /// The server is not authoritative for the zone.
        NotAuth = 9,

        /// The name does not exist in the zone.
        NotZone = 10,

        /// The DSO-TYPE is not supported.
        DsoTypeNi = 11,
    }
}

num_enum! {
    /// The resource types that a question can ask for.
    ///
    /// Only `A` and `MX` answers can be interpreted; `AAAA` can be asked for but
    /// is refused by [`parse_response`].
    pub enum ResourceType {
        /// Get the host's IPv4 address.
        A = 1,

        /// Get the mail exchange for a domain.
        MX = 15,

        /// Get the IPv6 address for a domain.
        AAAA = 28,
    }
}

/// The given value is not a valid code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCode(u16);

impl InvalidCode {
    /// Get the invalid code.
    pub fn code(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for InvalidCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid code: {}", self.0)
    }
}

#[cfg(feature = "std")]
impl StdError for InvalidCode {}
