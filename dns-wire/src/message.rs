//! The sections of a DNS message.

use super::name::DomainName;
use super::ser::{ensure_space, Cursor, Serialize};
use super::{Error, Flags};

use core::convert::TryFrom;

/// The class used for Internet names.
pub const CLASS_IN: u16 = 1;

serialize! {
    /// The header for a DNS message.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Header {
        /// The ID of this message.
        id: u16,

        /// The flags associated with this message.
        flags: Flags,

        /// The number of questions in this message.
        question_count: u16,

        /// The number of answers in this message.
        answer_count: u16,

        /// The number of authorities in this message.
        authority_count: u16,

        /// The number of additional records in this message.
        additional_count: u16,
    }
}

impl Header {
    /// The size of a header on the wire.
    pub const LEN: usize = 12;

    /// Create a header for a message with a single question and nothing else.
    pub fn query(id: u16, flags: Flags) -> Self {
        Self {
            id,
            flags,
            question_count: 1,
            ..Self::default()
        }
    }

    /// Read a header from the start of `message`.
    pub fn read(message: &[u8]) -> Result<Self, Error> {
        let mut header = Self::default();
        header.deserialize(Cursor::new(message))?;
        Ok(header)
    }

    /// Get the ID of this message.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Get the flags for this message.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Get the number of questions in this message.
    pub fn question_count(&self) -> u16 {
        self.question_count
    }

    /// Get the number of answers in this message.
    pub fn answer_count(&self) -> u16 {
        self.answer_count
    }

    /// Get the number of authority records in this message.
    pub fn authority_count(&self) -> u16 {
        self.authority_count
    }

    /// Get the number of additional records in this message.
    pub fn additional_count(&self) -> u16 {
        self.additional_count
    }
}

serialize! {
    /// The question in a DNS message.
    #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Question {
        /// The name of the question.
        name: DomainName,

        /// The type of the question.
        ty: u16,

        /// The class of the question.
        class: u16,
    }
}

impl Question {
    /// Create a new question.
    pub fn new(name: impl Into<DomainName>, ty: impl Into<u16>, class: u16) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            class,
        }
    }

    /// Get the name of the question.
    pub fn name(&self) -> &DomainName {
        &self.name
    }

    /// Get the type of the question.
    pub fn ty(&self) -> u16 {
        self.ty
    }

    /// Get the class of the question.
    pub fn class(&self) -> u16 {
        self.class
    }
}

serialize! {
    /// A resource record in a DNS message.
    ///
    /// The record data is kept as a slice of the message it was read from, since
    /// names inside of it may point anywhere in that message.
    #[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ResourceRecord<'a> {
        /// The name of the resource record.
        name: DomainName,

        /// The type of the resource record.
        ty: u16,

        /// The class of the resource record.
        class: u16,

        /// The time-to-live of the resource record.
        ttl: u32,

        /// The data of the resource record.
        data: ResourceData<'a>,
    }
}

impl<'a> ResourceRecord<'a> {
    /// Create a new `ResourceRecord` with uncompressed data.
    pub fn new(
        name: impl Into<DomainName>,
        ty: impl Into<u16>,
        class: u16,
        ttl: u32,
        data: &'a [u8],
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            class,
            ttl,
            data: ResourceData { bytes: data, offset: 0 },
        }
    }

    /// Get the name of the resource record.
    pub fn name(&self) -> &DomainName {
        &self.name
    }

    /// Take the name out of the resource record.
    pub fn into_name(self) -> DomainName {
        self.name
    }

    /// Get the type of the resource record.
    pub fn ty(&self) -> u16 {
        self.ty
    }

    /// Get the class of the resource record.
    pub fn class(&self) -> u16 {
        self.class
    }

    /// Get the time-to-live of the resource record.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Get the data of the resource record.
    pub fn data(&self) -> &'a [u8] {
        self.data.bytes
    }

    /// Get the offset of the record data within the message it was read from.
    pub fn data_offset(&self) -> usize {
        self.data.offset
    }
}

/// The resource stored in a resource record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ResourceData<'a> {
    /// The record data itself.
    bytes: &'a [u8],

    /// Where `bytes` starts in the original message.
    offset: usize,
}

impl<'a> Serialize<'a> for ResourceData<'a> {
    fn serialized_len(&self) -> usize {
        2 + self.bytes.len()
    }

    fn serialize(&self, bytes: &mut [u8]) -> Result<usize, Error> {
        let data_len = u16::try_from(self.bytes.len())
            .map_err(|_| Error::RecordDataTooLong(self.bytes.len()))?;

        let len = self.serialized_len();
        ensure_space(bytes, len)?;

        data_len.serialize(bytes)?;
        bytes[2..len].copy_from_slice(self.bytes);

        Ok(len)
    }

    fn deserialize(&mut self, cursor: Cursor<'a>) -> Result<Cursor<'a>, Error> {
        // Deserialize a u16 for the length
        let mut len = 0u16;
        let cursor = len.deserialize(cursor)?;

        self.offset = cursor.position();
        let (bytes, cursor) = cursor.take(len as usize)?;
        self.bytes = bytes;
        Ok(cursor)
    }
}
