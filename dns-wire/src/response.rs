//! Parsing responses down to the single answer we asked for.

use super::message::{Header, Question, ResourceRecord};
use super::name::{self, DomainName};
use super::ser::{Cursor, Serialize};
use super::{Error, ResourceType};

use alloc::string::String;
use core::convert::TryInto;
use core::fmt;
use core::net::Ipv4Addr;

/// The interpreted data of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    /// The IPv4 address of the host.
    A(Ipv4Addr),

    /// The mail exchange for the domain.
    Mx {
        /// Lower values are preferred.
        preference: u16,

        /// The host name of the mail exchange.
        exchange: String,
    },
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(addr) => fmt::Display::fmt(addr, f),
            RecordData::Mx { exchange, .. } => f.write_str(exchange),
        }
    }
}

/// The answer picked out of a response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Answer {
    name: DomainName,
    ttl: u32,
    data: RecordData,
}

impl Answer {
    /// The owner name of the record.
    pub fn name(&self) -> &DomainName {
        &self.name
    }

    /// The time-to-live of the record, in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// The interpreted record data.
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Unwrap into the record data.
    pub fn into_data(self) -> RecordData {
        self.data
    }
}

/// Formats as the address or the mail exchange host name.
impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.data, f)
    }
}

/// Parse `message` as the response to the query `expected_id` for `ty` records.
///
/// The questions are skipped and the answers are read in order; the first one of
/// type `ty` is interpreted and returned. Answers of other types are stepped over
/// without being looked at. The authority and additional sections are never read.
///
/// # Errors
///
/// - [`Error::UnsupportedType`] unless `ty` is `A` or `MX`.
/// - [`Error::TransactionMismatch`] if the message ID is not `expected_id`.
/// - [`Error::ServerError`] if the response code is not zero.
/// - [`Error::ResponseTruncated`] if the server set the truncation flag.
/// - [`Error::NoAnswers`] if the answer section is empty.
/// - [`Error::NoMatchingRecord`] if none of the answers are of type `ty`.
/// - [`Error::InvalidRecordData`] if the matching record's data is the wrong shape.
/// - [`Error::Truncated`] or [`Error::MalformedName`] if the message ends early or
///   contains a bad name.
pub fn parse_response(message: &[u8], expected_id: u16, ty: ResourceType) -> Result<Answer, Error> {
    if !matches!(ty, ResourceType::A | ResourceType::MX) {
        return Err(Error::UnsupportedType(ty.into()));
    }

    let mut header = Header::default();
    let mut cursor = header.deserialize(Cursor::new(message))?;

    if header.id() != expected_id {
        return Err(Error::TransactionMismatch {
            expected: expected_id,
            found: header.id(),
        });
    }

    let rcode = header.flags().rcode();
    if rcode != 0 {
        return Err(Error::ServerError(rcode));
    }

    if header.flags().truncated() {
        return Err(Error::ResponseTruncated);
    }

    for _ in 0..header.question_count() {
        let mut question = Question::default();
        cursor = question.deserialize(cursor)?;
    }

    if header.answer_count() == 0 {
        return Err(Error::NoAnswers);
    }

    // Every counted answer must be present, even after the first match.
    let wanted: u16 = ty.into();
    let mut first_match = None;
    for _ in 0..header.answer_count() {
        let mut record = ResourceRecord::default();
        cursor = record.deserialize(cursor)?;

        if first_match.is_none() && record.ty() == wanted {
            first_match = Some(record);
        }
    }

    match first_match {
        Some(record) => interpret(message, record, ty),
        None => Err(Error::NoMatchingRecord),
    }
}

/// Turn the record data into an answer.
fn interpret(message: &[u8], record: ResourceRecord<'_>, ty: ResourceType) -> Result<Answer, Error> {
    let raw = record.data();
    let invalid = || Error::InvalidRecordData {
        ty: ty.into(),
        len: raw.len(),
    };

    let data = match ty {
        ResourceType::A => {
            let octets: [u8; 4] = raw.try_into().map_err(|_| invalid())?;
            RecordData::A(Ipv4Addr::from(octets))
        }
        ResourceType::MX => {
            // A 16-bit preference, then the exchange name.
            if raw.len() < 3 {
                return Err(invalid());
            }

            let preference = u16::from_be_bytes([raw[0], raw[1]]);
            let start = record.data_offset() + 2;
            let (exchange, end) = name::decode(message, start)?;

            if end > record.data_offset() + raw.len() {
                return Err(invalid());
            }

            RecordData::Mx {
                preference,
                exchange,
            }
        }
        _ => return Err(Error::UnsupportedType(ty.into())),
    };

    Ok(Answer {
        ttl: record.ttl(),
        name: record.into_name(),
        data,
    })
}
