//! Building query messages.

use super::message::{Header, Question, CLASS_IN};
use super::ser::Serialize;
use super::{Error, Flags, ResourceType};

use alloc::vec;
use alloc::vec::Vec;

/// Build a query for the `ty` records of `hostname`.
///
/// The query carries a single question of class IN. No flags are set, so this is
/// an iterative query: the server is not asked to recurse on our behalf.
///
/// ```
/// use dns_wire::{build_query, ResourceType};
///
/// let query = build_query("www.sandiego.edu", 5, ResourceType::A).unwrap();
/// assert_eq!(&query[..4], [0, 5, 0, 0]);
/// ```
///
/// # Errors
///
/// Fails with [`Error::LabelTooLong`] or [`Error::NameTooLong`] if `hostname`
/// can't be encoded.
pub fn build_query(hostname: &str, id: u16, ty: ResourceType) -> Result<Vec<u8>, Error> {
    QueryBuilder::new(hostname, ty).id(id).build()
}

/// A builder for a single-question query.
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    hostname: &'a str,
    ty: ResourceType,
    id: u16,
    recursion_desired: bool,
}

impl<'a> QueryBuilder<'a> {
    /// Start a query for the `ty` records of `hostname`.
    pub fn new(hostname: &'a str, ty: ResourceType) -> Self {
        Self {
            hostname,
            ty,
            id: 0,
            recursion_desired: false,
        }
    }

    /// Set the transaction ID.
    pub fn id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    /// Ask the server to resolve the name recursively.
    pub fn recursion_desired(mut self, recursion_desired: bool) -> Self {
        self.recursion_desired = recursion_desired;
        self
    }

    /// Serialize the query.
    pub fn build(&self) -> Result<Vec<u8>, Error> {
        let mut flags = Flags::new();
        flags.set_recursive(self.recursion_desired);

        let header = Header::query(self.id, flags);
        let question = Question::new(self.hostname, self.ty, CLASS_IN);

        let mut buf = vec![0; header.serialized_len() + question.serialized_len()];
        let mut offset = header.serialize(&mut buf)?;
        offset += question.serialize(&mut buf[offset..])?;
        buf.truncate(offset);

        Ok(buf)
    }
}
