//! Errors produced while resolving a name.

use std::io;
use std::time::Duration;

/// A failed resolution.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// The query could not be built or the response could not be used.
    #[error(transparent)]
    Protocol(#[from] dns_wire::Error),

    /// No response arrived in time.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The socket failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The session already made its one attempt.
    #[error("session has already been used")]
    SessionSpent,
}

/// A flat classification of [`ResolveError`], one kind per failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A label of the hostname is longer than 63 bytes.
    LabelTooLong,

    /// The hostname is longer than 255 bytes once encoded.
    NameTooLong,

    /// A name in the response is malformed.
    MalformedName,

    /// The response ended early.
    TruncatedMessage,

    /// The response carries another query's ID.
    TransactionMismatch,

    /// The server answered with this response code.
    ServerError(u8),

    /// The server set the truncation flag.
    ResponseTruncated,

    /// The response had no answers.
    NoAnswers,

    /// No answer had the requested type.
    NoMatchingRecord,

    /// The matching record's data is the wrong shape.
    InvalidRecordData,

    /// No response arrived in time.
    Timeout,

    /// The socket failed.
    TransportIo,

    /// The session already made its one attempt.
    SessionSpent,

    /// Something else went wrong while encoding or decoding.
    Other,
}

impl ResolveError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use dns_wire::Error as Wire;

        match self {
            ResolveError::Protocol(err) => match err {
                Wire::LabelTooLong(_) => ErrorKind::LabelTooLong,
                Wire::NameTooLong(_) => ErrorKind::NameTooLong,
                Wire::MalformedName { .. } => ErrorKind::MalformedName,
                Wire::Truncated { .. } => ErrorKind::TruncatedMessage,
                Wire::TransactionMismatch { .. } => ErrorKind::TransactionMismatch,
                Wire::ServerError(code) => ErrorKind::ServerError(*code),
                Wire::ResponseTruncated => ErrorKind::ResponseTruncated,
                Wire::NoAnswers => ErrorKind::NoAnswers,
                Wire::NoMatchingRecord => ErrorKind::NoMatchingRecord,
                Wire::InvalidRecordData { .. } => ErrorKind::InvalidRecordData,
                _ => ErrorKind::Other,
            },
            ResolveError::Timeout(_) => ErrorKind::Timeout,
            ResolveError::Transport(_) => ErrorKind::TransportIo,
            ResolveError::SessionSpent => ErrorKind::SessionSpent,
        }
    }
}
