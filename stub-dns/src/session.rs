//! One query, one response.

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::transport::{Transport, UdpTransport, WaitResult};

use dns_wire::{parse_response, Answer, Error as WireError, QueryBuilder, ResourceType};

/// The record types a session can ask for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// The IPv4 address of the host.
    A,

    /// The mail exchange for the domain.
    Mx,
}

impl From<QueryType> for ResourceType {
    fn from(ty: QueryType) -> Self {
        match ty {
            QueryType::A => ResourceType::A,
            QueryType::Mx => ResourceType::MX,
        }
    }
}

/// Where a session is in its single round trip.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum State {
    /// Nothing has been sent yet.
    Idle,

    /// The query is out; waiting for the response.
    QuerySent,

    /// A response arrived and is being parsed.
    ResponseReceived,

    /// No response arrived in time.
    TimedOut,

    /// The answer was found.
    Done,

    /// The attempt failed for any other reason.
    Failed,
}

/// A single resolution attempt over a transport.
///
/// The session owns its transport until the attempt is over, then lets go of it
/// whichever way the attempt ended. Each session draws a random transaction ID.
#[derive(Debug)]
pub struct Session<T> {
    transport: Option<T>,
    config: ResolverConfig,
    id: u16,
    state: State,
}

impl<T: Transport> Session<T> {
    /// Create a session that will query the server in `config` over `transport`.
    pub fn new(transport: T, config: ResolverConfig) -> Self {
        Self {
            transport: Some(transport),
            config,
            id: fastrand::u16(..),
            state: State::Idle,
        }
    }

    /// The transaction ID this session uses.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Where the session is.
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the session still holds its transport.
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Resolve the `ty` record of `hostname`.
    ///
    /// Sends a single query and waits once for the response; nothing is retried.
    /// The transport is dropped before this returns, so a second call fails with
    /// [`ResolveError::SessionSpent`] and leaves the state alone.
    pub fn resolve(&mut self, hostname: &str, ty: QueryType) -> Result<Answer, ResolveError> {
        let mut transport = self.transport.take().ok_or(ResolveError::SessionSpent)?;

        let result = self.exchange(&mut transport, hostname, ty);
        drop(transport);

        self.state = match &result {
            Ok(_) => State::Done,
            Err(ResolveError::Timeout(_)) => State::TimedOut,
            Err(_) => State::Failed,
        };

        result
    }

    fn exchange(
        &mut self,
        transport: &mut T,
        hostname: &str,
        ty: QueryType,
    ) -> Result<Answer, ResolveError> {
        let server = self.config.server();
        let timeout = self.config.timeout();
        let wire_ty = ResourceType::from(ty);

        let query = QueryBuilder::new(hostname, wire_ty)
            .id(self.id)
            .recursion_desired(self.config.recursion_desired())
            .build()?;

        transport.send(&query, server)?;
        self.state = State::QuerySent;
        tracing::debug!(
            id = self.id,
            %server,
            hostname,
            ?ty,
            len = query.len(),
            "sent query"
        );

        let response = match transport.receive(self.config.buffer_size(), timeout)? {
            WaitResult::Packet(response) => response,
            WaitResult::TimedOut => {
                tracing::warn!(id = self.id, %server, ?timeout, "query timed out");
                return Err(ResolveError::Timeout(timeout));
            }
        };

        self.state = State::ResponseReceived;
        tracing::debug!(id = self.id, len = response.len(), "received response");

        match parse_response(&response, self.id, wire_ty) {
            Ok(answer) => {
                tracing::debug!(id = self.id, %answer, ttl = answer.ttl(), "resolved");
                Ok(answer)
            }
            Err(err) => {
                if let WireError::TransactionMismatch { expected, found } = err {
                    tracing::warn!(expected, found, %server, "dropping response to another query");
                }
                Err(err.into())
            }
        }
    }
}

/// Resolve the `ty` record of `hostname` using the server in `config`.
///
/// A UDP socket is opened for this one query and closed before returning.
///
/// ```no_run
/// use stub_dns::{resolve, QueryType, ResolverConfig};
/// use std::net::Ipv4Addr;
///
/// let config = ResolverConfig::new(Ipv4Addr::new(8, 8, 8, 8).into())
///     .with_recursion_desired(true);
/// let answer = resolve("www.sandiego.edu", QueryType::A, &config).unwrap();
/// println!("{}", answer);
/// ```
pub fn resolve(
    hostname: &str,
    ty: QueryType,
    config: &ResolverConfig,
) -> Result<Answer, ResolveError> {
    let transport = UdpTransport::bind_for(config.server())?;
    Session::new(transport, config.clone()).resolve(hostname, ty)
}
