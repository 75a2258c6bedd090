//! A minimal stub DNS resolver.
//!
//! Given a hostname and a nameserver, this crate sends a single query over UDP and
//! returns the first A or MX answer in the response. There is no caching, no
//! retrying and no recursion of our own; the wire format is handled by
//! [`dns-wire`], and the socket is driven by [`async-io`].
//!
//! [`dns-wire`]: dns_wire
//! [`async-io`]: https://crates.io/crates/async-io
//!
//! # Example
//!
//! ```no_run
//! use stub_dns::{resolve, QueryType, ResolverConfig};
//! use std::time::Duration;
//!
//! let config = ResolverConfig::new("8.8.8.8".parse().unwrap())
//!     .with_timeout(Duration::from_secs(2))
//!     .with_recursion_desired(true);
//!
//! match resolve("sandiego.edu", QueryType::Mx, &config) {
//!     Ok(answer) => println!("mail goes to {}", answer),
//!     Err(err) => eprintln!("could not resolve: {} ({:?})", err, err.kind()),
//! }
//! ```

#![forbid(unsafe_code, rust_2018_idioms)]

mod config;
mod error;
mod session;
mod transport;

pub use config::ResolverConfig;
pub use error::{ErrorKind, ResolveError};
pub use session::{resolve, QueryType, Session, State};
pub use transport::{Transport, UdpTransport, WaitResult};

pub use dns_wire::{Answer, RecordData};

fn _assert_threadsafe() {
    fn _assertion<T: Send + Sync>() {}
    _assertion::<Session<UdpTransport>>();
    _assertion::<ResolveError>();
}
