//! Resolve a hostname's A record, or its MX record with `-m`.
//!
//! Usage: `lookup [-m] <hostname> [nameserver]`. The nameserver defaults to 8.8.8.8,
//! which only answers recursive queries, so recursion is requested. Set
//! `RUST_LOG=stub_dns=debug` to watch the exchange.

use std::env;
use std::net::IpAddr;
use std::process;

use stub_dns::{resolve, QueryType, ResolverConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Get the arguments/name to lookup.
    let mut args = env::args();
    let program_name = args.next().unwrap_or_else(|| "lookup".into());

    let mut ty = QueryType::A;
    let mut rest = vec![];
    for arg in args {
        if arg == "-m" {
            ty = QueryType::Mx;
        } else {
            rest.push(arg);
        }
    }

    let (hostname, server) = match rest.as_slice() {
        [hostname] => (hostname.as_str(), "8.8.8.8"),
        [hostname, server] => (hostname.as_str(), server.as_str()),
        _ => usage(&program_name),
    };

    let server: IpAddr = match server.parse() {
        Ok(server) => server,
        Err(_) => usage(&program_name),
    };

    let config = ResolverConfig::new(server).with_recursion_desired(true);

    // Perform the lookup.
    match resolve(hostname, ty, &config) {
        Ok(answer) => println!("Answer: {}", answer),
        Err(err) => {
            eprintln!("Could not resolve request: {}", err);
            process::exit(2);
        }
    }
}

fn usage(program_name: &str) -> ! {
    eprintln!("Usage: {} [-m] <hostname> [nameserver]", program_name);
    process::exit(1);
}
