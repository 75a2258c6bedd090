//! Synchronous implementation of a one-shot `nslookup`, using `dns-wire`.
//!
//! Usage: `nslookup [-m] <name> <nameserver>`

use std::env;
use std::net::{IpAddr, UdpSocket};
use std::process;
use std::time::Duration;

use dns_wire::{build_query, parse_response, ResourceType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args();
    let program_name = args.next().unwrap_or_else(|| "nslookup".into());

    let mut ty = ResourceType::A;
    let mut rest = vec![];
    for arg in args {
        if arg == "-m" {
            ty = ResourceType::MX;
        } else {
            rest.push(arg);
        }
    }

    let (name, nameserver) = match rest.as_slice() {
        [name, nameserver] => (name.clone(), nameserver.parse::<IpAddr>()?),
        _ => {
            eprintln!("Usage: {} [-m] <name> <nameserver>", &program_name);
            process::exit(1);
        }
    };

    println!("Nameserver: {}", nameserver);

    // Create the message we need to send.
    let id = 0xFEE7;
    let query = build_query(&name, id, ty)?;

    // Send the packet to our nameserver over UDP.
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.set_read_timeout(Some(Duration::from_secs(5)))?;
    socket.send_to(&query, (nameserver, 53))?;

    // Wait for a response.
    let mut buffer = vec![0; 4096];
    let len = socket.recv(&mut buffer)?;

    // Parse the response.
    let answer = parse_response(&buffer[..len], id, ty)?;
    println!("{} ({}s): {}", answer.name(), answer.ttl(), answer);

    Ok(())
}
