//! Resolution over a scripted transport and over a loopback UDP responder.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use stub_dns::{
    resolve, ErrorKind, QueryType, RecordData, ResolveError, ResolverConfig, Session, State,
    Transport, WaitResult,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config() -> ResolverConfig {
    ResolverConfig::new(Ipv4Addr::new(192, 0, 2, 53).into())
        .with_timeout(Duration::from_millis(100))
}

/// Answer a query: echo its header and question, then append one record whose
/// name points back at the question name.
fn answer(query: &[u8], ty: u16, rdata: &[u8]) -> Vec<u8> {
    let mut response = query.to_vec();
    response[2] |= 0x80; // QR
    response[6..8].copy_from_slice(&1u16.to_be_bytes());

    response.extend_from_slice(&[0xc0, 12]);
    response.extend_from_slice(&ty.to_be_bytes());
    response.extend_from_slice(&[0, 1, 0, 0, 0x0e, 0x10]);
    response.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    response.extend_from_slice(rdata);
    response
}

/// A transport that hands each query to a closure and remembers what it saw.
struct Scripted<F> {
    respond: F,
    sent: Vec<(Vec<u8>, SocketAddr)>,
    log: Arc<ScriptLog>,
}

#[derive(Default)]
struct ScriptLog {
    released: AtomicBool,
    sent_any: AtomicBool,
}

impl<F> Scripted<F>
where
    F: FnMut(&[u8]) -> io::Result<WaitResult>,
{
    fn new(respond: F) -> (Self, Arc<ScriptLog>) {
        let log = Arc::new(ScriptLog::default());
        (
            Self {
                respond,
                sent: Vec::new(),
                log: log.clone(),
            },
            log,
        )
    }
}

impl<F> Transport for Scripted<F>
where
    F: FnMut(&[u8]) -> io::Result<WaitResult>,
{
    fn send(&mut self, bytes: &[u8], dest: SocketAddr) -> io::Result<()> {
        self.sent.push((bytes.to_vec(), dest));
        self.log.sent_any.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn receive(&mut self, _capacity: usize, _timeout: Duration) -> io::Result<WaitResult> {
        let (query, _) = self
            .sent
            .last()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "nothing sent"))?;
        (self.respond)(query)
    }
}

impl<F> Drop for Scripted<F> {
    fn drop(&mut self) {
        self.log.released.store(true, Ordering::SeqCst);
    }
}

#[test]
fn a_record_end_to_end() {
    init_logging();
    let (transport, log) =
        Scripted::new(|query: &[u8]| Ok(WaitResult::Packet(answer(query, 1, &[192, 168, 0, 1]))));

    let mut session = Session::new(transport, config());
    assert_eq!(session.state(), State::Idle);

    let answer = session.resolve("www.sandiego.edu", QueryType::A).unwrap();
    assert_eq!(answer.to_string(), "192.168.0.1");
    assert_eq!(answer.name().as_str(), "www.sandiego.edu");
    assert_eq!(session.state(), State::Done);
    assert!(!session.has_transport());
    assert!(log.released.load(Ordering::SeqCst));
}

#[test]
fn query_layout() {
    init_logging();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen2 = seen.clone();
    let (transport, _) = Scripted::new(move |query: &[u8]| {
        *seen2.lock().unwrap() = query.to_vec();
        Ok(WaitResult::Packet(answer(query, 1, &[10, 0, 0, 1])))
    });

    let mut session = Session::new(transport, config());
    let id = session.id();
    session.resolve("www.sandiego.edu", QueryType::A).unwrap();

    let query = seen.lock().unwrap().clone();
    let mut expected = id.to_be_bytes().to_vec();
    expected.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0, 0, 0]);
    expected.extend_from_slice(b"\x03www\x08sandiego\x03edu\x00\x00\x01\x00\x01");
    assert_eq!(query, expected);
}

#[test]
fn recursion_desired_is_configurable() {
    let (transport, _) = Scripted::new(|query: &[u8]| {
        assert_eq!(query[2] & 0x01, 0x01, "RD bit should be set");
        Ok(WaitResult::Packet(answer(query, 1, &[10, 0, 0, 1])))
    });

    let config = config().with_recursion_desired(true);
    Session::new(transport, config)
        .resolve("example.com", QueryType::A)
        .unwrap();
}

#[test]
fn sends_to_configured_server() {
    let (mut transport, _) =
        Scripted::new(|query: &[u8]| Ok(WaitResult::Packet(answer(query, 1, &[10, 0, 0, 1]))));

    let config = config().with_port(5353);
    Session::new(&mut transport, config)
        .resolve("example.com", QueryType::A)
        .unwrap();

    assert_eq!(transport.sent.len(), 1);
    assert_eq!(transport.sent[0].1, "192.0.2.53:5353".parse().unwrap());
}

#[test]
fn mx_record_with_compressed_suffix() {
    init_logging();
    // "edu" sits 13 bytes into the question name, which starts at offset 12.
    let (transport, _) = Scripted::new(|query: &[u8]| {
        Ok(WaitResult::Packet(answer(
            query,
            15,
            &[0, 10, 4, b'm', b'a', b'i', b'l', 0xc0, 25],
        )))
    });

    let answer = Session::new(transport, config())
        .resolve("www.sandiego.edu", QueryType::Mx)
        .unwrap();
    assert_eq!(answer.to_string(), "mail.edu");
}

#[test]
fn mx_record_pointing_into_question() {
    // "sandiego.edu" starts 4 bytes into the question name.
    let (transport, _) = Scripted::new(|query: &[u8]| {
        Ok(WaitResult::Packet(answer(
            query,
            15,
            &[0, 5, 4, b'm', b'a', b'i', b'l', 0xc0, 16],
        )))
    });

    let answer = Session::new(transport, config())
        .resolve("www.sandiego.edu", QueryType::Mx)
        .unwrap();
    assert_eq!(
        answer.data(),
        &RecordData::Mx {
            preference: 5,
            exchange: "mail.sandiego.edu".into()
        }
    );
}

#[test]
fn timeout_releases_transport() {
    init_logging();
    let (transport, log) = Scripted::new(|_: &[u8]| Ok(WaitResult::TimedOut));

    let mut session = Session::new(transport, config());
    let err = session.resolve("www.sandiego.edu", QueryType::A).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(matches!(err, ResolveError::Timeout(t) if t == Duration::from_millis(100)));
    assert_eq!(session.state(), State::TimedOut);
    assert!(log.released.load(Ordering::SeqCst));
}

#[test]
fn mismatched_id_is_rejected() {
    let (transport, log) = Scripted::new(|query: &[u8]| {
        let mut response = answer(query, 1, &[192, 168, 0, 1]);
        response[1] = response[1].wrapping_add(1);
        Ok(WaitResult::Packet(response))
    });

    let mut session = Session::new(transport, config());
    let err = session.resolve("www.sandiego.edu", QueryType::A).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransactionMismatch);
    assert_eq!(session.state(), State::Failed);
    assert!(log.released.load(Ordering::SeqCst));
}

#[test]
fn server_error_is_reported() {
    let (transport, _) = Scripted::new(|query: &[u8]| {
        let mut response = query.to_vec();
        response[2] |= 0x80;
        response[3] |= 3; // NXDOMAIN
        Ok(WaitResult::Packet(response))
    });

    let err = Session::new(transport, config())
        .resolve("nope.sandiego.edu", QueryType::A)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerError(3));
}

#[test]
fn empty_and_unmatched_answers_are_distinct() {
    let (transport, _) = Scripted::new(|query: &[u8]| {
        let mut response = query.to_vec();
        response[2] |= 0x80;
        Ok(WaitResult::Packet(response))
    });
    let err = Session::new(transport, config())
        .resolve("www.sandiego.edu", QueryType::A)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoAnswers);

    let (transport, _) =
        Scripted::new(|query: &[u8]| Ok(WaitResult::Packet(answer(query, 1, &[192, 168, 0, 1]))));
    let err = Session::new(transport, config())
        .resolve("www.sandiego.edu", QueryType::Mx)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoMatchingRecord);
}

#[test]
fn truncated_response_is_reported() {
    let full = {
        let query = dns_wire::build_query("www.sandiego.edu", 1, dns_wire::ResourceType::A).unwrap();
        answer(&query, 1, &[192, 168, 0, 1])
    };

    for len in 0..full.len() {
        let (transport, log) = Scripted::new(|query: &[u8]| {
            let mut response = answer(query, 1, &[192, 168, 0, 1]);
            response.truncate(len);
            Ok(WaitResult::Packet(response))
        });

        let err = Session::new(transport, config())
            .resolve("www.sandiego.edu", QueryType::A)
            .unwrap_err();
        assert!(
            matches!(
                err.kind(),
                ErrorKind::TruncatedMessage | ErrorKind::MalformedName
            ),
            "length {}: {:?}",
            len,
            err
        );
        assert!(log.released.load(Ordering::SeqCst));
    }
}

#[test]
fn long_label_fails_before_sending() {
    let (transport, log) = Scripted::new(|_: &[u8]| Ok(WaitResult::TimedOut));
    let hostname = format!("{}.com", "a".repeat(64));

    let mut session = Session::new(transport, config());
    let err = session.resolve(&hostname, QueryType::A).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LabelTooLong);
    assert!(!log.sent_any.load(Ordering::SeqCst));
    assert!(log.released.load(Ordering::SeqCst));
}

#[test]
fn transport_failure_is_reported() {
    let (transport, log) = Scripted::new(|_: &[u8]| {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
    });

    let mut session = Session::new(transport, config());
    let err = session.resolve("www.sandiego.edu", QueryType::A).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportIo);
    assert_eq!(session.state(), State::Failed);
    assert!(log.released.load(Ordering::SeqCst));
}

#[test]
fn session_makes_one_attempt() {
    let (transport, _) =
        Scripted::new(|query: &[u8]| Ok(WaitResult::Packet(answer(query, 1, &[192, 168, 0, 1]))));

    let mut session = Session::new(transport, config());
    session.resolve("www.sandiego.edu", QueryType::A).unwrap();

    let err = session.resolve("www.sandiego.edu", QueryType::A).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SessionSpent);
    assert_eq!(session.state(), State::Done);
    assert!(!session.has_transport());
}

#[test]
fn udp_round_trip() {
    init_logging();
    let server = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = server.local_addr().unwrap();

    let responder = thread::spawn(move || {
        let mut buf = [0u8; 512];
        let (len, peer) = server.recv_from(&mut buf).unwrap();
        let response = answer(&buf[..len], 1, &[192, 168, 0, 1]);
        server.send_to(&response, peer).unwrap();
    });

    let config = ResolverConfig::from(addr).with_timeout(Duration::from_secs(5));
    let answer = resolve("www.sandiego.edu", QueryType::A, &config).unwrap();
    assert_eq!(answer.to_string(), "192.168.0.1");

    responder.join().unwrap();
}

#[test]
fn udp_timeout() {
    init_logging();
    // Bound but never answers.
    let server = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = server.local_addr().unwrap();

    let config = ResolverConfig::from(addr).with_timeout(Duration::from_millis(100));
    let err = resolve("www.sandiego.edu", QueryType::A, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);

    drop(server);
}
