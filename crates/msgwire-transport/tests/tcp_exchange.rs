//! End-to-end exchanges against a real TCP peer on localhost.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use msgwire_codec::{encode_big, encode_small, CodecError, FrameCodec, SmallFraming};
use msgwire_transport::{
    CancellationToken, Client, ExchangeControl, TransportConfig, TransportError,
};

/// Accepts one connection, reads one small request frame and hands it to
/// `respond`, which writes whatever it likes back.
fn serve_once<F>(respond: F) -> (SocketAddr, JoinHandle<Vec<u8>>)
where
    F: FnOnce(&mut TcpStream, &[u8]) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_small_request(&mut stream);
        respond(&mut stream, &request);
        request
    });
    (addr, handle)
}

fn read_small_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 8];
    stream.read_exact(&mut header).unwrap();
    let total = i32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    let mut body = vec![0u8; usize::try_from(total).unwrap() - 8];
    stream.read_exact(&mut body).unwrap();
    let mut request = header.to_vec();
    request.extend_from_slice(&body);
    request
}

fn test_config() -> TransportConfig {
    TransportConfig {
        connect_timeout_ms: Some(1_000),
        exchange_timeout_ms: Some(5_000),
        ..TransportConfig::default()
    }
}

fn client() -> Client {
    Client::new(test_config()).unwrap()
}

#[test]
fn test_echo_roundtrip() {
    let (addr, server) = serve_once(|stream, request| {
        let codec = FrameCodec::default();
        let frame = codec.decode_small(request.to_vec().into()).unwrap();
        stream
            .write_all(&encode_small(frame.frame_type() + 1, frame.body()))
            .unwrap();
    });

    let request = encode_small(41, b"ping");
    let response = client().request(addr, &request).unwrap();

    assert_eq!(response.frame_type(), 42);
    assert_eq!(response.body().as_ref(), b"ping");
    assert_eq!(server.join().unwrap(), request.to_vec());
}

#[test]
fn test_split_writes_are_reassembled() {
    let (addr, server) = serve_once(|stream, _| {
        let response = encode_small(7, &[0x41, 0x42]);
        for part in [&response[..3], &response[3..8], &response[8..]] {
            stream.write_all(part).unwrap();
            stream.flush().unwrap();
            thread::sleep(Duration::from_millis(20));
        }
    });

    let response = client().request(addr, &encode_small(1, b"")).unwrap();
    assert_eq!(response.frame_type(), 7);
    assert_eq!(response.total_size(), 10);
    assert_eq!(response.body().as_ref(), &[0x41, 0x42]);
    server.join().unwrap();
}

#[test]
fn test_header_only_response() {
    let (addr, server) = serve_once(|stream, _| {
        stream.write_all(&encode_small(0, b"")).unwrap();
    });

    let response = client().request(addr, &encode_small(1, b"q")).unwrap();
    assert_eq!(response.total_size(), 8);
    assert!(response.body().is_empty());
    server.join().unwrap();
}

#[test]
fn test_big_response_over_tcp() {
    let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let expected = body.clone();
    let (addr, server) = serve_once(move |stream, _| {
        stream.write_all(&encode_big(&body)).unwrap();
    });

    let response = client().request_big(addr, &encode_small(2, b"blob")).unwrap();
    assert_eq!(response.total_size(), 200_008);
    assert_eq!(response.body().as_ref(), expected.as_slice());
    server.join().unwrap();
}

#[test]
fn test_over_capacity_response() {
    let (addr, server) = serve_once(|stream, _| {
        let mut header = 5i32.to_le_bytes().to_vec();
        header.extend_from_slice(&2000i32.to_le_bytes());
        stream.write_all(&header).unwrap();
        // Peer may see a reset once the client closes.
        let _ = stream.write_all(&[0u8; 1992]);
    });

    let err = client().request(addr, &encode_small(1, b"q")).unwrap_err();
    assert!(matches!(
        err,
        TransportError::Codec(CodecError::OverCapacity { declared: 2000, cap: 1024 })
    ));
    server.join().unwrap();
}

#[test]
fn test_peer_closes_mid_body() {
    let (addr, server) = serve_once(|stream, _| {
        let response = encode_small(1, b"0123456789");
        stream.write_all(&response[..11]).unwrap();
    });

    let err = client().request(addr, &encode_small(1, b"q")).unwrap_err();
    assert!(matches!(
        err,
        TransportError::Truncated {
            expected: 10,
            received: 3
        }
    ));
    server.join().unwrap();
}

#[test]
fn test_silent_peer_hits_deadline() {
    let (addr, server) = serve_once(|_, _| thread::sleep(Duration::from_millis(500)));

    let control = ExchangeControl::new().with_timeout(Duration::from_millis(150));
    let started = Instant::now();
    let err = client()
        .request_with::<SmallFraming>(addr, &encode_small(1, b"q"), control)
        .unwrap_err();

    assert!(matches!(err, TransportError::DeadlineExceeded { .. }));
    assert!(started.elapsed() < Duration::from_millis(500));
    server.join().unwrap();
}

#[test]
fn test_cancellation_from_another_thread() {
    let (addr, server) = serve_once(|_, _| thread::sleep(Duration::from_millis(500)));

    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        })
    };

    let control = ExchangeControl::new().with_cancellation(token);
    let err = client()
        .request_with::<SmallFraming>(addr, &encode_small(1, b"q"), control)
        .unwrap_err();

    assert!(matches!(err, TransportError::Cancelled));
    canceller.join().unwrap();
    server.join().unwrap();
}

#[test]
fn test_send_without_response() {
    let (addr, server) = serve_once(|_, _| {});

    let request = encode_small(9, b"fire and forget");
    client().send(addr, &request).unwrap();
    assert_eq!(server.join().unwrap(), request.to_vec());
}

#[test]
fn test_connect_failure_is_distinct() {
    let addr = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let err = client().request(addr, &encode_small(1, b"q")).unwrap_err();
    match err {
        TransportError::Connect { addr: failed, .. } => assert_eq!(failed, addr),
        other => panic!("expected connect failure, got {other:?}"),
    }
}
