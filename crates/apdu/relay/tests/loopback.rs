//! Loopback tests with a fake bridge on the other end of the socket

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use pgpcard_apdu_core::prelude::*;
use pgpcard_transport_relay::{RelayConfig, RelayTransport};

fn loopback() -> RelayTransport {
    let config = RelayConfig::new().with_bind(SocketAddr::from(([127, 0, 0, 1], 0)));
    RelayTransport::bind(config).unwrap()
}

/// Fake bridge: one connection per scripted answer, returns the commands it saw
fn spawn_bridge(addr: SocketAddr, answers: Vec<&'static str>) -> thread::JoinHandle<Vec<String>> {
    thread::spawn(move || {
        let mut seen = Vec::new();
        for answer in answers {
            let mut stream = TcpStream::connect(addr).unwrap();
            let mut buf = [0u8; 512];
            let n = stream.read(&mut buf).unwrap();
            seen.push(hex::encode(&buf[..n]));
            stream.write_all(&hex::decode(answer).unwrap()).unwrap();
        }
        seen
    })
}

#[test]
fn relays_one_exchange() {
    let mut transport = loopback();
    let bridge = spawn_bridge(transport.local_addr(), vec!["0102039000"]);

    let response = transport.transmit_raw(&[0x00, 0xCA, 0x00, 0x6E, 0x00]).unwrap();
    assert_eq!(response.as_ref(), &[0x01, 0x02, 0x03, 0x90, 0x00]);
    assert!(transport.is_connected());

    assert_eq!(bridge.join().unwrap(), vec!["00ca006e00".to_string()]);
}

#[test]
fn executor_drains_continuation_over_relay() {
    let transport = loopback();
    let bridge = spawn_bridge(transport.local_addr(), vec!["aabb6102", "ccdd9000"]);

    let mut executor = CardExecutor::new(transport);
    let response = executor
        .transmit(&Command::new_with_le(0x00, 0xCA, 0x00, 0x65, 0x00))
        .unwrap();
    assert!(response.is_success());
    assert_eq!(response.payload(), &[0xAA, 0xBB, 0xCC, 0xDD]);

    assert_eq!(
        bridge.join().unwrap(),
        vec!["00ca006500".to_string(), "00c0000002".to_string()]
    );
}

#[test]
fn answer_split_across_segments_is_reassembled() {
    let mut transport = loopback();
    let addr = transport.local_addr();
    let bridge = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.set_nodelay(true).unwrap();
        let mut buf = [0u8; 16];
        let _ = stream.read(&mut buf).unwrap();
        stream.write_all(&[0x01, 0x02, 0x03]).unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(50));
        stream.write_all(&[0x90, 0x00]).unwrap();
    });

    let response = transport.transmit_raw(&[0x00, 0xF1, 0x00, 0x00, 0x00]).unwrap();
    assert_eq!(response.as_ref(), &[0x01, 0x02, 0x03, 0x90, 0x00]);
    bridge.join().unwrap();
}

#[test]
fn bridge_hang_up_is_a_transport_fault() {
    let transport = loopback();
    let addr = transport.local_addr();
    let bridge = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        let mut buf = [0u8; 16];
        let _ = stream.read(&mut buf);
        // Drop without answering
    });

    let mut executor = CardExecutor::new(transport);
    let err = executor
        .transmit(&Command::new_with_le(0x00, 0xF1, 0x00, 0x00, 0x00))
        .unwrap_err();
    assert!(err.is_transport_fault());
    bridge.join().unwrap();
}

#[test]
fn drop_stops_worker() {
    let transport = loopback();
    let addr = transport.local_addr();
    drop(transport);
    // Listener is gone with the worker
    assert!(TcpStream::connect(addr).is_err());
}
