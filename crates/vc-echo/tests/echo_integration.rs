//! Echo session integration tests
//!
//! Runs responder and initiator against each other over Unix sockets and
//! file-backed console ports.

use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

use vc_core::config::{RelayConfig, ResponderConfig};
use vc_core::{ContentDigest, ContentSource, ErrorKind};
use vc_echo::{
    ConsoleEndpoint, ConsoleRelay, Initiator, Responder, UnixEndpoint, UnixListenerEndpoint,
};
use vc_protocol::{encode, read_message, write_message, FrameHeader};

fn socket_responder_config() -> ResponderConfig {
    ResponderConfig {
        reopen_for_reply: false,
        ..ResponderConfig::default()
    }
}

async fn wait_for(path: &Path) {
    for _ in 0..50 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{:?} never appeared", path);
}

#[tokio::test]
async fn test_echo_hello_world_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");

    let responder = Responder::new(
        UnixListenerEndpoint::bind(&path).unwrap(),
        socket_responder_config(),
    );
    let server = tokio::spawn(async move { responder.run().await });

    let payload = ContentSource::default().generate().unwrap();
    let initiator =
        Initiator::new(UnixEndpoint::new(&path)).with_timeout(Some(Duration::from_secs(10)));
    let report = initiator.run(&payload).await.unwrap();

    let echoed = server.await.unwrap().unwrap();
    assert_eq!(echoed, payload);
    assert_eq!(report.sent_len, 64 * 1024);
    assert_eq!(report.received_len, report.sent_len);
    assert_eq!(report.digest, ContentDigest::of(&payload));
}

#[tokio::test]
async fn test_echo_empty_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");

    let responder = Responder::new(
        UnixListenerEndpoint::bind(&path).unwrap(),
        socket_responder_config(),
    );
    let server = tokio::spawn(async move { responder.run().await });

    let report = Initiator::new(UnixEndpoint::new(&path))
        .run(&[])
        .await
        .unwrap();

    assert!(server.await.unwrap().unwrap().is_empty());
    assert_eq!(report.received_len, 0);
}

#[tokio::test]
async fn test_corrupted_echo_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let message = read_message(&mut stream).await.unwrap();
        let mut corrupted = message.to_vec();
        corrupted[1000] ^= 0xFF;
        write_message(&mut stream, &corrupted).await.unwrap();
    });

    let source = ContentSource::Random { size: 20_000 };
    let err = Initiator::new(UnixEndpoint::new(&path))
        .run_with(&source)
        .await
        .unwrap_err();
    server.await.unwrap();

    assert_eq!(err.kind(), ErrorKind::Verification);
}

#[tokio::test]
async fn test_truncated_echo_is_framing_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let message = read_message(&mut stream).await.unwrap();
        let partial = encode(&message);
        stream.write_all(&partial[..partial.len() / 2]).await.unwrap();
    });

    let err = Initiator::new(UnixEndpoint::new(&path))
        .run(b"hello world hello world")
        .await
        .unwrap_err();
    server.await.unwrap();

    assert_eq!(err.kind(), ErrorKind::Framing);
}

#[tokio::test]
async fn test_silent_peer_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = read_message(&mut stream).await;
        // Hold the connection open without replying
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let err = Initiator::new(UnixEndpoint::new(&path))
        .with_timeout(Some(Duration::from_millis(200)))
        .run(b"anyone there?")
        .await
        .unwrap_err();
    server.abort();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_responder_times_out_waiting_for_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");

    let responder = Responder::new(
        UnixListenerEndpoint::bind(&path).unwrap(),
        ResponderConfig {
            timeout: Some(Duration::from_millis(200)),
            ..socket_responder_config()
        },
    );
    let server = tokio::spawn(async move { responder.run().await });

    // Connect but never send
    let _client = UnixStream::connect(&path).await.unwrap();

    let err = server.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_listener_responder_times_out_without_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");

    let responder = Responder::new(
        UnixListenerEndpoint::bind(&path).unwrap(),
        ResponderConfig {
            timeout: Some(Duration::from_millis(200)),
            ..socket_responder_config()
        },
    );

    let outcome = tokio::time::timeout(Duration::from_secs(5), responder.run())
        .await
        .expect("responder ignored its own timeout while accepting");
    assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_responder_times_out_when_reply_stalls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");

    let responder = Responder::new(
        UnixListenerEndpoint::bind(&path).unwrap(),
        ResponderConfig {
            timeout: Some(Duration::from_millis(500)),
            ..socket_responder_config()
        },
    );
    let server = tokio::spawn(async move { responder.run().await });

    // Far larger than the socket buffers, and the client never reads it back
    let message = vec![0x5a; 4 << 20];
    let mut client = UnixStream::connect(&path).await.unwrap();
    write_message(&mut client, &message).await.unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("responder ignored its own timeout while replying");
    assert_eq!(outcome.unwrap().unwrap_err().kind(), ErrorKind::Timeout);
    drop(client);
}

#[tokio::test]
async fn test_missing_socket_is_transport_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = Initiator::new(UnixEndpoint::new(dir.path().join("absent.sock")))
        .run(b"hello")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_console_responder_reopens_and_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let port = dir.path().join("tart-agent");
    let dump = dir.path().join("received.txt");
    let message = b"hello world".repeat(2000);
    std::fs::write(&port, encode(&message)).unwrap();

    let responder = Responder::new(
        ConsoleEndpoint::new(&port),
        ResponderConfig {
            device_path: port.clone(),
            dump_path: Some(dump.clone()),
            ..ResponderConfig::default()
        },
    );
    let echoed = responder.run().await.unwrap();

    assert_eq!(echoed.as_ref(), message.as_slice());
    assert_eq!(std::fs::read(&dump).unwrap(), message);
    // The reply was written from the start of a freshly opened handle
    assert_eq!(std::fs::read(&port).unwrap(), encode(&message).to_vec());
}

#[tokio::test]
async fn test_console_responder_rejects_truncated_frame() {
    let dir = tempfile::tempdir().unwrap();
    let port = dir.path().join("tart-agent");
    let mut bytes = FrameHeader::new(100).to_bytes().to_vec();
    bytes.extend_from_slice(&[7u8; 40]);
    std::fs::write(&port, &bytes).unwrap();

    let responder = Responder::new(ConsoleEndpoint::new(&port), ResponderConfig::default());
    let err = responder.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Framing);
    assert_eq!(std::fs::read(&port).unwrap(), bytes);
}

#[tokio::test]
async fn test_relay_bridges_socket_and_console() {
    let dir = tempfile::tempdir().unwrap();
    let config = RelayConfig {
        socket_path: dir.path().join("tart-agent.sock"),
        console_input: dir.path().join("console.out"),
        console_output: dir.path().join("console.in"),
    };
    std::fs::write(&config.console_input, encode(b"pong")).unwrap();
    std::fs::write(&config.console_output, b"").unwrap();

    let cancel = CancellationToken::new();
    let relay = ConsoleRelay::new(config.clone(), cancel.clone());
    let handle = tokio::spawn(async move { relay.run().await });
    wait_for(&config.socket_path).await;

    let mut client = UnixStream::connect(&config.socket_path).await.unwrap();
    write_message(&mut client, b"ping").await.unwrap();
    let reply = read_message(&mut client).await.unwrap();
    assert_eq!(reply.as_ref(), b"pong");

    // Console side reached end of stream, so the socket is half-closed
    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
    drop(client);

    let expected = encode(b"ping").to_vec();
    let mut delivered = Vec::new();
    for _ in 0..50 {
        delivered = std::fs::read(&config.console_output).unwrap();
        if delivered == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(delivered, expected);

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_relay_hands_console_bytes_to_next_connection() {
    let dir = tempfile::tempdir().unwrap();
    let config = RelayConfig {
        socket_path: dir.path().join("tart-agent.sock"),
        console_input: dir.path().join("console.out"),
        console_output: dir.path().join("console.in"),
    };
    let status = std::process::Command::new("mkfifo")
        .arg(&config.console_input)
        .status()
        .unwrap();
    assert!(status.success());
    std::fs::write(&config.console_output, b"").unwrap();

    // Opening a FIFO read-write does not wait for a reader
    let mut guest = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(&config.console_input)
        .unwrap();

    let cancel = CancellationToken::new();
    let relay = ConsoleRelay::new(config.clone(), cancel.clone());
    let handle = tokio::spawn(async move { relay.run().await });
    wait_for(&config.socket_path).await;

    // First client sends and hangs up while the console is still silent
    let mut first = UnixStream::connect(&config.socket_path).await.unwrap();
    write_message(&mut first, b"ping").await.unwrap();
    first.shutdown().await.unwrap();
    let mut rest = Vec::new();
    first.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
    assert_eq!(
        std::fs::read(&config.console_output).unwrap(),
        encode(b"ping").to_vec()
    );

    let mut second = UnixStream::connect(&config.socket_path).await.unwrap();
    guest.write_all(&encode(b"pong")).unwrap();
    let reply = tokio::time::timeout(Duration::from_secs(3), read_message(&mut second))
        .await
        .expect("console bytes never reached the second connection")
        .unwrap();
    assert_eq!(reply.as_ref(), b"pong");

    drop(second);
    // Closing the last writer ends the console read still in flight
    drop(guest);
    cancel.cancel();
    handle.await.unwrap().unwrap();
}
