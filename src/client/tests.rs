use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use super::connection::check_status;
use super::ticker::{self, TickerOptions};
use super::{Connection, ConnectionPool};
use crate::config::Settings;
use crate::protocol::Command;
use crate::test_support::{spawn_default_server, wait_until};
use crate::utils::JackError;

#[tokio::test]
async fn test_connection_round_trip() {
    let (addr, _store) = spawn_default_server().await;
    let mut conn = Connection::connect("127.0.0.1", addr.port()).await.unwrap();

    assert_eq!(conn.get("k").await.unwrap(), None);
    conn.set("k", "v").await.unwrap();
    assert_eq!(conn.get("k").await.unwrap().as_deref(), Some("v"));
    conn.delete("k").await.unwrap();
    assert_eq!(conn.get("k").await.unwrap(), None);
    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_subscription_receives_publish() {
    let (addr, store) = spawn_default_server().await;

    let sub_conn = Connection::connect("127.0.0.1", addr.port()).await.unwrap();
    let mut sub = sub_conn.subscribe("chat").await.unwrap();
    assert_eq!(sub.key(), "chat");
    assert!(wait_until(|| store.subscriber_count("chat") == 1).await);

    let mut publisher = Connection::connect("127.0.0.1", addr.port()).await.unwrap();
    publisher.publish("chat", "hello").await.unwrap();

    assert_eq!(sub.next().await.unwrap().as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = Connection::connect("127.0.0.1", port).await.unwrap_err();
    assert!(matches!(err, JackError::Io(_)));
}

#[tokio::test]
async fn test_pool_reuses_and_limits() {
    let (addr, _store) = spawn_default_server().await;
    let pool = ConnectionPool::new("127.0.0.1", addr.port(), 2);

    let a = pool.get().await.unwrap();
    let b = pool.get().await.unwrap();
    assert_eq!(pool.opened(), 2);

    let err = pool.get().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Connection Pool Error: Maximum connections reached."
    );

    pool.release(a);
    assert_eq!(pool.idle(), 1);
    let mut reused = pool.get().await.unwrap();
    assert_eq!(pool.opened(), 2);
    reused.set("x", "1").await.unwrap();

    drop(b);
}

#[tokio::test]
async fn test_pool_failed_dial_frees_slot() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let pool = ConnectionPool::new("127.0.0.1", port, 1);
    assert!(pool.get().await.is_err());
    assert_eq!(pool.opened(), 0);
}

#[tokio::test]
async fn test_ticker_reads_handshake_before_sending() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();

        let mut handshake = [0u8; 11];
        sock.read_exact(&mut handshake).await.unwrap();
        assert_eq!(&handshake, b"PUB testKey");

        // Nothing else may arrive until the reply is sent.
        let mut probe = [0u8; 1];
        let early = tokio::time::timeout(Duration::from_millis(200), sock.read(&mut probe)).await;
        assert!(early.is_err(), "ticker sent data before the handshake reply");

        sock.write_all(b"1").await.unwrap();

        let mut rest = Vec::new();
        sock.read_to_end(&mut rest).await.unwrap();
        rest
    });

    let opts = TickerOptions {
        address: "127.0.0.1".to_string(),
        port,
        key: "testKey".to_string(),
        interval: Duration::from_millis(20),
        count: Some(3),
    };
    assert_eq!(ticker::run(&opts).await.unwrap(), 3);

    let rest = server.await.unwrap();
    let text = String::from_utf8(rest).unwrap();
    assert!(text.chars().all(|c| c.is_ascii_digit() || c == '.'));
    assert_eq!(text.matches('.').count(), 3);
}

#[tokio::test]
async fn test_ticker_without_listener_fails_to_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let opts = TickerOptions {
        address: "127.0.0.1".to_string(),
        port,
        key: "testKey".to_string(),
        interval: Duration::from_millis(10),
        count: Some(1),
    };
    assert!(matches!(ticker::run(&opts).await, Err(JackError::Io(_))));
}

#[tokio::test]
async fn test_ticker_against_server_stores_timestamps() {
    let (addr, store) = spawn_default_server().await;
    let opts = TickerOptions {
        address: "127.0.0.1".to_string(),
        port: addr.port(),
        key: "clock".to_string(),
        interval: Duration::from_millis(10),
        count: Some(2),
    };
    ticker::run(&opts).await.unwrap();

    assert!(wait_until(|| store.get("clock").is_some()).await);
    let value = store.get("clock").unwrap();
    assert!(value.split('.').next().unwrap().parse::<i64>().unwrap() > 1_600_000_000);
}

#[test]
fn test_timestamp_format() {
    let ts = ticker::timestamp();
    let (secs, micros) = ts.split_once('.').unwrap();
    assert!(secs.parse::<i64>().is_ok());
    assert_eq!(micros.len(), 6);
}

#[tokio::test]
async fn test_ticker_rejects_zero_interval() {
    let (addr, store) = spawn_default_server().await;
    let mut settings = Settings::default();
    settings.client.address = "127.0.0.1".to_string();
    settings.client.port = addr.port();
    settings.ticker.interval_ms = 0;

    let mut opts = TickerOptions::from_settings(&settings);
    opts.count = Some(1);

    let err = ticker::run(&opts).await.unwrap_err();
    assert!(matches!(err, JackError::InvalidSettings { .. }));
    assert_eq!(store.get("testKey"), None);
}

#[test]
fn test_status_success_byte_is_ok() {
    assert!(check_status(Command::Set, b'1').is_ok());
}

#[test]
fn test_status_fail_byte_is_command_failed() {
    let err = check_status(Command::Delete, b'0').unwrap_err();
    assert!(matches!(err, JackError::CommandFailed { command: "DEL" }));
}

#[test]
fn test_status_other_byte_is_unexpected() {
    let err = check_status(Command::Publish, b'x').unwrap_err();
    assert!(matches!(
        err,
        JackError::UnexpectedResponse {
            command: "PUB",
            byte: b'x'
        }
    ));
}
