//! Provisioning against a real TCP listener

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use ttm_link::{provision, shutdown, ProvisionError, TcpProvisioningLink};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_provision_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut conn, _) = listener.accept().await.unwrap();

        let mut buf = [0u8; 32];
        let n = conn.read(&mut buf).await.unwrap();
        let vehicle_id = String::from_utf8_lossy(&buf[..n]).into_owned();

        conn.write_all(b"5001").await.unwrap();

        // The client closes after reading the port
        let eof = conn.read(&mut buf).await.unwrap();
        (vehicle_id, eof)
    });

    let (_trigger, mut listener_shutdown) = shutdown::channel();
    let mut link = TcpProvisioningLink::new();
    let port = tokio::time::timeout(
        WAIT,
        provision(&mut link, server_addr, "199", &mut listener_shutdown),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(port, 5001);

    let (vehicle_id, eof) = tokio::time::timeout(WAIT, server).await.unwrap().unwrap();
    assert_eq!(vehicle_id, "199");
    assert_eq!(eof, 0);
}

#[tokio::test]
async fn test_provision_waits_for_server() {
    // Reserve a port, then release it so the first attempts are refused
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr: SocketAddr = probe.local_addr().unwrap();
    drop(probe);

    let server = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let listener = TcpListener::bind(server_addr).await.unwrap();
        let (mut conn, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 32];
        let _ = conn.read(&mut buf).await.unwrap();
        conn.write_all(b"6100\n").await.unwrap();
        let _ = conn.read(&mut buf).await;
    });

    let (_trigger, mut listener_shutdown) = shutdown::channel();
    let mut link = TcpProvisioningLink::new();
    let port = tokio::time::timeout(
        WAIT,
        provision(&mut link, server_addr, "199", &mut listener_shutdown),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(port, 6100);
    tokio::time::timeout(WAIT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_provision_cancelled() {
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_addr = probe.local_addr().unwrap();
    drop(probe);

    let (trigger, mut listener_shutdown) = shutdown::channel();
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        trigger.trigger();
    });

    let mut link = TcpProvisioningLink::new();
    let result = tokio::time::timeout(
        WAIT,
        provision(&mut link, server_addr, "199", &mut listener_shutdown),
    )
    .await
    .unwrap();

    assert_eq!(result, Err(ProvisionError::Cancelled));
    canceller.await.unwrap();
}
