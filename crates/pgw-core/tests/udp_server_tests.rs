//! UDP request server tests against a real loopback socket

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pgw_core::{
    AdmissionPolicy, AuditAction, MemoryAuditSink, RequestServer, SessionTable,
};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct TestServer {
    addr: SocketAddr,
    table: Arc<SessionTable>,
    audit: Arc<MemoryAuditSink>,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start(max_sessions: usize) -> Self {
        let table = Arc::new(SessionTable::new(AdmissionPolicy::new(
            ["123456"],
            max_sessions,
            Duration::from_secs(30),
        )));
        let audit = Arc::new(MemoryAuditSink::new());

        let server = RequestServer::bind("127.0.0.1:0".parse().unwrap(), table.clone(), audit.clone())
            .await
            .expect("Failed to bind UDP server");
        let addr = server.local_addr();
        assert_ne!(addr.port(), 0);

        let token = CancellationToken::new();
        let handle = tokio::spawn(server.run(token.clone()));

        Self {
            addr,
            table,
            audit,
            token,
            handle,
        }
    }

    async fn stop(self) {
        self.token.cancel();
        tokio::time::timeout(Duration::from_secs(1), self.handle)
            .await
            .expect("UDP server did not stop")
            .unwrap();
    }
}

async fn send_request(server: SocketAddr, payload: &[u8]) -> String {
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(payload, server).await.unwrap();

    let mut buf = [0u8; 128];
    let (len, from) = tokio::time::timeout(Duration::from_secs(1), client.recv_from(&mut buf))
        .await
        .expect("no response received")
        .unwrap();
    assert_eq!(from, server);

    String::from_utf8_lossy(&buf[..len]).into_owned()
}

#[tokio::test]
async fn test_basic_request() {
    let server = TestServer::start(100).await;

    let response = send_request(server.addr, b"111222333444555").await;

    assert_eq!(response, "created");
    assert!(server.table.is_active("111222333444555"));
    assert_eq!(server.audit.count(AuditAction::Created), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_blacklisted_request() {
    let server = TestServer::start(100).await;

    let response = send_request(server.addr, b"123456").await;

    assert_eq!(response, "rejected");
    assert!(!server.table.is_active("123456"));
    assert_eq!(server.audit.count(AuditAction::Rejected), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_existing_session_reads_as_created() {
    let server = TestServer::start(100).await;

    assert_eq!(send_request(server.addr, b"001010000000001").await, "created");
    assert_eq!(send_request(server.addr, b"001010000000001").await, "created");

    // Only the audit trail tells the two apart
    let actions: Vec<_> = server.audit.events().iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![AuditAction::Created, AuditAction::Exists]);
    assert_eq!(server.table.size(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_limit_rejection() {
    let server = TestServer::start(1).await;

    assert_eq!(send_request(server.addr, b"A").await, "created");
    assert_eq!(send_request(server.addr, b"B").await, "rejected");
    assert_eq!(server.table.size(), 1);

    server.stop().await;
}

#[tokio::test]
async fn test_payload_is_not_validated() {
    let server = TestServer::start(100).await;

    assert_eq!(send_request(server.addr, b"not-an-imsi").await, "created");
    assert!(server.table.is_active("not-an-imsi"));

    assert_eq!(send_request(server.addr, b"").await, "created");
    assert!(server.table.is_active(""));

    server.stop().await;
}

#[tokio::test]
async fn test_stop_unblocks_idle_receive() {
    let server = TestServer::start(100).await;
    let addr = server.addr;
    let table = server.table.clone();

    // No traffic at all; cancellation alone must end the loop
    server.stop().await;

    // Datagrams after stop are not admitted
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let _ = client.send_to(b"999999999999999", addr).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!table.is_active("999999999999999"));
}
