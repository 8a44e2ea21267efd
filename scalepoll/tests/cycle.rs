//! End-to-end polling cycles against a fake scale on localhost
//!
//! The fake answers discovery on UDP and weight queries on TCP, both on the
//! same port number, as the real scale does.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

use scalepoll::config::{DeviceConfig, ReadModeSetting};
use scalepoll::{Error, MemorySink, Poller, Reading, Scale};

/// Weight response for weight=1234, division=1, stable=1
const WEIGHT_RESPONSE: [u8; 14] = [
    0xF8, 0x55, 0xCE, 0x07, 0x00, 0xA0, 0xD2, 0x04, 0x00, 0x00, 0x01, 0x01, 0xB2, 0xCE,
];

struct FakeScale {
    port: u16,
    udp: JoinHandle<()>,
    tcp: Option<JoinHandle<Vec<u8>>>,
}

impl FakeScale {
    /// Answers one discovery poll and serves `responses` to one TCP session
    async fn start(responses: Vec<Vec<u8>>) -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let udp = answer_discovery(port).await;

        let tcp = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8];
            socket.read_exact(&mut request).await.unwrap();

            for chunk in responses {
                let _ = socket.write_all(&chunk).await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
            request
        });

        Self {
            port,
            udp,
            tcp: Some(tcp),
        }
    }

    /// Answers discovery, but nothing listens for TCP on that port
    async fn start_without_tcp() -> Self {
        let port = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
            listener.local_addr().unwrap().port()
        };

        Self {
            port,
            udp: answer_discovery(port).await,
            tcp: None,
        }
    }

    fn config(&self) -> DeviceConfig {
        DeviceConfig {
            host: "127.0.0.1".to_string(),
            port: self.port,
            discovery_timeout_ms: 2000,
            connect_timeout_ms: 1000,
            read_timeout_ms: 1000,
            ..DeviceConfig::default()
        }
    }

    async fn request(self) -> Vec<u8> {
        self.udp.abort();
        self.tcp.expect("fake has no TCP side").await.unwrap()
    }
}

async fn answer_discovery(port: u16) -> JoinHandle<()> {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, port)).await.unwrap();

    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        let (n, from): (usize, SocketAddr) = socket.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0xF8, 0x55, 0xCE, 0x00, 0x00, 0x00, 0x00]);
        socket.send_to(&[0xF8, 0x55, 0xCE], from).await.unwrap();
    })
}

#[tokio::test]
async fn test_connected_cycle_records_reading() {
    let fake = FakeScale::start(vec![WEIGHT_RESPONSE.to_vec()]).await;
    let sink = MemorySink::new();
    let mut poller = Poller::new(Scale::new(&fake.config()).unwrap(), sink.clone());

    let record = poller.poll_once().await;

    assert_eq!(record.columns(), (1234, 1, 1, 1));
    assert_eq!(record.reading(), Some(Reading::new(1234, 1, 1)));
    assert_eq!(sink.records(), vec![record]);

    let request = fake.request().await;
    assert_eq!(request, vec![0xF8, 0x55, 0xCE, 0x00, 0x01, 0xA0, 0x00, 0xA0]);
}

#[tokio::test]
async fn test_discovery_timeout_records_not_connected() {
    let silent = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let config = DeviceConfig {
        host: "127.0.0.1".to_string(),
        port: silent.local_addr().unwrap().port(),
        discovery_timeout_ms: 200,
        ..DeviceConfig::default()
    };

    let scale = Scale::new(&config).unwrap();
    assert!(matches!(
        scale.read_weight().await,
        Err(Error::DiscoveryTimeout(_))
    ));

    let sink = MemorySink::new();
    let mut poller = Poller::new(scale, sink.clone());
    let record = poller.poll_once().await;

    assert_eq!(record.columns(), (0, 0, 0, 0));
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_connect_failure_records_not_connected() {
    let fake = FakeScale::start_without_tcp().await;
    let sink = MemorySink::new();
    let mut poller = Poller::new(Scale::new(&fake.config()).unwrap(), sink.clone());

    let record = poller.poll_once().await;

    assert_eq!(record.columns(), (0, 0, 0, 0));
    assert_eq!(sink.records(), vec![record]);
}

#[tokio::test]
async fn test_segmented_response_is_reassembled() {
    let fake = FakeScale::start(vec![
        WEIGHT_RESPONSE[..4].to_vec(),
        WEIGHT_RESPONSE[4..].to_vec(),
    ])
    .await;

    let reading = Scale::new(&fake.config()).unwrap().read_weight().await.unwrap();
    assert_eq!(reading, Reading::new(1234, 1, 1));
}

#[tokio::test]
async fn test_single_read_mode_surfaces_short_frame() {
    let fake = FakeScale::start(vec![
        WEIGHT_RESPONSE[..9].to_vec(),
        WEIGHT_RESPONSE[9..].to_vec(),
    ])
    .await;
    let config = DeviceConfig {
        read_mode: ReadModeSetting::Single,
        ..fake.config()
    };

    let result = Scale::new(&config).unwrap().read_weight().await;

    match result {
        Err(e @ Error::Protocol(scalepoll_core::Error::MalformedFrame { expected: 14, actual: 9 })) => {
            assert!(e.is_protocol_drift());
        }
        other => panic!("expected malformed frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_response_records_not_connected() {
    let fake = FakeScale::start(vec![]).await;
    let config = DeviceConfig {
        read_mode: ReadModeSetting::Single,
        ..fake.config()
    };

    let scale = Scale::new(&config).unwrap();
    let sink = MemorySink::new();
    let mut poller = Poller::new(scale, sink.clone());

    let record = poller.poll_once().await;
    assert_eq!(record.columns(), (0, 0, 0, 0));
}

#[tokio::test]
async fn test_wrong_size_response_never_yields_reading() {
    let mut oversized = WEIGHT_RESPONSE.to_vec();
    oversized[3] = 0x08;
    oversized.push(0x00);
    let fake = FakeScale::start(vec![oversized]).await;

    let result = Scale::new(&fake.config()).unwrap().read_weight().await;
    assert!(matches!(
        result,
        Err(Error::Protocol(scalepoll_core::Error::MalformedFrame { actual: 15, .. }))
    ));
}
