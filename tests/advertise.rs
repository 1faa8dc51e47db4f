use std::net::Ipv6Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hr_radv6::config::InterfaceConfig;
use hr_radv6::facts::InterfaceFacts;
use hr_radv6::metrics::Metrics;
use hr_radv6::socket::{DialContext, Dialer, IcmpSocket};
use hr_radv6::system::SystemState;
use hr_radv6::wire::{decode, NdMessage};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

struct FakeSocket {
    sent: Mutex<Vec<(Vec<u8>, Ipv6Addr)>>,
    inbound: Mutex<std::collections::VecDeque<(Vec<u8>, u8, Ipv6Addr)>>,
}

impl FakeSocket {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            inbound: Mutex::new(std::collections::VecDeque::new()),
        }
    }
}

#[async_trait]
impl IcmpSocket for FakeSocket {
    async fn recv_from(&self) -> std::io::Result<(Vec<u8>, u8, Ipv6Addr)> {
        loop {
            if let Some(next) = self.inbound.lock().await.pop_front() {
                return Ok(next);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn send_to(&self, data: &[u8], dst: Ipv6Addr) -> std::io::Result<()> {
        self.sent.lock().await.push((data.to_vec(), dst));
        Ok(())
    }
}

struct FakeDialer {
    socket: Arc<FakeSocket>,
}

#[async_trait]
impl Dialer for FakeDialer {
    async fn dial(&self) -> anyhow::Result<DialContext> {
        Ok(DialContext {
            socket: self.socket.clone(),
            facts: InterfaceFacts {
                mac: [0x02, 0, 0, 0, 0, 1],
                link_local: "fe80::1".parse().unwrap(),
                mtu: 1500,
                index: 1,
            },
        })
    }
}

struct AlwaysForwarding;

#[async_trait]
impl SystemState for AlwaysForwarding {
    async fn ipv6_forwarding(&self, _interface: &str) -> anyhow::Result<bool> {
        Ok(true)
    }
}

fn test_config() -> InterfaceConfig {
    serde_json::from_str(
        r#"{"interface": "eth0", "min_interval": 200, "max_interval": 600, "unicast_only": true}"#,
    )
    .unwrap()
}

#[tokio::test]
async fn probes_immediately_on_startup() {
    let socket = Arc::new(FakeSocket::new());
    let dialer = FakeDialer {
        socket: socket.clone(),
    };
    let metrics = Arc::new(Metrics::new(&prometheus::Registry::new()).unwrap());
    let cancel = CancellationToken::new();

    let inner_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        hr_radv6::advertise(
            &dialer,
            test_config(),
            Vec::new(),
            Arc::new(AlwaysForwarding),
            metrics,
            None,
            inner_cancel,
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!socket.sent.lock().await.is_empty(), "expected an immediate probe RA");

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("advertise should stop promptly after cancellation")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn shutdown_sends_zero_lifetime_advertisement() {
    let socket = Arc::new(FakeSocket::new());
    let dialer = FakeDialer {
        socket: socket.clone(),
    };
    let metrics = Arc::new(Metrics::new(&prometheus::Registry::new()).unwrap());
    let cancel = CancellationToken::new();

    let inner_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        hr_radv6::advertise(
            &dialer,
            test_config(),
            Vec::new(),
            Arc::new(AlwaysForwarding),
            metrics,
            None,
            inner_cancel,
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("advertise should stop promptly")
        .unwrap()
        .unwrap();

    let sent = socket.sent.lock().await;
    let (last_bytes, _dst) = sent.last().expect("at least one RA sent");
    match decode(last_bytes).unwrap() {
        NdMessage::RouterAdvertisement(ra) => {
            assert_eq!(ra.router_lifetime, Duration::ZERO);
        }
        other => panic!("unexpected final message: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_hop_limit_is_counted_and_ignored() {
    let socket = Arc::new(FakeSocket::new());
    socket
        .inbound
        .lock()
        .await
        .push_back((vec![134, 0, 0, 0, 64, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0], 1, "fe80::2".parse().unwrap()));

    let dialer = FakeDialer {
        socket: socket.clone(),
    };
    let metrics = Arc::new(Metrics::new(&prometheus::Registry::new()).unwrap());
    let metrics_check = metrics.clone();
    let cancel = CancellationToken::new();

    let inner_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        hr_radv6::advertise(
            &dialer,
            test_config(),
            Vec::new(),
            Arc::new(AlwaysForwarding),
            metrics,
            None,
            inner_cancel,
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("advertise should stop promptly")
        .unwrap()
        .unwrap();

    assert_eq!(
        metrics_check
            .messages_received_invalid_total
            .with_label_values(&["hop_limit"])
            .get(),
        1.0
    );
}
