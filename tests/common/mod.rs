#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use sacn_transport::config::TransportConfig;
use sacn_transport::error::Result;
use sacn_transport::transport::{MulticastAddressProvider, SacnSender};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Resolves every universe to one fixed address and records the keys it was asked for
#[derive(Clone)]
pub struct RecordingProvider {
    target: IpAddr,
    pub seen: Arc<Mutex<Vec<u16>>>,
}

impl RecordingProvider {
    pub fn new(target: IpAddr) -> Self {
        Self {
            target,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn keys(&self) -> Vec<u16> {
        self.seen.lock().unwrap().clone()
    }
}

impl MulticastAddressProvider for RecordingProvider {
    fn multicast_address(&self, universe: u16) -> Result<IpAddr> {
        self.seen.lock().unwrap().push(universe);
        Ok(self.target)
    }
}

/// A loopback receiver standing in for a multicast group
pub async fn receiver_v4() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.expect("bind receiver")
}

/// Sender whose remote port points at `port`, with recording providers mapping every
/// universe to IPv4 and IPv6 loopback
pub async fn loopback_sender(
    port: u16,
) -> (SacnSender, RecordingProvider, RecordingProvider) {
    let v4 = RecordingProvider::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let v6 = RecordingProvider::new("::1".parse().unwrap());
    let config = TransportConfig {
        remote_port: port,
        ..TransportConfig::default()
    };
    let sender = SacnSender::with_providers(config, Box::new(v4.clone()), Box::new(v6.clone()))
        .await
        .expect("open sender");
    (sender, v4, v6)
}

/// Receive one datagram or fail after two seconds
pub async fn recv_datagram(socket: &UdpSocket) -> (Vec<u8>, SocketAddr) {
    let mut buf = vec![0u8; 2048];
    let (len, from) = tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
        .await
        .expect("datagram within timeout")
        .expect("recv");
    buf.truncate(len);
    (buf, from)
}
