//! Sender integration tests over loopback UDP.
//!
//! Multicast groups are replaced by recording providers that resolve to loopback, so
//! the tests observe both which resolver and socket a send used and the exact bytes
//! that arrived.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{loopback_sender, receiver_v4, recv_datagram};
use sacn_transport::config::TransportConfig;
use sacn_transport::core::packet::DISCOVERY_UNIVERSE;
use sacn_transport::core::{Cid, DataPacket, Packet, SynchronizationPacket, UniverseDiscoveryPacket};
use sacn_transport::error::{ErrorCategory, SacnError};
use sacn_transport::transport::{IpFamily, SacnSender};
use std::net::{IpAddr, Ipv4Addr};
use tokio::net::UdpSocket;

fn serialized(packet: &dyn Packet) -> Vec<u8> {
    let mut buf = vec![0u8; packet.length()];
    packet.write_to(&mut buf).unwrap();
    buf
}

#[tokio::test]
async fn test_full_universe_multicast_v4() {
    let rx = receiver_v4().await;
    let (sender, v4, v6) = loopback_sender(rx.local_addr().unwrap().port()).await;

    let packet = DataPacket::new(Cid::random(), "console", 1, vec![0x80; 512]);
    assert_eq!(packet.length(), 638);
    sender.send_multicast(&packet, IpFamily::V4).await.unwrap();

    let (payload, from) = recv_datagram(&rx).await;
    assert_eq!(payload.len(), 638);
    assert_eq!(payload, serialized(&packet));
    assert_eq!(v4.keys(), vec![1]);
    assert!(v6.keys().is_empty());

    // came from the IPv4 socket
    let (local_v4, _) = sender.local_addrs().unwrap();
    assert_eq!(from.port(), local_v4.port());
}

#[tokio::test]
async fn test_multicast_defaults_to_ipv4() {
    let rx = receiver_v4().await;
    let (sender, v4, v6) = loopback_sender(rx.local_addr().unwrap().port()).await;

    let packet = SynchronizationPacket::new(Cid::random(), 77);
    sender
        .send_multicast(&packet, IpFamily::default())
        .await
        .unwrap();
    recv_datagram(&rx).await;

    assert_eq!(v4.keys(), vec![77]);
    assert!(v6.keys().is_empty());
}

#[tokio::test]
async fn test_multicast_v6_uses_v6_resolver_and_socket() {
    let Ok(rx) = UdpSocket::bind("[::1]:0").await else {
        eprintln!("IPv6 loopback unavailable, skipping");
        return;
    };
    let (sender, v4, v6) = loopback_sender(rx.local_addr().unwrap().port()).await;

    let packet = DataPacket::new(Cid::random(), "console", 12, vec![1, 2, 3]);
    sender.send_multicast(&packet, IpFamily::V6).await.unwrap();

    let (payload, from) = recv_datagram(&rx).await;
    assert_eq!(payload, serialized(&packet));
    assert_eq!(v6.keys(), vec![12]);
    assert!(v4.keys().is_empty());

    let (_, local_v6) = sender.local_addrs().unwrap();
    assert!(from.is_ipv6());
    assert_eq!(from.port(), local_v6.port());
}

#[tokio::test]
async fn test_discovery_resolves_discovery_universe() {
    let rx = receiver_v4().await;
    let (sender, v4, _) = loopback_sender(rx.local_addr().unwrap().port()).await;

    let packet = UniverseDiscoveryPacket::new(Cid::random(), "rack", vec![1, 2, 3, 900]);
    sender.send_multicast(&packet, IpFamily::V4).await.unwrap();

    let (payload, _) = recv_datagram(&rx).await;
    assert_eq!(payload.len(), 120 + 8);
    assert_eq!(v4.keys(), vec![DISCOVERY_UNIVERSE]);
}

#[tokio::test]
async fn test_sync_resolves_sync_address_not_universe() {
    let rx = receiver_v4().await;
    let (sender, v4, _) = loopback_sender(rx.local_addr().unwrap().port()).await;

    let data = DataPacket::new(Cid::random(), "console", 5, vec![0; 24]).with_sync_address(4000);
    let sync = SynchronizationPacket::new(data.cid, 4000);
    sender.send_multicast(&data, IpFamily::V4).await.unwrap();
    sender.send_multicast(&sync, IpFamily::V4).await.unwrap();

    recv_datagram(&rx).await;
    let (payload, _) = recv_datagram(&rx).await;
    assert_eq!(payload.len(), 49);
    assert_eq!(v4.keys(), vec![5, 4000]);
}

#[tokio::test]
async fn test_unicast_targets_remote_port() {
    let rx = receiver_v4().await;
    let rx_addr = rx.local_addr().unwrap();
    let (sender, v4, v6) = loopback_sender(rx_addr.port()).await;

    let packets: Vec<Box<dyn Packet>> = vec![
        Box::new(DataPacket::new(Cid::random(), "console", 3, vec![9; 10])),
        Box::new(SynchronizationPacket::new(Cid::random(), 3)),
        Box::new(UniverseDiscoveryPacket::new(Cid::random(), "rack", vec![3])),
    ];
    for packet in &packets {
        sender
            .send_unicast(packet.as_ref(), rx_addr.ip())
            .await
            .unwrap();
        let (payload, _) = recv_datagram(&rx).await;
        assert_eq!(payload, serialized(packet.as_ref()));
    }

    // unicast never consults a resolver
    assert!(v4.keys().is_empty());
    assert!(v6.keys().is_empty());
    assert_eq!(sender.metrics().unicast_sends, 3);
    assert_eq!(sender.metrics().datagrams_sent, 3);
}

#[tokio::test]
async fn test_local_bind_is_reapplied_on_every_send() {
    let rx = receiver_v4().await;
    let config = TransportConfig {
        remote_port: rx.local_addr().unwrap().port(),
        ..TransportConfig::default()
    }
    .with_local_address(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let sender = SacnSender::bind(config).await.unwrap();

    let (local_v4, _) = sender.local_addrs().unwrap();
    assert_eq!(local_v4.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));

    let packet = SynchronizationPacket::new(Cid::random(), 1);
    for _ in 0..3 {
        sender
            .send_unicast(&packet, IpAddr::V4(Ipv4Addr::LOCALHOST))
            .await
            .unwrap();
        let (_, from) = recv_datagram(&rx).await;
        assert_eq!(from, local_v4);
    }
}

#[tokio::test]
async fn test_send_after_dispose_is_lifecycle_error() {
    let rx = receiver_v4().await;
    let rx_addr = rx.local_addr().unwrap();
    let (sender, v4, _) = loopback_sender(rx_addr.port()).await;
    let packet = DataPacket::new(Cid::random(), "console", 1, vec![0; 8]);

    sender.dispose();
    assert!(sender.is_disposed());
    // second dispose is a no-op
    sender.dispose();

    let unicast = sender.send_unicast(&packet, rx_addr.ip()).await;
    assert!(matches!(unicast, Err(SacnError::Disposed)));

    let multicast = sender.send_multicast(&packet, IpFamily::V4).await;
    assert!(matches!(multicast, Err(SacnError::Disposed)));
    assert!(v4.keys().is_empty(), "resolver must not run after dispose");

    assert!(matches!(sender.local_addrs(), Err(SacnError::Disposed)));
    assert_eq!(sender.metrics().lifecycle_failures, 2);
}

#[tokio::test]
async fn test_send_multicast_all_preserves_order() {
    let rx = receiver_v4().await;
    let (sender, v4, _) = loopback_sender(rx.local_addr().unwrap().port()).await;
    let cid = Cid::random();

    let first = DataPacket::new(cid, "console", 10, vec![1; 4]).with_sync_address(9);
    let second = DataPacket::new(cid, "console", 11, vec![2; 4]).with_sync_address(9);
    let sync = SynchronizationPacket::new(cid, 9);
    let frame: [&dyn Packet; 3] = [&first, &second, &sync];

    let outcomes = sender.send_multicast_all(&frame, IpFamily::V4).await;
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| o.is_ok()));

    for _ in 0..3 {
        recv_datagram(&rx).await;
    }
    let mut keys = v4.keys();
    keys.sort_unstable();
    assert_eq!(keys, vec![9, 10, 11]);
}

#[tokio::test]
async fn test_standard_providers_reject_unknown_universe() {
    let sender = SacnSender::new().await.unwrap();
    let packet = SynchronizationPacket::new(Cid::random(), 64000);

    let err = sender
        .send_multicast(&packet, IpFamily::V4)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Resolution);
    assert!(matches!(err, SacnError::Resolution { universe: 64000 }));
    assert_eq!(sender.metrics().resolution_failures, 1);
    assert_eq!(sender.metrics().datagrams_sent, 0);
}
