//! The per-call send primitive.
//!
//! A [`SendOperation`] owns nothing beyond the borrowed packet and its resolved
//! destination. It rents a buffer, serializes into it, re-applies the local bind,
//! and awaits the OS accepting the datagram. The buffer goes back to the pool once
//! the operation finishes, success or not.

use std::io;
use std::net::{IpAddr, SocketAddr};

use tokio::net::UdpSocket;
use tracing::{debug, trace};

use crate::core::packet::Packet;
use crate::error::{Result, SacnError};
use crate::utils::buffer_pool::{BufferPool, PooledBuffer};

pub(crate) struct SendOperation<'a, P: Packet + ?Sized> {
    packet: &'a P,
    destination: SocketAddr,
}

impl<'a, P: Packet + ?Sized> SendOperation<'a, P> {
    pub(crate) fn new(packet: &'a P, address: IpAddr, port: u16) -> Self {
        Self {
            packet,
            destination: SocketAddr::new(address, port),
        }
    }

    pub(crate) fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Serialize the packet into a rented buffer of exactly its declared length
    pub(crate) fn serialize(&self, pool: &BufferPool) -> Result<PooledBuffer> {
        let declared = self.packet.length();
        let mut buffer = pool.rent(declared);
        let written = self.packet.write_to(&mut buffer)?;
        if written != declared {
            return Err(SacnError::LengthMismatch { declared, written });
        }
        Ok(buffer)
    }

    /// Run the send on `socket`, returning the datagram size.
    pub(crate) async fn execute(
        self,
        socket: &UdpSocket,
        local_bind: Option<SocketAddr>,
        pool: &BufferPool,
    ) -> Result<usize> {
        let buffer = self.serialize(pool)?;

        if let Some(local) = local_bind {
            rebind(socket, local)?;
        }

        let destination = self.destination;
        let sent = socket
            .send_to(&buffer, destination)
            .await
            .map_err(|source| SacnError::Transport {
                destination,
                source,
            })?;

        if sent != buffer.len() {
            return Err(SacnError::PartialSend {
                sent,
                expected: buffer.len(),
            });
        }

        debug!(
            kind = %self.packet.kind(),
            bytes = sent,
            destination = %destination,
            "Datagram sent"
        );
        Ok(sent)
    }
}

/// Re-apply the local bind before a send.
///
/// Sockets are bound once when the sender opens them, so a socket already bound to
/// `local` passes unchanged. Port 0 in `local` accepts whatever port the OS assigned.
pub(crate) fn rebind(socket: &UdpSocket, local: SocketAddr) -> Result<()> {
    let bound = socket.local_addr().map_err(|source| SacnError::Transport {
        destination: local,
        source,
    })?;
    if bound.ip() == local.ip() && (local.port() == 0 || bound.port() == local.port()) {
        trace!(local = %bound, "Local bind in place");
        return Ok(());
    }

    Err(SacnError::Transport {
        destination: local,
        source: io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("socket is bound to {bound}, expected {local}"),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::packet::PacketKind;
    use crate::core::{Cid, SynchronizationPacket};
    use crate::error::ErrorCategory;
    use std::net::Ipv4Addr;

    /// Declares one length and writes another
    struct ShortPacket;

    impl Packet for ShortPacket {
        fn kind(&self) -> PacketKind {
            PacketKind::Data
        }

        fn length(&self) -> usize {
            10
        }

        fn write_to(&self, buf: &mut [u8]) -> Result<usize> {
            buf[..4].copy_from_slice(&[1, 2, 3, 4]);
            Ok(4)
        }

        fn multicast_key(&self) -> u16 {
            1
        }
    }

    #[test]
    fn test_destination_uses_given_port() {
        let packet = SynchronizationPacket::new(Cid::default(), 1);
        let op = SendOperation::new(&packet, IpAddr::V4(Ipv4Addr::LOCALHOST), 5568);
        assert_eq!(
            op.destination(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5568)
        );
    }

    #[test]
    fn test_serialize_rejects_length_mismatch() {
        let pool = BufferPool::new(1);
        let op = SendOperation::new(&ShortPacket, IpAddr::V4(Ipv4Addr::LOCALHOST), 5568);
        assert!(matches!(
            op.serialize(&pool),
            Err(SacnError::LengthMismatch {
                declared: 10,
                written: 4
            })
        ));
        // buffer went back to the pool
        assert_eq!(pool.available(), 1);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_serialize_exact_length() {
        let pool = BufferPool::new(1);
        let packet = SynchronizationPacket::new(Cid([9; 16]), 12);
        let op = SendOperation::new(&packet, IpAddr::V4(Ipv4Addr::LOCALHOST), 5568);
        let buffer = op.serialize(&pool).unwrap();
        assert_eq!(buffer.len(), packet.length());
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_rebind_is_idempotent() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let bound = socket.local_addr().unwrap();

        rebind(&socket, bound).unwrap();
        rebind(&socket, bound).unwrap();
        rebind(&socket, SocketAddr::new(bound.ip(), 0)).unwrap();
    }

    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_rebind_rejects_other_address() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let other: SocketAddr = "127.0.0.2:0".parse().unwrap();
        let err = rebind(&socket, other).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transport);
    }
}
