use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::{Arc, RwLock};

use futures::future::join_all;
use tokio::net::UdpSocket;
use tracing::{debug, info, instrument, warn};

use super::multicast::{
    IpFamily, Ipv4MulticastProvider, Ipv6MulticastProvider, MulticastAddressProvider,
};
use super::send::SendOperation;
use crate::config::TransportConfig;
use crate::core::packet::Packet;
use crate::error::{Result, SacnError};
use crate::utils::buffer_pool::BufferPool;
use crate::utils::metrics::{MetricsSnapshot, SendMetrics, Timer};

struct SocketPair {
    v4: Arc<UdpSocket>,
    v6: Arc<UdpSocket>,
}

/// Sends sACN packets over one long-lived IPv4 socket and one IPv6 socket.
///
/// Both sockets are opened at construction and closed by [`dispose`](Self::dispose).
/// Sends take `&self`, so one sender can be shared behind an `Arc` and driven from many
/// tasks at once. Each send is an independent future; an in-flight send keeps its
/// socket open even if `dispose` runs concurrently.
///
/// # Example
///
/// ```rust,no_run
/// use sacn_transport::core::{Cid, DataPacket};
/// use sacn_transport::transport::{IpFamily, SacnSender};
///
/// # async fn run() -> sacn_transport::error::Result<()> {
/// let sender = SacnSender::new().await?;
/// let packet = DataPacket::new(Cid::random(), "console", 1, vec![255; 512]);
/// sender.send_multicast(&packet, IpFamily::V4).await?;
/// sender.dispose();
/// # Ok(())
/// # }
/// ```
pub struct SacnSender {
    config: TransportConfig,
    local_bind: Option<SocketAddr>,
    sockets: RwLock<Option<SocketPair>>,
    ipv4_provider: Box<dyn MulticastAddressProvider>,
    ipv6_provider: Box<dyn MulticastAddressProvider>,
    pool: BufferPool,
    metrics: SendMetrics,
}

impl SacnSender {
    /// Open a sender with default configuration and OS-chosen source addresses.
    pub async fn new() -> Result<Self> {
        Self::bind(TransportConfig::default()).await
    }

    /// Open a sender whose matching-family socket binds to `local_address`.
    pub async fn with_local_address(local_address: IpAddr) -> Result<Self> {
        Self::bind(TransportConfig::default().with_local_address(local_address)).await
    }

    /// Open a sender using the standard sACN multicast groups.
    pub async fn bind(config: TransportConfig) -> Result<Self> {
        Self::with_providers(
            config,
            Box::new(Ipv4MulticastProvider),
            Box::new(Ipv6MulticastProvider),
        )
        .await
    }

    /// Open a sender with custom multicast address providers.
    #[instrument(skip_all, fields(remote_port = config.remote_port))]
    pub async fn with_providers(
        config: TransportConfig,
        ipv4_provider: Box<dyn MulticastAddressProvider>,
        ipv6_provider: Box<dyn MulticastAddressProvider>,
    ) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(SacnError::ConfigError(errors.join("; ")));
        }

        let local_bind = config
            .local_address
            .map(|ip| SocketAddr::new(ip, config.local_port));

        let v4 = open_socket(IpFamily::V4, local_bind, &config).await?;
        let v6 = open_socket(IpFamily::V6, local_bind, &config).await?;
        info!(
            v4 = %v4.local_addr()?,
            v6 = %v6.local_addr()?,
            "sACN sender sockets open"
        );

        Ok(Self {
            pool: BufferPool::new(config.buffer_pool_size),
            config,
            local_bind,
            sockets: RwLock::new(Some(SocketPair {
                v4: Arc::new(v4),
                v6: Arc::new(v6),
            })),
            ipv4_provider,
            ipv6_provider,
            metrics: SendMetrics::new(),
        })
    }

    /// Send `packet` to `remote_host` on the configured remote port.
    #[instrument(skip(self, packet), fields(kind = %packet.kind()))]
    pub async fn send_unicast<P: Packet + ?Sized>(
        &self,
        packet: &P,
        remote_host: IpAddr,
    ) -> Result<()> {
        self.metrics.unicast_attempt();
        let outcome = self.send_internal(packet, remote_host).await;
        self.finish(outcome)
    }

    /// Send `packet` to the multicast group for its resolution key.
    ///
    /// `family` picks both the address provider and the socket.
    #[instrument(skip(self, packet), fields(kind = %packet.kind(), key = packet.multicast_key()))]
    pub async fn send_multicast<P: Packet + ?Sized>(
        &self,
        packet: &P,
        family: IpFamily,
    ) -> Result<()> {
        self.metrics.multicast_attempt();
        let outcome = match self.resolve(packet, family) {
            Ok(group) => self.send_internal(packet, group).await,
            Err(e) => Err(e),
        };
        self.finish(outcome)
    }

    /// Multicast every packet concurrently, returning outcomes in input order.
    ///
    /// Typical use is one data packet per universe followed by a synchronization packet.
    pub async fn send_multicast_all(
        &self,
        packets: &[&dyn Packet],
        family: IpFamily,
    ) -> Vec<Result<()>> {
        join_all(
            packets
                .iter()
                .map(|packet| self.send_multicast(*packet, family)),
        )
        .await
    }

    /// Close both sockets. Later sends fail with [`SacnError::Disposed`].
    pub fn dispose(&self) {
        let mut guard = match self.sockets.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.take().is_some() {
            info!("sACN sender disposed");
        } else {
            debug!("sACN sender already disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        match self.sockets.read() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// Local addresses of the IPv4 and IPv6 sockets
    pub fn local_addrs(&self) -> Result<(SocketAddr, SocketAddr)> {
        let guard = self.sockets.read().map_err(|_| SacnError::LockPoisoned)?;
        let pair = guard.as_ref().ok_or(SacnError::Disposed)?;
        Ok((pair.v4.local_addr()?, pair.v6.local_addr()?))
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn log_metrics(&self) {
        self.metrics.log_metrics();
    }

    fn resolve<P: Packet + ?Sized>(&self, packet: &P, family: IpFamily) -> Result<IpAddr> {
        // a disposed sender reports Disposed even for keys that would not resolve
        self.ensure_open()?;
        let provider = match family {
            IpFamily::V4 => &self.ipv4_provider,
            IpFamily::V6 => &self.ipv6_provider,
        };
        provider.multicast_address(packet.multicast_key())
    }

    async fn send_internal<P: Packet + ?Sized>(&self, packet: &P, address: IpAddr) -> Result<usize> {
        let _timer = Timer::start("sacn_send");
        let operation = SendOperation::new(packet, address, self.config.remote_port);
        let destination = operation.destination();
        let socket = self.socket_for(&destination)?;
        let local_bind = self
            .local_bind
            .filter(|local| local.is_ipv4() == destination.is_ipv4());

        operation.execute(&socket, local_bind, &self.pool).await
    }

    fn finish(&self, outcome: Result<usize>) -> Result<()> {
        match outcome {
            Ok(sent) => {
                self.metrics.datagram_sent(sent as u64);
                Ok(())
            }
            Err(e) => {
                self.metrics.failure(&e);
                warn!(error = %e, "sACN send failed");
                Err(e)
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(SacnError::Disposed);
        }
        Ok(())
    }

    fn socket_for(&self, destination: &SocketAddr) -> Result<Arc<UdpSocket>> {
        let guard = self.sockets.read().map_err(|_| SacnError::LockPoisoned)?;
        let pair = guard.as_ref().ok_or(SacnError::Disposed)?;
        Ok(match destination {
            SocketAddr::V4(_) => pair.v4.clone(),
            SocketAddr::V6(_) => pair.v6.clone(),
        })
    }
}

/// Open the socket for `family`, bound to `local_bind` when it belongs to that family
async fn open_socket(
    family: IpFamily,
    local_bind: Option<SocketAddr>,
    config: &TransportConfig,
) -> Result<UdpSocket> {
    let addr = match local_bind {
        Some(local) if IpFamily::of(&local.ip()) == family => local,
        _ => match family {
            IpFamily::V4 => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            IpFamily::V6 => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        },
    };

    let socket = UdpSocket::bind(addr).await?;
    match family {
        IpFamily::V4 => {
            socket.set_multicast_ttl_v4(config.multicast_ttl)?;
            socket.set_multicast_loop_v4(config.multicast_loop)?;
        }
        IpFamily::V6 => socket.set_multicast_loop_v6(config.multicast_loop)?,
    }
    debug!(?family, local = %addr, "Socket bound");
    Ok(socket)
}
