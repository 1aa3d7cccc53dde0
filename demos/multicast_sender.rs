//! Streams a slow chase on one universe at roughly 44 frames per second, with a
//! synchronization packet after every frame and a discovery packet roughly every 10 seconds.
//!
//! ```text
//! SACN_LOG_LEVEL=debug cargo run --example multicast_sender
//! ```
//!
//! Configuration comes from `SACN_*` environment variables (see `SenderConfig::from_env`).

use sacn_transport::config::SenderConfig;
use sacn_transport::core::{
    Cid, DataPacket, Packet, SynchronizationPacket, UniverseDiscoveryPacket,
};
use sacn_transport::transport::{IpFamily, SacnSender};
use sacn_transport::utils::logging::init_logging;
use std::time::Duration;
use tracing::{info, warn};

const UNIVERSE: u16 = 1;
const SYNC_ADDRESS: u16 = 7000;
const FRAMES: usize = 1320;
const DISCOVERY_EVERY: usize = 435;

#[tokio::main]
async fn main() -> sacn_transport::Result<()> {
    let config = SenderConfig::from_env()?;
    config.validate_strict()?;
    init_logging(&config.logging)?;

    let sender = SacnSender::bind(config.transport.clone()).await?;
    let cid = Cid::random();
    let discovery = UniverseDiscoveryPacket::new(cid, "sacn-transport demo", vec![UNIVERSE]);

    let mut ticker = tokio::time::interval(Duration::from_millis(23));
    for frame in 0..FRAMES {
        ticker.tick().await;

        if frame % DISCOVERY_EVERY == 0 {
            sender.send_multicast(&discovery, IpFamily::V4).await?;
        }

        let mut levels = vec![0u8; 512];
        levels[frame % 512] = 255;
        let sequence = frame as u8;
        let data = DataPacket::new(cid, "sacn-transport demo", UNIVERSE, levels)
            .with_sequence(sequence)
            .with_sync_address(SYNC_ADDRESS);
        let sync = SynchronizationPacket::new(cid, SYNC_ADDRESS).with_sequence(sequence);

        let batch: [&dyn Packet; 2] = [&data, &sync];
        for outcome in sender.send_multicast_all(&batch, IpFamily::V4).await {
            if let Err(e) = outcome {
                warn!(error = %e, frame, "Frame dropped");
            }
        }
    }

    // tell receivers the stream is over
    let last = DataPacket::new(cid, "sacn-transport demo", UNIVERSE, vec![0u8; 512])
        .with_stream_terminated(true);
    sender.send_multicast(&last, IpFamily::V4).await?;

    sender.log_metrics();
    sender.dispose();
    info!("Demo finished");
    Ok(())
}
