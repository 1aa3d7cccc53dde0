//! # Error Types
//!
//! Error handling for the sACN transport.
//!
//! Every failure a send can produce is a variant of [`SacnError`]. Callers that only
//! care about the broad class of failure can branch on [`SacnError::category`]:
//!
//! - **Resolution**: no multicast group exists for the requested universe
//! - **Transport**: the OS rejected or truncated the datagram
//! - **Lifecycle**: a send was attempted after the sender was disposed
//! - **Packet**: the packet could not be serialized as declared
//! - **Config**: invalid configuration or socket setup
//!
//! No variant is retried internally. UDP is best-effort and retry policy belongs to the
//! caller.
//!
//! ## Example Usage
//! ```rust
//! use sacn_transport::error::{ErrorCategory, SacnError};
//! use tracing::warn;
//!
//! fn report(err: &SacnError) {
//!     match err.category() {
//!         ErrorCategory::Transport => warn!(error = %err, "datagram dropped"),
//!         _ => warn!(error = %err, "send rejected"),
//!     }
//! }
//!
//! report(&SacnError::Disposed);
//! ```

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Packet validation errors
    pub const ERR_BUFFER_TOO_SMALL: &str = "Buffer is smaller than the packet length";
    pub const ERR_UNIVERSE_RANGE: &str = "Universe must be in 1..=63999";
    pub const ERR_SYNC_ADDRESS_RANGE: &str = "Synchronization address must be in 1..=63999";
    pub const ERR_PRIORITY_RANGE: &str = "Priority must be in 0..=200";
    pub const ERR_TOO_MANY_SLOTS: &str = "Data packet carries more than 512 slots";
    pub const ERR_SOURCE_NAME_TOO_LONG: &str = "Source name exceeds 63 bytes";
    pub const ERR_TOO_MANY_UNIVERSES: &str = "Discovery page lists more than 512 universes";
    pub const ERR_UNSORTED_UNIVERSES: &str = "Discovery universes must be strictly ascending";
    pub const ERR_PAGE_RANGE: &str = "Discovery page exceeds last page";
}

/// Broad classification of a [`SacnError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Resolution,
    Transport,
    Lifecycle,
    Packet,
    Config,
}

// SacnError is the error type for every sender operation
#[derive(Error, Debug)]
pub enum SacnError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No multicast group for universe {universe}")]
    Resolution { universe: u16 },

    #[error("Send to {destination} failed: {source}")]
    Transport {
        destination: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Partial datagram: sent {sent} of {expected} bytes")]
    PartialSend { sent: usize, expected: usize },

    #[error("Sender has been disposed")]
    Disposed,

    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    #[error("Packet declared {declared} bytes but wrote {written}")]
    LengthMismatch { declared: usize, written: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Synchronization primitive poisoned")]
    LockPoisoned,
}

impl SacnError {
    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SacnError::Resolution { .. } => ErrorCategory::Resolution,
            SacnError::Transport { .. } | SacnError::PartialSend { .. } => {
                ErrorCategory::Transport
            }
            SacnError::Disposed => ErrorCategory::Lifecycle,
            SacnError::InvalidPacket(_) | SacnError::LengthMismatch { .. } => {
                ErrorCategory::Packet
            }
            SacnError::Io(_) | SacnError::ConfigError(_) | SacnError::LockPoisoned => {
                ErrorCategory::Config
            }
        }
    }

    pub(crate) fn invalid_packet(msg: &str) -> Self {
        SacnError::InvalidPacket(msg.to_string())
    }
}

/// Type alias for Results using SacnError
pub type Result<T> = std::result::Result<T, SacnError>;
