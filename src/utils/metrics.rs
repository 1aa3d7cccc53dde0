//! Observability and Metrics
//!
//! Counters for datagrams a sender has put on the wire and the ways sends have failed.
//!
//! Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::{ErrorCategory, SacnError};

/// Metrics collector for one sender
#[derive(Debug)]
pub struct SendMetrics {
    /// Datagrams fully accepted by the OS
    pub datagrams_sent: AtomicU64,
    /// Payload bytes of those datagrams
    pub bytes_sent: AtomicU64,
    /// Unicast send attempts
    pub unicast_sends: AtomicU64,
    /// Multicast send attempts
    pub multicast_sends: AtomicU64,
    /// OS-level send failures and short writes
    pub transport_failures: AtomicU64,
    /// Universes with no multicast group
    pub resolution_failures: AtomicU64,
    /// Sends attempted after dispose
    pub lifecycle_failures: AtomicU64,
    /// Packets that failed to serialize
    pub packet_failures: AtomicU64,
    start_time: Instant,
}

impl SendMetrics {
    pub fn new() -> Self {
        Self {
            datagrams_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            unicast_sends: AtomicU64::new(0),
            multicast_sends: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            resolution_failures: AtomicU64::new(0),
            lifecycle_failures: AtomicU64::new(0),
            packet_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn unicast_attempt(&self) {
        self.unicast_sends.fetch_add(1, Ordering::Relaxed);
    }

    pub fn multicast_attempt(&self) {
        self.multicast_sends.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a datagram accepted by the OS
    pub fn datagram_sent(&self, byte_count: u64) {
        self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a failed send under its error category
    pub fn failure(&self, err: &SacnError) {
        let counter = match err.category() {
            ErrorCategory::Transport | ErrorCategory::Config => &self.transport_failures,
            ErrorCategory::Resolution => &self.resolution_failures,
            ErrorCategory::Lifecycle => &self.lifecycle_failures,
            ErrorCategory::Packet => &self.packet_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datagrams_sent: self.datagrams_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            unicast_sends: self.unicast_sends.load(Ordering::Relaxed),
            multicast_sends: self.multicast_sends.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            resolution_failures: self.resolution_failures.load(Ordering::Relaxed),
            lifecycle_failures: self.lifecycle_failures.load(Ordering::Relaxed),
            packet_failures: self.packet_failures.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            datagrams_sent = snapshot.datagrams_sent,
            bytes_sent = snapshot.bytes_sent,
            unicast_sends = snapshot.unicast_sends,
            multicast_sends = snapshot.multicast_sends,
            transport_failures = snapshot.transport_failures,
            resolution_failures = snapshot.resolution_failures,
            lifecycle_failures = snapshot.lifecycle_failures,
            packet_failures = snapshot.packet_failures,
            uptime_seconds = snapshot.uptime_seconds,
            "sACN sender metrics snapshot"
        );
    }
}

impl Default for SendMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub datagrams_sent: u64,
    pub bytes_sent: u64,
    pub unicast_sends: u64,
    pub multicast_sends: u64,
    pub transport_failures: u64,
    pub resolution_failures: u64,
    pub lifecycle_failures: u64,
    pub packet_failures: u64,
    pub uptime_seconds: u64,
}

impl MetricsSnapshot {
    /// Total failed sends of any kind
    pub fn failures(&self) -> u64 {
        self.transport_failures
            + self.resolution_failures
            + self.lifecycle_failures
            + self.packet_failures
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_category() {
        let metrics = SendMetrics::new();
        metrics.unicast_attempt();
        metrics.datagram_sent(638);
        metrics.multicast_attempt();
        metrics.failure(&SacnError::Resolution { universe: 0 });
        metrics.failure(&SacnError::Disposed);
        metrics.failure(&SacnError::PartialSend {
            sent: 1,
            expected: 49,
        });

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.datagrams_sent, 1);
        assert_eq!(snapshot.bytes_sent, 638);
        assert_eq!(snapshot.unicast_sends, 1);
        assert_eq!(snapshot.multicast_sends, 1);
        assert_eq!(snapshot.resolution_failures, 1);
        assert_eq!(snapshot.lifecycle_failures, 1);
        assert_eq!(snapshot.transport_failures, 1);
        assert_eq!(snapshot.failures(), 3);
    }
}
