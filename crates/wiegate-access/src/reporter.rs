//! Mesh reporting of decoded UIDs.
//!
//! Every decoded frame is published as the "last UID" attribute of a
//! manufacturer-specific cluster. The payload is a ZCL character string: one
//! length byte followed by the UID bytes.

use tokio::sync::mpsc;
use tracing::{debug, warn};
use wiegate_core::Uid;
use wiegate_core::constants::{
    MAX_UID_BYTES, MESH_ATTR_LAST_UID, MESH_CLUSTER_ID, MESH_COORDINATOR_ADDR,
    MESH_COORDINATOR_ENDPOINT, MESH_ENDPOINT,
};

/// Attribute report sent to the mesh coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeReport {
    /// Local endpoint hosting the cluster
    pub endpoint: u8,

    /// Cluster identifier
    pub cluster: u16,

    /// Attribute identifier
    pub attribute: u16,

    /// Destination short address
    pub dst_addr: u16,

    /// Destination endpoint
    pub dst_endpoint: u8,

    /// ZCL character string: length byte then UID bytes
    pub payload: Vec<u8>,
}

impl AttributeReport {
    /// Build the last-UID report for `uid`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiegate_access::AttributeReport;
    /// use wiegate_core::Uid;
    ///
    /// let report = AttributeReport::last_uid(&Uid::from_bytes(&[0xB4]).unwrap());
    /// assert_eq!(report.payload, [0x01, 0xB4]);
    /// assert_eq!(report.cluster, 0xFC00);
    /// ```
    pub fn last_uid(uid: &Uid) -> Self {
        let bytes = &uid.as_bytes()[..uid.len().min(MAX_UID_BYTES)];

        let mut payload = Vec::with_capacity(bytes.len() + 1);
        payload.push(bytes.len() as u8);
        payload.extend_from_slice(bytes);

        Self {
            endpoint: MESH_ENDPOINT,
            cluster: MESH_CLUSTER_ID,
            attribute: MESH_ATTR_LAST_UID,
            dst_addr: MESH_COORDINATOR_ADDR,
            dst_endpoint: MESH_COORDINATOR_ENDPOINT,
            payload,
        }
    }

    /// UID bytes carried by the payload.
    pub fn uid_bytes(&self) -> &[u8] {
        self.payload.get(1..).unwrap_or_default()
    }
}

/// Collaborator told about every decoded UID, granted or not.
///
/// Implementations must not block: the access worker calls this inline.
pub trait UidReporter: Send + Sync {
    /// Publish `uid`.
    fn report_uid(&self, uid: &Uid);
}

/// Reporter that only logs the attribute report.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl UidReporter for TracingReporter {
    fn report_uid(&self, uid: &Uid) {
        let report = AttributeReport::last_uid(uid);
        debug!(
            uid = %uid,
            endpoint = report.endpoint,
            cluster = format_args!("{:#06X}", report.cluster),
            attribute = format_args!("{:#06X}", report.attribute),
            payload_len = report.payload.len(),
            "Reporting UID to coordinator"
        );
    }
}

/// Reporter forwarding attribute reports over a channel, to a radio task or
/// a test.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<AttributeReport>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AttributeReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl UidReporter for ChannelReporter {
    fn report_uid(&self, uid: &Uid) {
        if self.tx.send(AttributeReport::last_uid(uid)).is_err() {
            warn!(uid = %uid, "Report receiver gone, UID not reported");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_addressing() {
        let report = AttributeReport::last_uid(&Uid::from_bytes(&[0x80, 0x80, 0x00, 0xC0]).unwrap());

        assert_eq!(report.endpoint, 10);
        assert_eq!(report.cluster, 0xFC00);
        assert_eq!(report.attribute, 0x0001);
        assert_eq!(report.dst_addr, 0x0000);
        assert_eq!(report.dst_endpoint, 1);
        assert_eq!(report.payload, [4, 0x80, 0x80, 0x00, 0xC0]);
        assert_eq!(report.uid_bytes(), [0x80, 0x80, 0x00, 0xC0]);
    }

    #[test]
    fn test_full_length_uid() {
        let uid = Uid::from_frame(u64::MAX, 64).unwrap();
        let report = AttributeReport::last_uid(&uid);
        assert_eq!(report.payload[0], 8);
        assert_eq!(report.payload.len(), 9);
    }

    #[tokio::test]
    async fn test_channel_reporter_forwards() {
        let (reporter, mut rx) = ChannelReporter::new();
        reporter.report_uid(&Uid::from_bytes(&[0xB4]).unwrap());

        let report = rx.recv().await.unwrap();
        assert_eq!(report.uid_bytes(), [0xB4]);
    }

    #[test]
    fn test_channel_reporter_tolerates_closed_receiver() {
        let (reporter, rx) = ChannelReporter::new();
        drop(rx);
        reporter.report_uid(&Uid::from_bytes(&[0xB4]).unwrap());
    }
}
