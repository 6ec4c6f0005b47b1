//! Last decoded UID and the status snapshot built from it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use wiegate_core::Uid;

/// Shared cell holding the most recently decoded UID.
///
/// Written by the access worker, read and cleared by the management
/// surface. Clones share the same cell.
///
/// # Examples
///
/// ```
/// use wiegate_access::LastUid;
/// use wiegate_core::Uid;
///
/// let last = LastUid::new();
/// assert!(last.get().is_none());
///
/// last.set(Uid::from_bytes(&[0xB4]).unwrap());
/// assert_eq!(last.snapshot().last_uid, "B4");
///
/// last.clear();
/// assert_eq!(last.snapshot().len, 0);
/// ```
#[derive(Debug, Clone)]
pub struct LastUid {
    tx: Arc<watch::Sender<Option<Uid>>>,
}

impl LastUid {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(None)),
        }
    }

    /// Record `uid` as the latest read.
    pub fn set(&self, uid: Uid) {
        self.tx.send_replace(Some(uid));
    }

    /// Forget the latest read.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Latest read, if any.
    pub fn get(&self) -> Option<Uid> {
        *self.tx.borrow()
    }

    /// Receiver notified whenever the cell changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Uid>> {
        self.tx.subscribe()
    }

    /// Status view of the cell.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::from(self.get())
    }
}

impl Default for LastUid {
    fn default() -> Self {
        Self::new()
    }
}

/// Status report served by the management surface.
///
/// Serializes as `{"last_uid":"B4","len":1}`; with no read recorded the hex
/// is empty and the length zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Uppercase hex of the last UID, empty if none
    pub last_uid: String,

    /// Byte length of the last UID
    pub len: usize,
}

impl From<Option<Uid>> for StatusSnapshot {
    fn from(uid: Option<Uid>) -> Self {
        match uid {
            Some(uid) => Self {
                last_uid: uid.to_hex(),
                len: uid.len(),
            },
            None => Self {
                last_uid: String::new(),
                len: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_status_json() {
        let json = serde_json::to_string(&LastUid::new().snapshot()).unwrap();
        assert_eq!(json, r#"{"last_uid":"","len":0}"#);
    }

    #[test]
    fn test_status_json_for_26_bit_card() {
        let last = LastUid::new();
        last.set(Uid::from_frame(0x202_0003, 26).unwrap());

        let json = serde_json::to_string(&last.snapshot()).unwrap();
        assert_eq!(json, r#"{"last_uid":"808000C0","len":4}"#);
    }

    #[test]
    fn test_clones_share_the_cell() {
        let writer = LastUid::new();
        let reader = writer.clone();

        writer.set(Uid::from_bytes(&[0x0A]).unwrap());
        assert_eq!(reader.get().map(|u| u.to_hex()), Some("0A".to_string()));

        reader.clear();
        assert!(writer.get().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let last = LastUid::new();
        let mut rx = last.subscribe();

        last.set(Uid::from_bytes(&[0xB4]).unwrap());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().map(|u| u.len()), Some(1));
    }
}
