//! Latest-value result sink for published snapshots.
//!
//! The sink keeps only the most recent snapshot. Subscribers that fall behind
//! skip intermediate snapshots, and a subscriber attached late still sees the
//! latest one.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Snapshot;

#[derive(Debug, Clone, Default)]
struct SinkState {
    snapshot: Snapshot,
    /// Number of snapshots published so far.
    version: u64,
    complete: bool,
}

/// Producer side of the snapshot stream.
#[derive(Debug, Clone)]
pub struct SnapshotSink {
    tx: Arc<watch::Sender<SinkState>>,
}

impl Default for SnapshotSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSink {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SinkState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        self.tx.send_modify(|state| {
            state.snapshot = snapshot;
            state.version += 1;
        });
    }

    /// Mark the stream finished. Subscribers drain the last snapshot and then stop.
    pub fn finish(&self) {
        self.tx.send_modify(|state| state.complete = true);
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Snapshot {
        self.tx.borrow().snapshot.clone()
    }

    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    pub fn is_complete(&self) -> bool {
        self.tx.borrow().complete
    }

    pub fn subscribe(&self) -> SnapshotSubscriber {
        SnapshotSubscriber {
            rx: self.tx.subscribe(),
            seen: 0,
        }
    }
}

/// Consumer side of the snapshot stream.
#[derive(Debug)]
pub struct SnapshotSubscriber {
    rx: watch::Receiver<SinkState>,
    seen: u64,
}

impl SnapshotSubscriber {
    /// The most recently published snapshot, without waiting.
    pub fn latest(&self) -> Snapshot {
        self.rx.borrow().snapshot.clone()
    }

    pub fn is_complete(&self) -> bool {
        self.rx.borrow().complete
    }

    /// Wait for a snapshot this subscriber has not seen yet.
    ///
    /// Returns the newest one when several were published in between. Returns
    /// `None` once the stream is finished and the final snapshot was seen.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        loop {
            if let Some(snapshot) = self.take_unseen() {
                return Some(snapshot);
            }
            if self.rx.borrow().complete {
                return None;
            }
            if self.rx.changed().await.is_err() {
                return self.take_unseen();
            }
        }
    }

    /// Wait for the stream to finish and return the final snapshot.
    pub async fn wait_final(&mut self) -> Snapshot {
        while self.changed().await.is_some() {}
        self.latest()
    }

    fn take_unseen(&mut self) -> Option<Snapshot> {
        let state = self.rx.borrow_and_update();
        if state.version > self.seen {
            self.seen = state.version;
            Some(state.snapshot.clone())
        } else {
            None
        }
    }
}
