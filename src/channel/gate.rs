//! Synchronization gate on the live-element counter
//!
//! The dispatcher raises the counter on inbound `addElem` and lowers it on
//! `delElem`; the demo script waits for it to reach a threshold before the
//! visibility-toggle segment. Built on a watch channel so the wait is
//! edge-notified rather than polled, while staying level-triggered: a
//! counter already at the threshold releases the wait immediately.

use anyhow::{Context, Result};
use tokio::sync::watch;

/// Write side, owned by the inbound dispatcher
#[derive(Debug)]
pub struct ElementCounter {
    tx: watch::Sender<u32>,
}

/// Read side, owned by the demo script
#[derive(Debug, Clone)]
pub struct ElementGate {
    rx: watch::Receiver<u32>,
}

/// Create a linked counter/gate pair starting at zero
pub fn element_gate() -> (ElementCounter, ElementGate) {
    let (tx, rx) = watch::channel(0);
    (ElementCounter { tx }, ElementGate { rx })
}

impl ElementCounter {
    pub fn increment(&self) {
        self.tx.send_modify(|count| *count += 1);
    }

    pub fn decrement(&self) {
        self.tx.send_modify(|count| *count = count.saturating_sub(1));
    }

    pub fn get(&self) -> u32 {
        *self.tx.borrow()
    }
}

impl ElementGate {
    /// Current counter value
    pub fn count(&self) -> u32 {
        *self.rx.borrow()
    }

    /// Wait until the counter reaches `threshold`
    ///
    /// Fails only if the counter side is dropped while waiting, which means
    /// the dispatch loop is gone and the script cannot proceed anyway.
    pub async fn wait_for(&mut self, threshold: u32) -> Result<()> {
        self.rx
            .wait_for(|&count| count >= threshold)
            .await
            .context("Element counter dropped while waiting on the gate")?;
        Ok(())
    }
}
