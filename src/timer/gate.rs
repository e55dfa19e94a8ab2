use std::sync::Arc;

use tokio::sync::watch;

/// Open/closed gate the countdown loop passes through before every tick.
///
/// Only the controller flips it; the worker holds a receiver and waits.
#[derive(Debug, Clone)]
pub struct PauseGate {
    open: Arc<watch::Sender<bool>>,
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseGate {
    pub fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self {
            open: Arc::new(open),
        }
    }

    pub fn pause(&self) {
        self.open.send_replace(false);
    }

    pub fn resume(&self) {
        self.open.send_replace(true);
    }

    pub fn is_paused(&self) -> bool {
        !*self.open.borrow()
    }

    pub fn waiter(&self) -> GateWaiter {
        GateWaiter {
            open: self.open.subscribe(),
        }
    }
}

/// Worker-side handle of a [`PauseGate`].
#[derive(Debug)]
pub struct GateWaiter {
    open: watch::Receiver<bool>,
}

impl GateWaiter {
    /// Returns immediately while the gate is open, otherwise suspends until
    /// it is reopened.
    pub async fn wait_open(&mut self) {
        // The sender lives as long as the controller; if it is gone there is
        // nobody left to resume, so let the loop run on.
        let _ = self.open.wait_for(|open| *open).await;
    }
}
