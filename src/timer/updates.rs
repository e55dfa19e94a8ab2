use std::fmt;
use std::path::PathBuf;
use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use serde::Serialize;

/// Remaining time split for the clock display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Countdown {
    pub const ZERO: Countdown = Countdown {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    pub fn from_secs(total: u64) -> Self {
        let (hours, rem) = (total / 3600, total % 3600);
        Self {
            hours,
            minutes: rem / 60,
            seconds: rem % 60,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    SourceMissing,
    Unexpected,
}

/// One pending change for the interface, applied exactly once on the
/// interface side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    SetCountdown(Countdown),
    /// Zero the display and sound the alert.
    PlayAlert,
    ShowSuccess {
        filename: String,
        destination: PathBuf,
        completed_at: String,
    },
    ShowError {
        kind: FailureKind,
        message: String,
    },
    ResetUi,
}

/// Producer half handed to the worker.
#[derive(Debug, Clone)]
pub struct UpdateSender {
    tx: Sender<UiUpdate>,
}

impl UpdateSender {
    pub fn send(&self, update: UiUpdate) {
        // The receiver is owned by the queue, which outlives every worker.
        let _ = self.tx.send(update);
    }
}

/// Unbounded FIFO between the worker and the interface thread.
#[derive(Debug)]
pub struct UpdateQueue {
    tx: Sender<UiUpdate>,
    rx: Mutex<Receiver<UiUpdate>>,
}

impl Default for UpdateQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn sender(&self) -> UpdateSender {
        UpdateSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push(&self, update: UiUpdate) {
        let _ = self.tx.send(update);
    }

    /// Non-blocking: `None` when nothing is pending.
    pub fn drain_one(&self) -> Option<UiUpdate> {
        let rx = match self.rx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_splits_and_formats() {
        let c = Countdown::from_secs(3 * 3600 + 25 * 60 + 7);
        assert_eq!(c, Countdown { hours: 3, minutes: 25, seconds: 7 });
        assert_eq!(c.to_string(), "03:25:07");
        assert_eq!(c.total_secs(), 3 * 3600 + 25 * 60 + 7);
        assert_eq!(Countdown::from_secs(90).to_string(), "00:01:30");
        assert_eq!(Countdown::ZERO.to_string(), "00:00:00");
    }

    #[test]
    fn drains_in_fifo_order() {
        let queue = UpdateQueue::new();
        let sender = queue.sender();
        sender.send(UiUpdate::SetCountdown(Countdown::from_secs(2)));
        sender.send(UiUpdate::PlayAlert);
        queue.push(UiUpdate::ResetUi);

        assert_eq!(
            queue.drain_one(),
            Some(UiUpdate::SetCountdown(Countdown::from_secs(2)))
        );
        assert_eq!(queue.drain_one(), Some(UiUpdate::PlayAlert));
        assert_eq!(queue.drain_one(), Some(UiUpdate::ResetUi));
        assert_eq!(queue.drain_one(), None);
    }

    #[test]
    fn drain_is_non_blocking_when_empty() {
        let queue = UpdateQueue::new();
        assert_eq!(queue.drain_one(), None);
    }

    #[test]
    fn updates_cross_threads() {
        let queue = UpdateQueue::new();
        let sender = queue.sender();
        std::thread::spawn(move || {
            for secs in (0..5).rev() {
                sender.send(UiUpdate::SetCountdown(Countdown::from_secs(secs)));
            }
        })
        .join()
        .unwrap();

        let drained: Vec<_> = std::iter::from_fn(|| queue.drain_one()).collect();
        let secs: Vec<u64> = drained
            .iter()
            .map(|u| match u {
                UiUpdate::SetCountdown(c) => c.total_secs(),
                other => panic!("unexpected update {other:?}"),
            })
            .collect();
        assert_eq!(secs, vec![4, 3, 2, 1, 0]);
    }
}
