use std::{sync::Arc, time::Duration};

use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::mover::{self, MoveError};

use super::{
    clock::Clock,
    gate::GateWaiter,
    state::{JobRequest, JobState, JobStatus},
    updates::{Countdown, FailureKind, UiUpdate, UpdateSender},
};

pub(crate) struct CountdownWorker {
    pub job_id: Uuid,
    pub request: JobRequest,
    pub state: Arc<Mutex<JobState>>,
    pub gate: GateWaiter,
    pub updates: UpdateSender,
    pub clock: Arc<dyn Clock>,
    pub tick_interval: Duration,
    pub cancel: CancellationToken,
}

enum CountdownEnd {
    Elapsed,
    Cancelled,
}

impl CountdownWorker {
    /// Counts down to the job deadline, then moves the file. Every outcome
    /// ends with a `ResetUi` update unless the job was cancelled.
    pub async fn run(mut self) {
        match self.count_down().await {
            CountdownEnd::Cancelled => {
                info!("job {} cancelled during countdown", self.job_id);
                return;
            }
            CountdownEnd::Elapsed => {}
        }

        self.updates.send(UiUpdate::PlayAlert);

        let result = mover::move_into(&self.request.source, &self.request.destination);
        match result {
            Ok(path) => {
                info!("job {} completed: {}", self.job_id, path.display());
                self.state.lock().await.finish(JobStatus::Completed);
                let filename = self
                    .request
                    .source
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.updates.send(UiUpdate::ShowSuccess {
                    filename,
                    destination: self.request.destination.clone(),
                    completed_at: self.clock.now().format("%H:%M").to_string(),
                });
            }
            Err(err) => {
                error!("job {} failed: {}", self.job_id, err);
                self.state.lock().await.finish(JobStatus::Failed);
                self.updates.send(failure_update(&err));
            }
        }
        self.updates.send(UiUpdate::ResetUi);
    }

    async fn count_down(&mut self) -> CountdownEnd {
        loop {
            tokio::select! {
                _ = self.gate.wait_open() => {}
                _ = self.cancel.cancelled() => return CountdownEnd::Cancelled,
            }

            let left = {
                let state = self.state.lock().await;
                state.time_left(self.clock.now())
            };
            if left <= chrono::TimeDelta::zero() {
                return CountdownEnd::Elapsed;
            }

            let countdown = Countdown::from_secs(left.num_seconds() as u64);
            debug!("job {} remaining {}", self.job_id, countdown);
            self.updates.send(UiUpdate::SetCountdown(countdown));

            let nap = left
                .to_std()
                .map(|left| left.min(self.tick_interval))
                .unwrap_or(self.tick_interval);
            tokio::select! {
                _ = tokio::time::sleep(nap) => {}
                _ = self.cancel.cancelled() => return CountdownEnd::Cancelled,
            }
        }
    }
}

fn failure_update(err: &MoveError) -> UiUpdate {
    match err {
        MoveError::SourceMissing(path) => UiUpdate::ShowError {
            kind: FailureKind::SourceMissing,
            message: format!(
                "source file does not exist: {}\n\nplease reselect the file.",
                path.display()
            ),
        },
        other => unexpected(other.to_string()),
    }
}

pub(crate) fn unexpected(message: impl std::fmt::Display) -> UiUpdate {
    UiUpdate::ShowError {
        kind: FailureKind::Unexpected,
        message: format!("unexpected error: {message}"),
    }
}

/// Runs the worker on its own task and turns a panic into a failure notice,
/// so the interface always gets its terminal updates.
pub(crate) async fn supervise(worker: CountdownWorker) {
    let job_id = worker.job_id;
    let state = worker.state.clone();
    let updates = worker.updates.clone();

    if let Err(join_err) = tokio::spawn(worker.run()).await {
        if join_err.is_cancelled() {
            return;
        }
        warn!("job {} worker crashed: {}", job_id, join_err);
        state.lock().await.finish(JobStatus::Failed);
        updates.send(unexpected(join_err));
        updates.send(UiUpdate::ResetUi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{gate::PauseGate, target::TimeOfDay, updates::UpdateQueue};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers once, then panics.
    struct FlakyClock {
        calls: AtomicUsize,
    }

    impl Clock for FlakyClock {
        fn now(&self) -> NaiveDateTime {
            if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
                panic!("clock went away");
            }
            NaiveDate::from_ymd_opt(2024, 5, 17)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn worker_panic_becomes_failure_notice() {
        let clock = FlakyClock {
            calls: AtomicUsize::new(0),
        };
        let deadline = clock.now() + chrono::Duration::minutes(5);
        let job_id = Uuid::new_v4();
        let request = JobRequest::new("/tmp/in.txt", "/tmp/out", TimeOfDay::new(10, 5).unwrap());
        let state = Arc::new(Mutex::new(JobState::default()));
        state.lock().await.begin(job_id, request.clone(), deadline);

        let gate = PauseGate::new();
        let queue = UpdateQueue::new();
        let worker = CountdownWorker {
            job_id,
            request,
            state: state.clone(),
            gate: gate.waiter(),
            updates: queue.sender(),
            clock: Arc::new(clock),
            tick_interval: Duration::from_secs(1),
            cancel: CancellationToken::new(),
        };

        supervise(worker).await;

        let drained: Vec<_> = std::iter::from_fn(|| queue.drain_one()).collect();
        assert_eq!(drained.len(), 2, "got {drained:?}");
        match &drained[0] {
            UiUpdate::ShowError { kind, message } => {
                assert_eq!(*kind, FailureKind::Unexpected);
                assert!(message.starts_with("unexpected error:"));
            }
            other => panic!("expected an error notice, got {other:?}"),
        }
        assert_eq!(drained[1], UiUpdate::ResetUi);
        assert_eq!(state.lock().await.status, JobStatus::Failed);
    }

    #[test]
    fn vanished_source_gets_its_own_notice() {
        let update = failure_update(&MoveError::SourceMissing(PathBuf::from("/tmp/x.bin")));
        match update {
            UiUpdate::ShowError { kind, message } => {
                assert_eq!(kind, FailureKind::SourceMissing);
                assert!(message.starts_with("source file does not exist"));
                assert!(message.contains("/tmp/x.bin"));
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[test]
    fn other_failures_are_generic() {
        let update = failure_update(&MoveError::DestinationMissing(PathBuf::from("/out")));
        match update {
            UiUpdate::ShowError { kind, message } => {
                assert_eq!(kind, FailureKind::Unexpected);
                assert_eq!(
                    message,
                    "unexpected error: destination folder does not exist: /out"
                );
            }
            other => panic!("unexpected update {other:?}"),
        }
    }
}
