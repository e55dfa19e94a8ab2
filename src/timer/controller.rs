use std::{sync::Arc, time::Duration};

use chrono::TimeDelta;

use log::{info, warn};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{
    clock::{Clock, LocalClock},
    gate::PauseGate,
    state::{JobRequest, JobSnapshot, JobState, JobStatus},
    target::resolve_target,
    updates::{UiUpdate, UpdateQueue},
    worker::{supervise, CountdownWorker},
};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("a job is already counting down")]
    AlreadyActive,
    #[error("please select a source file and a destination folder first ({0})")]
    Precondition(String),
    #[error("no job is counting down")]
    NotCounting,
    #[error("the job is not paused")]
    NotPaused,
    #[error("the countdown has already elapsed")]
    Elapsed,
}

struct WorkerHandle {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Owns the single job: its state, pause gate, update queue and worker task.
///
/// Every method is meant to be called from the interface side; the worker
/// only reports back through the queue and the terminal state transition.
#[derive(Clone)]
pub struct JobController {
    state: Arc<Mutex<JobState>>,
    gate: PauseGate,
    updates: Arc<UpdateQueue>,
    worker: Arc<Mutex<Option<WorkerHandle>>>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
}

impl JobController {
    pub fn new(clock: Arc<dyn Clock>, tick_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(JobState::default())),
            gate: PauseGate::new(),
            updates: Arc::new(UpdateQueue::new()),
            worker: Arc::new(Mutex::new(None)),
            clock,
            tick_interval,
        }
    }

    pub fn with_local_clock(tick_interval: Duration) -> Self {
        Self::new(Arc::new(LocalClock), tick_interval)
    }

    pub async fn snapshot(&self) -> JobSnapshot {
        self.state.lock().await.snapshot(self.clock.now())
    }

    pub fn drain_one_update(&self) -> Option<UiUpdate> {
        self.updates.drain_one()
    }

    pub async fn start_job(&self, request: JobRequest) -> Result<JobSnapshot, JobError> {
        check_preconditions(&request)?;

        let mut worker_slot = self.worker.lock().await;
        if self.state.lock().await.status.is_in_flight() {
            return Err(JobError::AlreadyActive);
        }
        if let Some(previous) = worker_slot.take() {
            // Already terminal; only its last queue pushes can be outstanding.
            let _ = previous.handle.await;
        }

        let mut state = self.state.lock().await;
        let now = self.clock.now();
        let deadline = resolve_target(request.time, now);
        let job_id = Uuid::new_v4();
        state.begin(job_id, request.clone(), deadline);
        self.gate.resume();

        info!(
            "job {} started: {} -> {} at {} ({}s)",
            job_id,
            request.source.display(),
            request.destination.display(),
            deadline,
            (deadline - now).num_seconds()
        );

        let cancel = CancellationToken::new();
        let worker = CountdownWorker {
            job_id,
            request,
            state: self.state.clone(),
            gate: self.gate.waiter(),
            updates: self.updates.sender(),
            clock: self.clock.clone(),
            tick_interval: self.tick_interval,
            cancel: cancel.clone(),
        };
        *worker_slot = Some(WorkerHandle {
            handle: tokio::spawn(supervise(worker)),
            cancel,
        });

        Ok(state.snapshot(now))
    }

    /// Rejected once the deadline has passed: by then the worker is moving
    /// the file and would not stop at the gate.
    pub async fn pause(&self) -> Result<(), JobError> {
        let mut state = self.state.lock().await;
        if state.status != JobStatus::Counting {
            return Err(JobError::NotCounting);
        }
        let now = self.clock.now();
        if state.time_left(now) <= TimeDelta::zero() {
            return Err(JobError::Elapsed);
        }
        state.pause(now);
        self.gate.pause();
        info!("job {:?} paused", state.job_id);
        Ok(())
    }

    pub async fn resume(&self) -> Result<(), JobError> {
        let mut state = self.state.lock().await;
        if state.status != JobStatus::Paused {
            return Err(JobError::NotPaused);
        }
        state.resume(self.clock.now());
        self.gate.resume();
        info!("job {:?} resumed, deadline now {:?}", state.job_id, state.deadline);
        Ok(())
    }

    /// Pause when counting, resume when paused. Returns the new status.
    pub async fn toggle_pause(&self) -> Result<JobStatus, JobError> {
        let status = self.state.lock().await.status;
        match status {
            JobStatus::Counting => self.pause().await.map(|_| JobStatus::Paused),
            JobStatus::Paused => self.resume().await.map(|_| JobStatus::Counting),
            _ => Err(JobError::NotCounting),
        }
    }

    /// Stops any in-flight job and returns to `Idle`. A `ResetUi` update is
    /// queued behind everything the stopped job already reported.
    pub async fn reset(&self) {
        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            worker.cancel.cancel();
            if let Err(err) = worker.handle.await {
                warn!("worker did not shut down cleanly: {err}");
            }
        }

        {
            let mut state = self.state.lock().await;
            if state.status.is_in_flight() {
                info!("job {:?} reset before completion", state.job_id);
            }
            *state = JobState::default();
        }
        self.gate.resume();
        self.updates.push(UiUpdate::ResetUi);
    }
}

fn check_preconditions(request: &JobRequest) -> Result<(), JobError> {
    if !request.source.is_file() {
        return Err(JobError::Precondition(format!(
            "source file not found: {}",
            request.source.display()
        )));
    }
    if !request.destination.is_dir() {
        return Err(JobError::Precondition(format!(
            "destination folder not found: {}",
            request.destination.display()
        )));
    }
    Ok(())
}
