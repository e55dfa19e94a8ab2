use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use super::target::TimeOfDay;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    #[default]
    Idle,
    Counting,
    Paused,
    Completed,
    Failed,
}

impl JobStatus {
    /// A new job may only start from one of these.
    pub fn is_startable(self) -> bool {
        matches!(
            self,
            JobStatus::Idle | JobStatus::Completed | JobStatus::Failed
        )
    }

    pub fn is_in_flight(self) -> bool {
        !self.is_startable()
    }
}

/// What the user picked: one file, one folder, one time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub time: TimeOfDay,
}

impl JobRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, time: TimeOfDay) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            time,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobState {
    pub status: JobStatus,
    pub job_id: Option<Uuid>,
    pub request: Option<JobRequest>,
    /// Moment the countdown ends. Pushed forward by the length of every pause.
    pub deadline: Option<NaiveDateTime>,
    pub paused_at: Option<NaiveDateTime>,
}

impl JobState {
    pub fn begin(&mut self, job_id: Uuid, request: JobRequest, deadline: NaiveDateTime) {
        *self = Self {
            status: JobStatus::Counting,
            job_id: Some(job_id),
            request: Some(request),
            deadline: Some(deadline),
            paused_at: None,
        };
    }

    pub fn pause(&mut self, now: NaiveDateTime) {
        self.status = JobStatus::Paused;
        self.paused_at = Some(now);
    }

    pub fn resume(&mut self, now: NaiveDateTime) {
        if let (Some(paused_at), Some(deadline)) = (self.paused_at.take(), self.deadline) {
            if now > paused_at {
                self.deadline = Some(deadline + (now - paused_at));
            }
        }
        self.status = JobStatus::Counting;
    }

    pub fn finish(&mut self, status: JobStatus) {
        self.status = status;
        self.paused_at = None;
    }

    /// Time until the deadline, frozen while paused, never negative.
    pub fn time_left(&self, now: NaiveDateTime) -> TimeDelta {
        match self.deadline {
            Some(deadline) if self.status.is_in_flight() => {
                let reference = self.paused_at.unwrap_or(now);
                (deadline - reference).max(TimeDelta::zero())
            }
            _ => TimeDelta::zero(),
        }
    }

    pub fn remaining_secs(&self, now: NaiveDateTime) -> u64 {
        self.time_left(now).num_seconds() as u64
    }

    pub fn snapshot(&self, now: NaiveDateTime) -> JobSnapshot {
        JobSnapshot {
            job_id: self.job_id,
            status: self.status,
            source: self.request.as_ref().map(|r| r.source.clone()),
            destination: self.request.as_ref().map(|r| r.destination.clone()),
            deadline: self.deadline,
            remaining_secs: self.remaining_secs(now),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobSnapshot {
    pub job_id: Option<Uuid>,
    pub status: JobStatus,
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub deadline: Option<NaiveDateTime>,
    pub remaining_secs: u64,
}
