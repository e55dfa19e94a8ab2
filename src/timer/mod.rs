pub mod clock;
pub mod controller;
pub mod gate;
pub mod state;
pub mod target;
pub mod updates;
mod worker;

pub use clock::{Clock, LocalClock};
pub use controller::{JobController, JobError};
pub use state::{JobRequest, JobSnapshot, JobStatus};
pub use target::{resolve_target, TimeOfDay};
pub use updates::{Countdown, FailureKind, UiUpdate};
