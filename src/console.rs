use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
    time::Duration,
};

use log::{debug, warn};
use serde::Serialize;
use tokio::time::MissedTickBehavior;

use crate::notify::Notifier;
use crate::timer::{Countdown, FailureKind, JobController, JobStatus, UiUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    TogglePause,
    Reset,
    Quit,
}

impl KeyCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" | "resume" => Some(KeyCommand::TogglePause),
            "r" | "reset" => Some(KeyCommand::Reset),
            "q" | "quit" | "exit" => Some(KeyCommand::Quit),
            _ => None,
        }
    }
}

/// Reads commands from stdin on a separate thread so the interface loop never
/// blocks on input. The thread ends quietly at EOF.
pub fn spawn_stdin_reader() -> Receiver<KeyCommand> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match KeyCommand::parse(&line) {
                    Some(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    None => debug!("ignoring input {line:?}"),
                }
            }
        });
    if let Err(err) = spawned {
        warn!("keyboard commands unavailable: {err}");
    }
    rx
}

/// Terminal outcome of a run, printed with `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum JobReport {
    #[serde(rename_all = "camelCase")]
    Completed {
        file: String,
        destination: PathBuf,
        completed_at: String,
    },
    #[serde(rename_all = "camelCase")]
    Failed { kind: FailureKind, message: String },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished,
}

/// The interface side: owns the display and applies queued updates one per
/// poll.
pub struct Console<N, W> {
    controller: JobController,
    notifier: N,
    out: W,
    display: Countdown,
    paused: bool,
    report: Option<JobReport>,
}

impl<N: Notifier, W: Write> Console<N, W> {
    pub fn new(controller: JobController, notifier: N, out: W) -> Self {
        Self {
            controller,
            notifier,
            out,
            display: Countdown::ZERO,
            paused: false,
            report: None,
        }
    }

    pub fn display(&self) -> Countdown {
        self.display
    }

    pub fn report(&self) -> JobReport {
        self.report.clone().unwrap_or(JobReport::Cancelled)
    }

    fn redraw(&mut self) {
        let suffix = if self.paused { "  (paused)" } else { "          " };
        let _ = write!(self.out, "\r  {}{}", self.display, suffix);
        let _ = self.out.flush();
    }

    pub fn apply(&mut self, update: UiUpdate) -> Flow {
        match update {
            UiUpdate::SetCountdown(countdown) => {
                self.display = countdown;
                self.redraw();
            }
            UiUpdate::PlayAlert => {
                self.display = Countdown::ZERO;
                self.redraw();
                self.notifier.play_alert();
            }
            UiUpdate::ShowSuccess {
                filename,
                destination,
                completed_at,
            } => {
                self.notifier.show_info(
                    "Task complete",
                    &format!(
                        "'{}' was moved at {} to\n'{}'",
                        filename,
                        completed_at,
                        destination.display()
                    ),
                );
                self.report = Some(JobReport::Completed {
                    file: filename,
                    destination,
                    completed_at,
                });
            }
            UiUpdate::ShowError { kind, message } => {
                let title = match kind {
                    FailureKind::SourceMissing => "Source file missing",
                    FailureKind::Unexpected => "Error",
                };
                self.notifier.show_error(title, &message);
                self.report = Some(JobReport::Failed { kind, message });
            }
            UiUpdate::ResetUi => {
                self.display = Countdown::ZERO;
                self.paused = false;
                let _ = writeln!(self.out);
                return Flow::Finished;
            }
        }
        Flow::Continue
    }

    pub async fn handle_key(&mut self, cmd: KeyCommand) -> Flow {
        match cmd {
            KeyCommand::TogglePause => match self.controller.toggle_pause().await {
                Ok(status) => {
                    self.paused = status == JobStatus::Paused;
                    self.redraw();
                }
                Err(err) => debug!("pause toggle ignored: {err}"),
            },
            KeyCommand::Reset => self.controller.reset().await,
            KeyCommand::Quit => {
                self.controller.reset().await;
                return Flow::Finished;
            }
        }
        Flow::Continue
    }

    /// Polls keyboard commands and the update queue every `poll_interval`
    /// until the job reaches a terminal outcome or is reset.
    ///
    /// The console stays with the caller afterwards, so an alert that is still
    /// sounding keeps playing until the console is dropped.
    pub async fn run(&mut self, keys: Receiver<KeyCommand>, poll_interval: Duration) -> JobReport {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut keys_open = true;

        loop {
            ticker.tick().await;

            while keys_open {
                match keys.try_recv() {
                    Ok(cmd) => {
                        if self.handle_key(cmd).await == Flow::Finished {
                            return self.report();
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => keys_open = false,
                }
            }

            if let Some(update) = self.controller.drain_one_update() {
                if self.apply(update) == Flow::Finished {
                    return self.report();
                }
            }
        }
    }
}
