#[cfg(feature = "sound")]
mod audio;
pub mod cli;
pub mod config;
pub mod console;
pub mod mover;
pub mod notify;
pub mod timer;

use std::{process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use cli::Args;
use config::AppConfig;
use console::{spawn_stdin_reader, Console, JobReport};
use notify::{ConsoleNotifier, Notifier};
use timer::{Clock, JobController, JobError, JobRequest, LocalClock};

/// Long enough for the built-in chime to finish before the process exits.
const ALERT_LINGER: Duration = Duration::from_millis(1200);

pub fn run() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging (reads RUST_LOG env var)
    let level = if config::debug_requested() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = AppConfig::from_env();
    info!("filetimer starting with {config:?}");

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    runtime.block_on(run_job(args, config))
}

async fn run_job(args: Args, config: AppConfig) -> Result<ExitCode> {
    let now = LocalClock.now();
    let time = args.time_of_day(now);
    let controller = JobController::with_local_clock(config.tick_interval);
    let notifier = ConsoleNotifier::new(config.alert_sound.clone());

    let request = JobRequest::new(&args.source, &args.destination, time);
    let snapshot = match controller.start_job(request).await {
        Ok(snapshot) => snapshot,
        Err(err @ JobError::Precondition(_)) => {
            notifier.show_warning("Incomplete information", &err.to_string());
            return Ok(ExitCode::from(2));
        }
        Err(err) => return Err(err).context("failed to start the countdown"),
    };

    println!(
        "Moving {} to {} at {} ({}s from now)",
        args.source.display(),
        args.destination.display(),
        time,
        snapshot.remaining_secs
    );
    println!("Type p + Enter to pause/resume, r to reset, q to quit.");

    let keys = spawn_stdin_reader();
    let mut console = Console::new(controller, notifier, std::io::stdout());
    let report = console.run(keys, config.poll_interval).await;

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    }

    let code = match report {
        JobReport::Completed { .. } => ExitCode::SUCCESS,
        JobReport::Failed { .. } => ExitCode::FAILURE,
        JobReport::Cancelled => return Ok(ExitCode::SUCCESS),
    };
    tokio::time::sleep(ALERT_LINGER).await;
    // Dropping the notifier stops the audio thread.
    drop(console);
    Ok(code)
}
