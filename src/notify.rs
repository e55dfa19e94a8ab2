use log::{error, info, warn};
use std::path::PathBuf;

#[cfg(feature = "sound")]
use crate::audio::AudioEngineHandle;

/// Everything the user gets told. Only the interface side calls these.
pub trait Notifier {
    fn play_alert(&self);
    fn show_info(&self, title: &str, message: &str);
    fn show_warning(&self, title: &str, message: &str);
    fn show_error(&self, title: &str, message: &str);
}

/// Writes notices to stderr and sounds the alert on the audio thread.
pub struct ConsoleNotifier {
    alert_sound: Option<PathBuf>,
    #[cfg(feature = "sound")]
    audio: AudioEngineHandle,
}

impl ConsoleNotifier {
    pub fn new(alert_sound: Option<PathBuf>) -> Self {
        Self {
            alert_sound,
            #[cfg(feature = "sound")]
            audio: AudioEngineHandle::new(),
        }
    }

    fn print(&self, label: &str, title: &str, message: &str) {
        eprintln!("\n[{label}] {title}");
        for line in message.lines() {
            eprintln!("    {line}");
        }
    }
}

impl Notifier for ConsoleNotifier {
    #[cfg(feature = "sound")]
    fn play_alert(&self) {
        if let Err(err) = self.audio.play_alert(self.alert_sound.as_deref()) {
            warn!("could not play alert: {err:#}");
        }
    }

    #[cfg(not(feature = "sound"))]
    fn play_alert(&self) {
        if let Some(path) = &self.alert_sound {
            warn!("built without sound, ignoring {}", path.display());
        }
        eprint!("\x07");
    }

    fn show_info(&self, title: &str, message: &str) {
        info!("{title}: {message}");
        self.print("done", title, message);
    }

    fn show_warning(&self, title: &str, message: &str) {
        warn!("{title}: {message}");
        self.print("warning", title, message);
    }

    fn show_error(&self, title: &str, message: &str) {
        error!("{title}: {message}");
        self.print("error", title, message);
    }
}

#[cfg(feature = "sound")]
impl Drop for ConsoleNotifier {
    fn drop(&mut self) {
        self.audio.stop();
    }
}
