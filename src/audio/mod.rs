pub mod chime;

use chime::Chime;

use anyhow::{anyhow, Context, Result};
use log::{error, warn};
use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

enum AudioCommand {
    PlayChime,
    PlayFile(PathBuf),
    Stop,
}

/// Handle to a dedicated audio thread. The output stream is not `Send`, so it
/// is created and kept on that thread; callers only send commands.
#[derive(Clone, Default)]
pub struct AudioEngineHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|e| anyhow!("audio handle poisoned: {e}"))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<()> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .context("failed to open audio output")?;
                        let new_sink =
                            Sink::try_new(&handle).context("failed to create audio sink")?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::PlayChime => {
                            if let Err(e) = ensure_sink(&mut _stream, &mut sink) {
                                warn!("alert sound unavailable: {e:#}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.append(Chime::new());
                            }
                        }
                        AudioCommand::PlayFile(path) => {
                            if let Err(e) = ensure_sink(&mut _stream, &mut sink) {
                                warn!("alert sound unavailable: {e:#}");
                                continue;
                            }
                            match open_decoder(&path) {
                                Ok(source) => {
                                    if let Some(ref s) = sink {
                                        s.append(source);
                                    }
                                }
                                Err(e) => {
                                    error!("{e:#}, falling back to the built-in chime");
                                    if let Some(ref s) = sink {
                                        s.append(Chime::new());
                                    }
                                }
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                    }
                }
            })
            .context("failed to spawn audio thread")?;

        *guard = Some(tx.clone());
        Ok(tx)
    }

    /// Queues the alert: `sound` when given and decodable, the chime otherwise.
    pub fn play_alert(&self, sound: Option<&Path>) -> Result<()> {
        let tx = self.ensure_thread()?;
        let cmd = match sound {
            Some(path) => AudioCommand::PlayFile(path.to_path_buf()),
            None => AudioCommand::PlayChime,
        };
        tx.send(cmd).map_err(|e| anyhow!("audio thread gone: {e}"))
    }

    pub fn stop(&self) {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
    }
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open alert sound {}", path.display()))?;
    Decoder::new(BufReader::new(file))
        .with_context(|| format!("failed to decode alert sound {}", path.display()))
}
