use log::warn;
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_TICK_MS: u64 = 1000;
const DEFAULT_POLL_MS: u64 = 100;

/// Runtime knobs, read from the environment only. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub tick_interval: Duration,
    pub poll_interval: Duration,
    pub alert_sound: Option<PathBuf>,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            alert_sound: None,
            debug: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |key: &str, default: u64| match lookup(key) {
            None => Duration::from_millis(default),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => Duration::from_millis(value),
                _ => {
                    warn!("ignoring {key}={raw:?}, using {default}ms");
                    Duration::from_millis(default)
                }
            },
        };

        Self {
            tick_interval: millis("FILETIMER_TICK_MS", DEFAULT_TICK_MS),
            poll_interval: millis("FILETIMER_POLL_MS", DEFAULT_POLL_MS),
            alert_sound: lookup("FILETIMER_ALERT_SOUND")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            debug: lookup("FILETIMER_DEBUG").is_some_and(|value| is_truthy(&value)),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Checked before the logger exists, so it can pick the default level.
pub fn debug_requested() -> bool {
    env::var("FILETIMER_DEBUG").is_ok_and(|value| is_truthy(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]), AppConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            ("FILETIMER_TICK_MS", "250"),
            ("FILETIMER_POLL_MS", "50"),
            ("FILETIMER_ALERT_SOUND", "/usr/share/sounds/finish.wav"),
            ("FILETIMER_DEBUG", "TRUE"),
        ]);
        assert_eq!(cfg.tick_interval, Duration::from_millis(250));
        assert_eq!(cfg.poll_interval, Duration::from_millis(50));
        assert_eq!(
            cfg.alert_sound,
            Some(PathBuf::from("/usr/share/sounds/finish.wav"))
        );
        assert!(cfg.debug);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let cfg = config(&[("FILETIMER_TICK_MS", "soon"), ("FILETIMER_POLL_MS", "0")]);
        assert_eq!(cfg.tick_interval, Duration::from_millis(DEFAULT_TICK_MS));
        assert_eq!(cfg.poll_interval, Duration::from_millis(DEFAULT_POLL_MS));
    }
}
