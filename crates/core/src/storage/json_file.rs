use crate::storage::{AlertLedger, Baselines, StateStore, TrackerState};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const BASELINE_FILE: &str = "baseline_prices.json";
pub const ALERT_STATE_FILE: &str = "alert_state.json";

/// Two pretty-printed JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn baseline_path(&self) -> PathBuf {
        self.dir.join(BASELINE_FILE)
    }

    pub fn alert_state_path(&self) -> PathBuf {
        self.dir.join(ALERT_STATE_FILE)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> anyhow::Result<TrackerState> {
        let baselines: Baselines = read_json_or_default(&self.baseline_path())?;
        let alerts: AlertLedger = read_json_or_default(&self.alert_state_path())?;
        Ok(TrackerState { baselines, alerts })
    }

    fn save(&self, state: &TrackerState) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create state dir {}", self.dir.display()))?;
        write_json_atomic(&self.baseline_path(), &state.baselines)?;
        write_json_atomic(&self.alert_state_path(), &state.alerts)?;
        tracing::debug!(dir = %self.dir.display(), "saved tracker state");
        Ok(())
    }
}

fn read_json_or_default<T>(path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    if text.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
