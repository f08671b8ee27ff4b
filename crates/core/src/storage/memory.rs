use crate::storage::{StateStore, TrackerState};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<TrackerState>,
}

impl MemoryStore {
    pub fn new(state: TrackerState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> TrackerState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> anyhow::Result<TrackerState> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &TrackerState) -> anyhow::Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        *guard = state.clone();
        Ok(())
    }
}
