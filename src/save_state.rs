use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("save state I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save state encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionState {
    pub label: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    // CPU state, in register file order
    pub registers: Vec<u16>,
    pub cycles: u64,
    pub stack_depth: i32,

    pub frame: u64,

    // Writable regions only; ROM comes back from the boot image.
    pub regions: Vec<RegionState>,

    pub timestamp: u64,
}

impl SaveState {
    pub fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveStateError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<SaveState, SaveStateError> {
        Ok(bincode::deserialize(data)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, filename: P) -> Result<(), SaveStateError> {
        let data = self.to_bytes()?;
        std::fs::write(filename.as_ref(), data)?;
        log::info!("Save state written to: {}", filename.as_ref().display());
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(filename: P) -> Result<SaveState, SaveStateError> {
        let data = std::fs::read(filename.as_ref())?;
        let save_state = Self::from_bytes(&data)?;
        log::info!("Save state loaded from: {}", filename.as_ref().display());
        Ok(save_state)
    }
}
