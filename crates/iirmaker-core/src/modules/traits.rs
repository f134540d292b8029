use crate::domain::{IirError, IirResult, Slot};
use std::fs;
use std::path::PathBuf;

/// Where coefficient records come from.
///
/// `Ok(None)` means the slot has no file and is skipped; it is not an error.
pub trait RecordSource {
    fn load(&self, slot: Slot) -> IirResult<Option<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RecordSource for DirectorySource {
    fn load(&self, slot: Slot) -> IirResult<Option<String>> {
        let path = self.dir.join(slot.input_file_name());
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path).map(Some).map_err(|source| {
            IirError::io_system(
                "IO.INPUT_READ",
                format!(
                    "failed to read coefficient file '{}' for slot {}: {}",
                    path.display(),
                    slot,
                    source
                ),
            )
        })
    }
}
