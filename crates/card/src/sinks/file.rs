//! Plain file card output.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::CardSink;
use crate::error::CardError;

/// Sink writing the card JSON to a file, replacing previous content.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl CardSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    fn write(&self, payload: &[u8]) -> Result<(), CardError> {
        std::fs::write(&self.path, payload).map_err(|source| CardError::File {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "Card written");
        Ok(())
    }
}
