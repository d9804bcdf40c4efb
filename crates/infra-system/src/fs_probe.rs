// Filesystem probe backed by std::fs

use penman_core::port::FileProbe;
use std::path::Path;

/// Real filesystem; symlinks are followed
pub struct StdFileProbe;

impl FileProbe for StdFileProbe {
    fn is_file(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}
