// File Probe Port (for testability)

use std::path::Path;

/// Filesystem existence check, injectable so lookups can run against a fake tree
pub trait FileProbe: Send + Sync {
    /// True when `path` names an existing regular file
    fn is_file(&self, path: &Path) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    /// In-memory set of files
    #[derive(Default)]
    pub struct FakeFileProbe {
        files: HashSet<PathBuf>,
    }

    impl FakeFileProbe {
        pub fn new<I, P>(files: I) -> Self
        where
            I: IntoIterator<Item = P>,
            P: Into<PathBuf>,
        {
            Self {
                files: files.into_iter().map(Into::into).collect(),
            }
        }
    }

    impl FileProbe for FakeFileProbe {
        fn is_file(&self, path: &Path) -> bool {
            self.files.contains(path)
        }
    }
}
