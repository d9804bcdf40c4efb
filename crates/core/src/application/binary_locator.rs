// Binary lookup over an ordered list of search roots

use crate::domain::ProviderSpec;
use crate::port::FileProbe;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Finds provider binaries in injectable search roots
pub struct BinaryLocator {
    search_roots: Vec<PathBuf>,
    probe: Arc<dyn FileProbe>,
}

impl BinaryLocator {
    /// Create a locator
    ///
    /// # Arguments
    /// * `search_roots` - Directories checked in order
    /// * `probe` - Filesystem seam (real or fake)
    pub fn new(search_roots: Vec<PathBuf>, probe: Arc<dyn FileProbe>) -> Self {
        Self {
            search_roots,
            probe,
        }
    }

    /// Every candidate path, roots outer, names inner
    pub fn candidates(&self, spec: &ProviderSpec) -> Vec<PathBuf> {
        self.search_roots
            .iter()
            .flat_map(|root| spec.binary_names.iter().map(move |name| root.join(name)))
            .collect()
    }

    /// First existing candidate
    pub fn find(&self, spec: &ProviderSpec) -> Option<PathBuf> {
        self.candidates(spec)
            .into_iter()
            .find(|path| self.probe.is_file(path))
    }

    /// First existing candidate, else the first candidate
    ///
    /// The fallback lets the runner report `BinaryNotFound` with the path the
    /// user would be expected to install to.
    pub fn resolve(&self, spec: &ProviderSpec) -> PathBuf {
        if let Some(found) = self.find(spec) {
            debug!(provider = %spec.tag, path = %found.display(), "Binary located");
            return found;
        }
        let fallback = self
            .candidates(spec)
            .into_iter()
            .next()
            .unwrap_or_else(|| PathBuf::from(spec.binary_names.first().copied().unwrap_or("")));
        debug!(provider = %spec.tag, fallback = %fallback.display(), "Binary not installed in any search root");
        fallback
    }
}
