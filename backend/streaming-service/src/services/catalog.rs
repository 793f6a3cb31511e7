use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Maps public video ids to files on disk.
///
/// Stands in for a real catalog service. Ids are stable public handles;
/// an unknown id means 404 and never reaches the publisher.
#[derive(Debug, Clone, Default)]
pub struct VideoCatalog {
    entries: HashMap<String, PathBuf>,
}

impl VideoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the bundled sample videos under `video_dir`.
    pub fn with_samples(video_dir: &Path) -> Self {
        let mut catalog = Self::new();
        catalog.insert("1", video_dir.join("sample-hd.mp4"));
        catalog.insert("2", video_dir.join("sample-uhd.mp4"));
        catalog
    }

    pub fn insert(&mut self, id: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(id.into(), path.into());
    }

    pub fn resolve(&self, id: &str) -> Option<&Path> {
        self.entries.get(id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog_resolves_known_ids() {
        let catalog = VideoCatalog::with_samples(Path::new("videos"));
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.resolve("1"),
            Some(Path::new("videos/sample-hd.mp4"))
        );
        assert_eq!(
            catalog.resolve("2"),
            Some(Path::new("videos/sample-uhd.mp4"))
        );
    }

    #[test]
    fn test_unknown_id_resolves_to_none() {
        let catalog = VideoCatalog::with_samples(Path::new("videos"));
        assert!(catalog.resolve("99").is_none());
    }

    #[test]
    fn test_inserted_entry_is_resolvable() {
        let mut catalog = VideoCatalog::new();
        assert!(catalog.is_empty());

        catalog.insert("7", "clips/seven.mp4");
        assert_eq!(catalog.resolve("7"), Some(Path::new("clips/seven.mp4")));
    }
}
