//! Test fixtures for storage testing.

/// Creates a temporary directory and a table path inside it.
///
/// The returned `TempDir` must be kept alive for the duration of the test.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
pub fn create_temp_store_path() -> (tempfile::TempDir, std::path::PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("search-counts.json");
    (temp_dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_store_path() {
        let (temp_dir, path) = create_temp_store_path();

        assert!(temp_dir.path().is_dir());
        assert!(!path.exists());
        assert_eq!(path.parent(), Some(temp_dir.path()));
    }
}
