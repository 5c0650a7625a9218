//! Temporary files for tests that read CityJSON from disk.

use std::path::PathBuf;

use serde_json::Value;

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes `document` as `name` inside `dir` and returns the path.
pub fn write_fixture(dir: &tempfile::TempDir, name: &str, document: &Value) -> PathBuf {
    let path = dir.path().join(name);
    let body = serde_json::to_vec_pretty(document).expect("Failed to serialize fixture");
    std::fs::write(&path, body).expect("Failed to write fixture file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_fixture_round_trips() {
        let dir = temp_test_dir();
        let document = serde_json::json!({"type": "CityJSON"});
        let path = write_fixture(&dir, "model.city.json", &document);

        let read: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(read, document);
    }
}
