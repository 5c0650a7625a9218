//! Import pipeline: read, validate, store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use cityjson_protocol::{import_document, model_name_for_file, ImportedModel};
use storage::FeatureStore;
use tracing::{error, info, instrument, warn};

/// One file to import.
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub path: PathBuf,

    /// Model name, defaults to the file name up to its first dot.
    pub name: Option<String>,
}

impl ImportJob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Outcome of a batch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    /// `(model name, object count)` for each model written or validated.
    pub imported: Vec<(String, usize)>,

    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl ImportSummary {
    pub fn object_count(&self) -> usize {
        self.imported.iter().map(|(_, n)| n).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Derive the model name from a file path: `Delft.city.json` → `Delft`.
pub fn model_name_for(path: &Path) -> Result<String> {
    model_name_for_file(path)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Cannot derive a model name from {:?}", path))
}

/// Read and validate one CityJSON file.
pub fn load_file(job: &ImportJob) -> Result<ImportedModel> {
    let name = match &job.name {
        Some(name) => name.clone(),
        None => model_name_for(&job.path)?,
    };

    let content = std::fs::read(&job.path)
        .with_context(|| format!("Failed to read {:?}", job.path))?;
    let document: serde_json::Value = serde_json::from_slice(&content)
        .with_context(|| format!("Failed to parse JSON in {:?}", job.path))?;

    import_document(&name, &document).with_context(|| format!("Invalid CityJSON in {:?}", job.path))
}

/// Loads files into a feature store.
pub struct Importer {
    store: Arc<dyn FeatureStore>,
    replace: bool,
    dry_run: bool,
}

impl Importer {
    pub fn new(store: Arc<dyn FeatureStore>) -> Self {
        Self {
            store,
            replace: false,
            dry_run: false,
        }
    }

    /// Overwrite models that already exist.
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Validate only, never write.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Import one file and return the stored object count.
    #[instrument(skip(self, job), fields(path = ?job.path))]
    pub async fn import(&self, job: &ImportJob) -> Result<(String, usize)> {
        let imported = load_file(job)?;
        let name = imported.model.name.clone();

        if self.dry_run {
            info!(model = %name, objects = imported.objects.len(), "Validated (dry run)");
            return Ok((name, imported.objects.len()));
        }

        let count = self
            .store
            .import_model(&imported, self.replace)
            .await
            .with_context(|| format!("Failed to store model {}", name))?;

        info!(model = %name, objects = count, backend = self.store.backend(), "Imported");
        Ok((name, count))
    }

    /// Import every job, continuing past failures.
    pub async fn import_all(&self, jobs: &[ImportJob]) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for job in jobs {
            match self.import(job).await {
                Ok(entry) => summary.imported.push(entry),
                Err(e) => {
                    error!(path = ?job.path, error = %format!("{:#}", e), "Import failed");
                    summary.failed.push((job.path.clone(), format!("{:#}", e)));
                }
            }
        }

        if !summary.is_success() {
            warn!(failed = summary.failed.len(), "Some files were not imported");
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name_for() {
        assert_eq!(model_name_for(Path::new("/data/Delft.city.json")).unwrap(), "Delft");
        assert_eq!(model_name_for(Path::new("rotterdam.json")).unwrap(), "rotterdam");
        assert!(model_name_for(Path::new("/data/.json")).is_err());
    }

    #[test]
    fn test_explicit_name_wins() {
        let dir = test_utils::temp_test_dir();
        let path = test_utils::write_fixture(&dir, "delft.json", &test_utils::delft_document());

        let imported = load_file(&ImportJob::new(&path).named("Delft-2024")).unwrap();
        assert_eq!(imported.model.name, "Delft-2024");
        assert!(imported.objects.iter().all(|o| o.city_model == "Delft-2024"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(&ImportJob::new("/nonexistent/city.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
