//! Storage backend for experiment tracking

use std::fs;
use std::path::{Path, PathBuf};

use super::tracker::Experiment;
use crate::error::{PredictorError, Result};

/// Storage backend trait
pub trait StorageBackend {
    /// Save experiments to storage
    fn save_experiments(&self, experiments: &[Experiment]) -> Result<()>;

    /// Load experiments from storage. An empty store yields an empty list.
    fn load_experiments(&self) -> Result<Vec<Experiment>>;

    /// Copy `source` into the artifact area of a run, returning the stored path
    fn store_artifact(&self, experiment_id: &str, run_id: &str, source: &Path) -> Result<PathBuf>;
}

/// Local file system storage backend.
///
/// Layout: `<base>/experiments.json` plus
/// `<base>/<experiment_id>/<run_id>/artifacts/<file>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn experiments_file(&self) -> PathBuf {
        self.base_dir.join("experiments.json")
    }

    fn artifact_dir(&self, experiment_id: &str, run_id: &str) -> PathBuf {
        self.base_dir.join(experiment_id).join(run_id).join("artifacts")
    }
}

impl StorageBackend for LocalStorage {
    fn save_experiments(&self, experiments: &[Experiment]) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let json = serde_json::to_string_pretty(experiments)?;
        fs::write(self.experiments_file(), json)?;
        Ok(())
    }

    fn load_experiments(&self) -> Result<Vec<Experiment>> {
        let file_path = self.experiments_file();
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&file_path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn store_artifact(&self, experiment_id: &str, run_id: &str, source: &Path) -> Result<PathBuf> {
        let file_name = source.file_name().ok_or_else(|| {
            PredictorError::TrackingError(format!("artifact path has no file name: {}", source.display()))
        })?;

        let dir = self.artifact_dir(experiment_id, run_id);
        fs::create_dir_all(&dir)?;
        let dest = dir.join(file_name);
        fs::copy(source, &dest)?;
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("tracking-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_local_storage_save_load() {
        let dir = temp_dir();
        let storage = LocalStorage::new(&dir);

        assert!(storage.load_experiments().unwrap().is_empty());

        let experiments = vec![Experiment::new("survey"), Experiment::new("other")];
        storage.save_experiments(&experiments).unwrap();

        let loaded = storage.load_experiments().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "survey");
        assert_eq!(loaded[0].experiment_id, experiments[0].experiment_id);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_store_artifact() {
        let dir = temp_dir();
        let storage = LocalStorage::new(&dir);

        fs::create_dir_all(&dir).unwrap();
        let source = dir.join("feature_names.txt");
        fs::write(&source, "Age\nGender_Male").unwrap();

        let stored = storage.store_artifact("exp", "run", &source).unwrap();
        assert_eq!(stored, dir.join("exp").join("run").join("artifacts").join("feature_names.txt"));
        assert_eq!(fs::read_to_string(stored).unwrap(), "Age\nGender_Male");

        let _ = fs::remove_dir_all(dir);
    }
}
