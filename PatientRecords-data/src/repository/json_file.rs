use std::io::ErrorKind;
use std::path::PathBuf;
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::models::patient::PatientCollection;
use super::errors::RepositoryError;
use super::patient::PatientRepositoryTrait;

/// Patient store backed by a single JSON document on disk.
///
/// A missing file reads as an empty collection. Saves go through a sibling
/// `.tmp` file that is renamed over the target, so readers never observe a
/// half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Create a repository for the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "patients.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl PatientRepositoryTrait for JsonFileRepository {
    async fn load(&self) -> Result<PatientCollection, RepositoryError> {
        debug!("Loading patient records from {}", self.path.display());

        let contents = match fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(PatientCollection::new());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(PatientCollection::new());
        }

        Ok(serde_json::from_slice(&contents)?)
    }

    async fn save(&self, patients: &PatientCollection) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(patients)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, &json).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(count = patients.len(), "Saved patient records to {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }
}
