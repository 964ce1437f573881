use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tracing::debug;

use crate::models::patient::PatientCollection;
use super::errors::RepositoryError;
use super::patient::PatientRepositoryTrait;

/// In-memory storage for patient records.
///
/// Clones share the same underlying collection.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    patients: Arc<Mutex<PatientCollection>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::with_patients(PatientCollection::new())
    }

    /// Create an in-memory store pre-populated with `patients`
    pub fn with_patients(patients: PatientCollection) -> Self {
        Self {
            patients: Arc::new(Mutex::new(patients)),
        }
    }
}

#[async_trait]
impl PatientRepositoryTrait for InMemoryRepository {
    async fn load(&self) -> Result<PatientCollection, RepositoryError> {
        let store = self.patients.lock()?;
        Ok(store.clone())
    }

    async fn save(&self, patients: &PatientCollection) -> Result<(), RepositoryError> {
        let mut store = self.patients.lock()?;
        *store = patients.clone();
        debug!(count = store.len(), "Saved patient records in memory");
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}
