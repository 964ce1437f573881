use std::sync::Arc;
use async_trait::async_trait;

use crate::models::patient::PatientCollection;
use super::errors::RepositoryError;

/// Repository trait for the patient collection.
///
/// The store is a plain key-value document: every operation loads the whole
/// collection and mutations write the whole collection back.
#[async_trait]
pub trait PatientRepositoryTrait: Send + Sync {
    /// Load every stored patient, keyed by id, in insertion order
    async fn load(&self) -> Result<PatientCollection, RepositoryError>;

    /// Replace the stored collection with `patients`
    async fn save(&self, patients: &PatientCollection) -> Result<(), RepositoryError>;

    /// Human readable description of the backing store, used in health reports
    fn describe(&self) -> String;
}

#[async_trait]
impl<R: PatientRepositoryTrait + ?Sized> PatientRepositoryTrait for Arc<R> {
    async fn load(&self) -> Result<PatientCollection, RepositoryError> {
        (**self).load().await
    }

    async fn save(&self, patients: &PatientCollection) -> Result<(), RepositoryError> {
        (**self).save(patients).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
