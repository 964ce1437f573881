//! Store configuration for the patient records service
//!
//! Two backends are supported:
//! - JSON file (default), a single document rewritten on every mutation
//! - in-memory, for tests and throwaway instances

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::repository::{
    InMemoryRepository, JsonFileRepository, PatientRepositoryTrait, RepositoryError,
};

/// Default location of the patients document
pub const DEFAULT_PATIENTS_FILE: &str = "patients.json";

/// Supported store types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    /// JSON document on disk
    File,
    /// Process-local map, lost on restart
    Memory,
}

impl FromStr for StoreType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" | "json" => Ok(StoreType::File),
            "memory" | "in-memory" => Ok(StoreType::Memory),
            _ => Err(RepositoryError::Config(format!("Unsupported store type: {}", s))),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Which backend to use
    pub store_type: StoreType,
    /// Path of the patients document for the file backend
    pub file_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::File,
            file_path: DEFAULT_PATIENTS_FILE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Create a store configuration from environment variables
    ///
    /// - `PATIENTS_STORE`: `file` (default) or `memory`
    /// - `PATIENTS_FILE`: path of the JSON document (default `patients.json`)
    pub fn from_env() -> Result<Self, RepositoryError> {
        let store_type = match env::var("PATIENTS_STORE") {
            Ok(value) => value.parse()?,
            Err(_) => StoreType::File,
        };

        let file_path = env::var("PATIENTS_FILE")
            .unwrap_or_else(|_| DEFAULT_PATIENTS_FILE.to_string());

        Ok(Self { store_type, file_path })
    }
}

/// Build the repository described by `config`
pub fn create_repository(config: &StoreConfig) -> Arc<dyn PatientRepositoryTrait> {
    match config.store_type {
        StoreType::File => {
            info!("Using JSON file store at {}", config.file_path);
            Arc::new(JsonFileRepository::new(&config.file_path))
        }
        StoreType::Memory => {
            info!("Using in-memory store, records will not survive a restart");
            Arc::new(InMemoryRepository::new())
        }
    }
}
