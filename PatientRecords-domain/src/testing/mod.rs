// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::HashMap;
use std::sync::RwLock;
use async_trait::async_trait;

use crate::entities::patient::{Patient, PatientInput, PatientUpdate};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::services::patient::{
    merge_patient, sort_by_field, validate_patient, PatientServiceError, PatientServiceTrait,
    SortField, SortOrder,
};

/// Mock implementation of the PatientServiceTrait for testing.
///
/// Keeps patients in a vector so listing order is insertion order, and runs
/// the real validation and merge rules.
pub struct MockPatientService {
    patients: RwLock<Vec<Patient>>,
    should_fail_storage: bool,
}

impl Default for MockPatientService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPatientService {
    /// Create a new, empty mock patient service
    pub fn new() -> Self {
        Self {
            patients: RwLock::new(Vec::new()),
            should_fail_storage: false,
        }
    }

    /// Configure the mock so every operation fails with a repository error
    pub fn with_storage_failure(mut self) -> Self {
        self.should_fail_storage = true;
        self
    }

    /// Add a pre-defined patient to the mock
    pub fn with_patient(self, patient: Patient) -> Self {
        self.with_patients(vec![patient])
    }

    /// Add multiple pre-defined patients to the mock
    pub fn with_patients(self, patients: Vec<Patient>) -> Self {
        if let Ok(mut stored) = self.patients.write() {
            stored.extend(patients);
        }
        self
    }

    fn check_storage(&self) -> Result<(), PatientServiceError> {
        if self.should_fail_storage {
            Err(PatientServiceError::Repository(
                "Repository error - mock is configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn lock_error<T>(_: T) -> PatientServiceError {
        PatientServiceError::Repository("mock lock poisoned".to_string())
    }
}

#[async_trait]
impl PatientServiceTrait for MockPatientService {
    async fn list_patients(&self) -> Result<Vec<Patient>, PatientServiceError> {
        self.check_storage()?;
        Ok(self.patients.read().map_err(Self::lock_error)?.clone())
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, PatientServiceError> {
        self.check_storage()?;
        self.patients
            .read()
            .map_err(Self::lock_error)?
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| PatientServiceError::NotFound(id.to_string()))
    }

    async fn sort_patients(&self, sort_by: &str, order: &str) -> Result<Vec<Patient>, PatientServiceError> {
        let field = sort_by.parse::<SortField>()?;
        let order = order.parse::<SortOrder>()?;
        Ok(sort_by_field(self.list_patients().await?, field, order))
    }

    async fn create_patient(&self, input: PatientInput) -> Result<Patient, PatientServiceError> {
        let patient = validate_patient(&input)?;
        self.check_storage()?;

        let mut patients = self.patients.write().map_err(Self::lock_error)?;
        if patients.iter().any(|p| p.id == patient.id) {
            return Err(PatientServiceError::Conflict(patient.id));
        }
        patients.push(patient.clone());
        Ok(patient)
    }

    async fn update_patient(&self, id: &str, patch: PatientUpdate) -> Result<Patient, PatientServiceError> {
        self.check_storage()?;

        let mut patients = self.patients.write().map_err(Self::lock_error)?;
        let existing = patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PatientServiceError::NotFound(id.to_string()))?;

        let updated = merge_patient(existing, &patch)?;
        *existing = updated.clone();
        Ok(updated)
    }

    async fn delete_patient(&self, id: &str) -> Result<(), PatientServiceError> {
        self.check_storage()?;

        let mut patients = self.patients.write().map_err(Self::lock_error)?;
        let before = patients.len();
        patients.retain(|p| p.id != id);
        if patients.len() == before {
            return Err(PatientServiceError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    /// Store component status
    store_status: ComponentStatus,
    /// Additional components
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            store_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with a degraded store
    pub fn with_degraded_store(mut self) -> Self {
        self.store_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy store
    pub fn with_unhealthy_store(mut self) -> Self {
        self.store_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            "store".to_string(),
            HealthComponent {
                status: self.store_status.clone(),
                details: match self.store_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Store is responding slowly".to_string()),
                    ComponentStatus::Unhealthy => Some("Store unavailable".to_string()),
                },
            },
        );
        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );

        for (name, component) in &self.components {
            components.insert(name.clone(), component.clone());
        }

        SystemHealth::from_components(components)
    }

    async fn check_store_status(&self) -> Result<usize, String> {
        match self.store_status {
            ComponentStatus::Unhealthy => Err("Store unavailable".to_string()),
            _ => Ok(0),
        }
    }
}
