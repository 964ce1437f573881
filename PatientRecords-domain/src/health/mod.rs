//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;

use patient_records_data::repository::PatientRepositoryTrait;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Build a report whose overall status is the worst component status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check that the patient store can be read.
    /// Returns the number of stored patients, or a description of the failure.
    async fn check_store_status(&self) -> Result<usize, String>;
}

/// Health service that probes the patient store
pub struct StoreHealthService {
    repository: Arc<dyn PatientRepositoryTrait>,
}

impl std::fmt::Debug for StoreHealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHealthService")
            .field("store", &self.repository.describe())
            .finish()
    }
}

impl StoreHealthService {
    /// Create a health service for `repository`
    pub fn new(repository: Arc<dyn PatientRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl HealthServiceTrait for StoreHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let store_component = match self.check_store_status().await {
            Ok(count) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(format!("{} ({} patients)", self.repository.describe(), count)),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let mut components = HashMap::new();
        components.insert("store".to_string(), store_component);
        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );

        SystemHealth::from_components(components)
    }

    async fn check_store_status(&self) -> Result<usize, String> {
        self.repository
            .load()
            .await
            .map(|patients| patients.len())
            .map_err(|e| format!("Store unavailable: {}", e))
    }
}

/// Factory function to create a health service for `repository`
pub fn create_health_service(
    repository: Arc<dyn PatientRepositoryTrait>,
) -> Arc<dyn HealthServiceTrait> {
    Arc::new(StoreHealthService::new(repository))
}
