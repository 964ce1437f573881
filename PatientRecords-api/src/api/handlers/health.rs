use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

// Use the trait from domain layer
use patient_records_domain::health::{
    ComponentStatus as DomainComponentStatus, HealthComponent as DomainHealthComponent,
    HealthServiceTrait, SystemStatus,
};

use crate::entities::common::MessageResponse;

/// Health service type for dependency injection
pub type HealthService = Arc<dyn HealthServiceTrait>;

/// Health check response with status of the service and its store
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// When the response was generated
    pub timestamp: DateTime<Utc>,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,
    /// Details about various components of the system
    pub components: ComponentStatus,
    /// Environment information
    pub environment: String,
}

/// Status of individual system components
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// Patient store status
    pub store: ComponentHealthStatus,
    /// API status
    pub api: ComponentHealthStatus,
    /// Any further components reported by the health service
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional: BTreeMap<String, ComponentHealthStatus>,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Option<&DomainHealthComponent>> for ComponentHealthStatus {
    fn from(component: Option<&DomainHealthComponent>) -> Self {
        match component {
            Some(component) => Self {
                status: map_component_status(&component.status),
                message: component.details.clone(),
            },
            None => Self {
                status: "ok".to_string(),
                message: None,
            },
        }
    }
}

static SERVER_START_TIME: OnceCell<DateTime<Utc>> = OnceCell::new();

/// Record the server start time used for uptime reporting.
/// Calling this more than once keeps the first value.
pub fn initialize_server_start_time() {
    SERVER_START_TIME.get_or_init(Utc::now);
}

/// Liveness message
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = MessageResponse)
    ),
    tag = "health"
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Patients Management System API"))
}

/// Short description of the service
#[utoipa::path(
    get,
    path = "/about",
    responses(
        (status = 200, description = "Service description", body = MessageResponse)
    ),
    tag = "health"
)]
pub async fn about() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "Fully functional API for managing patient records.",
    ))
}

/// Health check endpoint to verify the API and its store are usable
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 503, description = "API is degraded or the store is unavailable", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(Extension(health_service): Extension<HealthService>) -> impl IntoResponse {
    info!("Health check requested");

    let now = Utc::now();
    let uptime = SERVER_START_TIME
        .get()
        .map(|start| (now - *start).num_seconds().max(0));

    let system_health = health_service.get_system_health().await;

    let overall_status = match system_health.status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    };

    let additional = system_health
        .components
        .iter()
        .filter(|(name, _)| name.as_str() != "store" && name.as_str() != "api")
        .map(|(name, component)| (name.clone(), ComponentHealthStatus::from(Some(component))))
        .collect();

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: ComponentStatus {
            store: system_health.components.get("store").into(),
            api: system_health.components.get("api").into(),
            additional,
        },
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    if system_health.status == SystemStatus::Healthy {
        (StatusCode::OK, Json(response))
    } else {
        warn!("Health check reports status {}", overall_status);
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_status_mapping() {
        assert_eq!(map_component_status(&DomainComponentStatus::Healthy), "ok");
        assert_eq!(map_component_status(&DomainComponentStatus::Degraded), "degraded");
        assert_eq!(map_component_status(&DomainComponentStatus::Unhealthy), "error");
    }

    #[test]
    fn test_missing_component_reports_ok() {
        let status = ComponentHealthStatus::from(None);
        assert_eq!(status.status, "ok");
        assert!(status.message.is_none());
    }

    #[tokio::test]
    async fn test_root_and_about_messages() {
        let Json(root_message) = root().await;
        assert_eq!(root_message.message, "Patients Management System API");

        let Json(about_message) = about().await;
        assert!(about_message.message.contains("patient records"));
    }
}
