use axum::{
    routing::{delete, get, post, put},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use patient_records_domain::health::create_health_service;
use patient_records_domain::services::create_patient_service;
use patient_records_data::repository::RepositoryError;
use patient_records_domain::store::{create_repository, StoreConfig};

use crate::api::handlers::{health, patient};
use crate::openapi::configure_swagger_routes;

/// Build the application router around the given services
pub fn create_app(service: patient::PatientService, health_service: health::HealthService) -> Router {
    debug!("Creating application router");

    let patient_routes = Router::new()
        .route("/viewpatients", get(patient::view_patients))
        .route("/viewpatient/:id", get(patient::view_patient))
        .route("/sort", get(patient::sort_patients))
        .route("/createpatient", post(patient::create_patient))
        .route("/updatepatient/:id", put(patient::update_patient))
        .route("/deletepatient/:id", delete(patient::delete_patient))
        .with_state(service);

    debug!("Patient routes configured");

    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/about", get(health::about))
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    debug!("Public routes configured");

    // Start the uptime clock the first time a router is built
    health::initialize_server_start_time();

    Router::new()
        .merge(public_routes)
        .merge(patient_routes)
        .merge(configure_swagger_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Build the application from environment configuration
pub fn create_application() -> Result<Router, RepositoryError> {
    let config = StoreConfig::from_env()?;
    let repository = create_repository(&config);

    let service: patient::PatientService = Arc::new(create_patient_service(repository.clone()));
    let health_service = create_health_service(repository);

    Ok(create_app(service, health_service))
}
