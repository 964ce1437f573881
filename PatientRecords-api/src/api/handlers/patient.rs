use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, instrument, warn};

// Import domain services
use patient_records_domain::services::{PatientServiceError, PatientServiceTrait};

// Import our entities
use crate::entities::common::{ErrorResponse, MessageResponse};
use crate::entities::patient::{
    PublicCreatePatientRequest, PublicPatient, PublicPatientDirectory,
    PublicUpdatePatientRequest, SortQueryParams,
};

/// Service type for dependency injection
pub type PatientService = Arc<dyn PatientServiceTrait>;

/// Map a domain error onto the API error format, logging it on the way
fn error_response(err: PatientServiceError) -> ErrorResponse {
    match err {
        PatientServiceError::NotFound(id) => {
            warn!("Patient not found: {}", id);
            ErrorResponse::not_found()
        }
        PatientServiceError::Conflict(id) => {
            warn!("Patient already exists: {}", id);
            ErrorResponse::conflict()
        }
        PatientServiceError::Validation(failure) => {
            warn!("Invalid patient data: {}", failure);
            ErrorResponse::validation_error(&failure.to_string(), failure.details())
        }
        PatientServiceError::BadRequest(message) => {
            warn!("Bad request: {}", message);
            ErrorResponse::bad_request(&message)
        }
        PatientServiceError::Repository(message) => {
            error!("Patient store failure: {}", message);
            ErrorResponse::internal_error()
        }
    }
}

/// Turn a body that failed to parse into a 400 response
fn rejection_response(rejection: JsonRejection) -> ErrorResponse {
    warn!("Rejected request body: {}", rejection.body_text());
    ErrorResponse::bad_request(&rejection.body_text())
}

/// Get every patient, keyed by id
#[utoipa::path(
    get,
    path = "/viewpatients",
    responses(
        (status = 200, description = "All patients keyed by id", body = PublicPatientDirectory),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn view_patients(
    State(service): State<PatientService>,
) -> Result<Json<PublicPatientDirectory>, ErrorResponse> {
    let patients = service.list_patients().await.map_err(error_response)?;
    Ok(Json(patients.into_iter().collect()))
}

/// Get a single patient by id
#[utoipa::path(
    get,
    path = "/viewpatient/{id}",
    params(
        ("id" = String, Path, description = "Patient ID", example = "P001")
    ),
    responses(
        (status = 200, description = "Patient found", body = PublicPatient),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn view_patient(
    State(service): State<PatientService>,
    Path(id): Path<String>,
) -> Result<Json<PublicPatient>, ErrorResponse> {
    let patient = service.get_patient(&id).await.map_err(error_response)?;
    Ok(Json(PublicPatient::from(patient)))
}

/// Get every patient sorted by height, weight or bmi
#[utoipa::path(
    get,
    path = "/sort",
    params(SortQueryParams),
    responses(
        (status = 200, description = "Sorted patients", body = [PublicPatient]),
        (status = 400, description = "Invalid sort field or order", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn sort_patients(
    State(service): State<PatientService>,
    Query(params): Query<SortQueryParams>,
) -> Result<Json<Vec<PublicPatient>>, ErrorResponse> {
    let sort_by = params.sort_by.unwrap_or_default();
    let order = params.order.unwrap_or_else(|| "asc".to_string());

    let patients = service
        .sort_patients(&sort_by, &order)
        .await
        .map_err(error_response)?;

    Ok(Json(patients.into_iter().map(PublicPatient::from).collect()))
}

/// Create a new patient
#[utoipa::path(
    post,
    path = "/createpatient",
    request_body = PublicCreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = MessageResponse),
        (status = 400, description = "Invalid patient or duplicate id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service, payload))]
pub async fn create_patient(
    State(service): State<PatientService>,
    payload: Result<Json<PublicCreatePatientRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload.map_err(rejection_response)?;

    let patient = service
        .create_patient(request.into())
        .await
        .map_err(error_response)?;

    info!("Patient created with ID: {}", patient.id);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Patient created successfully!")),
    ))
}

/// Update fields of an existing patient
#[utoipa::path(
    put,
    path = "/updatepatient/{id}",
    params(
        ("id" = String, Path, description = "Patient ID", example = "P001")
    ),
    request_body = PublicUpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = MessageResponse),
        (status = 400, description = "Merged patient is invalid", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service, payload))]
pub async fn update_patient(
    State(service): State<PatientService>,
    Path(id): Path<String>,
    payload: Result<Json<PublicUpdatePatientRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    let Json(request) = payload.map_err(rejection_response)?;

    service
        .update_patient(&id, request.into())
        .await
        .map_err(error_response)?;

    Ok(Json(MessageResponse::new("Patient updated successfully!")))
}

/// Delete a patient
#[utoipa::path(
    delete,
    path = "/deletepatient/{id}",
    params(
        ("id" = String, Path, description = "Patient ID", example = "P001")
    ),
    responses(
        (status = 200, description = "Patient deleted", body = MessageResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn delete_patient(
    State(service): State<PatientService>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    service.delete_patient(&id).await.map_err(error_response)?;
    Ok(Json(MessageResponse::new("Patient deleted successfully!")))
}
