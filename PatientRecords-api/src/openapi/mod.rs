use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Service endpoints
        crate::api::handlers::health::root,
        crate::api::handlers::health::about,
        crate::api::handlers::health::health_check,

        // Patient endpoints
        crate::api::handlers::patient::view_patients,
        crate::api::handlers::patient::view_patient,
        crate::api::handlers::patient::sort_patients,
        crate::api::handlers::patient::create_patient,
        crate::api::handlers::patient::update_patient,
        crate::api::handlers::patient::delete_patient,
    ),
    components(
        schemas(
            crate::entities::patient::PublicPatient,
            crate::entities::patient::PublicPatientDirectory,
            crate::entities::patient::PublicCreatePatientRequest,
            crate::entities::patient::PublicUpdatePatientRequest,
            crate::entities::common::ErrorResponse,
            crate::entities::common::MessageResponse,

            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,
        )
    ),
    tags(
        (name = "health", description = "Service status endpoints"),
        (name = "patients", description = "Patient record management endpoints")
    ),
    info(
        title = "Patient Records API",
        version = "0.1.0",
        description = "API for storing patient records with derived BMI and weight verdict",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Patient Records API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags should be defined");
        assert!(tags.iter().any(|tag| tag.name == "health"));
        assert!(tags.iter().any(|tag| tag.name == "patients"));

        for path in [
            "/",
            "/about",
            "/health",
            "/viewpatients",
            "/viewpatient/{id}",
            "/sort",
            "/createpatient",
            "/updatepatient/{id}",
            "/deletepatient/{id}",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_schemas_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components should be defined");

        assert!(components.schemas.contains_key("PublicPatient"));
        assert!(components.schemas.contains_key("ErrorResponse"));
        assert!(components.schemas.contains_key("HealthResponse"));
    }
}
