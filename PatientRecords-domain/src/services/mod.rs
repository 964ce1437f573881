pub mod metrics;
pub mod patient;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use patient::{
    create_patient_service, merge_patient, sort_by_field, validate_patient, PatientService,
    PatientServiceError, PatientServiceTrait, SortField, SortOrder,
};
pub use metrics::{calculate_bmi, categorize_bmi, derive_metrics};
