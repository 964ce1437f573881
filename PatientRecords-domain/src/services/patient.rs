use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;
use async_trait::async_trait;

use crate::entities::conversions;
use crate::entities::patient::{
    FieldViolation, Gender, Patient, PatientInput, PatientUpdate, ValidationFailure,
};
use crate::services::metrics::derive_metrics;
use patient_records_data::models::PatientCollection;
use patient_records_data::repository::{PatientRepositoryTrait, RepositoryError};

/// Message returned for an unknown sort field
pub const INVALID_SORT_FIELD: &str = "Invalid field, select from [height, weight, bmi]";

/// Message returned for an unknown sort direction
pub const INVALID_SORT_ORDER: &str = "Not a valid order, order should be asc or desc";

/// Field order used when reporting violations
const FIELD_ORDER: [&str; 6] = ["id", "name", "age", "gender", "height", "weight"];

/// Patient service errors
#[derive(Debug, Error)]
pub enum PatientServiceError {
    /// One or more fields violate their constraints
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationFailure),

    /// No patient with the given id
    #[error("Patient not found: {0}")]
    NotFound(String),

    /// A patient with the given id already exists
    #[error("Patient already exists: {0}")]
    Conflict(String),

    /// Malformed request parameters
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for PatientServiceError {
    fn from(err: RepositoryError) -> Self {
        PatientServiceError::Repository(err.to_string())
    }
}

/// Numeric field a patient listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    Bmi,
}

impl SortField {
    fn value(&self, patient: &Patient) -> f64 {
        match self {
            SortField::Height => patient.height,
            SortField::Weight => patient.weight,
            SortField::Bmi => patient.bmi,
        }
    }
}

impl FromStr for SortField {
    type Err = PatientServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            _ => Err(PatientServiceError::BadRequest(INVALID_SORT_FIELD.to_string())),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = PatientServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(PatientServiceError::BadRequest(INVALID_SORT_ORDER.to_string())),
        }
    }
}

/// Validate candidate field values and build a patient with derived metrics.
///
/// All constraints are checked and every violation is reported, not just the
/// first one.
pub fn validate_patient(input: &PatientInput) -> Result<Patient, ValidationFailure> {
    let mut violations = Vec::new();

    if let Err(validation_errors) = input.validate() {
        for (field, errors) in validation_errors.field_errors() {
            for err in errors.iter() {
                let message = match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                };
                violations.push(FieldViolation::new(field.to_string(), message));
            }
        }
    }

    let gender = match input.gender.parse::<Gender>() {
        Ok(gender) => Some(gender),
        Err(msg) => {
            violations.push(FieldViolation::new("gender", msg));
            None
        }
    };

    if !is_positive(input.height) {
        violations.push(FieldViolation::new("height", "Height must be a number greater than 0"));
    }
    if !is_positive(input.weight) {
        violations.push(FieldViolation::new("weight", "Weight must be a number greater than 0"));
    }

    let (bmi, verdict) = derive_metrics(input.height, input.weight);
    if violations.is_empty() && !bmi.is_finite() {
        violations.push(FieldViolation::new("height", "Height is too small to derive a BMI"));
    }

    match gender {
        Some(gender) if violations.is_empty() => Ok(Patient {
            id: input.id.clone(),
            name: input.name.clone(),
            age: input.age,
            gender,
            height: input.height,
            weight: input.weight,
            bmi,
            verdict,
        }),
        _ => {
            violations.sort_by_key(|v| {
                FIELD_ORDER
                    .iter()
                    .position(|f| *f == v.field)
                    .unwrap_or(FIELD_ORDER.len())
            });
            Err(ValidationFailure { violations })
        }
    }
}

/// Overlay `patch` onto `existing` and re-validate the result.
///
/// Fields absent from the patch keep their value and the id always comes from
/// `existing`. The whole merged record is validated again, not just the
/// patched fields, and derived metrics are recomputed.
pub fn merge_patient(existing: &Patient, patch: &PatientUpdate) -> Result<Patient, ValidationFailure> {
    let mut merged = PatientInput::from(existing);

    if let Some(name) = &patch.name {
        merged.name = name.clone();
    }
    if let Some(age) = patch.age {
        merged.age = age;
    }
    if let Some(gender) = &patch.gender {
        merged.gender = gender.clone();
    }
    if let Some(height) = patch.height {
        merged.height = height;
    }
    if let Some(weight) = patch.weight {
        merged.weight = weight;
    }

    validate_patient(&merged)
}

/// Stable sort of `patients` by `field`; equal values keep their order
pub fn sort_by_field(mut patients: Vec<Patient>, field: SortField, order: SortOrder) -> Vec<Patient> {
    patients.sort_by(|a, b| {
        let ordering = field.value(a).total_cmp(&field.value(b));
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    patients
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Trait for patient service operations
#[async_trait]
pub trait PatientServiceTrait: Send + Sync {
    /// Get every patient in store order
    async fn list_patients(&self) -> Result<Vec<Patient>, PatientServiceError>;

    /// Get a patient by id
    async fn get_patient(&self, id: &str) -> Result<Patient, PatientServiceError>;

    /// Get every patient ordered by `sort_by` (height, weight or bmi) in
    /// `order` (asc or desc)
    async fn sort_patients(&self, sort_by: &str, order: &str) -> Result<Vec<Patient>, PatientServiceError>;

    /// Validate and store a new patient
    async fn create_patient(&self, input: PatientInput) -> Result<Patient, PatientServiceError>;

    /// Merge `patch` into an existing patient and store the result
    async fn update_patient(&self, id: &str, patch: PatientUpdate) -> Result<Patient, PatientServiceError>;

    /// Remove a patient
    async fn delete_patient(&self, id: &str) -> Result<(), PatientServiceError>;
}

/// Patient service for domain logic
pub struct PatientService<R: PatientRepositoryTrait> {
    repository: R,
}

impl<R: PatientRepositoryTrait> PatientService<R> {
    /// Create a new patient service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    async fn load(&self) -> Result<PatientCollection, PatientServiceError> {
        Ok(self.repository.load().await?)
    }

    fn to_domain(
        id: &str,
        stored: patient_records_data::models::StoredPatient,
    ) -> Result<Patient, PatientServiceError> {
        conversions::convert_to_domain_patient(id, stored).map_err(PatientServiceError::Repository)
    }
}

#[async_trait]
impl<R: PatientRepositoryTrait> PatientServiceTrait for PatientService<R> {
    async fn list_patients(&self) -> Result<Vec<Patient>, PatientServiceError> {
        self.load()
            .await?
            .into_iter()
            .map(|(id, stored)| Self::to_domain(&id, stored))
            .collect()
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, PatientServiceError> {
        let mut patients = self.load().await?;
        let stored = patients
            .swap_remove(id)
            .ok_or_else(|| PatientServiceError::NotFound(id.to_string()))?;
        Self::to_domain(id, stored)
    }

    async fn sort_patients(&self, sort_by: &str, order: &str) -> Result<Vec<Patient>, PatientServiceError> {
        let field = sort_by.parse::<SortField>()?;
        let order = order.parse::<SortOrder>()?;

        let patients = self.list_patients().await?;
        debug!(?field, ?order, count = patients.len(), "Sorting patients");
        Ok(sort_by_field(patients, field, order))
    }

    async fn create_patient(&self, input: PatientInput) -> Result<Patient, PatientServiceError> {
        let patient = validate_patient(&input)?;

        let mut patients = self.load().await?;
        if patients.contains_key(&patient.id) {
            return Err(PatientServiceError::Conflict(patient.id));
        }

        patients.insert(patient.id.clone(), conversions::convert_to_data_patient(&patient));
        self.repository.save(&patients).await?;

        info!(id = %patient.id, bmi = patient.bmi, "Patient created");
        Ok(patient)
    }

    async fn update_patient(&self, id: &str, patch: PatientUpdate) -> Result<Patient, PatientServiceError> {
        let mut patients = self.load().await?;
        let stored = patients
            .get(id)
            .cloned()
            .ok_or_else(|| PatientServiceError::NotFound(id.to_string()))?;

        let existing = Self::to_domain(id, stored)?;
        let updated = merge_patient(&existing, &patch)?;

        // insert on an existing key keeps its position in the collection
        patients.insert(updated.id.clone(), conversions::convert_to_data_patient(&updated));
        self.repository.save(&patients).await?;

        info!(id = %updated.id, bmi = updated.bmi, "Patient updated");
        Ok(updated)
    }

    async fn delete_patient(&self, id: &str) -> Result<(), PatientServiceError> {
        let mut patients = self.load().await?;
        if patients.shift_remove(id).is_none() {
            return Err(PatientServiceError::NotFound(id.to_string()));
        }

        self.repository.save(&patients).await?;

        info!(id = %id, "Patient deleted");
        Ok(())
    }
}

/// Create a patient service backed by `repository`
pub fn create_patient_service(
    repository: Arc<dyn PatientRepositoryTrait>,
) -> impl PatientServiceTrait {
    PatientService::new(repository)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::patient::Verdict;
    use mockall::mock;
    use patient_records_data::models::StoredPatient;
    use patient_records_data::repository::InMemoryRepository;

    mock! {
        pub Repo {}

        #[async_trait]
        impl PatientRepositoryTrait for Repo {
            async fn load(&self) -> Result<PatientCollection, RepositoryError>;
            async fn save(&self, patients: &PatientCollection) -> Result<(), RepositoryError>;
            fn describe(&self) -> String;
        }
    }

    /// Create a valid patient input
    fn create_test_input(id: &str, height: f64, weight: f64) -> PatientInput {
        PatientInput {
            id: id.to_string(),
            name: "John Doe".to_string(),
            age: 30,
            gender: "Male".to_string(),
            height,
            weight,
        }
    }

    fn create_test_patient(id: &str, height: f64, weight: f64) -> Patient {
        validate_patient(&create_test_input(id, height, weight)).unwrap()
    }

    fn stored_collection(entries: &[(&str, f64)]) -> PatientCollection {
        entries
            .iter()
            .map(|(id, weight)| {
                let patient = create_test_patient(id, 170.0, *weight);
                (id.to_string(), conversions::convert_to_data_patient(&patient))
            })
            .collect()
    }

    #[test]
    fn test_validate_patient_valid() {
        let patient = validate_patient(&create_test_input("P001", 175.5, 70.0)).unwrap();
        assert_eq!(patient.id, "P001");
        assert_eq!(patient.gender, Gender::Male);
        assert_eq!(patient.bmi, 22.73);
        assert_eq!(patient.verdict, Verdict::NormalWeight);
    }

    #[test]
    fn test_validate_patient_age_bounds() {
        for age in [0, -5, 150, 200] {
            let mut input = create_test_input("P001", 175.5, 70.0);
            input.age = age;
            let failure = validate_patient(&input).unwrap_err();
            assert!(failure.has_field("age"), "age {} should be rejected", age);
        }

        for age in [1, 149] {
            let mut input = create_test_input("P001", 175.5, 70.0);
            input.age = age;
            assert!(validate_patient(&input).is_ok(), "age {} should be accepted", age);
        }
    }

    #[test]
    fn test_validate_patient_reports_every_violation() {
        let input = PatientInput {
            id: String::new(),
            name: String::new(),
            age: 0,
            gender: "Unknown".to_string(),
            height: 0.0,
            weight: -1.0,
        };

        let failure = validate_patient(&input).unwrap_err();
        let fields: Vec<&str> = failure.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["id", "name", "age", "gender", "height", "weight"]);
    }

    #[test]
    fn test_validate_patient_rejects_non_finite_measurements() {
        let failure = validate_patient(&create_test_input("P001", f64::NAN, 70.0)).unwrap_err();
        assert!(failure.has_field("height"));

        let failure = validate_patient(&create_test_input("P001", 175.0, f64::INFINITY)).unwrap_err();
        assert!(failure.has_field("weight"));
    }

    #[test]
    fn test_validate_patient_rejects_height_too_small_for_bmi() {
        let failure = validate_patient(&create_test_input("P001", 1e-300, 70.0)).unwrap_err();
        assert!(failure.has_field("height"));
    }

    #[test]
    fn test_merge_empty_patch_is_identity() {
        let existing = create_test_patient("P001", 175.5, 70.0);
        let merged = merge_patient(&existing, &PatientUpdate::default()).unwrap();
        assert_eq!(merged, existing);
    }

    #[test]
    fn test_merge_preserves_id() {
        let existing = create_test_patient("P001", 175.5, 70.0);
        let patch = PatientUpdate {
            id: Some("P999".to_string()),
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        };

        let merged = merge_patient(&existing, &patch).unwrap();
        assert_eq!(merged.id, "P001");
        assert_eq!(merged.name, "Jane Doe");
    }

    #[test]
    fn test_merge_recomputes_metrics() {
        let existing = create_test_patient("P001", 175.5, 70.0);
        let patch = PatientUpdate {
            weight: Some(95.0),
            ..Default::default()
        };

        let merged = merge_patient(&existing, &patch).unwrap();
        assert_eq!(merged.weight, 95.0);
        assert_eq!(merged.height, 175.5);
        assert_eq!(merged.bmi, 30.84);
        assert_eq!(merged.verdict, Verdict::Obesity);
    }

    #[test]
    fn test_merge_invalid_patch_fails_without_touching_existing() {
        let existing = create_test_patient("P001", 175.5, 70.0);
        let snapshot = existing.clone();
        let patch = PatientUpdate {
            age: Some(-3),
            gender: Some("Robot".to_string()),
            ..Default::default()
        };

        let failure = merge_patient(&existing, &patch).unwrap_err();
        assert!(failure.has_field("age"));
        assert!(failure.has_field("gender"));
        assert_eq!(existing, snapshot);
    }

    #[test]
    fn test_sort_field_and_order_parsing() {
        assert_eq!("bmi".parse::<SortField>().unwrap(), SortField::Bmi);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Descending);

        let err = "age".parse::<SortField>().unwrap_err();
        assert!(matches!(err, PatientServiceError::BadRequest(ref msg) if msg == INVALID_SORT_FIELD));

        let err = "up".parse::<SortOrder>().unwrap_err();
        assert!(matches!(err, PatientServiceError::BadRequest(ref msg) if msg == INVALID_SORT_ORDER));
    }

    #[test]
    fn test_sort_by_weight_desc() {
        let patients = vec![
            create_test_patient("A", 170.0, 60.0),
            create_test_patient("B", 170.0, 80.0),
            create_test_patient("C", 170.0, 70.0),
        ];

        let sorted = sort_by_field(patients, SortField::Weight, SortOrder::Descending);
        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_ties_keep_store_order_in_both_directions() {
        let patients = vec![
            create_test_patient("A", 170.0, 70.0),
            create_test_patient("B", 180.0, 70.0),
            create_test_patient("C", 160.0, 70.0),
        ];

        let asc = sort_by_field(patients.clone(), SortField::Weight, SortOrder::Ascending);
        let desc = sort_by_field(patients, SortField::Weight, SortOrder::Descending);
        let asc_ids: Vec<&str> = asc.iter().map(|p| p.id.as_str()).collect();
        let desc_ids: Vec<&str> = desc.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(asc_ids, vec!["A", "B", "C"]);
        assert_eq!(desc_ids, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let service = PatientService::new(InMemoryRepository::new());

        let created = service.create_patient(create_test_input("P001", 175.5, 70.0)).await.unwrap();
        let fetched = service.get_patient("P001").await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "John Doe");
        assert_eq!(fetched.bmi, 22.73);
        assert_eq!(fetched.verdict, Verdict::NormalWeight);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let service = PatientService::new(InMemoryRepository::new());
        service.create_patient(create_test_input("P001", 175.5, 70.0)).await.unwrap();

        let result = service.create_patient(create_test_input("P001", 160.0, 50.0)).await;
        assert!(matches!(result, Err(PatientServiceError::Conflict(id)) if id == "P001"));

        let kept = service.get_patient("P001").await.unwrap();
        assert_eq!(kept.height, 175.5);
    }

    #[tokio::test]
    async fn test_get_and_delete_missing_are_not_found() {
        let service = PatientService::new(InMemoryRepository::new());

        assert!(matches!(
            service.get_patient("nope").await,
            Err(PatientServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_patient("nope").await,
            Err(PatientServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.update_patient("nope", PatientUpdate::default()).await,
            Err(PatientServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_position_and_recomputes() {
        let repo = InMemoryRepository::with_patients(stored_collection(&[("A", 60.0), ("B", 80.0), ("C", 70.0)]));
        let service = PatientService::new(repo.clone());

        let patch = PatientUpdate {
            height: Some(200.0),
            ..Default::default()
        };
        let updated = service.update_patient("B", patch).await.unwrap();
        assert_eq!(updated.bmi, 20.0);

        let stored = repo.load().await.unwrap();
        let keys: Vec<&str> = stored.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert_eq!(stored["B"].bmi, 20.0);
        assert_eq!(stored["B"].verdict, "Normal weight");
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let repo = InMemoryRepository::with_patients(stored_collection(&[("A", 60.0), ("B", 80.0), ("C", 70.0)]));
        let service = PatientService::new(repo);

        service.delete_patient("B").await.unwrap();

        let ids: Vec<String> = service.list_patients().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_sort_patients_rejects_before_loading() {
        let mut repo = MockRepo::new();
        repo.expect_load().never();
        let service = PatientService::new(repo);

        let result = service.sort_patients("age", "asc").await;
        assert!(matches!(result, Err(PatientServiceError::BadRequest(_))));

        let result = service.sort_patients("bmi", "sideways").await;
        assert!(matches!(result, Err(PatientServiceError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_sort_patients_weight_desc() {
        let repo = InMemoryRepository::with_patients(stored_collection(&[("A", 60.0), ("B", 80.0), ("C", 70.0)]));
        let service = PatientService::new(repo);

        let sorted = service.sort_patients("weight", "desc").await.unwrap();
        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_invalid_update_does_not_save() {
        let mut repo = MockRepo::new();
        repo.expect_load()
            .times(1)
            .returning(|| Ok(stored_collection(&[("A", 60.0)])));
        repo.expect_save().never();
        let service = PatientService::new(repo);

        let patch = PatientUpdate {
            age: Some(-1),
            ..Default::default()
        };
        let result = service.update_patient("A", patch).await;
        assert!(matches!(result, Err(PatientServiceError::Validation(ref f)) if f.has_field("age")));
    }

    #[tokio::test]
    async fn test_invalid_create_does_not_touch_store() {
        let mut repo = MockRepo::new();
        repo.expect_load().never();
        repo.expect_save().never();
        let service = PatientService::new(repo);

        let result = service.create_patient(create_test_input("P001", -1.0, 70.0)).await;
        assert!(matches!(result, Err(PatientServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_writes_full_collection() {
        let mut repo = MockRepo::new();
        repo.expect_load()
            .times(1)
            .returning(|| Ok(stored_collection(&[("A", 60.0)])));
        repo.expect_save()
            .withf(|patients: &PatientCollection| {
                patients.len() == 2
                    && patients.get_index(1).map(|(id, _)| id.as_str()) == Some("P001")
            })
            .times(1)
            .returning(|_| Ok(()));
        let service = PatientService::new(repo);

        service.create_patient(create_test_input("P001", 175.5, 70.0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_repository_failure_is_surfaced() {
        let mut repo = MockRepo::new();
        repo.expect_load()
            .returning(|| Err(RepositoryError::Lock("poisoned".to_string())));
        let service = PatientService::new(repo);

        let result = service.list_patients().await;
        assert!(matches!(result, Err(PatientServiceError::Repository(msg)) if msg.contains("poisoned")));
    }

    #[tokio::test]
    async fn test_corrupt_stored_record_is_repository_error() {
        let mut collection = PatientCollection::new();
        collection.insert(
            "X".to_string(),
            StoredPatient {
                name: "X".to_string(),
                age: 30,
                gender: "robot".to_string(),
                height: 170.0,
                weight: 70.0,
                bmi: 24.22,
                verdict: "Normal weight".to_string(),
            },
        );
        let service = PatientService::new(InMemoryRepository::with_patients(collection));

        assert!(matches!(
            service.get_patient("X").await,
            Err(PatientServiceError::Repository(_))
        ));
    }
}
