use patient_records_data::models::patient::StoredPatient;

use crate::entities::patient::{Gender, Patient};
use crate::services::metrics::derive_metrics;

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Convert from data model to domain entity for a patient.
///
/// Derived fields are recomputed from the stored height and weight rather
/// than trusted from the document.
pub fn convert_to_domain_patient(id: &str, stored: StoredPatient) -> Result<Patient, String> {
    let gender = stored
        .gender
        .parse::<Gender>()
        .map_err(|e| format!("Stored patient {} is invalid: {}", id, e))?;

    let (bmi, verdict) = derive_metrics(stored.height, stored.weight);

    Ok(Patient {
        id: id.to_string(),
        name: stored.name,
        age: stored.age,
        gender,
        height: stored.height,
        weight: stored.weight,
        bmi,
        verdict,
    })
}

/// Convert from domain entity to data model for a patient.
/// The id is dropped: it becomes the collection key.
pub fn convert_to_data_patient(patient: &Patient) -> StoredPatient {
    StoredPatient {
        name: patient.name.clone(),
        age: patient.age,
        gender: patient.gender.to_string(),
        height: patient.height,
        weight: patient.weight,
        bmi: patient.bmi,
        verdict: patient.verdict.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::patient::Verdict;

    fn stored() -> StoredPatient {
        StoredPatient {
            name: "Ann".to_string(),
            age: 30,
            gender: "Female".to_string(),
            height: 175.5,
            weight: 70.0,
            bmi: 0.0,
            verdict: String::new(),
        }
    }

    #[test]
    fn test_stale_derived_fields_are_recomputed() {
        let patient = convert_to_domain_patient("P001", stored()).unwrap();
        assert_eq!(patient.id, "P001");
        assert_eq!(patient.bmi, 22.73);
        assert_eq!(patient.verdict, Verdict::NormalWeight);
    }

    #[test]
    fn test_unknown_stored_gender_is_rejected() {
        let mut record = stored();
        record.gender = "unknown".to_string();

        let error = convert_to_domain_patient("P001", record).unwrap_err();
        assert!(error.contains("P001"));
    }

    #[test]
    fn test_data_patient_carries_labels() {
        let patient = convert_to_domain_patient("P001", stored()).unwrap();
        let data = convert_to_data_patient(&patient);
        assert_eq!(data.gender, "Female");
        assert_eq!(data.verdict, "Normal weight");
        assert_eq!(data.bmi, 22.73);
    }
}
