use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Storage model for a patient record.
///
/// The patient id is the key of the enclosing collection and is never
/// repeated inside the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPatient {
    /// Patient name
    pub name: String,

    /// Age in whole years
    pub age: i32,

    /// Gender label (Male, Female or Other)
    pub gender: String,

    /// Height in centimeters
    pub height: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// Body mass index as last derived from height and weight
    #[serde(default)]
    pub bmi: f64,

    /// Verdict as last derived from the BMI
    #[serde(default)]
    pub verdict: String,
}

/// The full persisted document: patient id -> record, in insertion order
pub type PatientCollection = IndexMap<String, StoredPatient>;
