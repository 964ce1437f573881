use std::fmt;
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use patient_records_domain::entities::{Patient, PatientInput, PatientUpdate};

/// Public representation of a patient record. The id is carried by the
/// enclosing map key or the request path, not by the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PublicPatient {
    /// Patient name
    #[schema(example = "John Doe")]
    pub name: String,

    /// Age in years
    #[schema(example = 30)]
    pub age: i32,

    /// Male, Female or Other
    #[schema(example = "Male")]
    pub gender: String,

    /// Height in cm
    #[schema(example = 175.5)]
    pub height: f64,

    /// Weight in kg
    #[schema(example = 70.0)]
    pub weight: f64,

    /// Body mass index, derived from height and weight
    #[schema(example = 22.73)]
    pub bmi: f64,

    /// Underweight, Normal weight, Overweight or Obesity
    #[schema(example = "Normal weight")]
    pub verdict: String,
}

impl From<Patient> for PublicPatient {
    fn from(patient: Patient) -> Self {
        Self {
            name: patient.name,
            age: patient.age,
            gender: patient.gender.to_string(),
            height: patient.height,
            weight: patient.weight,
            bmi: patient.bmi,
            verdict: patient.verdict.to_string(),
        }
    }
}

/// All patients keyed by id, in store order
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PublicPatientDirectory(pub IndexMap<String, PublicPatient>);

impl FromIterator<Patient> for PublicPatientDirectory {
    fn from_iter<I: IntoIterator<Item = Patient>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|patient| (patient.id.clone(), PublicPatient::from(patient)))
                .collect(),
        )
    }
}

/// Request payload for creating a patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicCreatePatientRequest {
    /// Patient ID
    #[schema(example = "P001")]
    pub id: String,

    /// Patient name
    #[schema(example = "John Doe")]
    pub name: String,

    /// Age in years, greater than 0 and less than 150
    #[schema(example = 30)]
    #[serde(deserialize_with = "whole_number")]
    pub age: i32,

    /// Male, Female or Other
    #[schema(example = "Male")]
    pub gender: String,

    /// Height in cm, greater than 0
    #[schema(example = 175.5)]
    pub height: f64,

    /// Weight in kg, greater than 0
    #[schema(example = 70.0)]
    pub weight: f64,
}

impl From<PublicCreatePatientRequest> for PatientInput {
    fn from(request: PublicCreatePatientRequest) -> Self {
        Self {
            id: request.id,
            name: request.name,
            age: request.age,
            gender: request.gender,
            height: request.height,
            weight: request.weight,
        }
    }
}

/// Request payload for updating a patient; only supplied fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PublicUpdatePatientRequest {
    /// Ignored, the path id always wins
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

impl From<PublicUpdatePatientRequest> for PatientUpdate {
    fn from(request: PublicUpdatePatientRequest) -> Self {
        Self {
            id: request.id,
            name: request.name,
            age: request.age,
            gender: request.gender,
            height: request.height,
            weight: request.weight,
        }
    }
}

/// Query parameters for sorting patients
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SortQueryParams {
    /// Sort on the basis of height, weight or bmi
    pub sort_by: Option<String>,

    /// Sort in asc or desc order (default: asc)
    pub order: Option<String>,
}

/// An integer that may arrive as a JSON float with no fractional part, e.g. `30.0`
struct WholeNumber(i32);

impl<'de> Deserialize<'de> for WholeNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WholeNumberVisitor;

        impl<'de> de::Visitor<'de> for WholeNumberVisitor {
            type Value = WholeNumber;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a whole number")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                i32::try_from(v)
                    .map(WholeNumber)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i32::try_from(v)
                    .map(WholeNumber)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
                    Ok(WholeNumber(v as i32))
                } else {
                    Err(E::invalid_value(de::Unexpected::Float(v), &self))
                }
            }
        }

        deserializer.deserialize_any(WholeNumberVisitor)
    }
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    WholeNumber::deserialize(deserializer).map(|n| n.0)
}

fn optional_whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    Option::<WholeNumber>::deserialize(deserializer).map(|n| n.map(|n| n.0))
}
