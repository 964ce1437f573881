use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Patient gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Label used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(format!("Gender must be one of Male, Female, Other (got '{}')", s)),
        }
    }
}

/// Qualitative category derived from the BMI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// BMI below 18.5
    Underweight,

    /// BMI from 18.5 up to (not including) 24.9
    #[serde(rename = "Normal weight")]
    NormalWeight,

    /// BMI from 25 up to (not including) 29.9
    Overweight,

    /// Everything else, including the 24.9..25 gap
    Obesity,
}

impl Verdict {
    /// Label used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Underweight => "Underweight",
            Verdict::NormalWeight => "Normal weight",
            Verdict::Overweight => "Overweight",
            Verdict::Obesity => "Obesity",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model for a validated patient record.
///
/// Built by `validate_patient` or `merge_patient`, which keep `bmi` and
/// `verdict` in step with `height` and `weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique, caller-assigned identifier
    pub id: String,

    /// Patient name
    pub name: String,

    /// Age in whole years, between 1 and 149
    pub age: i32,

    /// Patient gender
    pub gender: Gender,

    /// Height in centimeters
    pub height: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// Body mass index rounded to two decimals
    pub bmi: f64,

    /// Verdict for `bmi`
    pub verdict: Verdict,
}

/// Candidate field values for a patient, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PatientInput {
    /// Unique, caller-assigned identifier
    #[validate(length(min = 1, message = "Patient ID must not be empty"))]
    pub id: String,

    /// Patient name
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    /// Age in whole years
    #[validate(range(min = 1, max = 149, message = "Age must be greater than 0 and less than 150"))]
    pub age: i32,

    /// Gender label, checked against `Gender`
    pub gender: String,

    /// Height in centimeters, must be positive
    pub height: f64,

    /// Weight in kilograms, must be positive
    pub weight: f64,
}

impl From<&Patient> for PatientInput {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            age: patient.age,
            gender: patient.gender.to_string(),
            height: patient.height,
            weight: patient.weight,
        }
    }
}

/// Sparse set of field updates for an existing patient.
///
/// `id` is accepted so clients may echo it back, but it never changes the
/// stored key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientUpdate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
}

/// A single field constraint violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Name of the offending field
    pub field: String,

    /// What the field must satisfy
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every constraint a candidate patient failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.violations))]
pub struct ValidationFailure {
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationFailure {
    /// Per-field messages in `field: message` form
    pub fn details(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    /// Whether `field` is among the violated fields
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}
