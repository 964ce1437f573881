// Storage models, shaped exactly as they are written to the patients document
pub mod patient;

pub use patient::{PatientCollection, StoredPatient};
