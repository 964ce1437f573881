pub mod health;
pub mod patient;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use health::{about, health_check, root};
pub use patient::{
    create_patient, delete_patient, sort_patients, update_patient, view_patient, view_patients,
};
