// Patient Records Domain
// This crate contains the business logic for the patient records service

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the store module from the data crate for convenience
pub use patient_records_data::store;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
