// Public entities for the patient records API
// This module contains data structures that are shared across the application boundary

// Patient requests and responses
pub mod patient;

// Common entities for error handling and plain messages
pub mod common;
