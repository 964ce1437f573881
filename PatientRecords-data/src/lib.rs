// Patient Records Data
// This crate handles persistence of patient records

// Store configuration and repository construction
pub mod store;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
