// Repository module structure
pub mod errors;
mod patient;
mod json_file;
mod in_memory;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use patient::PatientRepositoryTrait;
pub use json_file::JsonFileRepository;
pub use in_memory::InMemoryRepository;
