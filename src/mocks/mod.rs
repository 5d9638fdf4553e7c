//! In-memory backends for local development and tests

pub mod memory_backend;
pub mod memory_profiles;

pub use memory_backend::InMemoryAuthBackend;
pub use memory_profiles::InMemoryProfileRepository;
