//! User module
//!
//! Storefront profile records created alongside new accounts, and recreated
//! on sign-in when missing.

pub mod error;
pub mod models;
pub mod repository;

pub use error::ProfileError;
pub use models::{NewProfile, Profile};
pub use repository::{HostedProfileRepository, ProfileRepository};
