//! Password policy and credential hashing

pub mod security;
pub mod validator;

pub use validator::{
    evaluate, is_valid, ChecklistItem, PasswordRequirements, Requirement, MIN_PASSWORD_LENGTH,
    SYMBOLS,
};
