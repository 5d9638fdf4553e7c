//! Password policy validation.
//!
//! Reports which of the five structural password rules a candidate satisfies:
//! - Minimum length (at least 8 characters)
//! - One uppercase letter (A-Z)
//! - One lowercase letter (a-z)
//! - One number (0-9)
//! - One special character from a fixed symbol set
//!
//! Evaluation is total: every string, including the empty one, yields a record.
//! The aggregate verdict is a plain AND over the five flags.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum number of characters (inclusive)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters accepted by the special character rule
pub const SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

static UPPERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[A-Z]").expect("uppercase pattern"));
static LOWERCASE: Lazy<Regex> = Lazy::new(|| Regex::new("[a-z]").expect("lowercase pattern"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]").expect("number pattern"));
static SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("symbol pattern"));

/// Which password rules a candidate currently satisfies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequirements {
    pub min_length: bool,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_number: bool,
    pub has_symbol: bool,
}

/// A single password rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Requirement {
    MinLength,
    HasUppercase,
    HasLowercase,
    HasNumber,
    HasSymbol,
}

impl Requirement {
    /// All rules in checklist order
    pub const ALL: [Requirement; 5] = [
        Requirement::MinLength,
        Requirement::HasUppercase,
        Requirement::HasLowercase,
        Requirement::HasNumber,
        Requirement::HasSymbol,
    ];

    /// Checklist label shown next to the rule
    pub fn label(self) -> &'static str {
        match self {
            Requirement::MinLength => "At least 8 characters",
            Requirement::HasUppercase => "One uppercase letter",
            Requirement::HasLowercase => "One lowercase letter",
            Requirement::HasNumber => "One number",
            Requirement::HasSymbol => "One special character",
        }
    }

    /// Whether this rule is met in the given record
    pub fn is_met(self, requirements: &PasswordRequirements) -> bool {
        match self {
            Requirement::MinLength => requirements.min_length,
            Requirement::HasUppercase => requirements.has_uppercase,
            Requirement::HasLowercase => requirements.has_lowercase,
            Requirement::HasNumber => requirements.has_number,
            Requirement::HasSymbol => requirements.has_symbol,
        }
    }
}

/// One line of a rendered requirements checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub requirement: Requirement,
    pub label: &'static str,
    pub met: bool,
}

impl PasswordRequirements {
    /// Check if all requirements are met
    pub fn is_valid(&self) -> bool {
        is_valid(self)
    }

    /// Checklist lines in display order
    pub fn checklist(&self) -> Vec<ChecklistItem> {
        Requirement::ALL
            .iter()
            .map(|&requirement| ChecklistItem {
                requirement,
                label: requirement.label(),
                met: requirement.is_met(self),
            })
            .collect()
    }

    /// Rules the candidate does not satisfy yet
    pub fn unmet(&self) -> Vec<Requirement> {
        Requirement::ALL.iter().copied().filter(|r| !r.is_met(self)).collect()
    }
}

/// Evaluate a candidate password against every rule
///
/// All five checks always run so callers can render per-rule feedback.
pub fn evaluate(candidate: &str) -> PasswordRequirements {
    PasswordRequirements {
        min_length: candidate.chars().count() >= MIN_PASSWORD_LENGTH,
        has_uppercase: UPPERCASE.is_match(candidate),
        has_lowercase: LOWERCASE.is_match(candidate),
        has_number: NUMBER.is_match(candidate),
        has_symbol: SYMBOL.is_match(candidate),
    }
}

/// Aggregate verdict: true only when every rule is satisfied
pub fn is_valid(requirements: &PasswordRequirements) -> bool {
    requirements.min_length
        && requirements.has_uppercase
        && requirements.has_lowercase
        && requirements.has_number
        && requirements.has_symbol
}
