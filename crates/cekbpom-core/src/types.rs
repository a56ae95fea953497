//! Shared types used across the CekBpom scraper.
//!
//! This module defines the newtypes and enums that model the upstream
//! registry's query contract.

use crate::error::CekBpomError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Record attributes the upstream registry allows searching against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    /// Registration number (e.g. `MD 224510107115`)
    RegistrationNumber,
    /// Product name
    ProductName,
    /// Brand
    Brand,
    /// Packaging description
    Packaging,
    /// Dosage form
    DosageForm,
    /// Composition / ingredients
    Composition,
    /// Registrant company name
    RegistrantName,
    /// Registrant tax identifier (NPWP)
    RegistrantTaxId,
}

impl SearchField {
    /// Every search field, in upstream code order.
    pub const ALL: [Self; 8] = [
        Self::RegistrationNumber,
        Self::ProductName,
        Self::Brand,
        Self::Packaging,
        Self::DosageForm,
        Self::Composition,
        Self::RegistrantName,
        Self::RegistrantTaxId,
    ];

    /// Snake-case name used in configuration and on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegistrationNumber => "registration_number",
            Self::ProductName => "product_name",
            Self::Brand => "brand",
            Self::Packaging => "packaging",
            Self::DosageForm => "dosage_form",
            Self::Composition => "composition",
            Self::RegistrantName => "registrant_name",
            Self::RegistrantTaxId => "registrant_tax_id",
        }
    }

    /// Get a human-readable display name for the search field.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RegistrationNumber => "Registration Number",
            Self::ProductName => "Product Name",
            Self::Brand => "Brand",
            Self::Packaging => "Packaging",
            Self::DosageForm => "Dosage Form",
            Self::Composition => "Composition",
            Self::RegistrantName => "Registrant Name",
            Self::RegistrantTaxId => "Registrant Tax ID",
        }
    }

    /// Numeric code the upstream search endpoint expects for this field.
    #[must_use]
    pub fn default_code(&self) -> u8 {
        match self {
            Self::RegistrationNumber => 1,
            Self::ProductName => 2,
            Self::Brand => 3,
            Self::Packaging => 4,
            Self::DosageForm => 5,
            Self::Composition => 6,
            Self::RegistrantName => 7,
            Self::RegistrantTaxId => 8,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = CekBpomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| CekBpomError::UnknownField(s.to_string()))
    }
}

/// Immutable field-to-code lookup injected into the URL builder.
///
/// Built once at startup from the default code table, optionally with
/// configured overrides, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCodes(HashMap<SearchField, u8>);

impl FieldCodes {
    /// Build the lookup from the default table with the given overrides applied.
    #[must_use]
    pub fn with_overrides(overrides: &HashMap<SearchField, u8>) -> Self {
        let mut codes: HashMap<SearchField, u8> = SearchField::ALL
            .into_iter()
            .map(|field| (field, field.default_code()))
            .collect();
        codes.extend(overrides.iter().map(|(field, code)| (*field, *code)));
        Self(codes)
    }

    /// Code for a search field.
    #[must_use]
    pub fn code(&self, field: SearchField) -> u8 {
        self.0
            .get(&field)
            .copied()
            .unwrap_or_else(|| field.default_code())
    }
}

impl Default for FieldCodes {
    fn default() -> Self {
        Self::with_overrides(&HashMap::new())
    }
}

/// Opaque session token issued by the upstream service on first contact.
///
/// Tokens are exactly 26 lowercase alphanumeric characters. They are held
/// for the lifetime of one run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Length of every session token.
    pub const LEN: usize = 26;

    /// Unanchored pattern a token must match in full.
    pub const PATTERN: &'static str = "[a-z0-9]{26}";

    /// Create a new `SessionToken` from a string.
    ///
    /// # Errors
    /// Returns error if the token is not 26 lowercase alphanumeric characters.
    pub fn new(token: impl Into<String>) -> Result<Self, CekBpomError> {
        let token = token.into();
        Self::validate(&token)?;
        Ok(Self(token))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(token: &str) -> Result<(), CekBpomError> {
        static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = TOKEN_REGEX
            .get_or_init(|| Regex::new(&format!("^{}$", Self::PATTERN)).expect("valid regex"));

        if regex.is_match(token) {
            Ok(())
        } else {
            Err(CekBpomError::Validation(format!(
                "invalid session token: expected {} lowercase alphanumeric characters, got '{token}'",
                Self::LEN
            )))
        }
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique key of a product registration record.
///
/// Used for deduplication across a run and for detail lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(String);

impl RegistrationId {
    /// Create a new `RegistrationId`.
    ///
    /// # Errors
    /// Returns error if the identifier is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, CekBpomError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(CekBpomError::Validation(
                "registration id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
