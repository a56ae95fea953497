//! CekBpom Core - Foundation crate for the product registry scraper.
//!
//! This crate provides the shared types, error handling and configuration
//! management that the scanning engine and the command-line shell depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes and enums (`SearchField`, `FieldCodes`, `SessionToken`, `RegistrationId`)
//!
//! # Example
//!
//! ```rust
//! use cekbpom_core::{AppConfig, SearchField};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let codes = config.field_codes()?;
//!
//! let field: SearchField = "brand".parse()?;
//! assert_eq!(codes.code(field), 3);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, HttpConfig, OutputConfig, SearchConfig, ShortfallPolicy};
pub use error::{CekBpomError, ConfigError, ConfigResult};
pub use types::{FieldCodes, RegistrationId, SearchField, SessionToken};
