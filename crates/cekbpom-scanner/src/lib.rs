//! CekBpom Scanner - Registry search scraping and aggregation.
//!
//! This crate drives the session-bound product registry search: it captures
//! a session token, converges each search on its true result count, extracts
//! rows from the listing markup, deduplicates them across every query and
//! search field, and optionally resolves manufacturer details per row.
//!
//! # Features
//!
//! - Adaptive page sizing bounded to two rounds per search
//! - Pattern-based row extraction tolerant of minor markup revisions
//! - First-seen deduplication by registration id across a whole run
//! - Non-fatal per-row manufacturer enrichment
//! - A uniform [`ResultEnvelope`] for success and failure
//!
//! # Example
//!
//! ```rust,ignore
//! use cekbpom_core::{AppConfig, SearchField};
//! use cekbpom_scanner::{ReqwestFetcher, SearchOrchestrator};
//! use std::sync::Arc;
//!
//! let config = AppConfig::default();
//! let fetcher = Arc::new(ReqwestFetcher::new(&config.http)?);
//! let orchestrator = SearchOrchestrator::from_config(fetcher, &config)?;
//!
//! let envelope = orchestrator
//!     .run(&[SearchField::ProductName, SearchField::Brand], &["hichew".to_string()], false)
//!     .await;
//! assert_eq!(envelope.status, 200);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod detail;
pub mod envelope;
#[allow(missing_docs)]
pub mod error;
pub mod http;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod parser;
pub mod search;
pub mod session;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use detail::{find_manufacturer, DetailEnricher, Manufacturer};
pub use envelope::{EnvelopeMetadata, ResultEnvelope, RunSummary, RunTiming, TimedEnvelope};
pub use error::{ProtocolViolation, Result, ScanError};
pub use http::{FetchError, HttpFetcher, HttpResponse, ReqwestFetcher};
pub use orchestrator::{ResultSet, SearchOrchestrator};
pub use parser::{CountBanner, ResultRow, RowExtractor};
pub use search::{PaginatedSearch, PaginationSettings, RowShortfall, SearchPage};
pub use session::acquire_session;
pub use url_builder::SearchUrlBuilder;
