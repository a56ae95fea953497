//! The uniform success/error return contract of a run.

use crate::error::ScanError;
use crate::parser::ResultRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope status for a successful run.
pub const STATUS_OK: u16 = 200;

const NO_RESULTS_HINT: &str =
    "No registrations matched; try other search fields or spelling variants of the query";

/// Counters describing a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Field/query searches performed
    pub searches: usize,
    /// Rows returned across all searches, duplicates included
    pub rows_seen: usize,
    /// Rows discarded because their registration id was already seen
    pub duplicates_discarded: usize,
    /// Searches whose parsed row count fell short of the banner
    pub shortfalls: usize,
    /// Rows that gained manufacturer fields
    pub enriched: usize,
}

/// Column metadata for envelope consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMetadata {
    /// Row field names in output order
    pub field_order: Vec<String>,
    /// Human-readable labels for `field_order`
    pub display_fields: Vec<String>,
    /// Run counters, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    /// Set when a successful run found nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_results_hint: Option<String>,
}

impl Default for EnvelopeMetadata {
    fn default() -> Self {
        Self {
            field_order: ResultRow::FIELD_ORDER.iter().map(ToString::to_string).collect(),
            display_fields: ResultRow::DISPLAY_FIELDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            summary: None,
            no_results_hint: None,
        }
    }
}

/// Result of one run, built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// 200 on success, 400 for input errors, 543 for protocol violations,
    /// otherwise the relayed upstream status
    pub status: u16,
    /// `"OK"` or the failure description
    pub message: String,
    /// Deduplicated rows in first-seen order; empty on failure
    pub data: Vec<ResultRow>,
    /// Column metadata and run counters
    pub metadata: EnvelopeMetadata,
}

impl ResultEnvelope {
    /// Successful envelope carrying the aggregated rows.
    #[must_use]
    pub fn success(data: Vec<ResultRow>, summary: RunSummary) -> Self {
        let no_results_hint = data.is_empty().then(|| NO_RESULTS_HINT.to_string());
        Self {
            status: STATUS_OK,
            message: "OK".to_string(),
            data,
            metadata: EnvelopeMetadata {
                summary: Some(summary),
                no_results_hint,
                ..EnvelopeMetadata::default()
            },
        }
    }

    /// Failure envelope; failed runs never carry partial rows.
    #[must_use]
    pub fn failure(error: &ScanError) -> Self {
        Self {
            status: error.status_code(),
            message: error.to_string(),
            data: Vec::new(),
            metadata: EnvelopeMetadata::default(),
        }
    }

    /// Whether the run succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Wall-clock bounds of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTiming {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the envelope was built
    pub finished_at: DateTime<Utc>,
    /// Elapsed milliseconds
    pub duration_ms: u64,
}

impl RunTiming {
    /// Timing for a run that started at `started_at` and finishes now.
    #[must_use]
    pub fn since(started_at: DateTime<Utc>) -> Self {
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at)
            .num_milliseconds()
            .try_into()
            .unwrap_or(0);
        Self {
            started_at,
            finished_at,
            duration_ms,
        }
    }
}

/// An envelope plus the timing consumed by logging and dump collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEnvelope {
    /// The run result
    pub envelope: ResultEnvelope,
    /// Run wall-clock bounds
    pub timing: RunTiming,
}
