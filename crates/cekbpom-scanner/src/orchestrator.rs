//! Search orchestrator for aggregating registry searches.
//!
//! This module provides the `SearchOrchestrator`, which acquires one session
//! per run, drives a paginated search for every query × field pair, keeps the
//! first occurrence of each registration and optionally enriches the result.

use crate::detail::DetailEnricher;
use crate::envelope::{ResultEnvelope, RunSummary, RunTiming, TimedEnvelope};
use crate::error::{Result, ScanError};
use crate::http::HttpFetcher;
use crate::parser::ResultRow;
use crate::search::{PaginatedSearch, PaginationSettings};
use crate::session::acquire_session;
use crate::url_builder::SearchUrlBuilder;
use cekbpom_core::{AppConfig, ConfigResult, RegistrationId, SearchField};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered rows unique by registration id; the first occurrence wins.
#[derive(Debug, Default)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
    seen: HashSet<RegistrationId>,
}

impl ResultSet {
    /// Add `row` unless its registration id was already admitted.
    ///
    /// Returns whether the row was kept.
    pub fn admit(&mut self, row: ResultRow) -> bool {
        if self.seen.insert(row.registration_id.clone()) {
            self.rows.push(row);
            true
        } else {
            false
        }
    }

    /// Number of unique rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row has been admitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Mutable view for in-place enrichment; ids must not be changed through it.
    pub fn rows_mut(&mut self) -> &mut [ResultRow] {
        &mut self.rows
    }

    /// Consume the set, keeping insertion order.
    #[must_use]
    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }
}

/// Drives searches over fields × queries against one upstream session.
pub struct SearchOrchestrator {
    /// HTTP client shared by every request of a run
    fetcher: Arc<dyn HttpFetcher>,
    /// URL shapes for the landing page
    urls: SearchUrlBuilder,
    /// Per-pair adaptive search
    search: PaginatedSearch,
    /// Optional manufacturer lookup
    enricher: DetailEnricher,
}

impl SearchOrchestrator {
    /// Create a new search orchestrator.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        urls: SearchUrlBuilder,
        settings: PaginationSettings,
    ) -> Self {
        Self {
            fetcher,
            search: PaginatedSearch::new(urls.clone(), settings),
            enricher: DetailEnricher::new(urls.clone()),
            urls,
        }
    }

    /// Create an orchestrator from application configuration.
    ///
    /// The field code table is built here, once, and shared by all URLs.
    pub fn from_config(fetcher: Arc<dyn HttpFetcher>, config: &AppConfig) -> ConfigResult<Self> {
        let urls = SearchUrlBuilder::new(config.http.base_url.clone(), config.field_codes()?);
        Ok(Self::new(
            fetcher,
            urls,
            PaginationSettings::from(&config.search),
        ))
    }

    /// Run every query against every field and return the envelope.
    ///
    /// Iteration is query-major, field-minor; that order decides which
    /// duplicate is kept. Any transport or protocol failure aborts the whole
    /// run without partial results.
    pub async fn run(
        &self,
        fields: &[SearchField],
        queries: &[String],
        enrich: bool,
    ) -> ResultEnvelope {
        match self.execute(fields, queries, enrich).await {
            Ok((rows, summary)) => {
                tracing::info!(
                    "Run finished: {} unique rows from {} searches ({} duplicates discarded)",
                    rows.len(),
                    summary.searches,
                    summary.duplicates_discarded
                );
                ResultEnvelope::success(rows, summary)
            }
            Err(e) => {
                tracing::error!("Run aborted: {}", e);
                ResultEnvelope::failure(&e)
            }
        }
    }

    /// Like [`SearchOrchestrator::run`], with field names resolved first.
    ///
    /// Unknown names produce a 400 envelope before any request is made.
    pub async fn run_named<S: AsRef<str>>(
        &self,
        field_names: &[S],
        queries: &[String],
        enrich: bool,
    ) -> ResultEnvelope {
        let fields: std::result::Result<Vec<SearchField>, _> = field_names
            .iter()
            .map(|name| name.as_ref().parse::<SearchField>())
            .collect();

        match fields {
            Ok(fields) => self.run(&fields, queries, enrich).await,
            Err(e) => ResultEnvelope::failure(&ScanError::Input(e.to_string())),
        }
    }

    /// [`SearchOrchestrator::run`] plus wall-clock timing for collaborators.
    pub async fn run_timed(
        &self,
        fields: &[SearchField],
        queries: &[String],
        enrich: bool,
    ) -> TimedEnvelope {
        let started_at = Utc::now();
        let envelope = self.run(fields, queries, enrich).await;
        TimedEnvelope {
            envelope,
            timing: RunTiming::since(started_at),
        }
    }

    async fn execute(
        &self,
        fields: &[SearchField],
        queries: &[String],
        enrich: bool,
    ) -> Result<(Vec<ResultRow>, RunSummary)> {
        if queries.is_empty() {
            return Err(ScanError::Input("no queries given".to_string()));
        }
        if fields.is_empty() {
            return Err(ScanError::Input("no search fields given".to_string()));
        }

        tracing::info!(
            "Starting run: {} queries × {} fields",
            queries.len(),
            fields.len()
        );

        let fetcher = self.fetcher.as_ref();
        let session = acquire_session(fetcher, &self.urls).await?;

        let mut results = ResultSet::default();
        let mut summary = RunSummary::default();

        for query in queries {
            for &field in fields {
                let page = self.search.search(fetcher, &session, field, query).await?;

                summary.searches += 1;
                summary.rows_seen += page.rows.len();
                if page.shortfall.is_some() {
                    summary.shortfalls += 1;
                }

                for row in page.rows {
                    if !results.admit(row) {
                        summary.duplicates_discarded += 1;
                    }
                }
            }
        }

        if enrich && !results.is_empty() {
            tracing::info!("Enriching {} rows with detail pages", results.len());
            summary.enriched = self
                .enricher
                .enrich(fetcher, &session, results.rows_mut())
                .await;
        }

        Ok((results.into_rows(), summary))
    }
}
