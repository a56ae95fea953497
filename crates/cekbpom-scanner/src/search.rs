//! Adaptive page-size search against the registry listing.
//!
//! The listing only reveals its true result count after a first request. The
//! search probes with the initial page size and, when the banner shows the
//! page stops short of the total (and the total is below the ceiling),
//! re-runs the same page-0 request once with the page size set to the total.

use crate::error::{ProtocolViolation, Result, ScanError};
use crate::http::HttpFetcher;
use crate::parser::{CountBanner, ResultRow, RowExtractor};
use crate::url_builder::SearchUrlBuilder;
use cekbpom_core::{SearchConfig, SearchField, SessionToken, ShortfallPolicy};

/// Upper bound on convergence rounds for a single search.
pub const MAX_ROUNDS: u8 = 2;

/// Fewer rows parsed than the banner declared in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowShortfall {
    /// Declared result total
    pub expected: usize,
    /// Rows the extractor matched
    pub parsed: usize,
    /// Rows the banner says the accepted page lists
    pub page_rows: usize,
}

impl RowShortfall {
    /// Rows listed on the page that the extractor could not match.
    #[must_use]
    pub fn unparsed(&self) -> usize {
        self.page_rows.saturating_sub(self.parsed)
    }

    /// Declared rows the accepted page never listed (the ceiling case).
    #[must_use]
    pub fn unlisted(&self) -> usize {
        self.expected.saturating_sub(self.page_rows)
    }
}

/// Outcome of one field/query search.
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Extracted rows, in document order
    pub rows: Vec<ResultRow>,
    /// Total reported by the count banner
    pub declared_total: usize,
    /// Convergence rounds used (1 or 2)
    pub rounds: u8,
    /// Set when fewer rows were parsed than the banner declared
    pub shortfall: Option<RowShortfall>,
}

/// Paging knobs for [`PaginatedSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    /// Page size of the first round
    pub initial_page_size: u32,
    /// Totals at or above this are accepted from the first round
    pub page_size_ceiling: u32,
    /// Row shortfall handling
    pub shortfall_policy: ShortfallPolicy,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for PaginationSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            initial_page_size: config.initial_page_size,
            page_size_ceiling: config.page_size_ceiling,
            shortfall_policy: config.shortfall_policy,
        }
    }
}

enum Convergence {
    Probing { page_size: u32, round: u8 },
    Converged { body: String, banner: CountBanner, rounds: u8 },
    Failed(ScanError),
}

/// Runs one search to convergence and extracts its rows.
#[derive(Debug, Clone)]
pub struct PaginatedSearch {
    urls: SearchUrlBuilder,
    extractor: RowExtractor,
    settings: PaginationSettings,
}

impl PaginatedSearch {
    /// Create a search over the given URL shapes.
    #[must_use]
    pub fn new(urls: SearchUrlBuilder, settings: PaginationSettings) -> Self {
        Self {
            urls,
            extractor: RowExtractor::new(),
            settings,
        }
    }

    /// Search `field` for `query` within `session`.
    ///
    /// Fails on a non-success status or when the count banner is missing.
    /// A row shortfall fails only under [`ShortfallPolicy::Abort`].
    pub async fn search(
        &self,
        fetcher: &dyn HttpFetcher,
        session: &SessionToken,
        field: SearchField,
        query: &str,
    ) -> Result<SearchPage> {
        let mut state = Convergence::Probing {
            page_size: self.settings.initial_page_size,
            round: 1,
        };

        let (body, banner, rounds) = loop {
            state = match state {
                Convergence::Probing { page_size, round } => {
                    match self.fetch_round(fetcher, session, field, query, page_size).await {
                        Ok((body, banner)) => self.next_state(body, banner, page_size, round),
                        Err(e) => Convergence::Failed(e),
                    }
                }
                Convergence::Converged {
                    body,
                    banner,
                    rounds,
                } => break (body, banner, rounds),
                Convergence::Failed(e) => return Err(e),
            };
        };

        let rows: Vec<ResultRow> = self.extractor.extract(&body).collect();
        let shortfall = (rows.len() < banner.total).then_some(RowShortfall {
            expected: banner.total,
            parsed: rows.len(),
            page_rows: banner.rows_on_page(),
        });

        if let Some(shortfall) = shortfall {
            tracing::warn!(
                "{} search for {:?}: parsed {} of {} declared rows ({} unparsable, {} not listed)",
                field,
                query,
                shortfall.parsed,
                shortfall.expected,
                shortfall.unparsed(),
                shortfall.unlisted()
            );
            // Rows cut off by the ceiling are never fatal.
            let abort = self.settings.shortfall_policy == ShortfallPolicy::Abort;
            if abort && shortfall.unparsed() > 0 {
                return Err(ScanError::Protocol(ProtocolViolation::RowShortfall {
                    expected: shortfall.page_rows,
                    parsed: shortfall.parsed,
                }));
            }
        }

        tracing::debug!(
            "{} search for {:?}: {} rows, declared total {}, {} round(s)",
            field,
            query,
            rows.len(),
            banner.total,
            rounds
        );

        Ok(SearchPage {
            rows,
            declared_total: banner.total,
            rounds,
            shortfall,
        })
    }

    fn next_state(
        &self,
        body: String,
        banner: CountBanner,
        page_size: u32,
        round: u8,
    ) -> Convergence {
        let total = u32::try_from(banner.total).unwrap_or(u32::MAX);
        let redo =
            round < MAX_ROUNDS && banner.is_partial() && total < self.settings.page_size_ceiling;

        if redo {
            tracing::debug!(
                "Page of size {} holds {} of {} rows, redoing with page size {}",
                page_size,
                banner.end,
                banner.total,
                total
            );
            Convergence::Probing {
                page_size: total,
                round: round + 1,
            }
        } else {
            Convergence::Converged {
                body,
                banner,
                rounds: round,
            }
        }
    }

    async fn fetch_round(
        &self,
        fetcher: &dyn HttpFetcher,
        session: &SessionToken,
        field: SearchField,
        query: &str,
        page_size: u32,
    ) -> Result<(String, CountBanner)> {
        let url = self.urls.search_url(session, field, query, page_size, 0);
        let response = fetcher.get(&url).await?;
        if !response.is_success() {
            return Err(ScanError::Transport {
                status: response.status,
                message: response.reason,
            });
        }

        let banner = CountBanner::find(&response.body)
            .ok_or(ScanError::Protocol(ProtocolViolation::SignatureNotFound))?;
        Ok((response.body, banner))
    }
}
