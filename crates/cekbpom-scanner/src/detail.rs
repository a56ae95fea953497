//! Manufacturer enrichment from the per-registration detail page.

use crate::error::ProtocolViolation;
use crate::http::HttpFetcher;
use crate::parser::{clean_text, ResultRow};
use crate::url_builder::SearchUrlBuilder;
use cekbpom_core::SessionToken;
use regex::Regex;
use std::sync::OnceLock;

/// Manufacturer fields resolved from a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
    pub country: String,
}

fn manufacturer_regex() -> &'static Regex {
    static MANUFACTURER_REGEX: OnceLock<Regex> = OnceLock::new();
    // The country is everything after the last " - " inside the anchor text.
    MANUFACTURER_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?si)<a[^>]*?\bhref="[^"]*/produsen/(?:[^"]*/)?(?P<id>[^"/]+)"[^>]*>\s*(?P<name>[^<]+?)\s+-\s+(?P<country>[^<\-]+?)\s*</a>"#,
        )
        .expect("valid regex")
    })
}

/// Find the manufacturer line in a detail page body.
pub fn find_manufacturer(body: &str) -> Option<Manufacturer> {
    let caps = manufacturer_regex().captures(body)?;
    Some(Manufacturer {
        id: caps.name("id")?.as_str().to_string(),
        name: clean_text(caps.name("name")?.as_str()),
        country: clean_text(caps.name("country")?.as_str()),
    })
}

/// Fills manufacturer fields with one detail fetch per row.
///
/// Per-row failures leave that row without manufacturer fields; they never
/// abort the run.
#[derive(Debug, Clone)]
pub struct DetailEnricher {
    urls: SearchUrlBuilder,
}

impl DetailEnricher {
    #[must_use]
    pub fn new(urls: SearchUrlBuilder) -> Self {
        Self { urls }
    }

    /// Enrich `rows` in place and return how many gained manufacturer fields.
    pub async fn enrich(
        &self,
        fetcher: &dyn HttpFetcher,
        session: &SessionToken,
        rows: &mut [ResultRow],
    ) -> usize {
        let mut enriched = 0;

        for row in rows.iter_mut() {
            let url = self.urls.detail_url(session, &row.registration_id);
            let response = match fetcher.get(&url).await {
                Ok(response) if response.is_success() => response,
                Ok(response) => {
                    tracing::warn!(
                        "Detail fetch for {} failed: HTTP {} {}",
                        row.registration_id,
                        response.status,
                        response.reason
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Detail fetch for {} failed: {}", row.registration_id, e);
                    continue;
                }
            };

            match find_manufacturer(&response.body) {
                Some(manufacturer) => {
                    row.manufacturer_id = Some(manufacturer.id);
                    row.manufacturer_name = Some(manufacturer.name);
                    row.manufacturer_country = Some(manufacturer.country);
                    enriched += 1;
                }
                None => {
                    tracing::warn!(
                        "Detail page for {}: {}",
                        row.registration_id,
                        ProtocolViolation::ManufacturerNotFound
                    );
                }
            }
        }

        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StubFetcher;
    use cekbpom_core::{FieldCodes, RegistrationId};

    const DETAIL: &str = r#"
        <table class="detil">
            <tr><td>Pendaftar</td><td>PT. SINAR NIAGA</td></tr>
            <tr><td>Produsen</td>
                <td><a href="http://upstream/home/produsen/abcdefghijklmnopqrstuvwxyz/MFR-00123">MORINAGA &amp; CO., LTD. - Tokyo Plant - JEPANG</a></td></tr>
        </table>"#;

    fn session() -> SessionToken {
        SessionToken::new("abcdefghijklmnopqrstuvwxyz").expect("valid token")
    }

    fn urls() -> SearchUrlBuilder {
        SearchUrlBuilder::new("http://upstream", FieldCodes::default())
    }

    fn row(id: &str) -> ResultRow {
        ResultRow {
            registration_id: RegistrationId::new(id).expect("valid id"),
            registration_number: "ML 234509001234".to_string(),
            issue_date: None,
            product_name: "HI-CHEW".to_string(),
            brand: "HI-CHEW".to_string(),
            packaging: "Box".to_string(),
            registrant_name: "PT. SINAR NIAGA".to_string(),
            registrant_city: "JAKARTA".to_string(),
            manufacturer_id: None,
            manufacturer_name: None,
            manufacturer_country: None,
        }
    }

    #[test]
    fn test_find_manufacturer() {
        let manufacturer = find_manufacturer(DETAIL).expect("manufacturer line");
        assert_eq!(manufacturer.id, "MFR-00123");
        assert_eq!(manufacturer.name, "MORINAGA & CO., LTD. - Tokyo Plant");
        assert_eq!(manufacturer.country, "JEPANG");
    }

    #[test]
    fn test_find_manufacturer_without_dash() {
        let body = r#"<a href="/home/produsen/s/MFR-1">MORINAGA JEPANG</a>"#;
        assert!(find_manufacturer(body).is_none());
    }

    #[tokio::test]
    async fn test_per_row_failures_are_not_fatal() {
        let enricher = DetailEnricher::new(urls());
        let mut rows = vec![row("A1"), row("B2"), row("C3")];

        let fetcher = StubFetcher::default()
            .route(urls().detail_url(&session(), &rows[0].registration_id), 200, DETAIL)
            .route(urls().detail_url(&session(), &rows[1].registration_id), 500, "")
            .route(
                urls().detail_url(&session(), &rows[2].registration_id),
                200,
                "<p>no producer</p>",
            );

        let enriched = enricher.enrich(&fetcher, &session(), &mut rows).await;

        assert_eq!(enriched, 1);
        assert_eq!(rows[0].manufacturer_country.as_deref(), Some("JEPANG"));
        assert!(!rows[1].has_manufacturer());
        assert!(rows[1].manufacturer_id.is_none());
        assert!(!rows[2].has_manufacturer());
        assert_eq!(fetcher.calls().len(), 3);

        let ids: Vec<_> = rows.iter().map(|r| r.registration_id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "B2", "C3"]);
    }
}
