//! Session token acquisition.

use crate::error::{ProtocolViolation, Result, ScanError};
use crate::http::HttpFetcher;
use crate::url_builder::SearchUrlBuilder;
use cekbpom_core::SessionToken;
use regex::Regex;
use std::sync::OnceLock;

// Any path segment in token position; the token alphabet is checked by
// `SessionToken` itself.
fn token_link_regex() -> &'static Regex {
    static TOKEN_LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    TOKEN_LINK_REGEX
        .get_or_init(|| Regex::new(r#"/home/produk/([^"/\s]+)""#).expect("valid regex"))
}

/// Find the session token embedded in a landing page body.
///
/// The first link segment that is a valid token wins. Fails with
/// [`ProtocolViolation::InvalidSessionToken`] when token links exist but none
/// holds a valid token, and with [`ProtocolViolation::SessionTokenNotFound`]
/// when there is no token link at all.
pub fn find_session_token(body: &str) -> std::result::Result<SessionToken, ProtocolViolation> {
    let mut rejected = None;
    for caps in token_link_regex().captures_iter(body) {
        match SessionToken::new(&caps[1]) {
            Ok(token) => return Ok(token),
            Err(e) => {
                rejected.get_or_insert_with(|| e.to_string());
            }
        }
    }

    Err(rejected.map_or(
        ProtocolViolation::SessionTokenNotFound,
        ProtocolViolation::InvalidSessionToken,
    ))
}

/// Fetch the landing page and capture the session token for this run.
///
/// A missing token means the upstream markup changed; the run cannot continue.
pub async fn acquire_session(
    fetcher: &dyn HttpFetcher,
    urls: &SearchUrlBuilder,
) -> Result<SessionToken> {
    let response = fetcher.get(&urls.landing_url()).await?;
    if !response.is_success() {
        return Err(ScanError::Transport {
            status: response.status,
            message: response.reason,
        });
    }

    let token = find_session_token(&response.body)?;
    tracing::debug!("Acquired session token {}", token);
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StubFetcher;
    use cekbpom_core::FieldCodes;

    const LANDING: &str = r#"<html><body>
        <a class="menu" href="https://cekbpom.pom.go.id/home/produk/q1w2e3r4t5y6u7i8o9p0a1s2d3">Produk</a>
    </body></html>"#;

    fn urls() -> SearchUrlBuilder {
        SearchUrlBuilder::new("http://upstream", FieldCodes::default())
    }

    #[test]
    fn test_find_session_token() {
        let token = find_session_token(LANDING).expect("token present");
        assert_eq!(token.as_str(), "q1w2e3r4t5y6u7i8o9p0a1s2d3");
    }

    #[test]
    fn test_token_must_end_at_quote() {
        let body = r#"<a href="/home/produk/q1w2e3r4t5y6u7i8o9p0a1s2d3/all">x</a>"#;
        assert_eq!(
            find_session_token(body),
            Err(ProtocolViolation::SessionTokenNotFound)
        );
    }

    #[test]
    fn test_malformed_token_reported_as_invalid() {
        let body = r#"<a href="/home/produk/Q1W2E3R4T5Y6U7I8O9P0A1S2D3">Produk</a>"#;
        let err = find_session_token(body).unwrap_err();
        assert!(matches!(err, ProtocolViolation::InvalidSessionToken(_)));
        assert!(err.to_string().contains("Q1W2E3R4T5Y6U7I8O9P0A1S2D3"));
    }

    #[test]
    fn test_first_valid_token_link_wins() {
        let body = r#"
            <a href="/home/produk/BAD">x</a>
            <a href="/home/produk/q1w2e3r4t5y6u7i8o9p0a1s2d3">Produk</a>"#;
        let token = find_session_token(body).expect("valid token after malformed one");
        assert_eq!(token.as_str(), "q1w2e3r4t5y6u7i8o9p0a1s2d3");
    }

    #[tokio::test]
    async fn test_acquire_session() {
        let fetcher = StubFetcher::default().route("http://upstream/", 200, LANDING);
        let token = acquire_session(&fetcher, &urls()).await.expect("token");
        assert_eq!(token.as_str(), "q1w2e3r4t5y6u7i8o9p0a1s2d3");
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_acquire_session_missing_marker() {
        let fetcher = StubFetcher::default().route("http://upstream/", 200, "<html></html>");
        let err = acquire_session(&fetcher, &urls()).await.unwrap_err();
        assert!(matches!(
            err,
            ScanError::Protocol(ProtocolViolation::SessionTokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_acquire_session_malformed_token() {
        let body = r#"<a href="/home/produk/Q1W2E3R4T5Y6U7I8O9P0A1S2D3">Produk</a>"#;
        let fetcher = StubFetcher::default().route("http://upstream/", 200, body);
        let err = acquire_session(&fetcher, &urls()).await.unwrap_err();
        assert_eq!(err.status_code(), 543);
        assert!(err.to_string().contains("invalid session token"));
    }

    #[tokio::test]
    async fn test_acquire_session_transport_failure() {
        let fetcher = StubFetcher::default().route("http://upstream/", 503, "");
        let err = acquire_session(&fetcher, &urls()).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
    }
}
