use cekbpom_core::RegistrationId;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One product registration record as listed by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub registration_id: RegistrationId,
    pub registration_number: String,
    pub issue_date: Option<String>,
    pub product_name: String,
    pub brand: String,
    pub packaging: String,
    pub registrant_name: String,
    pub registrant_city: String,
    pub manufacturer_id: Option<String>,
    pub manufacturer_name: Option<String>,
    pub manufacturer_country: Option<String>,
}

impl ResultRow {
    /// Serialized field names, in output order.
    pub const FIELD_ORDER: [&'static str; 11] = [
        "registration_id",
        "registration_number",
        "issue_date",
        "product_name",
        "brand",
        "packaging",
        "registrant_name",
        "registrant_city",
        "manufacturer_id",
        "manufacturer_name",
        "manufacturer_country",
    ];

    /// Column labels matching [`ResultRow::FIELD_ORDER`].
    pub const DISPLAY_FIELDS: [&'static str; 11] = [
        "Registration ID",
        "Registration Number",
        "Issue Date",
        "Product Name",
        "Brand",
        "Packaging",
        "Registrant",
        "Registrant City",
        "Manufacturer ID",
        "Manufacturer",
        "Manufacturer Country",
    ];

    pub fn has_manufacturer(&self) -> bool {
        self.manufacturer_name.is_some()
    }
}

// Anchor row carrying the detail path, then three cells: registration number
// (+ optional issue date), product (+ brand, packaging), registrant (+ city).
// Label prefixes differ between markup revisions, so they are optional.
// Packaging may contain `<br>` line breaks but no other tags.
const ROW_PATTERN: &str = r#"(?xsi)
    <tr[^>]*?\burldetil="[^"]*/produk/(?P<id>[^"/]+)"[^>]*>\s*
    <td[^>]*>\s*(?P<number>[^<]+?)\s*
        (?:<div[^>]*>\s*(?:Terbit:\s*)?(?P<issued>[^<]*?)\s*</div>\s*)?
    </td>\s*
    <td[^>]*>\s*(?P<product>[^<]+?)\s*
        <div[^>]*>\s*(?:Merk:\s*)?(?P<brand>[^<]*?)\s*</div>\s*
        <div[^>]*>\s*(?:Kemasan:\s*)?(?P<packaging>(?:[^<]|<br\s*/?>)*?)\s*</div>\s*
    </td>\s*
    <td[^>]*>\s*(?P<registrant>[^<]+?)\s*
        <div[^>]*>\s*(?:Kota:\s*)?(?P<city>[^<]*?)\s*</div>\s*
    </td>
"#;

const BANNER_PATTERN: &str =
    r"(?i)(?P<start>\d[\d.,]*)\s*-\s*(?P<end>\d[\d.,]*)\s+dari\s+(?P<total>\d[\d.,]*)";

fn row_regex() -> &'static Regex {
    static ROW_REGEX: OnceLock<Regex> = OnceLock::new();
    ROW_REGEX.get_or_init(|| Regex::new(ROW_PATTERN).expect("valid regex"))
}

fn banner_regex() -> &'static Regex {
    static BANNER_REGEX: OnceLock<Regex> = OnceLock::new();
    BANNER_REGEX.get_or_init(|| Regex::new(BANNER_PATTERN).expect("valid regex"))
}

/// Normalize a captured markup fragment into plain text.
///
/// Line breaks (`<br>` tags and raw newlines) become single spaces, common
/// entities are decoded and whitespace runs are collapsed.
pub fn clean_text(raw: &str) -> String {
    static BREAK_REGEX: OnceLock<Regex> = OnceLock::new();
    let breaks = BREAK_REGEX.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

    let text = breaks.replace_all(raw, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts [`ResultRow`]s from a search result document.
///
/// Holds no per-document state: calling [`RowExtractor::extract`] twice on the
/// same input yields the same rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowExtractor;

impl RowExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Lazily match row blocks in `html`. Blocks that don't fit the full
    /// row shape are skipped.
    pub fn extract<'a>(&self, html: &'a str) -> impl Iterator<Item = ResultRow> + 'a {
        row_regex()
            .captures_iter(html)
            .filter_map(|caps| Self::build_row(&caps))
    }

    fn build_row(caps: &Captures<'_>) -> Option<ResultRow> {
        let text = |name: &str| caps.name(name).map(|m| clean_text(m.as_str()));
        let optional = |name: &str| text(name).filter(|value| !value.is_empty());

        let registration_id = RegistrationId::new(text("id")?).ok()?;

        Some(ResultRow {
            registration_id,
            registration_number: text("number")?,
            issue_date: optional("issued"),
            product_name: text("product")?,
            brand: text("brand")?,
            packaging: text("packaging")?,
            registrant_name: text("registrant")?,
            registrant_city: text("city")?,
            manufacturer_id: None,
            manufacturer_name: None,
            manufacturer_country: None,
        })
    }
}

/// The `"<start> - <end> Dari <total>"` result-count banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountBanner {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl CountBanner {
    /// Locate and parse the banner in a search result document.
    pub fn find(html: &str) -> Option<Self> {
        let caps = banner_regex().captures(html)?;
        let number = |name: &str| -> Option<usize> {
            caps.name(name)?
                .as_str()
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
                .parse()
                .ok()
        };

        Some(Self {
            start: number("start")?,
            end: number("end")?,
            total: number("total")?,
        })
    }

    /// Number of rows the banner says this page holds.
    pub fn rows_on_page(&self) -> usize {
        if self.total == 0 || self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Whether the page stops short of the declared total.
    pub fn is_partial(&self) -> bool {
        self.end < self.total
    }
}
