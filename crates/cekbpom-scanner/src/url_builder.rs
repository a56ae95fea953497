use cekbpom_core::{FieldCodes, RegistrationId, SearchField, SessionToken};

/// Result ordering column and direction the upstream listing expects.
const ORDER_SEGMENT: &str = "order/4/DESC";

/// Builds landing, search and detail URLs for one upstream service.
#[derive(Debug, Clone)]
pub struct SearchUrlBuilder {
    base_url: String,
    codes: FieldCodes,
}

impl SearchUrlBuilder {
    pub fn new(base_url: impl Into<String>, codes: FieldCodes) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, codes }
    }

    pub fn landing_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// `<base>/home/produk/<session>/all/row/<size>/page/<page>/order/4/DESC/search/<code>/<query>`
    pub fn search_url(
        &self,
        session: &SessionToken,
        field: SearchField,
        query: &str,
        page_size: u32,
        page: u32,
    ) -> String {
        format!(
            "{}/home/produk/{}/all/row/{}/page/{}/{}/search/{}/{}",
            self.base_url,
            session.as_str(),
            page_size,
            page,
            ORDER_SEGMENT,
            self.codes.code(field),
            urlencoding::encode(query),
        )
    }

    pub fn detail_url(&self, session: &SessionToken, id: &RegistrationId) -> String {
        format!(
            "{}/home/detil/{}/produk/{}",
            self.base_url,
            session.as_str(),
            urlencoding::encode(id.as_str()),
        )
    }
}
