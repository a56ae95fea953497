#![allow(dead_code)]

use async_trait::async_trait;
use cekbpom_core::{FieldCodes, SearchField, SessionToken};
use cekbpom_scanner::{FetchError, HttpFetcher, HttpResponse, SearchUrlBuilder};
use std::collections::HashMap;
use std::sync::Mutex;

pub const BASE: &str = "http://registry.test";
pub const TOKEN: &str = "k3j4h5g6f7d8s9a0p1o2i3u4y5";

/// In-memory upstream: canned responses by exact URL, every request recorded.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    routes: HashMap<String, HttpResponse>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_landing(self) -> Self {
        self.respond(&urls().landing_url(), 200, &landing_page())
    }

    pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            HttpResponse {
                status,
                reason: reason(status).to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn search(self, field: SearchField, query: &str, page_size: u32, body: &str) -> Self {
        let url = urls().search_url(&session(), field, query, page_size, 0);
        self.respond(&url, 200, body)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        self.calls.lock().expect("calls lock").push(url.to_string());
        Ok(self.routes.get(url).cloned().unwrap_or(HttpResponse {
            status: 404,
            reason: "Not Found".to_string(),
            body: String::new(),
        }))
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    }
}

pub fn urls() -> SearchUrlBuilder {
    SearchUrlBuilder::new(BASE, FieldCodes::default())
}

pub fn session() -> SessionToken {
    SessionToken::new(TOKEN).expect("valid token")
}

pub fn landing_page() -> String {
    format!(
        r#"<html><head><title>Cek Produk BPOM</title></head><body>
            <ul class="nav"><li><a href="{BASE}/home/produk/{TOKEN}">Produk</a></li></ul>
        </body></html>"#
    )
}

/// A listing row as the upstream renders it.
pub struct Listing<'a> {
    pub id: &'a str,
    pub product: &'a str,
    pub brand: &'a str,
}

pub fn listing(id: &str) -> Listing<'_> {
    Listing {
        id,
        product: "HI-CHEW",
        brand: "HI-CHEW",
    }
}

fn render_row(row: &Listing<'_>) -> String {
    format!(
        r#"
        <tr title="Lihat detil" urldetil="{BASE}/home/detil/{TOKEN}/produk/{id}">
            <td>ML {id}<div>Terbit: 01-02-2020</div></td>
            <td>{product}<div>Merk: {brand}</div><div>Kemasan: Dus,
                10 Bungkus @ 35 g</div></td>
            <td>PT. SINAR NIAGA<div>Kota: JAKARTA UTARA</div></td>
        </tr>"#,
        id = row.id,
        product = row.product,
        brand = row.brand,
    )
}

/// A full result page whose banner declares `total` with `end` rows shown.
pub fn result_page(end: usize, total: usize, rows: &[Listing<'_>]) -> String {
    let start = usize::from(total > 0);
    let body: String = rows.iter().map(render_row).collect();
    format!(
        r#"<html><body>
            <div class="pagination-info">{start} - {end} Dari {total}</div>
            <table class="table">
                <tr><th>Nomor Registrasi</th><th>Produk</th><th>Pendaftar</th></tr>
                {body}
            </table>
        </body></html>"#
    )
}

/// A page that lists exactly `rows` and declares them as the total.
pub fn complete_page(rows: &[Listing<'_>]) -> String {
    result_page(rows.len(), rows.len(), rows)
}

pub fn detail_page(manufacturer_id: &str, name: &str, country: &str) -> String {
    format!(
        r#"<html><body><table class="detil">
            <tr><td>Produsen</td>
                <td><a href="{BASE}/home/produsen/{TOKEN}/{manufacturer_id}">{name} - {country}</a></td></tr>
        </table></body></html>"#
    )
}

pub fn queries(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
