use log::{info, warn};
use serde_json::Value;
use crate::config::{Config, Endpoints};
use crate::delay_manager;
use crate::fetcher::{Fetch, Request};
use crate::input_loader::{self, AddressRecord};
use crate::property::{self, PropertyRecord};
use crate::resolver;
use crate::tax_parser;

fn fetch_json<F: Fetch + ?Sized>(fetcher: &F, request: &Request) -> Option<Value> {
    let body = match fetcher.fetch(request) {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to fetch {}: {}", request.url, e);
            return None;
        }
    };
    if body.trim().is_empty() {
        return Some(Value::Null);
    }
    match serde_json::from_str(&body) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Invalid JSON from {}: {}", request.url, e);
            None
        }
    }
}

/// Runs the full chain for one address-search URL.
///
/// Returns `None` when the search or parcel detail yields nothing usable. A
/// failed tax-page fetch still returns the record, with an empty tax list.
pub fn scrape_address<F: Fetch + ?Sized>(fetcher: &F, search_url: &str, endpoints: &Endpoints) -> Option<PropertyRecord> {
    let search = fetch_json(fetcher, &Request::new(search_url))?;
    let folio = resolver::resolve_folio(&search)?;

    let detail_request = Request::new(resolver::detail_url(endpoints, &folio));
    let detail = fetch_json(fetcher, &detail_request)?;
    let parcel = match property::build_property(&detail, endpoints) {
        Some(parcel) => parcel,
        None => {
            warn!("Empty parcel detail for folio {}", folio);
            return None;
        }
    };

    let tax = match fetcher.fetch(&parcel.tax_request) {
        Ok(html) => tax_parser::parse_taxes(&html),
        Err(e) => {
            warn!("Failed to fetch tax history {}: {}", parcel.tax_request.url, e);
            Vec::new()
        }
    };
    Some(parcel.record.with_tax(tax))
}

/// Scrapes every address in file order and collects the emitted records.
pub fn run<F: Fetch + ?Sized>(fetcher: &F, records: &[AddressRecord], config: &Config) -> Vec<PropertyRecord> {
    let total = records.len();
    let mut emitted = Vec::new();

    for (i, url) in input_loader::search_urls(records, &config.endpoints).enumerate() {
        if i > 0 {
            delay_manager::random_address_delay(config.delay);
        }
        info!("Processing {} / {} : {}", i + 1, total, records[i].query().trim());

        match scrape_address(fetcher, &url, &config.endpoints) {
            Some(record) => emitted.push(record),
            None => info!("No record for address {}", records[i].query().trim()),
        }
    }

    info!("Scraping completed. {} of {} addresses produced a record.", emitted.len(), total);
    emitted
}
