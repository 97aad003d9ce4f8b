use log::{debug, info};
use serde_json::Value;
use crate::config::Endpoints;
use crate::lookup::Lookup;

/// Canonical parcel identifier: the appraiser's strap with every `-` removed.
pub fn normalize_folio(strap: &str) -> String {
    strap.replace('-', "")
}

pub fn detail_url(endpoints: &Endpoints, folio: &str) -> String {
    format!(
        "{}?Operation=GetPropertySearchByFolio&clientAppName=PropertySearch&folioNumber={}",
        endpoints.pa_service, folio
    )
}

/// Folio of the first address-search match, if the search completed with results.
pub fn resolve_folio(search: &Value) -> Option<String> {
    let root = Lookup::new(search);
    if !root.key("Completed").truthy() || !root.key("MinimumPropertyInfos").truthy() {
        info!("Address search returned no usable result.");
        return None;
    }
    let strap = root.key("MinimumPropertyInfos").first().key("Strap").text()?;
    let folio = normalize_folio(&strap);
    debug!("Resolved strap {} to folio {}", strap, folio);
    Some(folio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn folio_drops_every_hyphen() {
        assert_eq!(normalize_folio("12-3456-789"), "123456789");
        assert_eq!(normalize_folio("30-1234-567-0010"), "3012345670010");
        assert_eq!(normalize_folio("0141390000040"), "0141390000040");
    }

    #[test]
    fn first_match_wins() {
        let search = json!({
            "Completed": true,
            "MinimumPropertyInfos": [
                { "Strap": "01-4139-000-0040" },
                { "Strap": "99-9999-999-9999" }
            ]
        });
        assert_eq!(resolve_folio(&search).as_deref(), Some("0141390000040"));
    }

    #[test]
    fn incomplete_or_empty_search_is_dropped() {
        assert_eq!(resolve_folio(&json!({ "Completed": false, "MinimumPropertyInfos": [{ "Strap": "1-2" }] })), None);
        assert_eq!(resolve_folio(&json!({ "Completed": true, "MinimumPropertyInfos": [] })), None);
        assert_eq!(resolve_folio(&json!({ "Completed": true })), None);
        assert_eq!(resolve_folio(&json!(null)), None);
    }

    #[test]
    fn detail_url_carries_folio() {
        let url = detail_url(&Endpoints::default(), "0141390000040");
        assert!(url.ends_with("?Operation=GetPropertySearchByFolio&clientAppName=PropertySearch&folioNumber=0141390000040"));
        assert!(url.starts_with("https://www.miamidade.gov/"));
    }
}
