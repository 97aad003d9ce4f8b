use log::warn;
use serde::Serialize;
use serde_json::Value;
use crate::config::Endpoints;
use crate::fetcher::Request;
use crate::lookup::Lookup;
use crate::resolver::normalize_folio;

/// One billing period from the tax-statement page.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct TaxEntry {
    pub bill: Option<String>,
    pub amount_due: Option<String>,
    pub amount_paid: Option<String>,
    pub status: Option<String>,
}

/// Flat output record for one address. Field order is the output order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PropertyRecord {
    pub property_address: Value,
    pub city: Value,
    pub country: Value,
    pub state: Value,
    pub zipcode: Value,
    pub mailing_address: String,
    pub owners: Vec<Option<String>>,
    pub primary_land_use: String,
    pub actual_area: Value,
    pub living_area: Value,
    pub adjusted_area: Value,
    pub market_value: Value,
    pub assessed_value: Value,
    pub year_built: Value,
    pub actual_sqft: Value,
    pub living_sqft: Value,
    pub calc_value: Value,
    pub tax: Vec<TaxEntry>,
}

impl PropertyRecord {
    /// Returns the record extended with its tax history.
    pub fn with_tax(self, tax: Vec<TaxEntry>) -> Self {
        PropertyRecord { tax, ..self }
    }
}

/// Stage output: the record so far plus the tax-page request it leads to.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelDetail {
    pub record: PropertyRecord,
    pub tax_request: Request,
}

pub fn tax_url(endpoints: &Endpoints, folio: &str) -> String {
    format!("{}/public/real_estate/parcels/{}", endpoints.tax_site, folio)
}

/// `"{address} {city}, {state} {zipcode}"` with absent parts rendered empty.
pub fn compose_mailing_address(
    address: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    zipcode: Option<&str>,
) -> String {
    format!(
        "{} {}, {} {}",
        address.unwrap_or(""),
        city.unwrap_or(""),
        state.unwrap_or(""),
        zipcode.unwrap_or("")
    )
}

/// Builds the flat record from a parcel-detail payload.
///
/// An empty payload (null, `{}`, `[]`, `""`) yields `None`, as does a payload
/// without `PropertyInfo.FolioNumber`, since the tax page cannot be addressed.
pub fn build_property(detail: &Value, endpoints: &Endpoints) -> Option<ParcelDetail> {
    let root = Lookup::new(detail);
    if !root.truthy() {
        return None;
    }

    let mailing = root.key("MailingAddress");
    let mailing_address = compose_mailing_address(
        mailing.key("Address1").text().as_deref(),
        mailing.key("City").text().as_deref(),
        mailing.key("State").text().as_deref(),
        mailing.key("ZipCode").text().as_deref(),
    );

    let owners = root.key("OwnerInfos").items().map(|owner| owner.key("Name").text()).collect();

    let info = root.key("PropertyInfo");
    let primary_land_use = format!(
        "{} {}",
        info.key("DORCode").text().unwrap_or_default(),
        info.key("DORDescription").text().unwrap_or_default()
    );

    let taxable = root.key("Taxable").key("TaxableInfos").first();
    let building = root.key("Building").key("BuildingInfos").first();

    let folio = match info.key("FolioNumber").text() {
        Some(f) => normalize_folio(&f),
        None => {
            warn!("Parcel detail has no PropertyInfo.FolioNumber; dropping record for {}", mailing_address);
            return None;
        }
    };

    let record = PropertyRecord {
        property_address: mailing.key("Address1").value(),
        city: mailing.key("City").value(),
        country: mailing.key("Country").value(),
        state: mailing.key("State").value(),
        zipcode: mailing.key("ZipCode").value(),
        mailing_address,
        owners,
        primary_land_use,
        actual_area: info.key("BuildingGrossArea").value(),
        living_area: info.key("BuildingHeatedArea").value(),
        adjusted_area: info.key("BuildingEffectiveArea").value(),
        market_value: taxable.key("SchoolTaxableValue").value(),
        assessed_value: taxable.key("CountyTaxableValue").value(),
        year_built: building.key("Actual").value(),
        actual_sqft: building.key("GrossArea").value(),
        living_sqft: building.key("HeatedArea").value(),
        calc_value: building.key("DepreciatedValue").value(),
        tax: Vec::new(),
    };

    Some(ParcelDetail {
        record,
        tax_request: Request::unblocked(tax_url(endpoints, &folio)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_detail() -> Value {
        json!({
            "MailingAddress": {
                "Address1": "1250 S MIAMI AVE",
                "City": "MIAMI",
                "Country": "USA",
                "State": "FL",
                "ZipCode": "33130"
            },
            "OwnerInfos": [
                { "Name": "JANE DOE" },
                { "Name": "JOHN DOE" },
                { "Name": "JANE DOE" }
            ],
            "PropertyInfo": {
                "DORCode": "0407",
                "DORDescription": "RESIDENTIAL - TOTAL VALUE : CONDOMINIUM - RESIDENTIAL",
                "BuildingGrossArea": 1450,
                "BuildingHeatedArea": 1210,
                "BuildingEffectiveArea": 1300,
                "FolioNumber": "01-4139-000-0040"
            },
            "Taxable": { "TaxableInfos": [
                { "SchoolTaxableValue": 410000, "CountyTaxableValue": 385000 },
                { "SchoolTaxableValue": 1, "CountyTaxableValue": 1 }
            ] },
            "Building": { "BuildingInfos": [
                { "Actual": 2004, "GrossArea": 1450, "HeatedArea": 1210, "DepreciatedValue": 250000 }
            ] }
        })
    }

    #[test]
    fn builds_flat_record() {
        let parcel = build_property(&sample_detail(), &Endpoints::default()).unwrap();
        let r = &parcel.record;
        assert_eq!(r.mailing_address, "1250 S MIAMI AVE MIAMI, FL 33130");
        assert_eq!(r.country, json!("USA"));
        assert_eq!(r.zipcode, json!("33130"));
        assert_eq!(r.owners.len(), 3);
        assert_eq!(r.owners[2].as_deref(), Some("JANE DOE"));
        assert_eq!(r.primary_land_use, "0407 RESIDENTIAL - TOTAL VALUE : CONDOMINIUM - RESIDENTIAL");
        assert_eq!(r.actual_area, json!(1450));
        assert_eq!(r.market_value, json!(410000));
        assert_eq!(r.assessed_value, json!(385000));
        assert_eq!(r.year_built, json!(2004));
        assert_eq!(r.calc_value, json!(250000));
        assert!(r.tax.is_empty());
    }

    #[test]
    fn tax_request_uses_detail_folio_and_unblock_hint() {
        let parcel = build_property(&sample_detail(), &Endpoints::default()).unwrap();
        assert_eq!(
            parcel.tax_request.url,
            "https://miamidade.county-taxes.com/public/real_estate/parcels/0141390000040"
        );
        assert!(parcel.tax_request.unblock);
    }

    #[test]
    fn empty_taxable_list_gives_null_values() {
        let mut detail = sample_detail();
        detail["Taxable"]["TaxableInfos"] = json!([]);
        detail.as_object_mut().unwrap().remove("Building");
        let r = build_property(&detail, &Endpoints::default()).unwrap().record;
        assert_eq!(r.market_value, Value::Null);
        assert_eq!(r.assessed_value, Value::Null);
        assert_eq!(r.year_built, Value::Null);
        assert_eq!(r.living_sqft, Value::Null);
    }

    #[test]
    fn missing_mailing_parts_render_empty() {
        let mut detail = sample_detail();
        detail.as_object_mut().unwrap().remove("MailingAddress");
        let r = build_property(&detail, &Endpoints::default()).unwrap().record;
        assert_eq!(r.property_address, Value::Null);
        assert_eq!(r.mailing_address, " ,  ");
    }

    #[test]
    fn numeric_mailing_fields_keep_their_json_type() {
        let mut detail = sample_detail();
        detail["MailingAddress"]["ZipCode"] = json!(33130);
        let r = build_property(&detail, &Endpoints::default()).unwrap().record;
        assert_eq!(r.zipcode, json!(33130));
        assert_eq!(r.mailing_address, "1250 S MIAMI AVE MIAMI, FL 33130");
    }

    #[test]
    fn empty_payload_emits_nothing() {
        assert!(build_property(&json!({}), &Endpoints::default()).is_none());
        assert!(build_property(&Value::Null, &Endpoints::default()).is_none());
    }

    #[test]
    fn payload_without_folio_is_dropped() {
        let mut detail = sample_detail();
        detail["PropertyInfo"].as_object_mut().unwrap().remove("FolioNumber");
        assert!(build_property(&detail, &Endpoints::default()).is_none());
    }

    #[test]
    fn with_tax_keeps_existing_fields() {
        let parcel = build_property(&sample_detail(), &Endpoints::default()).unwrap();
        let entry = TaxEntry { bill: Some("2023".into()), ..TaxEntry::default() };
        let full = parcel.record.clone().with_tax(vec![entry.clone()]);
        assert_eq!(full.tax, vec![entry]);
        assert_eq!(full.owners, parcel.record.owners);
    }
}
