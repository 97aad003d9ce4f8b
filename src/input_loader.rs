use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use log::{info, error};
use serde::Deserialize;
use calamine::{Reader, Xlsx, XlsxError, Xls, XlsError, open_workbook, Data, Range};
use crate::config::{Endpoints, SEARCH_FROM, SEARCH_TO};
use crate::error::ScrapeError;

/// One row of the address table.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AddressRecord {
    #[serde(rename = "NUMBER", alias = "number", default)]
    pub number: Option<String>,
    #[serde(rename = "PREDIR", alias = "predir", default)]
    pub direction: Option<String>,
    #[serde(rename = "STNAME", alias = "stname", default)]
    pub street: Option<String>,
    #[serde(rename = "STSUFFIX", alias = "stsuffix", default)]
    pub suffix: Option<String>,
}

impl AddressRecord {
    /// `"{number} {direction} {street} {suffix}"`, missing parts as empty strings.
    pub fn query(&self) -> String {
        format!(
            "{} {} {} {}",
            self.number.as_deref().unwrap_or(""),
            self.direction.as_deref().unwrap_or(""),
            self.street.as_deref().unwrap_or(""),
            self.suffix.as_deref().unwrap_or(""),
        )
    }

    pub fn search_url(&self, endpoints: &Endpoints) -> String {
        format!(
            "{}?Operation=GetAddress&clientAppName=PropertySearch&myUnit=&from={}&myAddress={}&to={}",
            endpoints.pa_service,
            SEARCH_FROM,
            urlencoding::encode(&self.query()),
            SEARCH_TO,
        )
    }
}

/// Lazily renders one address-search URL per record, in file order.
pub fn search_urls<'a>(records: &'a [AddressRecord], endpoints: &'a Endpoints) -> impl Iterator<Item = String> + 'a {
    records.iter().map(move |record| record.search_url(endpoints))
}

pub fn load_records<P: AsRef<Path>>(filename: P) -> Result<Vec<AddressRecord>, ScrapeError> {
    let path_ref = filename.as_ref();

    if !path_ref.exists() {
        error!("Input file {:?} does not exist.", path_ref);
        return Err(ScrapeError::InputMissing(path_ref.to_path_buf()));
    }

    let extension = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("xlsx") => load_xlsx(path_ref),
        Some("xls") => load_xls(path_ref),
        _ => load_csv(path_ref),
    }
}

fn load_csv(path: &Path) -> Result<Vec<AddressRecord>, ScrapeError> {
    let file = File::open(path)?;
    let records = read_csv(file);
    info!("Loaded {} records from CSV {:?}", records.len(), path);
    Ok(records)
}

/// Malformed rows are logged and skipped.
pub fn read_csv<R: std::io::Read>(reader: R) -> Vec<AddressRecord> {
    let mut records = Vec::new();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    for (idx, result) in rdr.deserialize::<AddressRecord>().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => error!("Skipping CSV row {}: {}", idx + 1, e),
        }
    }
    records
}

fn load_xlsx(path: &Path) -> Result<Vec<AddressRecord>, ScrapeError> {
    let mut excel: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e: XlsxError| ScrapeError::Excel(e.to_string()))?;
    let records = excel
        .worksheets()
        .first()
        .map(|(_name, range)| records_from_range(range))
        .unwrap_or_default();
    info!("Loaded {} records from Excel {:?}", records.len(), path);
    Ok(records)
}

fn load_xls(path: &Path) -> Result<Vec<AddressRecord>, ScrapeError> {
    let mut excel: Xls<BufReader<File>> =
        open_workbook(path).map_err(|e: XlsError| ScrapeError::Excel(e.to_string()))?;
    let records = excel
        .worksheets()
        .first()
        .map(|(_name, range)| records_from_range(range))
        .unwrap_or_default();
    info!("Loaded {} records from Excel {:?}", records.len(), path);
    Ok(records)
}

fn records_from_range(range: &Range<Data>) -> Vec<AddressRecord> {
    let mut records = Vec::new();
    let mut number_idx = None;
    let mut direction_idx = None;
    let mut street_idx = None;
    let mut suffix_idx = None;

    for (row_idx, row) in range.rows().enumerate() {
        if row_idx == 0 {
            for (col_idx, cell) in row.iter().enumerate() {
                match cell.to_string().trim().to_uppercase().as_str() {
                    "NUMBER" => number_idx = Some(col_idx),
                    "PREDIR" => direction_idx = Some(col_idx),
                    "STNAME" => street_idx = Some(col_idx),
                    "STSUFFIX" => suffix_idx = Some(col_idx),
                    _ => {}
                }
            }
            if street_idx.is_none() {
                error!("Excel header missing 'STNAME' column");
                return records;
            }
            continue;
        }

        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|c| c.to_string().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let record = AddressRecord {
            number: cell(number_idx),
            direction: cell(direction_idx),
            street: cell(street_idx),
            suffix: cell(suffix_idx),
        };
        if record != AddressRecord::default() {
            records.push(record);
        }
    }
    records
}
