use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use log::info;
use serde::Serialize;
use serde_json::{Map, Value};
use crate::config::OutputFormat;
use crate::error::ScrapeError;
use crate::property::PropertyRecord;

/// Flattens nested objects and arrays into `parent_child` keys.
/// Array elements are numbered from 1, e.g. `tax_1_bill`, `owners_2`.
pub fn flatten(value: &Value) -> Vec<(String, Value)> {
    let mut items = Vec::new();
    flatten_into(value, "", &mut items);
    items
}

fn flatten_into(value: &Value, parent_key: &str, items: &mut Vec<(String, Value)>) {
    let join = |key: &str| {
        if parent_key.is_empty() { key.to_string() } else { format!("{}_{}", parent_key, key) }
    };
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let new_key = join(k);
                match v {
                    Value::Object(_) | Value::Array(_) => flatten_into(v, &new_key, items),
                    _ => items.push((new_key, v.clone())),
                }
            }
        }
        Value::Array(list) => {
            for (i, v) in list.iter().enumerate() {
                let new_key = join(&(i + 1).to_string());
                match v {
                    Value::Object(_) => flatten_into(v, &new_key, items),
                    _ => items.push((new_key, v.clone())),
                }
            }
        }
        other => items.push((parent_key.to_string(), other.clone())),
    }
}

fn to_flat_rows<T: Serialize>(records: &[T]) -> Result<Vec<Vec<(String, Value)>>, ScrapeError> {
    records
        .iter()
        .map(|r| -> Result<_, ScrapeError> { Ok(flatten(&serde_json::to_value(r)?)) })
        .collect()
}

pub fn write_json<W: Write>(mut writer: W, records: &[PropertyRecord]) -> Result<(), ScrapeError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn write_flat_json<W: Write>(mut writer: W, records: &[PropertyRecord]) -> Result<(), ScrapeError> {
    let rows: Vec<Map<String, Value>> = to_flat_rows(records)?
        .into_iter()
        .map(|row| row.into_iter().collect())
        .collect();
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Header is the union of flattened keys in first-seen order.
pub fn write_csv<W: Write>(writer: W, records: &[PropertyRecord]) -> Result<(), ScrapeError> {
    let rows = to_flat_rows(records)?;
    let mut headers: Vec<String> = Vec::new();
    for row in &rows {
        for (key, _) in row {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    if !headers.is_empty() {
        csv_writer.write_record(&headers)?;
    }
    for row in &rows {
        let cells = headers.iter().map(|h| {
            match row.iter().find(|(k, _)| k == h).map(|(_, v)| v) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            }
        });
        csv_writer.write_record(cells)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes all records to `path`, replacing any previous file.
pub fn write_records(path: &Path, format: OutputFormat, records: &[PropertyRecord]) -> Result<(), ScrapeError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    match format {
        OutputFormat::Json => write_json(writer, records)?,
        OutputFormat::FlatJson => write_flat_json(writer, records)?,
        OutputFormat::Csv => write_csv(writer, records)?,
    }
    info!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}
