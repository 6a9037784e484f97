// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use super::{CatalogError, RawRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Csv,
}

impl SourceFormat {
    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SourceFormat::Json),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }
}

/// Reads a data file into raw key/value records.
pub fn load_source<P: AsRef<Path>>(
    path: P,
    format: SourceFormat,
) -> Result<Vec<RawRecord>, CatalogError> {
    let path = path.as_ref();
    log::debug!("[Catalog] Reading {:?} source: {:?}", format, path);
    let reader = BufReader::new(File::open(path)?);
    match format {
        SourceFormat::Json => read_json_records(reader),
        SourceFormat::Csv => read_csv_records(reader),
    }
}

/// Parses a JSON array of flat objects. Scalar values are stringified so
/// that JSON and CSV sources go through the same field mapping.
pub fn read_json_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, CatalogError> {
    let value: Value = serde_json::from_reader(reader)?;
    let items = value.as_array().ok_or_else(|| {
        CatalogError::UnexpectedShape("expected a JSON array of objects".to_string())
    })?;

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let object = item.as_object().ok_or_else(|| {
            CatalogError::UnexpectedShape(format!("element {} is not an object", i))
        })?;
        let raw: RawRecord = object
            .iter()
            .map(|(key, value)| (key.clone(), json_scalar_to_string(value)))
            .collect();
        records.push(raw);
    }
    Ok(records)
}

fn json_scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses a CSV file with a header row. Rows may be shorter or longer than
/// the header; missing trailing fields are simply absent from the record.
pub fn read_csv_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, CatalogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Government open-data exports usually carry a UTF-8 BOM.
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let raw: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(header, field)| (header.clone(), field.to_string()))
            .collect();
        records.push(raw);
    }
    Ok(records)
}
