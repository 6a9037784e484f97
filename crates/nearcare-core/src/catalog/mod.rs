// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod source;

pub use source::{load_source, read_csv_records, read_json_records, SourceFormat};

use crate::category::Category;
use crate::facility::FacilityRecord;
use crate::geo;
use crate::nearest::{nearest, QueryResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// One row/object from a data source, keyed by column or field name.
pub type RawRecord = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unexpected source layout: {0}")]
    UnexpectedShape(String),
}

/// Which raw field supplies each facility attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            name: "name".to_string(),
            latitude: "lat".to_string(),
            longitude: "lon".to_string(),
            address: Some("address".to_string()),
            phone: Some("phone".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub fields: FieldMap,
    /// Keep only the last record seen for each name.
    pub dedup_by_name: bool,
    /// Substituted for coordinates that are missing, unparsable or out of range.
    pub default_coordinate: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            fields: FieldMap::default(),
            dedup_by_name: false,
            default_coordinate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    Missing,
    Unparsable,
    OutOfRange,
}

/// Outcome of reading one coordinate field.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateParse {
    Parsed(f64),
    Defaulted { raw: String, reason: DefaultReason },
}

impl CoordinateParse {
    pub fn parse(raw: Option<&str>, limit: f64) -> Self {
        let raw = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => {
                return CoordinateParse::Defaulted {
                    raw: String::new(),
                    reason: DefaultReason::Missing,
                }
            }
        };
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v.abs() <= limit => CoordinateParse::Parsed(v),
            Ok(_) => CoordinateParse::Defaulted {
                raw: raw.to_string(),
                reason: DefaultReason::OutOfRange,
            },
            Err(_) => CoordinateParse::Defaulted {
                raw: raw.to_string(),
                reason: DefaultReason::Unparsable,
            },
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, CoordinateParse::Defaulted { .. })
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            CoordinateParse::Parsed(v) => Some(*v),
            CoordinateParse::Defaulted { .. } => None,
        }
    }
}

/// An immutable collection of facilities for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    category: Category,
    records: Vec<FacilityRecord>,
}

impl Catalog {
    pub fn from_records(category: Category, records: Vec<FacilityRecord>) -> Self {
        Self { category, records }
    }

    /// Normalizes raw records into a catalog.
    ///
    /// Bad coordinates never fail the load: both coordinates of such a record
    /// are replaced by `options.default_coordinate` and the record is kept, so
    /// it still takes part in ranking. Records without a name are skipped.
    pub fn load<I>(category: Category, raw_records: I, options: &LoadOptions) -> Self
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let fields = &options.fields;
        let mut by_name: IndexMap<String, FacilityRecord> = IndexMap::new();
        let mut records = Vec::new();
        let mut seen = 0usize;
        let mut skipped = 0usize;
        let mut defaulted = 0usize;

        for raw in raw_records {
            seen += 1;
            let name = match field(&raw, Some(&fields.name)) {
                Some(name) => name,
                None => {
                    skipped += 1;
                    log::warn!(
                        "[Catalog] {}: skipping record #{} without a '{}' value",
                        category,
                        seen,
                        fields.name
                    );
                    continue;
                }
            };

            let lat = CoordinateParse::parse(raw.get(&fields.latitude).map(String::as_str), 90.0);
            let lon =
                CoordinateParse::parse(raw.get(&fields.longitude).map(String::as_str), 180.0);
            let (latitude, longitude, coordinates_defaulted) = match (lat.value(), lon.value()) {
                (Some(lat), Some(lon)) => (lat, lon, false),
                _ => {
                    defaulted += 1;
                    log::warn!(
                        "[Catalog] {}: '{}' has unusable coordinates (lat={:?}, lon={:?}); using ({}, {})",
                        category,
                        name,
                        lat,
                        lon,
                        options.default_coordinate,
                        options.default_coordinate
                    );
                    (options.default_coordinate, options.default_coordinate, true)
                }
            };

            let record = FacilityRecord {
                name,
                latitude,
                longitude,
                address: field(&raw, fields.address.as_ref()),
                phone: field(&raw, fields.phone.as_ref()),
                coordinates_defaulted,
            };

            if options.dedup_by_name {
                by_name.insert(record.name.clone(), record);
            } else {
                records.push(record);
            }
        }

        if options.dedup_by_name {
            let duplicates = seen - skipped - by_name.len();
            if duplicates > 0 {
                log::debug!(
                    "[Catalog] {}: merged {} duplicate name(s), last entry wins",
                    category,
                    duplicates
                );
            }
            records = by_name.into_values().collect();
        }

        log::info!(
            "[Catalog] {}: loaded {} record(s) ({} with default coordinates, {} skipped)",
            category,
            records.len(),
            defaulted,
            skipped
        );

        Self { category, records }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn records(&self) -> &[FacilityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records whose coordinates were replaced by the default.
    pub fn defaulted_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.coordinates_defaulted)
            .count()
    }

    pub fn nearest(&self, lat: f64, lon: f64, k: usize) -> QueryResult {
        nearest(&self.records, lat, lon, k)
    }
}

fn field(raw: &RawRecord, key: Option<&String>) -> Option<String> {
    let value = raw.get(key?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// The catalogs wired to categories for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    catalogs: HashMap<Category, Arc<Catalog>>,
}

impl CatalogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires a catalog to its category, returning any catalog it replaced.
    pub fn insert(&mut self, catalog: Catalog) -> Option<Arc<Catalog>> {
        self.catalogs.insert(catalog.category(), Arc::new(catalog))
    }

    pub fn get(&self, category: Category) -> Option<&Arc<Catalog>> {
        self.catalogs.get(&category)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.catalogs.contains_key(&category)
    }

    /// Wired categories, in menu order.
    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.catalogs.contains_key(c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

impl FromIterator<Catalog> for CatalogSet {
    fn from_iter<T: IntoIterator<Item = Catalog>>(iter: T) -> Self {
        let mut set = CatalogSet::new();
        for catalog in iter {
            set.insert(catalog);
        }
        set
    }
}

/// Whether the record's stored coordinates are a real location.
pub fn has_usable_coordinates(record: &FacilityRecord) -> bool {
    !record.coordinates_defaulted && geo::is_valid_coordinate(record.latitude, record.longitude)
}
