// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};

const MAP_PLACE_URL: &str = "https://www.google.com/maps/place?q=";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Set when the source coordinates could not be used and the catalog's
    /// default coordinate was substituted.
    #[serde(default)]
    pub coordinates_defaulted: bool,
}

impl FacilityRecord {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            address: None,
            phone: None,
            coordinates_defaulted: false,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Map search link for this facility. Uses the street address when there
    /// is one, otherwise the raw coordinates.
    ///
    /// Address words are percent-encoded and joined with `+`.
    pub fn map_link(&self) -> String {
        let address = self
            .address
            .as_deref()
            .map(|a| {
                a.split_whitespace()
                    .map(|word| urlencoding::encode(word).into_owned())
                    .collect::<Vec<_>>()
                    .join("+")
            })
            .filter(|q| !q.is_empty());

        match address {
            Some(query) => format!("{}{}", MAP_PLACE_URL, query),
            None => format!("{}{},{}", MAP_PLACE_URL, self.latitude, self.longitude),
        }
    }
}
