// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which facility dataset a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    PointOfInterest,
    DistrictHospital,
    Clinic,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Category; 3] = [
        Category::PointOfInterest,
        Category::DistrictHospital,
        Category::Clinic,
    ];

    /// Stable identifier used in config files and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Category::PointOfInterest => "POINT_OF_INTEREST",
            Category::DistrictHospital => "DISTRICT_HOSPITAL",
            Category::Clinic => "CLINIC",
        }
    }

    /// The chat token a user sends to pick this category. Also used as the
    /// menu label.
    pub fn keyword(&self) -> &'static str {
        match self {
            Category::PointOfInterest => "據點",
            Category::DistrictHospital => "地區醫院",
            Category::Clinic => "診所",
        }
    }

    /// Matches a chat message against the category tokens. Accepts the chat
    /// keyword or the identifier (case-insensitive), ignoring surrounding
    /// whitespace.
    pub fn from_text(text: &str) -> Option<Category> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Category::ALL
            .into_iter()
            .find(|c| c.keyword() == text || c.id().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_text(s).ok_or_else(|| {
            let known: Vec<&str> = Category::ALL.iter().map(|c| c.id()).collect();
            format!("Unknown category '{}' (expected one of {})", s, known.join(", "))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword() {
        assert_eq!(Category::from_text("診所"), Some(Category::Clinic));
        assert_eq!(Category::from_text(" 地區醫院 "), Some(Category::DistrictHospital));
        assert_eq!(Category::from_text("據點"), Some(Category::PointOfInterest));
    }

    #[test]
    fn test_from_identifier() {
        assert_eq!(Category::from_text("CLINIC"), Some(Category::Clinic));
        assert_eq!(Category::from_text("district_hospital"), Some(Category::DistrictHospital));
    }

    #[test]
    fn test_unknown_text() {
        assert_eq!(Category::from_text(""), None);
        assert_eq!(Category::from_text("醫院"), None);
        assert_eq!(Category::from_text("診所在哪"), None);
        assert!("pharmacy".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_uses_identifier() {
        let json = serde_json::to_string(&Category::DistrictHospital).unwrap();
        assert_eq!(json, "\"DISTRICT_HOSPITAL\"");
        let back: Category = serde_json::from_str("\"POINT_OF_INTEREST\"").unwrap();
        assert_eq!(back, Category::PointOfInterest);
    }
}
