// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::facility::FacilityRecord;
use crate::geo::distance_km;
use rayon::prelude::*;
use serde::Serialize;

/// Catalogs at least this large have their distances computed in parallel.
const PARALLEL_THRESHOLD: usize = 2048;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub record: FacilityRecord,
    pub distance_km: f64,
}

/// Matches ordered by ascending distance.
pub type QueryResult = Vec<Match>;

/// Returns the `k` records closest to the query point, nearest first.
///
/// The sort is stable, so records at equal distance keep their catalog order.
/// Fewer than `k` records yields all of them; an empty slice yields an empty
/// result.
pub fn nearest(
    records: &[FacilityRecord],
    query_lat: f64,
    query_lon: f64,
    k: usize,
) -> QueryResult {
    if k == 0 || records.is_empty() {
        return Vec::new();
    }

    let distance_to =
        |r: &FacilityRecord| distance_km(query_lat, query_lon, r.latitude, r.longitude);
    let distances: Vec<f64> = if records.len() >= PARALLEL_THRESHOLD {
        records.par_iter().map(distance_to).collect()
    } else {
        records.iter().map(distance_to).collect()
    };

    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));

    order
        .into_iter()
        .take(k)
        .map(|i| Match {
            record: records[i].clone(),
            distance_km: distances[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(result: &QueryResult) -> Vec<&str> {
        result.iter().map(|m| m.record.name.as_str()).collect()
    }

    #[test]
    fn test_single_nearest_is_exact_match() {
        let records = vec![
            FacilityRecord::new("A", 25.0, 121.5),
            FacilityRecord::new("B", 25.1, 121.6),
        ];
        let result = nearest(&records, 25.0, 121.5, 1);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].record.name, "A");
        assert_eq!(result[0].distance_km, 0.0);
    }

    #[test]
    fn test_top_three_sorted() {
        let records = vec![
            FacilityRecord::new("far", 25.30, 121.80),
            FacilityRecord::new("near", 25.02, 121.55),
            FacilityRecord::new("mid", 25.10, 121.60),
            FacilityRecord::new("closer", 25.03, 121.56),
            FacilityRecord::new("farthest", 24.00, 120.00),
        ];
        let result = nearest(&records, 25.02, 121.55, 3);
        assert_eq!(names(&result), vec!["near", "closer", "mid"]);
        assert!(result.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_fewer_records_than_k() {
        let records = vec![
            FacilityRecord::new("B", 25.1, 121.6),
            FacilityRecord::new("A", 25.0, 121.5),
        ];
        let result = nearest(&records, 25.0, 121.5, 3);
        assert_eq!(names(&result), vec!["A", "B"]);
    }

    #[test]
    fn test_empty_catalog_and_zero_k() {
        assert!(nearest(&[], 25.0, 121.5, 3).is_empty());
        let records = vec![FacilityRecord::new("A", 25.0, 121.5)];
        assert!(nearest(&records, 25.0, 121.5, 0).is_empty());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let records = vec![
            FacilityRecord::new("first", 25.1, 121.5),
            FacilityRecord::new("second", 25.1, 121.5),
            FacilityRecord::new("third", 25.1, 121.5),
        ];
        let result = nearest(&records, 25.0, 121.5, 2);
        assert_eq!(names(&result), vec!["first", "second"]);
    }

    #[test]
    fn test_large_catalog_matches_sequential_order() {
        // Above the parallel threshold, with repeated positions to exercise ties.
        let records: Vec<FacilityRecord> = (0..3000)
            .map(|i| {
                let step = (i % 500) as f64 * 0.001;
                FacilityRecord::new(format!("site-{}", i), 25.0 + step, 121.5 + step)
            })
            .collect();
        let result = nearest(&records, 25.0, 121.5, 3);
        assert_eq!(names(&result), vec!["site-0", "site-500", "site-1000"]);
        assert!(result.iter().all(|m| m.distance_km == 0.0));
    }
}
