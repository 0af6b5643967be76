//! Trip selection applied before aggregation

use serde::{Deserialize, Serialize};

use crate::dates::to_compact_key;
use crate::model::Trip;

/// Which trips the dashboard is looking at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TripFilter {
    /// Every trip
    #[default]
    All,
    /// One `YYYYMM` month
    Month { month: String },
    /// Inclusive date range; bounds accept `YYYY-MM-DD` or `YYYYMMDD`
    Range {
        from: Option<String>,
        to: Option<String>,
    },
}

impl TripFilter {
    /// Select the matching trips. Soft-deleted rows are always dropped.
    ///
    /// Trips without a resolvable date never match a month or range filter.
    pub fn apply(&self, trips: &[Trip], utc_offset_minutes: i32) -> Vec<Trip> {
        let live = trips.iter().filter(|t| !t.is_deleted);
        match self {
            TripFilter::All => live.cloned().collect(),
            TripFilter::Month { month } => live
                .filter(|t| t.month_key(utc_offset_minutes).as_deref() == Some(month.as_str()))
                .cloned()
                .collect(),
            TripFilter::Range { from, to } => {
                let from = from.as_deref().and_then(to_compact_key);
                let to = to.as_deref().and_then(to_compact_key);
                live.filter(|t| {
                    let Some(date) = t.date_key(utc_offset_minutes) else {
                        return false;
                    };
                    from.as_ref().map_or(true, |f| date >= *f)
                        && to.as_ref().map_or(true, |l| date <= *l)
                })
                .cloned()
                .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(date: &str) -> Trip {
        Trip {
            distance_km: 10.0,
            date: Some(date.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_month_filter() {
        let trips = vec![dated("20250110"), dated("20250201"), dated("20250131")];
        let filter = TripFilter::Month {
            month: "202501".into(),
        };
        assert_eq!(filter.apply(&trips, 0).len(), 2);
    }

    #[test]
    fn test_range_filter_is_inclusive() {
        let trips = vec![dated("20250101"), dated("20250115"), dated("20250131"), Trip::default()];
        let filter = TripFilter::Range {
            from: Some("2025-01-15".into()),
            to: Some("20250131".into()),
        };
        let kept = filter.apply(&trips, 0);
        assert_eq!(kept.len(), 2);

        let open = TripFilter::Range {
            from: None,
            to: Some("2025-01-15".into()),
        };
        assert_eq!(open.apply(&trips, 0).len(), 2);
    }

    #[test]
    fn test_soft_deleted_rows_are_dropped() {
        let mut deleted = dated("20250101");
        deleted.is_deleted = true;
        let trips = vec![deleted, dated("20250102")];
        assert_eq!(TripFilter::All.apply(&trips, 0).len(), 1);
    }

    #[test]
    fn test_filter_from_json() {
        let filter: TripFilter =
            serde_json::from_str(r#"{"type": "range", "from": "2025-01-01", "to": null}"#).unwrap();
        assert_eq!(
            filter,
            TripFilter::Range {
                from: Some("2025-01-01".into()),
                to: None
            }
        );
    }
}
