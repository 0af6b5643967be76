//! Record trips: the largest trips by distance, energy, duration and fuel

use serde::{Deserialize, Serialize};

use crate::model::Trip;
use crate::pricing::TripCost;

/// Length of every top-N list
pub const TOP_N: usize = 10;

/// A trip with its position in the input and its computed cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTrip {
    /// Index in the trip slice passed to `aggregate`
    pub index: usize,
    /// The trip itself
    pub trip: Trip,
    /// Its computed cost
    pub cost: TripCost,
}

/// Top-N lists, each sorted descending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopRecords {
    /// By distance
    pub km: Vec<RankedTrip>,
    /// By energy
    pub kwh: Vec<RankedTrip>,
    /// By duration
    pub duration: Vec<RankedTrip>,
    /// Empty unless the dataset contains fuel use
    pub fuel: Vec<RankedTrip>,
}

impl TopRecords {
    pub(crate) fn build(trips: &[RankedTrip], is_hybrid: bool) -> Self {
        let fuel = if is_hybrid {
            top_by(trips.iter().filter(|r| r.trip.fuel() > 0.0), |t| t.fuel())
        } else {
            Vec::new()
        };
        Self {
            km: top_by(trips.iter(), Trip::distance),
            kwh: top_by(trips.iter(), Trip::energy),
            duration: top_by(trips.iter(), Trip::duration),
            fuel,
        }
    }
}

/// Stable descending sort on `key`: ties keep their input order.
fn top_by<'a>(
    trips: impl Iterator<Item = &'a RankedTrip>,
    key: impl Fn(&Trip) -> f64,
) -> Vec<RankedTrip> {
    let mut ranked: Vec<&RankedTrip> = trips.collect();
    ranked.sort_by(|a, b| key(&b.trip).total_cmp(&key(&a.trip)));
    ranked.into_iter().take(TOP_N).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(index: usize, km: f64, fuel: f64) -> RankedTrip {
        RankedTrip {
            index,
            trip: Trip {
                distance_km: km,
                fuel_liters: fuel,
                ..Default::default()
            },
            cost: TripCost::default(),
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let trips = vec![ranked(0, 10.0, 0.0), ranked(1, 10.0, 0.0), ranked(2, 5.0, 0.0)];
        let top = TopRecords::build(&trips, false);
        let order: Vec<usize> = top.km.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(top.fuel.is_empty());
    }

    #[test]
    fn test_truncates_to_top_n() {
        let trips: Vec<RankedTrip> = (0..25).map(|i| ranked(i, i as f64, 0.0)).collect();
        let top = TopRecords::build(&trips, false);
        assert_eq!(top.km.len(), TOP_N);
        assert_eq!(top.km[0].index, 24);
        assert_eq!(top.km[TOP_N - 1].index, 15);
    }

    #[test]
    fn test_fuel_list_only_for_hybrids() {
        let trips = vec![ranked(0, 10.0, 0.0), ranked(1, 20.0, 1.5), ranked(2, 30.0, 0.5)];
        let top = TopRecords::build(&trips, true);
        let order: Vec<usize> = top.fuel.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2]);
    }
}
