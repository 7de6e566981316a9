//! Route usage analysis over the trip index

use crate::nearby::find_nearby_with;
use crate::{
    BalancedIndex, Config, DivvyError, Node, RecordKind, Result, Station, StationId, Trip,
    TripId,
};
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A trip picked up by [`match_trips_from`], reduced to the station it ended at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteMatch {
    pub station_id: StationId,
}

/// How heavily the route of one trip is used
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteAnalysis {
    pub from_station: StationId,
    pub to_station: StationId,
    /// Trips leaving near `from_station` whose destination is near `to_station`
    pub trip_count: usize,
    /// `trip_count` as a percentage of every trip in the index
    pub percentage: f64,
}

/// Every trip that starts at `station_id`, as its destination station
///
/// The order of the result is unspecified.
pub fn match_trips_from(
    trips: &BalancedIndex<TripId, Trip>,
    station_id: StationId,
) -> Vec<RouteMatch> {
    let mut matches = VecDeque::new();
    collect_trips_from(trips, trips.root(), station_id, &mut matches);
    matches.into()
}

fn collect_trips_from(
    trips: &BalancedIndex<TripId, Trip>,
    node: Option<&Node<TripId, Trip>>,
    station_id: StationId,
    matches: &mut VecDeque<RouteMatch>,
) {
    let Some(node) = node else {
        return;
    };

    let trip = node.value();
    if trip.from_station_id == station_id {
        matches.push_front(RouteMatch {
            station_id: trip.to_station_id,
        });
    }

    collect_trips_from(trips, trips.left(node), station_id, matches);
    collect_trips_from(trips, trips.right(node), station_id, matches);
}

/// Number of trips that start or end at `station_id`
///
/// A round trip back to the same station counts twice.
pub fn trips_at_station(trips: &BalancedIndex<TripId, Trip>, station_id: StationId) -> usize {
    fn count(
        trips: &BalancedIndex<TripId, Trip>,
        node: Option<&Node<TripId, Trip>>,
        station_id: StationId,
    ) -> usize {
        let Some(node) = node else {
            return 0;
        };
        let trip = node.value();
        usize::from(trip.from_station_id == station_id)
            + usize::from(trip.to_station_id == station_id)
            + count(trips, trips.left(node), station_id)
            + count(trips, trips.right(node), station_id)
    }

    count(trips, trips.root(), station_id)
}

/// Analyse how many trips follow the route of trip `trip_id`, using the default [`Config`]
///
/// Both ends of the trip are widened to every station within `radius` miles. The result
/// counts the trips that leave from a station near the origin and arrive at a station near
/// the destination.
pub fn route_analysis(
    stations: &BalancedIndex<StationId, Station>,
    trips: &BalancedIndex<TripId, Trip>,
    trip_id: TripId,
    radius: f64,
) -> Result<RouteAnalysis> {
    route_analysis_with(stations, trips, trip_id, radius, &Config::default())
}

/// [`route_analysis`] with an explicit configuration
pub fn route_analysis_with(
    stations: &BalancedIndex<StationId, Station>,
    trips: &BalancedIndex<TripId, Trip>,
    trip_id: TripId,
    radius: f64,
    config: &Config,
) -> Result<RouteAnalysis> {
    #[cfg(feature = "profiling")]
    profiling::scope!("routes::route_analysis");

    let trip = trips
        .search(&trip_id)
        .ok_or(DivvyError::NotFound {
            kind: RecordKind::Trip,
            id: trip_id,
        })?
        .value();
    let origin = lookup_station(stations, trip.from_station_id)?;
    let destination = lookup_station(stations, trip.to_station_id)?;

    let near_origin = find_nearby_with(
        stations,
        origin.latitude(),
        origin.longitude(),
        radius,
        config,
    );
    let near_destination = find_nearby_with(
        stations,
        destination.latitude(),
        destination.longitude(),
        radius,
        config,
    );

    let mut candidates = VecDeque::new();
    for nearby in &near_origin {
        collect_trips_from(trips, trips.root(), nearby.station_id, &mut candidates);
    }

    let trip_count: usize = near_destination
        .iter()
        .map(|nearby| {
            candidates
                .iter()
                .filter(|candidate| candidate.station_id == nearby.station_id)
                .count()
        })
        .sum();

    // The analysed trip itself is in the index, so the count is never zero
    let percentage = trip_count as f64 / trips.count() as f64 * 100.0;

    tracing::debug!(
        trip_id,
        radius,
        near_origin = near_origin.len(),
        near_destination = near_destination.len(),
        candidates = candidates.len(),
        trip_count,
        "route analysis"
    );

    Ok(RouteAnalysis {
        from_station: origin.id,
        to_station: destination.id,
        trip_count,
        percentage,
    })
}

fn lookup_station(
    stations: &BalancedIndex<StationId, Station>,
    station_id: StationId,
) -> Result<&Station> {
    stations
        .search(&station_id)
        .map(Node::value)
        .ok_or(DivvyError::NotFound {
            kind: RecordKind::Station,
            id: station_id,
        })
}
