//! Fixed-radius station search
//!
//! The station index is keyed by id, not position, so every node is visited.

use crate::distance::distance_with_radius;
use crate::{BalancedIndex, Config, Node, Station, StationId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A station found within the search radius
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NearbyStation {
    pub station_id: StationId,
    /// Distance from the query point in miles
    pub distance: f64,
}

/// Stations within `radius` miles of (`latitude`, `longitude`), nearest first
///
/// Uses the default [`Config`]. Stations at the same distance (within tolerance) keep the
/// order in which the traversal reached them.
pub fn find_nearby(
    stations: &BalancedIndex<StationId, Station>,
    latitude: f64,
    longitude: f64,
    radius: f64,
) -> Vec<NearbyStation> {
    find_nearby_with(stations, latitude, longitude, radius, &Config::default())
}

/// [`find_nearby`] with an explicit configuration
pub fn find_nearby_with(
    stations: &BalancedIndex<StationId, Station>,
    latitude: f64,
    longitude: f64,
    radius: f64,
    config: &Config,
) -> Vec<NearbyStation> {
    #[cfg(feature = "profiling")]
    profiling::scope!("nearby::find_nearby");

    let mut results = Vec::new();
    let query = NearbyQuery {
        stations,
        latitude,
        longitude,
        radius,
        config,
    };
    query.collect(stations.root(), &mut results);

    tracing::debug!(
        latitude,
        longitude,
        radius,
        found = results.len(),
        "nearby station search"
    );
    results
}

struct NearbyQuery<'a> {
    stations: &'a BalancedIndex<StationId, Station>,
    latitude: f64,
    longitude: f64,
    radius: f64,
    config: &'a Config,
}

impl NearbyQuery<'_> {
    /// Pre-order walk: the node itself, then its left and right subtrees
    fn collect(&self, node: Option<&Node<StationId, Station>>, results: &mut Vec<NearbyStation>) {
        let Some(node) = node else {
            return;
        };

        let station = node.value();
        let miles = distance_with_radius(
            station.latitude(),
            station.longitude(),
            self.latitude,
            self.longitude,
            self.config.earth_radius_miles,
        );
        if miles - self.radius < self.config.distance_tolerance {
            insert_by_distance(
                results,
                NearbyStation {
                    station_id: station.id,
                    distance: miles,
                },
                self.config.distance_tolerance,
            );
        }

        self.collect(self.stations.left(node), results);
        self.collect(self.stations.right(node), results);
    }
}

/// Place `entry` before the first result that is farther away by at least `tolerance`
fn insert_by_distance(results: &mut Vec<NearbyStation>, entry: NearbyStation, tolerance: f64) {
    let position = results
        .iter()
        .position(|existing| existing.distance - entry.distance >= tolerance)
        .unwrap_or(results.len());
    results.insert(position, entry);
}
