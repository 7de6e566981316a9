//! DivvyStore - Top-level owner of the station, trip and bike indexes
//!
//! This module provides the high-level API used by front ends: building the three indexes
//! from records, point lookups, statistics and the traversal queries.

use crate::distance::EARTH_RADIUS_MILES;
use crate::ingest::{self, LoadReport};
use crate::nearby::find_nearby_with;
use crate::routes::{route_analysis_with, trips_at_station};
use crate::{
    BalancedIndex, Bike, BikeId, DivvyError, IndexStats, NearbyStation, Record, RecordKind,
    Result, RouteAnalysis, Station, StationId, Trip, TripId,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for distance-based queries
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Radius of the sphere distances are measured on, in miles.
    /// Default: 3963.1
    pub earth_radius_miles: f64,
    /// Slack allowed when comparing distances, both for the radius cut-off and for
    /// ordering nearby results.
    /// Default: 1e-7
    pub distance_tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            earth_radius_miles: EARTH_RADIUS_MILES,
            distance_tolerance: 1e-7,
        }
    }
}

/// Count and height of each index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoreStats {
    pub stations: IndexStats,
    pub trips: IndexStats,
    pub bikes: IndexStats,
}

/// A station together with how busy it is
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo<'a> {
    pub station: &'a Station,
    /// Trips starting or ending at the station
    pub trip_count: usize,
}

/// Owner of the three record indexes
#[derive(Debug, Clone, Default)]
pub struct DivvyStore {
    stations: BalancedIndex<StationId, Station>,
    trips: BalancedIndex<TripId, Trip>,
    bikes: BalancedIndex<BikeId, Bike>,
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl DivvyStore {
    /// Create an empty store with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            stations: BalancedIndex::new(),
            trips: BalancedIndex::new(),
            bikes: BalancedIndex::new(),
            config,
        }
    }

    /// Add a station, rejecting an id that is already present
    pub fn add_station(&mut self, station: Station) -> Result<()> {
        self.stations.insert(station.id, station)
    }

    /// Add a trip and count it against its bike
    ///
    /// A trip id that is already present is rejected and the bike index is not touched.
    /// The first trip of a bike creates it with a count of one; later trips locate the
    /// existing bike and increment its count in place.
    pub fn add_trip(&mut self, trip: Trip) -> Result<()> {
        let bike_id = trip.bike_id;
        self.trips.insert(trip.id, trip)?;

        match self.bikes.insert(bike_id, Bike::first_trip(bike_id)) {
            Ok(()) => Ok(()),
            Err(DivvyError::DuplicateKey(_)) => {
                if let Some(node) = self.bikes.search_mut(&bike_id) {
                    node.value_mut().record_trip();
                }
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Load stations from a CSV file
    pub fn load_stations<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let data = std::fs::read(path.as_ref())?;
        let report = ingest::load_stations(self, &data);
        tracing::info!(
            path = %path.as_ref().display(),
            inserted = report.inserted,
            duplicates = report.duplicates,
            malformed = report.malformed,
            "loaded stations"
        );
        Ok(report)
    }

    /// Load trips (and through them, bikes) from a CSV file
    pub fn load_trips<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let data = std::fs::read(path.as_ref())?;
        let report = ingest::load_trips(self, &data);
        tracing::info!(
            path = %path.as_ref().display(),
            inserted = report.inserted,
            duplicates = report.duplicates,
            malformed = report.malformed,
            bikes = self.bikes.count(),
            "loaded trips"
        );
        Ok(report)
    }

    #[inline]
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.search(&id).map(|node| node.value())
    }

    #[inline]
    pub fn trip(&self, id: TripId) -> Option<&Trip> {
        self.trips.search(&id).map(|node| node.value())
    }

    #[inline]
    pub fn bike(&self, id: BikeId) -> Option<&Bike> {
        self.bikes.search(&id).map(|node| node.value())
    }

    /// The station index
    #[inline]
    pub fn stations(&self) -> &BalancedIndex<StationId, Station> {
        &self.stations
    }

    /// The trip index
    #[inline]
    pub fn trips(&self) -> &BalancedIndex<TripId, Trip> {
        &self.trips
    }

    /// The bike index
    #[inline]
    pub fn bikes(&self) -> &BalancedIndex<BikeId, Bike> {
        &self.bikes
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Count and height of every index
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            stations: self.stations.stats(),
            trips: self.trips.stats(),
            bikes: self.bikes.stats(),
        }
    }

    /// A station and the number of trips that start or end there
    pub fn station_info(&self, id: StationId) -> Result<StationInfo<'_>> {
        let station = self.station(id).ok_or(DivvyError::NotFound {
            kind: RecordKind::Station,
            id,
        })?;

        Ok(StationInfo {
            station,
            trip_count: trips_at_station(&self.trips, id),
        })
    }

    /// Stations within `radius` miles of a point, nearest first
    pub fn find_nearby(&self, latitude: f64, longitude: f64, radius: f64) -> Vec<NearbyStation> {
        find_nearby_with(&self.stations, latitude, longitude, radius, &self.config)
    }

    /// Usage of the route taken by trip `trip_id`
    pub fn route_analysis(&self, trip_id: TripId, radius: f64) -> Result<RouteAnalysis> {
        route_analysis_with(&self.stations, &self.trips, trip_id, radius, &self.config)
    }

    /// Consume the store, handing every record to `release`
    ///
    /// Each index is released in post-order; stations go first, then trips, then bikes.
    pub fn destroy<F: FnMut(Record)>(self, mut release: F) {
        self.stations
            .destroy(|_, station| release(Record::Station(station)));
        self.trips.destroy(|_, trip| release(Record::Trip(trip)));
        self.bikes.destroy(|_, bike| release(Record::Bike(bike)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::fixtures;

    fn sample_store() -> DivvyStore {
        let mut store = DivvyStore::new(Config::default());
        for station in [
            fixtures::station(1, 41.8800, -87.6300),
            fixtures::station(2, 41.8810, -87.6300),
            fixtures::station(3, 41.8950, -87.6300),
        ] {
            store.add_station(station).unwrap();
        }
        for (id, bike, from, to) in [(10, 500, 1, 3), (11, 501, 2, 3), (12, 500, 3, 1)] {
            store.add_trip(fixtures::trip(id, bike, from, to)).unwrap();
        }
        store
    }

    /// A fresh scratch directory under the system temp dir
    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("divvy-index-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_files() {
        let dir = scratch_dir("load-files");
        let stations = dir.join("stations.csv");
        let trips = dir.join("trips.csv");

        let mut station_rows = b"id,name,latitude,longitude,dpcapacity,online_date\r\n".to_vec();
        station_rows.extend_from_slice(b"1,Alpha,41.88,-87.63,15,6/10/2013\r\n");
        station_rows.extend_from_slice(b"2,B\xE9ta,41.89,-87.63,15,6/10/2013\r\n");
        station_rows.extend_from_slice(b"3,Gamma,41.90,-87.63,15,6/10/2013\r\n");
        std::fs::write(&stations, station_rows).unwrap();
        std::fs::write(
            &trips,
            "trip_id,starttime,stoptime,bikeid,tripduration,from_station_id,from_station_name,\
             to_station_id,to_station_name,usertype,gender,birthyear\n\
             10,6/27/2013 12:11,6/27/2013 12:16,480,316,1,Alpha,3,Gamma,Subscriber,Male,1985\n\
             11,6/27/2013 13:11,6/27/2013 13:16,480,300,3,Gamma,1,Alpha,Customer,,\n",
        )
        .unwrap();

        let mut store = DivvyStore::default();
        let station_report = store.load_stations(&stations).unwrap();
        let trip_report = store.load_trips(&trips).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(
            station_report,
            LoadReport {
                inserted: 2,
                duplicates: 0,
                malformed: 1
            }
        );
        assert_eq!(trip_report.inserted, 2);
        assert!(store.station(2).is_none());
        assert_eq!(store.bike(480).unwrap().trip_count, 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let missing = scratch_dir("missing-file").join("no-such-trips.csv");
        let mut store = DivvyStore::default();

        assert!(matches!(store.load_trips(&missing), Err(DivvyError::Io(_))));
        assert!(matches!(
            store.load_stations(&missing),
            Err(DivvyError::Io(_))
        ));
        assert_eq!(store.trips().count(), 0);
    }

    #[test]
    fn test_add_trip_counts_bikes() {
        let store = sample_store();

        assert_eq!(store.bike(500).unwrap().trip_count, 2);
        assert_eq!(store.bike(501).unwrap().trip_count, 1);
        assert!(store.bike(502).is_none());
        assert_eq!(store.bikes().count(), 2);
    }

    #[test]
    fn test_duplicate_trip_leaves_bike_alone() {
        let mut store = sample_store();

        let err = store.add_trip(fixtures::trip(10, 500, 2, 1)).unwrap_err();
        assert!(matches!(err, DivvyError::DuplicateKey(_)));
        assert_eq!(store.bike(500).unwrap().trip_count, 2);
        assert_eq!(store.trip(10).unwrap().from_station_id, 1);
        assert_eq!(store.trips().count(), 3);
    }

    #[test]
    fn test_duplicate_station_is_rejected() {
        let mut store = sample_store();
        let err = store
            .add_station(fixtures::station(2, 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, DivvyError::DuplicateKey(_)));
        assert_eq!(store.station(2).unwrap().latitude(), 41.8810);
    }

    #[test]
    fn test_stats() {
        let store = sample_store();
        let stats = store.stats();

        assert_eq!(stats.stations, IndexStats { count: 3, height: 1 });
        assert_eq!(stats.trips, IndexStats { count: 3, height: 1 });
        assert_eq!(stats.bikes, IndexStats { count: 2, height: 1 });

        let empty = DivvyStore::default();
        assert_eq!(empty.stats().stations, IndexStats { count: 0, height: -1 });
    }

    #[test]
    fn test_station_info() {
        let store = sample_store();

        let info = store.station_info(3).unwrap();
        assert_eq!(info.station.id, 3);
        assert_eq!(info.trip_count, 3);

        assert!(matches!(
            store.station_info(99),
            Err(DivvyError::NotFound {
                kind: RecordKind::Station,
                id: 99
            })
        ));
    }

    #[test]
    fn test_queries_use_store_config() {
        let store = sample_store();

        let nearby = store.find_nearby(41.8800, -87.6300, 0.1);
        let ids: Vec<_> = nearby.iter().map(|n| n.station_id).collect();
        assert_eq!(ids, vec![1, 2]);

        let analysis = store.route_analysis(10, 0.1).unwrap();
        assert_eq!(analysis.from_station, 1);
        assert_eq!(analysis.to_station, 3);
        assert_eq!(analysis.trip_count, 2);
    }

    #[test]
    fn test_destroy_hands_out_every_record() {
        let store = sample_store();

        let mut released = Vec::new();
        store.destroy(|record| released.push((record.kind(), record.id())));

        assert_eq!(released.len(), 8);
        let count = |kind| released.iter().filter(|(k, _)| *k == kind).count();
        assert_eq!(count(RecordKind::Station), 3);
        assert_eq!(count(RecordKind::Trip), 3);
        assert_eq!(count(RecordKind::Bike), 2);
        // Stations go first; their root, 2, is released after both children
        assert_eq!(released[2], (RecordKind::Station, 2));
    }
}
