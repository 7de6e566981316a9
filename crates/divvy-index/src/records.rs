//! Station, trip and bike records
//!
//! Records own their text fields, so dropping an index releases everything it holds.

use geo::Point;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub type StationId = i32;
pub type TripId = i32;
pub type BikeId = i32;

/// A docking station
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Station {
    pub id: StationId,
    pub name: String,
    /// Number of docks
    pub capacity: i32,
    /// WGS84 position, x = longitude, y = latitude
    pub location: Point<f64>,
    pub online_date: String,
}

impl Station {
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        capacity: i32,
        latitude: f64,
        longitude: f64,
        online_date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            location: Point::new(longitude, latitude),
            online_date: online_date.into(),
        }
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

/// Rider membership
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UserType {
    Subscriber,
    Customer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

/// A single ride from one station to another
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trip {
    pub id: TripId,
    pub start_time: String,
    pub stop_time: String,
    pub bike_id: BikeId,
    /// Length of the ride in seconds
    pub duration: i32,
    pub from_station_id: StationId,
    pub from_station_name: String,
    pub to_station_id: StationId,
    pub to_station_name: String,
    pub user_type: UserType,
    pub gender: Gender,
    /// `None` when the rider did not report it
    pub birth_year: Option<i32>,
}

impl Trip {
    /// Duration split into whole minutes and leftover seconds
    #[inline]
    pub fn duration_parts(&self) -> (i32, i32) {
        (self.duration / 60, self.duration % 60)
    }
}

/// Usage counter for one bike
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bike {
    pub id: BikeId,
    pub trip_count: u32,
}

impl Bike {
    /// A bike seen on its first trip
    pub fn first_trip(id: BikeId) -> Self {
        Self { id, trip_count: 1 }
    }

    #[inline]
    pub fn record_trip(&mut self) {
        self.trip_count = self.trip_count.saturating_add(1);
    }
}

/// Which of the three record families something refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecordKind {
    Station,
    Trip,
    Bike,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Station => "station",
            RecordKind::Trip => "trip",
            RecordKind::Bike => "bike",
        })
    }
}

/// Any record held by a [`DivvyStore`](crate::DivvyStore)
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Record {
    Station(Station),
    Trip(Trip),
    Bike(Bike),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Station(_) => RecordKind::Station,
            Record::Trip(_) => RecordKind::Trip,
            Record::Bike(_) => RecordKind::Bike,
        }
    }

    /// Identifier the record is indexed under
    pub fn id(&self) -> i32 {
        match self {
            Record::Station(s) => s.id,
            Record::Trip(t) => t.id,
            Record::Bike(b) => b.id,
        }
    }
}

impl From<Station> for Record {
    fn from(station: Station) -> Self {
        Record::Station(station)
    }
}

impl From<Trip> for Record {
    fn from(trip: Trip) -> Self {
        Record::Trip(trip)
    }
}

impl From<Bike> for Record {
    fn from(bike: Bike) -> Self {
        Record::Bike(bike)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_coordinates() {
        let station = Station::new(5, "State St & Harrison St", 19, 41.874, -87.627, "6/10/2013");
        assert_eq!(station.latitude(), 41.874);
        assert_eq!(station.longitude(), -87.627);
    }

    #[test]
    fn test_duration_parts() {
        let trip = fixtures::trip(1, 1, 1, 2);
        assert_eq!(trip.duration_parts(), (5, 16));

        let short = Trip {
            duration: 59,
            ..fixtures::trip(2, 1, 1, 2)
        };
        assert_eq!(short.duration_parts(), (0, 59));
    }

    #[test]
    fn test_bike_record_trip() {
        let mut bike = Bike::first_trip(480);
        bike.record_trip();
        bike.record_trip();
        assert_eq!(bike.trip_count, 3);

        let mut worn_out = Bike {
            id: 481,
            trip_count: u32::MAX,
        };
        worn_out.record_trip();
        assert_eq!(worn_out.trip_count, u32::MAX);
    }

    #[test]
    fn test_record_dispatch() {
        let records: Vec<Record> = vec![
            fixtures::station(3, 41.8, -87.6).into(),
            fixtures::trip(4, 9, 3, 3).into(),
            Bike::first_trip(9).into(),
        ];

        let kinds: Vec<_> = records.iter().map(|r| (r.kind(), r.id())).collect();
        assert_eq!(
            kinds,
            vec![
                (RecordKind::Station, 3),
                (RecordKind::Trip, 4),
                (RecordKind::Bike, 9)
            ]
        );
    }
}
