//! Divvy Index - Core Data Structures for Bike-Share Route Analysis
//!
//! This library keeps the stations, trips and bikes of a bike-share system in three
//! height-balanced (AVL) binary search trees keyed by their integer identifiers, and answers
//! a few analytical questions by walking those trees: which stations lie within a radius of a
//! point, and how many trips run between the neighbourhoods of a given trip's endpoints.
//!
//! # Architecture
//!
//! - **[`BalancedIndex`]**: Arena-backed AVL tree with O(log n) insert and lookup
//! - **[`Station`], [`Trip`], [`Bike`]**: Immutable records (the bike trip count aside)
//! - **[`find_nearby`] / [`route_analysis`]**: Full-tree traversal queries
//! - **[`DivvyStore`]**: High-level owner of the three indexes and their configuration
//! - **[`ingest`]**: Parallel CSV parsing feeding the store
//!
//! # Performance Characteristics
//!
//! - **Insert / Search**: O(log n), at most one single or double rotation per insert
//! - **Nearby query**: O(n) tree walk plus O(k²) ordered placement for k hits
//! - **Route analysis**: one trip-tree walk per station near the trip's origin

mod avl;
pub mod distance;
pub mod ingest;
mod nearby;
mod records;
mod routes;
mod store;

// Public API exports
pub use avl::{BalancedIndex, IndexStats, Node, compare_keys};
pub use distance::{EARTH_RADIUS_MILES, distance, distance_between};
pub use ingest::LoadReport;
pub use nearby::{NearbyStation, find_nearby, find_nearby_with};
pub use records::{
    Bike, BikeId, Gender, Record, RecordKind, Station, StationId, Trip, TripId, UserType,
};
pub use routes::{
    RouteAnalysis, RouteMatch, match_trips_from, route_analysis, route_analysis_with,
    trips_at_station,
};
pub use store::{Config, DivvyStore, StationInfo, StoreStats};

/// Error types for the index and its queries
#[derive(Debug, thiserror::Error)]
pub enum DivvyError {
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: i32 },

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DivvyError>;
