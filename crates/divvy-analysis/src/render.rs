//! Plain-text rendering of query results

use divvy_index::{Bike, NearbyStation, RouteAnalysis, StationInfo, StoreStats, Trip};
use std::io::{self, Write};

pub fn not_found(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "**not found")
}

pub fn unknown_command(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "**unknown cmd, try again...")
}

pub fn stats(out: &mut impl Write, stats: &StoreStats) -> io::Result<()> {
    writeln!(out, "** Trees:")?;
    for (label, index) in [
        ("Stations:", stats.stations),
        ("Trips:", stats.trips),
        ("Bikes:", stats.bikes),
    ] {
        writeln!(
            out,
            "   {label:<9} count = {}, height = {}",
            index.count, index.height
        )?;
    }
    Ok(())
}

pub fn station(out: &mut impl Write, info: &StationInfo<'_>) -> io::Result<()> {
    let station = info.station;
    writeln!(out, "**Station {}:", station.id)?;
    writeln!(out, "  Name: '{}'", station.name)?;
    writeln!(
        out,
        "  {:<11} ({:.6},{:.6})",
        "Location:",
        station.latitude(),
        station.longitude()
    )?;
    writeln!(out, "  {:<11} {}", "Capacity:", station.capacity)?;
    writeln!(out, "  {:<11} {}", "Trip count:", info.trip_count)
}

pub fn trip(out: &mut impl Write, trip: &Trip) -> io::Result<()> {
    let (minutes, seconds) = trip.duration_parts();
    writeln!(out, "**Trip {}:", trip.id)?;
    writeln!(out, "  {:<5} {}", "Bike:", trip.bike_id)?;
    writeln!(out, "  {:<5} {}", "From:", trip.from_station_id)?;
    writeln!(out, "  {:<5} {}", "To:", trip.to_station_id)?;
    writeln!(out, "  Duration: {minutes} min, {seconds} secs")
}

pub fn bike(out: &mut impl Write, bike: &Bike) -> io::Result<()> {
    writeln!(out, "**Bike {}:", bike.id)?;
    writeln!(out, "  Trip count: {}", bike.trip_count)
}

pub fn nearby(out: &mut impl Write, stations: &[NearbyStation]) -> io::Result<()> {
    for nearby in stations {
        writeln!(
            out,
            "Station {}: distance {:.6} miles",
            nearby.station_id, nearby.distance
        )?;
    }
    Ok(())
}

pub fn route(out: &mut impl Write, analysis: &RouteAnalysis) -> io::Result<()> {
    writeln!(
        out,
        "** Route: from station #{} to station #{}",
        analysis.from_station, analysis.to_station
    )?;
    writeln!(out, "** Trip count: {}", analysis.trip_count)?;
    writeln!(out, "** Percentage: {:.6}%", analysis.percentage)
}
