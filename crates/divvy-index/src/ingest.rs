//! CSV ingestion for the Divvy station and trip exports
//!
//! Rows are parsed in parallel and inserted sequentially in file order. A row that does not
//! parse (including one that is not valid UTF-8), or whose id is already indexed, is logged and
//! skipped; it never reaches an index.

use crate::{DivvyError, DivvyStore, Gender, Result, Station, Trip, UserType};
use rayon::prelude::*;
use std::str::{FromStr, Split};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Outcome of loading one file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadReport {
    /// Rows that became index entries
    pub inserted: usize,
    /// Rows whose id was already present
    pub duplicates: usize,
    /// Rows that could not be parsed
    pub malformed: usize,
}

/// Parse one `id,name,latitude,longitude,dpcapacity,online_date` row
pub fn parse_station(line: &str, line_number: usize) -> Result<Station> {
    let mut fields = Fields::new(line, line_number);

    let id = fields.parse("id")?;
    let name = fields.text("name")?;
    let latitude = fields.parse("latitude")?;
    let longitude = fields.parse("longitude")?;
    let capacity = fields.parse("dpcapacity")?;
    let online_date = fields.text("online_date")?;

    Ok(Station::new(id, name, capacity, latitude, longitude, online_date))
}

/// Parse one trip row
///
/// Columns: `trip_id,starttime,stoptime,bikeid,tripduration,from_station_id,
/// from_station_name,to_station_id,to_station_name,usertype,gender,birthyear`. The last two
/// may be empty or missing.
pub fn parse_trip(line: &str, line_number: usize) -> Result<Trip> {
    let mut fields = Fields::new(line, line_number);

    let id = fields.parse("trip_id")?;
    let start_time = fields.text("starttime")?;
    let stop_time = fields.text("stoptime")?;
    let bike_id = fields.parse("bikeid")?;
    let duration = fields.parse("tripduration")?;
    let from_station_id = fields.parse("from_station_id")?;
    let from_station_name = fields.text("from_station_name")?;
    let to_station_id = fields.parse("to_station_id")?;
    let to_station_name = fields.text("to_station_name")?;
    let user_type = match fields.text("usertype")? {
        "Subscriber" => UserType::Subscriber,
        _ => UserType::Customer,
    };
    let gender = match fields.optional() {
        Some("Male") => Gender::Male,
        Some("Female") => Gender::Female,
        _ => Gender::Unknown,
    };
    let birth_year = fields.optional().and_then(|raw| raw.parse().ok());

    Ok(Trip {
        id,
        start_time: start_time.to_string(),
        stop_time: stop_time.to_string(),
        bike_id,
        duration,
        from_station_id,
        from_station_name: from_station_name.to_string(),
        to_station_id,
        to_station_name: to_station_name.to_string(),
        user_type,
        gender,
        birth_year,
    })
}

/// Insert every station row of `data` (header line included) into `store`
pub fn load_stations(store: &mut DivvyStore, data: impl AsRef<[u8]>) -> LoadReport {
    #[cfg(feature = "profiling")]
    profiling::scope!("ingest::load_stations");

    let parsed: Vec<Result<Station>> = data_lines(data.as_ref())
        .into_par_iter()
        .map(|(line_number, line)| line.and_then(|line| parse_station(line, line_number)))
        .collect();

    insert_all(parsed, "station", |station| store.add_station(station))
}

/// Insert every trip row of `data` (header line included) into `store`, counting bikes
pub fn load_trips(store: &mut DivvyStore, data: impl AsRef<[u8]>) -> LoadReport {
    #[cfg(feature = "profiling")]
    profiling::scope!("ingest::load_trips");

    let parsed: Vec<Result<Trip>> = data_lines(data.as_ref())
        .into_par_iter()
        .map(|(line_number, line)| line.and_then(|line| parse_trip(line, line_number)))
        .collect();

    insert_all(parsed, "trip", |trip| store.add_trip(trip))
}

/// Non-blank lines after the header, with their 1-based line numbers
///
/// Each line is decoded on its own, so a stray non-UTF-8 byte only spoils its own row.
fn data_lines(data: &[u8]) -> Vec<(usize, Result<&str>)> {
    data.split(|&byte| byte == b'\n')
        .enumerate()
        .skip(1)
        .map(|(index, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = std::str::from_utf8(raw).map_err(|e| DivvyError::Parse {
                line: index + 1,
                reason: format!("invalid UTF-8: {e}"),
            });
            (index + 1, line)
        })
        .filter(|(_, line)| !matches!(line, Ok(text) if text.trim().is_empty()))
        .collect()
}

/// Sequential insert pass shared by both loaders
fn insert_all<T, F>(parsed: Vec<Result<T>>, what: &str, mut insert: F) -> LoadReport
where
    F: FnMut(T) -> Result<()>,
{
    let mut report = LoadReport::default();

    for row in parsed {
        let record = match row {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("Skipping malformed {what} row: {err}");
                report.malformed += 1;
                continue;
            }
        };

        match insert(record) {
            Ok(()) => report.inserted += 1,
            Err(DivvyError::DuplicateKey(key)) => {
                tracing::warn!("Skipping duplicate {what} {key}");
                report.duplicates += 1;
            }
            Err(err) => {
                tracing::warn!("Skipping {what} row: {err}");
                report.malformed += 1;
            }
        }
    }

    report
}

/// Cursor over the comma-separated fields of one row
struct Fields<'a> {
    parts: Split<'a, char>,
    line_number: usize,
}

impl<'a> Fields<'a> {
    fn new(line: &'a str, line_number: usize) -> Self {
        Self {
            parts: line.trim_end_matches(['\r', '\n']).split(','),
            line_number,
        }
    }

    /// Next field, which must be present and non-empty
    fn text(&mut self, name: &str) -> Result<&'a str> {
        match self.parts.next().map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(self.error(format!("missing {name}"))),
        }
    }

    /// Next field converted with `FromStr`
    fn parse<T: FromStr>(&mut self, name: &str) -> Result<T> {
        let raw = self.text(name)?;
        raw.parse()
            .map_err(|_| self.error(format!("invalid {name} {raw:?}")))
    }

    /// Next field if present and non-empty
    fn optional(&mut self) -> Option<&'a str> {
        self.parts
            .next()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn error(&self, reason: String) -> DivvyError {
        DivvyError::Parse {
            line: self.line_number,
            reason,
        }
    }
}
