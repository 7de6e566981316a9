//! Session driver: load the data, answer commands, then release everything

use crate::AppError;
use crate::commands::Command;
use crate::render;
use crate::settings::Settings;
use divvy_index::{Config, DivvyError, DivvyStore};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Run a full session on the process stdin/stdout
pub fn run(settings: &Settings) -> Result<(), AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let released = session(settings, &mut stdin.lock(), &mut stdout.lock())?;
    tracing::debug!(released, "released records");
    Ok(())
}

/// Run a full session, returning how many records were released at the end
pub fn session<R: BufRead, W: Write>(
    settings: &Settings,
    input: &mut R,
    out: &mut W,
) -> Result<usize, AppError> {
    writeln!(out, "** Welcome to Divvy Route Analysis **")?;
    out.flush()?;

    // Both names are resolved before anything is loaded
    let stations_path = resolve_path(settings.stations.as_deref(), input)?;
    let trips_path = resolve_path(settings.trips.as_deref(), input)?;

    let mut store = DivvyStore::new(Config::default());
    store
        .load_stations(&stations_path)
        .map_err(|source| open_error(&stations_path, source))?;
    store
        .load_trips(&trips_path)
        .map_err(|source| open_error(&trips_path, source))?;

    interact(&store, input, out)?;

    writeln!(out, "** Freeing memory **")?;
    let mut released = 0usize;
    store.destroy(|_| released += 1);
    writeln!(out, "** Done **")?;
    Ok(released)
}

/// Use the flag when given, otherwise read one line from `input` as the file name
///
/// The file must be openable either way.
pub fn resolve_path<R: BufRead>(flag: Option<&Path>, input: &mut R) -> Result<PathBuf, AppError> {
    let path = match flag {
        Some(path) => path.to_path_buf(),
        None => {
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(AppError::MissingFileName);
            }
            let name = line.trim_end_matches(['\r', '\n']);
            if name.is_empty() {
                return Err(AppError::MissingFileName);
            }
            PathBuf::from(name)
        }
    };

    File::open(&path).map_err(|source| AppError::Open {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn open_error(path: &Path, error: DivvyError) -> AppError {
    match error {
        DivvyError::Io(source) => AppError::Open {
            path: path.to_path_buf(),
            source,
        },
        other => AppError::Index(other),
    }
}

/// Answer commands until `exit` or end of input
pub fn interact<R: BufRead, W: Write>(
    store: &DivvyStore,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "** Ready **")?;
    out.flush()?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            tracing::debug!("end of input");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Exit) => break,
            Ok(command) => execute(store, command, out)?,
            Err(e) => {
                tracing::warn!(line = line.trim(), "{e}");
                render::unknown_command(out)?;
            }
        }
        out.flush()?;
    }

    Ok(())
}

fn execute<W: Write>(store: &DivvyStore, command: Command, out: &mut W) -> io::Result<()> {
    #[cfg(feature = "profiling")]
    profiling::scope!("run::execute");
    tracing::debug!(?command, "executing");

    match command {
        Command::Stats => render::stats(out, &store.stats()),
        Command::Station(id) => match store.station_info(id) {
            Ok(info) => render::station(out, &info),
            Err(_) => render::not_found(out),
        },
        Command::Trip(id) => match store.trip(id) {
            Some(trip) => render::trip(out, trip),
            None => render::not_found(out),
        },
        Command::Bike(id) => match store.bike(id) {
            Some(bike) => render::bike(out, bike),
            None => render::not_found(out),
        },
        Command::Find {
            latitude,
            longitude,
            radius,
        } => render::nearby(out, &store.find_nearby(latitude, longitude, radius)),
        Command::Route { trip_id, radius } => match store.route_analysis(trip_id, radius) {
            Ok(analysis) => render::route(out, &analysis),
            Err(e) => {
                tracing::debug!("{e}");
                render::not_found(out)
            }
        },
        Command::Exit => Ok(()),
    }
}
