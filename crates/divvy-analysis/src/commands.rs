//! Interactive command parsing

use divvy_index::{BikeId, StationId, TripId};
use std::str::{FromStr, SplitWhitespace};

/// One line typed at the prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Stats,
    Station(StationId),
    Trip(TripId),
    Bike(BikeId),
    Find {
        latitude: f64,
        longitude: f64,
        radius: f64,
    },
    Route {
        trip_id: TripId,
        radius: f64,
    },
    Exit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command {0:?}")]
    Unknown(String),

    #[error("missing <{0}>")]
    MissingArgument(&'static str),

    #[error("invalid <{name}> {value:?}")]
    InvalidArgument { name: &'static str, value: String },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let mut args = Args(words);

        // Trailing words are ignored, like the rest of a line after a command
        let command = match name {
            "stats" => Command::Stats,
            "station" => Command::Station(args.next("station id")?),
            "trip" => Command::Trip(args.next("trip id")?),
            "bike" => Command::Bike(args.next("bike id")?),
            "find" => Command::Find {
                latitude: args.next("latitude")?,
                longitude: args.next("longitude")?,
                radius: args.next("miles")?,
            },
            "route" => Command::Route {
                trip_id: args.next("trip id")?,
                radius: args.next("miles")?,
            },
            "exit" => Command::Exit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

struct Args<'a>(SplitWhitespace<'a>);

impl Args<'_> {
    fn next<T: FromStr>(&mut self, name: &'static str) -> Result<T, CommandError> {
        let raw = self.0.next().ok_or(CommandError::MissingArgument(name))?;
        raw.parse().map_err(|_| CommandError::InvalidArgument {
            name,
            value: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("stats".parse(), Ok(Command::Stats));
        assert_eq!("  exit  ".parse(), Ok(Command::Exit));
        assert_eq!("station 5".parse(), Ok(Command::Station(5)));
        assert_eq!("trip 4118".parse(), Ok(Command::Trip(4118)));
        assert_eq!("bike 480 extra words".parse(), Ok(Command::Bike(480)));
    }

    #[test]
    fn test_parse_query_commands() {
        assert_eq!(
            "find 41.88 -87.63 0.5".parse(),
            Ok(Command::Find {
                latitude: 41.88,
                longitude: -87.63,
                radius: 0.5
            })
        );
        assert_eq!(
            "route 4118 0.25".parse(),
            Ok(Command::Route {
                trip_id: 4118,
                radius: 0.25
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "stat".parse::<Command>(),
            Err(CommandError::Unknown("stat".to_string()))
        );
        assert_eq!(
            "station".parse::<Command>(),
            Err(CommandError::MissingArgument("station id"))
        );
        assert_eq!(
            "find 41.88 west 1".parse::<Command>(),
            Err(CommandError::InvalidArgument {
                name: "longitude",
                value: "west".to_string()
            })
        );
    }
}
