use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
/// Divvy Route Analysis - query Divvy stations, trips and bikes from the command line
pub struct Settings {
    /// Stations CSV file (asked for on stdin when omitted)
    #[clap(short, long, value_name = "FILE")]
    pub stations: Option<PathBuf>,

    /// Trips CSV file (asked for on stdin when omitted)
    #[clap(short, long, value_name = "FILE")]
    pub trips: Option<PathBuf>,

    /// Log filter such as "info" or "divvy_index=debug" (overrides RUST_LOG)
    #[clap(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl Settings {
    /// Parse the process arguments, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }
}
