mod commands;
mod render;
mod run;
mod settings;

use divvy_index::DivvyError;
use settings::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unable to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no file name given")]
    MissingFileName,

    #[error(transparent)]
    Index(#[from] DivvyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn init_logging(settings: &Settings) {
    let filter = match settings.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    init_logging(&settings);
    tracing::debug!(?settings, "starting");

    match run::run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            println!("**Error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AppError::Open {
            path: PathBuf::from("trips.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "unable to open 'trips.csv': missing");

        let err = AppError::from(DivvyError::DuplicateKey("7".to_string()));
        assert_eq!(err.to_string(), "Duplicate key: 7");
    }
}
