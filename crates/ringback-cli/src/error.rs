use anyhow::Error;
use ringback_config::ConfigError;
use ringback_core::CoreError;
use ringback_lookup::LookupError;
use ringback_store::{StoreError, StoreErrorKind};
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(match cli_err {
                CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
                CliError::NotFound(_) => EXIT_NOT_FOUND,
            });
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return ExitCode::from(store_exit_code(store_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(lookup_err) = cause.downcast_ref::<LookupError>() {
            return ExitCode::from(lookup_exit_code(lookup_err));
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::MissingSource => EXIT_NOT_FOUND,
        StoreErrorKind::MissingColumns | StoreErrorKind::Csv | StoreErrorKind::Core => {
            EXIT_INVALID_INPUT
        }
        StoreErrorKind::InvalidPosition | StoreErrorKind::Write | StoreErrorKind::Io => {
            EXIT_FAILURE
        }
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidField { .. }
        | ConfigError::MissingApiKey(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn lookup_exit_code(err: &LookupError) -> u8 {
    match err {
        LookupError::Unavailable(_) | LookupError::WebDriver { .. } => EXIT_FAILURE,
        LookupError::InvalidEndpoint(_) => EXIT_INVALID_INPUT,
        LookupError::Parse(_) => EXIT_FAILURE,
        #[cfg(feature = "remote")]
        LookupError::Http(_) => EXIT_FAILURE,
        #[cfg(feature = "remote")]
        LookupError::Url(_) => EXIT_INVALID_INPUT,
    }
}
