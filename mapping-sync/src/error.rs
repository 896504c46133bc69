use std::{fmt, process::ExitCode};

#[derive(Debug)]
pub enum SyncError {
    /// Configuration error. Should not retry.
    Configuration,
    /// The fetch step was called with an invalid argument.
    InvalidArgument,
    /// The gateway refused to serve the directory.
    Retrieval,
    /// Network error outside of the event queries.
    Transport,
    /// Filesystem error.
    Io,
    /// Fatal error. Should not retry.
    Fatal,
}

pub type Result<T> = error_stack::Result<T, SyncError>;

impl error_stack::Context for SyncError {}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Configuration => f.write_str("mapping sync error: configuration"),
            SyncError::InvalidArgument => f.write_str("mapping sync error: invalid argument"),
            SyncError::Retrieval => f.write_str("mapping sync error: retrieval"),
            SyncError::Transport => f.write_str("mapping sync error: transport"),
            SyncError::Io => f.write_str("mapping sync error: io"),
            SyncError::Fatal => f.write_str("mapping sync error: fatal"),
        }
    }
}

pub trait ReportExt {
    fn to_exit_code(&self) -> ExitCode;
}

impl<T> ReportExt for Result<T> {
    fn to_exit_code(&self) -> ExitCode {
        match self {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{:?}", err);
                ExitCode::FAILURE
            }
        }
    }
}
