use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("PCRaster is not available: {0}")]
    EngineUnavailable(String),
    #[error("{application} failed with exit code {code}: {stderr}")]
    EngineFailure {
        application: String,
        code: i32,
        stderr: String,
    },
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
    #[error("Invalid value for parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
    #[error("Runtime error: {0}")]
    Runtime(String),
    #[error("Invalid string: {0}")]
    InvalidString(#[from] std::ffi::NulError),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("GDAL error: {0}")]
    GdalError(#[from] gdal::errors::GdalError),
    #[error(transparent)]
    Infra(#[from] inf::Error),
}
