//! Module for errors.
use std::{error::Error, fmt::Display};

/// Error from the library interface.
#[derive(Debug)]
pub enum RaobErr {
    // Inherited errors from std
    /// Error forwarded from std
    IO(::std::io::Error),

    // Other forwarded errors
    /// Error reading or writing CSV
    Csv(::csv::Error),
    /// Error forwarded from reqwest
    Http(::reqwest::Error),
    /// Error from polars while building or writing a parquet table
    Parquet(::polars::error::PolarsError),
    /// Error from the netcdf library
    NetCdf(::netcdf::Error),
    /// Error parsing a RON configuration file
    Config(::ron::error::SpannedError),
    /// Database error
    Database(::rusqlite::Error),
    /// Error parsing a date or time
    Time(::chrono::ParseError),
    /// Error forwarded from the strum crate
    StrumError(strum::ParseError),

    // My own errors from this crate
    /// The archive had no sounding for the request.
    NoData,
    /// The archive server refused the request because it was too busy.
    ServerBusy,
    /// The page did not have the expected layout.
    Parse(String),
    /// Invalid station number.
    InvalidStation(String),
    /// Invalid date string.
    InvalidDate(String),
    /// Invalid grid or model configuration.
    InvalidConfig(String),
    /// Not enough data to complete the task.
    NotEnoughData,
}

impl Display for RaobErr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        use crate::errors::RaobErr::*;

        match self {
            IO(err) => write!(f, "std lib io error: {}", err),

            Csv(err) => write!(f, "csv error: {}", err),
            Http(err) => write!(f, "http error: {}", err),
            Parquet(err) => write!(f, "parquet error: {}", err),
            NetCdf(err) => write!(f, "netcdf error: {}", err),
            Config(err) => write!(f, "configuration file error: {}", err),
            Database(err) => write!(f, "database error: {}", err),
            Time(err) => write!(f, "time parse error: {}", err),
            StrumError(err) => write!(f, "error forwarded from strum crate: {}", err),

            NoData => write!(f, "no sounding available"),
            ServerBusy => write!(f, "archive server too busy"),
            Parse(msg) => write!(f, "unexpected page layout: {}", msg),
            InvalidStation(stn) => write!(f, "invalid station number: {}", stn),
            InvalidDate(dt) => write!(f, "could not parse date: {}", dt),
            InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            NotEnoughData => write!(f, "not enough data to complete task"),
        }
    }
}

impl Error for RaobErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use crate::errors::RaobErr::*;

        match self {
            IO(err) => Some(err),
            Csv(err) => Some(err),
            Http(err) => Some(err),
            Parquet(err) => Some(err),
            NetCdf(err) => Some(err),
            Config(err) => Some(err),
            Database(err) => Some(err),
            Time(err) => Some(err),
            StrumError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<::std::io::Error> for RaobErr {
    fn from(err: ::std::io::Error) -> RaobErr {
        RaobErr::IO(err)
    }
}

impl From<::csv::Error> for RaobErr {
    fn from(err: ::csv::Error) -> RaobErr {
        RaobErr::Csv(err)
    }
}

impl From<::reqwest::Error> for RaobErr {
    fn from(err: ::reqwest::Error) -> RaobErr {
        RaobErr::Http(err)
    }
}

impl From<::polars::error::PolarsError> for RaobErr {
    fn from(err: ::polars::error::PolarsError) -> RaobErr {
        RaobErr::Parquet(err)
    }
}

impl From<::netcdf::Error> for RaobErr {
    fn from(err: ::netcdf::Error) -> RaobErr {
        RaobErr::NetCdf(err)
    }
}

impl From<::ron::error::SpannedError> for RaobErr {
    fn from(err: ::ron::error::SpannedError) -> RaobErr {
        RaobErr::Config(err)
    }
}

impl From<::rusqlite::Error> for RaobErr {
    fn from(err: ::rusqlite::Error) -> RaobErr {
        RaobErr::Database(err)
    }
}

impl From<::chrono::ParseError> for RaobErr {
    fn from(err: ::chrono::ParseError) -> RaobErr {
        RaobErr::Time(err)
    }
}

impl From<strum::ParseError> for RaobErr {
    fn from(err: strum::ParseError) -> RaobErr {
        RaobErr::StrumError(err)
    }
}
