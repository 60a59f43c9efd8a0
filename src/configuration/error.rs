use std::{fmt, io};

use tracing::debug;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    ConfigurationFileFormat(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {err}"),
            Error::ConfigurationFileFormat(error) => {
                write!(f, "Configuration file format error: {error}")
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        debug!("TOML error: {error}");
        Error::ConfigurationFileFormat(error.to_string())
    }
}
