use std::fmt;

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    App(String, u16),
    Status(u16),
    Limited,
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::App(msg, code) => write!(f, "geo service error {}: {}", code, msg),
            Error::Status(code)   => write!(f, "geo service status {}", code),
            Error::Limited        => write!(f, "geo service rate limit reached"),
            Error::Other(msg)     => write!(f, "{}", msg),
        }
    }
}
