// typed-statsd - Typed metric identifiers for Statsd
//
// Copyright 2026 The typed-statsd Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;
use std::io;

/// Potential categories an error from this library falls into.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ErrorKind {
    /// The sink address could not be resolved or the backend could not
    /// be constructed.
    BackendInit,
    /// A metric identifier carried a kind that does not match its value.
    InvalidIdentifier,
    InvalidInput,
    IoError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorKind::BackendInit => "backend initialization error".fmt(f),
            ErrorKind::InvalidIdentifier => "invalid metric identifier".fmt(f),
            ErrorKind::InvalidInput => "invalid input".fmt(f),
            ErrorKind::IoError => "I/O error".fmt(f),
        }
    }
}

/// Error generated by this library, potentially wrapping another
/// type of error (exposed via the `Error` trait).
#[derive(Debug)]
pub struct MetricError {
    repr: ErrorRepr,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    IoError(ErrorKind, io::Error),
}

impl MetricError {
    /// Return the kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::IoError(kind, _) => kind,
            ErrorRepr::WithDescription(kind, _) => kind,
        }
    }

    /// Re-categorize this error, keeping its description or I/O cause.
    pub(crate) fn with_kind(self, kind: ErrorKind) -> MetricError {
        let repr = match self.repr {
            ErrorRepr::IoError(_, err) => ErrorRepr::IoError(kind, err),
            ErrorRepr::WithDescription(_, desc) => ErrorRepr::WithDescription(kind, desc),
        };

        MetricError { repr }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::IoError(ErrorKind::IoError, ref err) => err.fmt(f),
            ErrorRepr::IoError(kind, ref err) => write!(f, "{}: {}", kind, err),
            ErrorRepr::WithDescription(_, desc) => desc.fmt(f),
        }
    }
}

impl error::Error for MetricError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(_, ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricError {
    fn from(err: io::Error) -> MetricError {
        MetricError {
            repr: ErrorRepr::IoError(ErrorKind::IoError, err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for MetricError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;

#[cfg(test)]
mod tests {
    use super::{ErrorKind, MetricError};
    use std::error::Error;
    use std::io;

    #[test]
    fn test_metric_error_from_io_error() {
        let err = MetricError::from(io::Error::new(io::ErrorKind::Other, "socket closed"));

        assert_eq!(ErrorKind::IoError, err.kind());
        assert_eq!("socket closed", err.to_string());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_metric_error_with_description() {
        let err = MetricError::from((ErrorKind::InvalidIdentifier, "invalid metric identifier"));

        assert_eq!(ErrorKind::InvalidIdentifier, err.kind());
        assert_eq!("invalid metric identifier", err.to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_metric_error_with_kind_keeps_cause() {
        let err = MetricError::from(io::Error::new(io::ErrorKind::InvalidInput, "invalid socket address"))
            .with_kind(ErrorKind::BackendInit);

        assert_eq!(ErrorKind::BackendInit, err.kind());
        assert_eq!(
            "backend initialization error: invalid socket address",
            err.to_string()
        );
        assert!(err.source().is_some());
    }
}
