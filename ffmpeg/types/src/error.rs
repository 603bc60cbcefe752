/*!
    Error types for the vidfilter media crates.
*/

use std::fmt;

/**
    Error type for the vidfilter media crates.

    Native library failures are flattened into messages that name the
    operation that failed, since the native error codes do not survive
    the crate boundary in any useful form.
*/
#[derive(Debug)]
pub enum Error {
    /// I/O error (missing input file, unwritable output, etc.)
    Io(std::io::Error),
    /// Codec or container error reported by the native library
    Codec { message: String },
    /// Invalid data (malformed input, impossible dimensions)
    InvalidData { message: String },
    /// Unsupported format (valid, but outside the canonical set)
    UnsupportedFormat { message: String },
    /// End of stream (control flow, not a failure)
    Eof,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Codec { message } => write!(f, "codec error: {message}"),
            Self::InvalidData { message } => write!(f, "invalid data: {message}"),
            Self::UnsupportedFormat { message } => write!(f, "unsupported format: {message}"),
            Self::Eof => write!(f, "end of stream"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl Error {
    /**
        Create a codec error with the given message.
    */
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /**
        Create a codec error for a failed native operation.

        Renders as `"<operation>: <cause>"`.
    */
    pub fn native(operation: &str, cause: impl fmt::Display) -> Self {
        Self::Codec {
            message: format!("{operation}: {cause}"),
        }
    }

    /**
        Create an invalid data error with the given message.
    */
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /**
        Create an unsupported format error with the given message.
    */
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /**
        Returns true if this is an EOF error.
    */
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}

/**
    Result type alias for the vidfilter media crates.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn error_display() {
        let e = Error::codec("encoder rejected frame");
        assert_eq!(format!("{e}"), "codec error: encoder rejected frame");

        let e = Error::invalid_data("frame width is zero");
        assert_eq!(format!("{e}"), "invalid data: frame width is zero");

        let e = Error::unsupported_format("no planar equivalent for pal8");
        assert_eq!(
            format!("{e}"),
            "unsupported format: no planar equivalent for pal8"
        );

        assert_eq!(format!("{}", Error::Eof), "end of stream");
    }

    #[test]
    fn native_names_operation() {
        let e = Error::native("failed to write header", "Invalid argument");
        assert_eq!(
            format!("{e}"),
            "codec error: failed to write header: Invalid argument"
        );
    }

    #[test]
    fn io_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.source().is_some());
        assert!(Error::codec("x").source().is_none());
    }

    #[test]
    fn is_eof() {
        assert!(Error::Eof.is_eof());
        assert!(!Error::codec("x").is_eof());
    }
}
