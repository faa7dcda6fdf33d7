/*!
    Error types for the ffmpeg crate ecosystem.
*/

use std::fmt;

use crate::abi::{AVERROR_EOF, EAGAIN, averror};

/**
    Error type for the ffmpeg crate ecosystem.
*/
#[derive(Debug)]
pub enum Error {
    /// I/O error (file not found, network error, etc.)
    Io(std::io::Error),
    /// Codec error (decode/encode failure)
    Codec { message: String },
    /// Invalid data (malformed input)
    InvalidData { message: String },
    /// Unsupported format (valid but not handled)
    UnsupportedFormat { message: String },
    /// Raw error code returned by a native call, passed through unchanged
    Native { code: i32 },
    /// End of stream (not really an error, but part of control flow)
    Eof,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Codec { message } => write!(f, "codec error: {message}"),
            Self::InvalidData { message } => write!(f, "invalid data: {message}"),
            Self::UnsupportedFormat { message } => write!(f, "unsupported format: {message}"),
            Self::Native { code } => write!(f, "native error {code}"),
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
        Wrap a negative return code from a native call.

        End of file is reported as [`Error::Eof`], every other code is kept
        as-is in [`Error::Native`].
    */
    pub fn from_native(code: i32) -> Self {
        if code == AVERROR_EOF {
            Self::Eof
        } else {
            Self::Native { code }
        }
    }

    /**
        Check a native return value, turning negative values into errors.

        Non-negative values are returned unchanged since many native calls
        use them to report sizes or counts.
    */
    pub fn check(ret: i32) -> Result<i32> {
        if ret < 0 {
            Err(Self::from_native(ret))
        } else {
            Ok(ret)
        }
    }

    /**
        Returns the native error code, if this error came from a native call.
    */
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Native { code } => Some(*code),
            Self::Eof => Some(AVERROR_EOF),
            _ => None,
        }
    }

    /**
        Returns true if this is an EOF error.
    */
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /**
        Returns true if the native call asked to be retried (`AVERROR(EAGAIN)`).
    */
    pub fn is_again(&self) -> bool {
        self.code() == Some(averror(EAGAIN))
    }
}

/**
    Result type alias for the ffmpeg crate ecosystem.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::EINVAL;
    use std::error::Error as StdError;

    #[test]
    fn error_display() {
        let e = Error::codec("decode failed");
        assert_eq!(format!("{e}"), "codec error: decode failed");

        let e = Error::invalid_data("corrupted header");
        assert_eq!(format!("{e}"), "invalid data: corrupted header");

        let e = Error::unsupported_format("unknown codec");
        assert_eq!(format!("{e}"), "unsupported format: unknown codec");

        let e = Error::Native { code: -22 };
        assert_eq!(format!("{e}"), "native error -22");

        let e = Error::Eof;
        assert_eq!(format!("{e}"), "end of stream");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(format!("{e}").contains("file not found"));
    }

    #[test]
    fn native_codes_pass_through() {
        let e = Error::from_native(averror(EINVAL));
        assert_eq!(e.code(), Some(-22));
        assert!(!e.is_eof());

        let e = Error::from_native(AVERROR_EOF);
        assert!(e.is_eof());
        assert_eq!(e.code(), Some(AVERROR_EOF));

        assert_eq!(Error::codec("x").code(), None);
    }

    #[test]
    fn check_keeps_non_negative_values() {
        assert_eq!(Error::check(0).ok(), Some(0));
        assert_eq!(Error::check(512).ok(), Some(512));
        assert!(Error::check(averror(EAGAIN)).unwrap_err().is_again());
    }

    #[test]
    fn error_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let e = Error::Io(io_err);
        assert!(StdError::source(&e).is_some());

        let e = Error::Eof;
        assert!(StdError::source(&e).is_none());
    }
}
