use std::{fmt, io, num::ParseFloatError, str::Utf8Error};
use quick_xml::events::attributes::AttrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A non-blank line of line-format text has no `=`.
    MalformedInput,
    /// The document is not XML we can read, or has no `<node>`.
    MalformedXml,
    /// `lat` or `lon` is missing.
    MissingAttribute,
    /// A coordinate is not a number or out of range, or an edit was made in the wrong mode.
    Validation,
    /// An external collaborator failed or timed out.
    UpstreamUnavailable,
    Io,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedInput => "malformed input",
            ErrorKind::MalformedXml => "malformed XML",
            ErrorKind::MissingAttribute => "missing attribute",
            ErrorKind::Validation => "validation error",
            ErrorKind::UpstreamUnavailable => "upstream unavailable",
            ErrorKind::Io => "I/O error",
            ErrorKind::Config => "configuration error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
        }
    }

    pub fn malformed_input(line: usize, content: &str) -> Self {
        Error::new(
            ErrorKind::MalformedInput,
            format!("line {} has no '=' separator: {:?}", line, content),
        )
    }

    pub fn malformed_xml(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::MalformedXml, message)
    }

    pub fn missing_attribute(name: &str) -> Self {
        Error::new(ErrorKind::MissingAttribute, format!("missing '{}'", name))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Validation, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::UpstreamUnavailable, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::new(ErrorKind::Io, value.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        Error::malformed_xml(value.to_string())
    }
}

impl From<AttrError> for Error {
    fn from(value: AttrError) -> Self {
        Error::malformed_xml(value.to_string())
    }
}

impl From<Utf8Error> for Error {
    fn from(value: Utf8Error) -> Self {
        Error::malformed_xml(value.to_string())
    }
}

impl From<ParseFloatError> for Error {
    fn from(value: ParseFloatError) -> Self {
        Error::validation(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::new(ErrorKind::Config, value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
