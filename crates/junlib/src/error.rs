//! Error types for junlib

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Position in XML source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// Span for errors that do not come from source text
    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.line == 0 && self.end.line == 0
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A child or attribute name equals the reserved text key
    ReservedKeyCollision { key: String },
    /// A value shape the structured -> element direction does not cover
    MalformedInput,
    /// Two fields of one element would share a key
    DuplicateKey { key: String },
    InvalidToken,
    Expected { expected: String, found: String },
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
    /// JSON text could not be read or written
    Json,
    /// File could not be read or written
    Io { path: String },
    /// Positional insert relative to a key the object does not hold
    KeyNotFound { key: String },
    IndexOutOfBounds { index: usize, len: usize },
    /// Element at `path` does not match the schema
    SchemaViolation { path: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedKeyCollision { key } => {
                write!(f, "name collides with reserved text key: {key}")
            }
            Self::MalformedInput => write!(f, "malformed input"),
            Self::DuplicateKey { key } => write!(f, "duplicate key: {key}"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::MaxDepthExceeded { max } => {
                write!(f, "max depth exceeded: {max}")
            }
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
            Self::Json => write!(f, "invalid json"),
            Self::Io { path } => write!(f, "io error: {path}"),
            Self::KeyNotFound { key } => write!(f, "key not found: {key}"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::SchemaViolation { path } => write!(f, "schema violation at {path}"),
        }
    }
}

/// Main error type for junlib
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, offset: usize, line: u32, col: u32) -> Self {
        let pos = Pos::new(offset, line, col);
        Self::new(kind, Span::new(pos, pos))
    }

    /// Error raised while converting a tree, with no source position
    pub fn conversion(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::MalformedInput, Span::empty(), message)
    }

    pub(crate) fn io(path: &Path, source: &std::io::Error) -> Self {
        let path = path.display().to_string();
        let message = format!("{path}: {source}");
        Self::with_message(ErrorKind::Io { path }, Span::empty(), message)
    }

    pub(crate) fn json(source: &serde_json::Error) -> Self {
        let pos = Pos::new(0, saturating_u32(source.line()), saturating_u32(source.column()));
        Self::with_message(ErrorKind::Json, Span::new(pos, pos), source.to_string())
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            write!(f, "error: {}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for junlib
pub type Result<T> = std::result::Result<T, Error>;
