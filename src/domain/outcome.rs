use std::any::type_name;
use std::error::Error as StdError;
use std::fmt;
use std::io;

use chrono::{DateTime, Local};

/// Result of running the watched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(Failure),
}

impl Outcome {
    pub fn failure(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure(Failure::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Mail subject for this outcome: `SUCCESS` or `FAILURE`.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure(_) => "FAILURE",
        }
    }
}

/// Classified error of a failed operation: its kind (type name) and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: String,
    message: String,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Classify `err` by the name of its type and its `Display` output.
    ///
    /// The kind is the last path segment of the type name with generic
    /// arguments dropped, so `my_app::ValueError` becomes `ValueError`.
    /// A [`std::io::Error`] is named after its [`ErrorKind`](std::io::ErrorKind)
    /// instead (`NotFound`, `TimedOut`, ...).
    pub fn from_error<E: StdError + 'static>(err: &E) -> Self {
        let dyn_err: &(dyn StdError + 'static) = err;
        if let Some(io_err) = dyn_err.downcast_ref::<io::Error>() {
            return Self::new(format!("{:?}", io_err.kind()), err.to_string());
        }
        Self::new(short_type_name::<E>(), err.to_string())
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// Local wall-clock time at which the watched operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedAt(DateTime<Local>);

impl CompletedAt {
    /// `strftime` layout used in message bodies: `HH:MM:SS on MM/DD/YYYY`.
    pub const FORMAT: &'static str = "%H:%M:%S on %m/%d/%Y";

    pub fn now() -> Self {
        Self(Local::now())
    }

    pub fn value(&self) -> DateTime<Local> {
        self.0
    }
}

impl From<DateTime<Local>> for CompletedAt {
    fn from(value: DateTime<Local>) -> Self {
        Self(value)
    }
}

impl fmt::Display for CompletedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}
