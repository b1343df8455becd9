use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    UnknownCarrier { carrier: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::UnknownCarrier { carrier } => write!(f, "unknown carrier: {carrier}"),
        }
    }
}

impl std::error::Error for ValidationError {}
