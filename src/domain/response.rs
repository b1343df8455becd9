use crate::domain::outcome::Outcome;

/// Confirmation that the relay accepted a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Outcome of the watched operation that was reported.
    pub outcome: Outcome,
    pub subject: String,
    pub recipients: Vec<String>,
}
