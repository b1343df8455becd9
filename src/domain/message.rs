use crate::domain::outcome::{CompletedAt, Outcome};
use crate::domain::value::EmailAddress;

pub const SUCCESS_PHRASE: &str = "Process completed successfully";
pub const FAILURE_PHRASE: &str = "Process failed";

/// A composed status message, ready for submission.
///
/// Invariant: `recipients` is `[sender, gateway]`, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    from: EmailAddress,
    recipients: Vec<String>,
    subject: &'static str,
    body: String,
}

impl Notification {
    /// Compose the message for `outcome`, sent from `sender` to itself and to
    /// the SMS-gateway address.
    pub fn compose(
        sender: &EmailAddress,
        gateway_address: String,
        outcome: &Outcome,
        completed_at: CompletedAt,
    ) -> Self {
        let body = match outcome {
            Outcome::Success => format!("{SUCCESS_PHRASE} @ {completed_at}"),
            Outcome::Failure(failure) => {
                format!("{FAILURE_PHRASE} @ {completed_at}\n{failure}")
            }
        };

        Self {
            from: sender.clone(),
            recipients: vec![sender.as_str().to_owned(), gateway_address],
            subject: outcome.subject(),
            body,
        }
    }

    pub fn from(&self) -> &EmailAddress {
        &self.from
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn subject(&self) -> &str {
        self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
