use lettre::Message;
use lettre::address::AddressError;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;

use crate::domain::Notification;

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("invalid {role} address {input:?}: {source}")]
    Address {
        role: &'static str,
        input: String,
        #[source]
        source: AddressError,
    },

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
}

/// Encode `notification` as a plain-text message.
///
/// The envelope is derived from the headers: `MAIL FROM` is the sender and
/// `RCPT TO` is every recipient, in order.
pub fn encode_message(notification: &Notification) -> Result<Message, EncodeError> {
    let from = parse_mailbox("from", notification.from().as_str())?;

    let mut builder = Message::builder()
        .from(from)
        .subject(notification.subject())
        .header(ContentType::TEXT_PLAIN);
    for recipient in notification.recipients() {
        builder = builder.to(parse_mailbox("to", recipient)?);
    }

    Ok(builder.body(notification.body().to_owned())?)
}

/// Check that the sender and the gateway address parse as mailboxes, without
/// building a message.
pub fn check_addresses(sender: &str, gateway_address: &str) -> Result<(), EncodeError> {
    parse_mailbox("from", sender)?;
    parse_mailbox("to", gateway_address)?;
    Ok(())
}

fn parse_mailbox(role: &'static str, input: &str) -> Result<Mailbox, EncodeError> {
    input.parse().map_err(|source| EncodeError::Address {
        role,
        input: input.to_owned(),
        source,
    })
}
