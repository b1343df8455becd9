//! Transport layer: RFC 5322 message encoding for the SMTP relay.

mod mail;

pub use mail::{check_addresses, encode_message};
