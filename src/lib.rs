//! Text yourself when a long-running operation finishes.
//!
//! The operation runs on the calling thread. When it returns, a `SUCCESS` or
//! `FAILURE` message with a timestamp (and the error, if any) is mailed to the
//! sender's own address and to the carrier SMS gateway for a phone number,
//! through an authenticated STARTTLS relay (`smtp.gmail.com:587` by default).
//!
//! ```rust,no_run
//! use textme::{NotificationRequest, text_me_when_done};
//!
//! fn train(epochs: u32) -> Result<(), std::io::Error> {
//!     for _ in 0..epochs {
//!         std::thread::sleep(std::time::Duration::from_secs(1));
//!     }
//!     Ok(())
//! }
//!
//! fn main() -> Result<(), textme::NotifyError> {
//!     let request = NotificationRequest::new("AT&T", "4155551234", "me@gmail.com", "app password")?;
//!     let _delivery = text_me_when_done(request, || train(10))?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod invoker;
mod transport;

pub use client::{Notifier, NotifierBuilder, NotifyError, Prepared, SmtpRelay, text_me_when_done};
pub use domain::{
    AppPassword, Carrier, CarrierTable, CompletedAt, Delivery, EmailAddress, Failure,
    Notification, NotificationRequest, Outcome, PhoneNumber, ValidationError,
};
pub use invoker::{invoke, invoke_with};
