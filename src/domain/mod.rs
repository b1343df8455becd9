//! Domain layer: strong types with validation and invariants (no I/O).

mod carrier;
mod message;
mod outcome;
mod request;
mod response;
mod validation;
mod value;

pub use carrier::{BUILTIN_CARRIERS, CarrierTable};
pub use message::{FAILURE_PHRASE, Notification, SUCCESS_PHRASE};
pub use outcome::{CompletedAt, Failure, Outcome};
pub use request::NotificationRequest;
pub use response::Delivery;
pub use validation::ValidationError;
pub use value::{AppPassword, Carrier, EmailAddress, PhoneNumber};
