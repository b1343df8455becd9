use crate::domain::validation::ValidationError;
use crate::domain::value::{AppPassword, Carrier, EmailAddress, PhoneNumber};

/// Who to notify and how to authenticate with the relay.
///
/// The operation itself is not part of the request; it is passed as a
/// closure with its arguments already bound.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    carrier: Carrier,
    phone: PhoneNumber,
    sender: EmailAddress,
    password: AppPassword,
}

impl NotificationRequest {
    pub fn new(
        carrier: impl Into<String>,
        phone: impl Into<String>,
        sender: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            carrier: Carrier::new(carrier)?,
            phone: PhoneNumber::new(phone)?,
            sender: EmailAddress::new(sender)?,
            password: AppPassword::new(password)?,
        })
    }

    pub fn carrier(&self) -> &Carrier {
        &self.carrier
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn sender(&self) -> &EmailAddress {
        &self.sender
    }

    pub fn password(&self) -> &AppPassword {
        &self.password
    }
}
