use std::fmt;

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Sender mailbox, also used as the SMTP login and as the first recipient.
///
/// Invariant: non-empty after trimming. The format is not checked here; the
/// mail encoder rejects addresses it cannot parse.
pub struct EmailAddress(String);

impl EmailAddress {
    /// Field name used in validation errors.
    pub const FIELD: &'static str = "email_address";

    /// Create a validated [`EmailAddress`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Eq)]
/// App-scoped mail account password.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
/// `Debug` output is redacted so the secret never reaches a log line.
pub struct AppPassword(String);

impl AppPassword {
    /// Field name used in validation errors.
    pub const FIELD: &'static str = "app_password";

    /// Create a validated [`AppPassword`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AppPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AppPassword(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Phone number used as the local part of the SMS-gateway address.
///
/// Expected to be ten digits, but only trimmed and checked for emptiness.
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Field name used in validation errors.
    pub const FIELD: &'static str = "phone";

    /// Create a [`PhoneNumber`] from its raw digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the raw digits.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Carrier name as written in the [`CarrierTable`](crate::domain::CarrierTable),
/// e.g. `AT&T` or `Verizon`.
///
/// Invariant: non-empty after trimming. Whether the carrier is known is decided
/// by the table at resolution time.
pub struct Carrier(String);

impl Carrier {
    /// Field name used in validation errors.
    pub const FIELD: &'static str = "carrier";

    /// Create a validated [`Carrier`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
