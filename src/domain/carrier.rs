use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Deserialize;
use serde::de::Error as DeError;

use crate::domain::validation::ValidationError;
use crate::domain::value::{Carrier, PhoneNumber};

/// Carriers known out of the box, as `(carrier, gateway domain)`.
pub const BUILTIN_CARRIERS: [(&str, &str); 4] = [
    ("AT&T", "txt.att.net"),
    ("T-Mobile", "tmomail.net"),
    ("Verizon", "vtext.com"),
    ("Virgin", "vmobl.com"),
];

static BUILTIN: LazyLock<CarrierTable> = LazyLock::new(CarrierTable::builtin);

/// Mapping from carrier name to its SMS-gateway domain.
///
/// The table is immutable once built. Extra carriers are supplied by building a
/// new table ([`CarrierTable::with_carrier`], [`Extend`], or deserializing a map
/// of entries, which are merged over [`BUILTIN_CARRIERS`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierTable {
    domains: BTreeMap<String, String>,
}

impl CarrierTable {
    /// Table with exactly the [`BUILTIN_CARRIERS`].
    pub fn builtin() -> Self {
        Self {
            domains: BUILTIN_CARRIERS
                .iter()
                .map(|(name, domain)| ((*name).to_owned(), (*domain).to_owned()))
                .collect(),
        }
    }

    /// Process-wide builtin table, initialized on first use.
    pub fn shared() -> &'static CarrierTable {
        &BUILTIN
    }

    /// Table with no carriers at all.
    pub fn empty() -> Self {
        Self {
            domains: BTreeMap::new(),
        }
    }

    /// Add or replace a carrier. A leading `@` on the domain is ignored.
    pub fn with_carrier(mut self, carrier: impl Into<String>, domain: impl Into<String>) -> Self {
        self.insert(carrier.into(), domain.into());
        self
    }

    fn insert(&mut self, carrier: String, domain: String) {
        let domain = domain.trim().trim_start_matches('@').to_owned();
        self.domains.insert(carrier.trim().to_owned(), domain);
    }

    /// Gateway domain for `carrier`.
    pub fn domain(&self, carrier: &Carrier) -> Result<&str, ValidationError> {
        self.domains
            .get(carrier.as_str())
            .map(String::as_str)
            .ok_or_else(|| ValidationError::UnknownCarrier {
                carrier: carrier.as_str().to_owned(),
            })
    }

    /// SMS-gateway address `<phone>@<domain>` for a phone on `carrier`.
    pub fn gateway_address(
        &self,
        carrier: &Carrier,
        phone: &PhoneNumber,
    ) -> Result<String, ValidationError> {
        let domain = self.domain(carrier)?;
        Ok(format!("{}@{domain}", phone.raw()))
    }

    pub fn contains(&self, carrier: &str) -> bool {
        self.domains.contains_key(carrier)
    }

    /// Carrier names in sorted order.
    pub fn carriers(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }
}

impl Default for CarrierTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Extend<(String, String)> for CarrierTable {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        for (carrier, domain) in iter {
            self.insert(carrier, domain);
        }
    }
}

impl<'de> Deserialize<'de> for CarrierTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let extra = BTreeMap::<String, String>::deserialize(deserializer)?;
        if let Some((carrier, _)) = extra
            .iter()
            .find(|(carrier, domain)| carrier.trim().is_empty() || domain.trim().is_empty())
        {
            return Err(D::Error::custom(format!(
                "carrier entry {carrier:?} must have a non-empty name and domain"
            )));
        }

        let mut table = Self::builtin();
        table.extend(extra);
        Ok(table)
    }
}
