//! Fixed set of currencies the router can route.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::DomainError;

/// Immutable currency descriptor.
///
/// Identity is the ISO-4217 code alone; `decimal_digits` is metadata
/// describing how many minor-unit digits follow the decimal point.
/// Values can only be obtained from the constants below or through
/// [`Currency::from_code`].
#[derive(Debug, Clone, Copy)]
pub struct Currency {
    code: &'static str,
    decimal_digits: u32,
}

impl Currency {
    pub const AED: Currency = Currency::define("AED", 2);
    pub const USD: Currency = Currency::define("USD", 2);
    pub const EUR: Currency = Currency::define("EUR", 2);
    pub const JPY: Currency = Currency::define("JPY", 0);
    pub const BHD: Currency = Currency::define("BHD", 3);

    /// Every currency known to the process.
    pub const ALL: [Currency; 5] = [
        Currency::AED,
        Currency::USD,
        Currency::EUR,
        Currency::JPY,
        Currency::BHD,
    ];

    const fn define(code: &'static str, decimal_digits: u32) -> Self {
        Self {
            code,
            decimal_digits,
        }
    }

    /// Looks up a currency by its (case-sensitive) code.
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|c| c.code == code)
            .ok_or_else(|| DomainError::UnknownCurrency(code.to_string()))
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn decimal_digits(&self) -> u32 {
        self.decimal_digits
    }

    /// Same currency, compared by code only.
    pub fn is(&self, other: &Currency) -> bool {
        self.code == other.code
    }

    /// Number of minor units in one major unit, e.g. 100 cents per USD.
    pub fn minor_units_per_major(&self) -> u64 {
        10u64.pow(self.decimal_digits)
    }

    /// Largest valid fractional part, e.g. 99 for USD.
    pub fn max_fractional(&self) -> u64 {
        self.minor_units_per_major() - 1
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl std::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Currency::from_code(&code).map_err(serde::de::Error::custom)
    }
}
