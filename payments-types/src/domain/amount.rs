//! Exact fixed-point monetary amount bound to a currency.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::currency::Currency;
use crate::error::DomainError;

/// Immutable monetary value split into an integer and a fractional part.
///
/// The fractional part is always within `0..=currency.max_fractional()`
/// and the whole amount always fits in `u64` minor units, so
/// [`Amount::to_minor_units`] cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Amount {
    currency: Currency,
    integer: u64,
    fractional: u64,
}

impl Amount {
    /// Creates an amount, rejecting fractional parts the currency cannot hold.
    pub fn new(currency: Currency, integer: u64, fractional: u64) -> Result<Self, DomainError> {
        let max = currency.max_fractional();
        if fractional > max {
            return Err(DomainError::InvalidFractional {
                currency,
                given: fractional,
                max,
            });
        }

        integer
            .checked_mul(currency.minor_units_per_major())
            .and_then(|minor| minor.checked_add(fractional))
            .ok_or(DomainError::AmountOverflow { currency, integer })?;

        Ok(Self {
            currency,
            integer,
            fractional,
        })
    }

    /// Decomposes a count of minor units, e.g. 999 cents into 9.99 USD.
    ///
    /// Always in range, which is why storage and transport carry minor
    /// units instead of floats.
    pub fn from_minor_units(currency: Currency, minor_units: u64) -> Self {
        let divider = currency.minor_units_per_major();
        Self {
            currency,
            integer: minor_units / divider,
            fractional: minor_units % divider,
        }
    }

    pub fn to_minor_units(&self) -> u64 {
        self.integer * self.currency.minor_units_per_major() + self.fractional
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn integer(&self) -> u64 {
        self.integer
    }

    pub fn fractional(&self) -> u64 {
        self.fractional
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.currency.decimal_digits() as usize;
        if digits == 0 {
            return write!(f, "{} {}", self.integer, self.currency);
        }
        write!(
            f,
            "{}.{:0digits$} {}",
            self.integer,
            self.fractional,
            self.currency,
            digits = digits
        )
    }
}

/// Wire shape: the same three fields, re-validated on the way in.
#[derive(Deserialize)]
struct RawAmount {
    currency: Currency,
    integer: u64,
    fractional: u64,
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawAmount::deserialize(deserializer)?;
        Amount::new(raw.currency, raw.integer, raw.fractional).map_err(serde::de::Error::custom)
    }
}
