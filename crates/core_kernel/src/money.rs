//! Bounded claim amounts with precise decimal arithmetic
//!
//! Reimbursement amounts are a single numeric value in the organisation's
//! currency. They use rust_decimal so that no floating-point rounding ever
//! touches a claimed amount.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default ceiling for a single claim, in currency units
pub const DEFAULT_AMOUNT_CEILING: Decimal = dec!(10000);

/// Maximum number of fractional digits accepted for an amount
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Errors that can occur when constructing an amount
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount must be greater than zero, got {0}")]
    NotPositive(Decimal),

    #[error("Amount {amount} exceeds the ceiling of {ceiling}")]
    ExceedsCeiling { amount: Decimal, ceiling: Decimal },

    #[error("Amount {0} has more than two decimal places")]
    TooPrecise(Decimal),
}

/// A claimed amount: strictly positive and at most a configured ceiling
///
/// The bounds are checked once at construction; an `Amount` in hand is always
/// admissible under the ceiling it was built against. Deserialization goes
/// through the same checks against the default ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "Decimal", try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Creates an amount bounded by the default ceiling
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        Self::bounded(value, DEFAULT_AMOUNT_CEILING)
    }

    /// Creates an amount bounded by the given ceiling
    pub fn bounded(value: Decimal, ceiling: Decimal) -> Result<Self, MoneyError> {
        if value <= Decimal::ZERO {
            return Err(MoneyError::NotPositive(value));
        }
        if value > ceiling {
            return Err(MoneyError::ExceedsCeiling {
                amount: value,
                ceiling,
            });
        }
        if value.normalize().scale() > AMOUNT_DECIMAL_PLACES {
            return Err(MoneyError::TooPrecise(value));
        }
        Ok(Self(value.normalize()))
    }

    /// Wraps a value that was already validated (e.g. read back from storage)
    pub fn from_trusted(value: Decimal) -> Self {
        Self(value.normalize())
    }

    /// Returns the decimal value
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Decimal {
        amount.0
    }
}
