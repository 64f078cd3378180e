use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Normalize a monetary value to 2 decimal places (with_scale truncates or pads with zeros).
pub fn normalize_scale(value: &BigDecimal) -> BigDecimal {
    value.with_scale(2)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount must be a number")]
    NotNumeric,
    #[error("amount must be a finite number")]
    NotFinite,
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// A payment amount: strictly positive, carried at 2 decimal places.
/// Anything that rounds down to zero cents is rejected.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Amount(BigDecimal);

impl Amount {
    pub fn new(raw: BigDecimal) -> Result<Self, MoneyError> {
        let normalized = normalize_scale(&raw);
        if normalized <= BigDecimal::zero() {
            return Err(MoneyError::NotPositive);
        }
        Ok(Self(normalized))
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn into_inner(self) -> BigDecimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw amount as it arrives on the wire. Callers historically sent both
/// JSON numbers and numeric strings, so both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn into_amount(self) -> Result<Amount, MoneyError> {
        let raw = match self {
            AmountInput::Number(n) => {
                if !n.is_finite() {
                    return Err(MoneyError::NotFinite);
                }
                BigDecimal::try_from(n).map_err(|_| MoneyError::NotFinite)?
            }
            AmountInput::Text(s) => {
                BigDecimal::from_str(s.trim()).map_err(|_| MoneyError::NotNumeric)?
            }
        };
        Amount::new(raw)
    }
}
