use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Number of implied decimals in on-chain USDC amounts.
pub const USDC_DECIMALS: u32 = 6;
const SCALE: u128 = 10u128.pow(USDC_DECIMALS);

/// Smallest-unit USDC amount as stored by the marketplace contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UsdcAmount(u128);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceParseError {
    #[error("price is empty")]
    Empty,
    #[error("price `{0}` is not a base-10 integer")]
    NotAnInteger(String),
    #[error("price `{0}` is out of range")]
    OutOfRange(String),
}

impl UsdcAmount {
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    pub fn parse(raw: &str) -> Result<Self, PriceParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PriceParseError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PriceParseError::NotAnInteger(trimmed.to_string()));
        }
        trimmed
            .parse::<u128>()
            .map(Self)
            .map_err(|_| PriceParseError::OutOfRange(trimmed.to_string()))
    }

    /// Exact decimal rendering with trailing zeros trimmed: `1500000` → `1.5`.
    pub fn format_units(&self) -> String {
        let whole = self.0 / SCALE;
        let fraction = self.0 % SCALE;
        if fraction == 0 {
            return whole.to_string();
        }
        let digits = format!("{fraction:0width$}", width = USDC_DECIMALS as usize);
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }

    /// Two decimals, rounded half-up: `1505000` → `1.51`.
    pub fn to_fixed_2(&self) -> String {
        let cents = self.0.saturating_add(SCALE / 200) / (SCALE / 100);
        format!("{}.{:02}", cents / 100, cents % 100)
    }
}

impl FromStr for UsdcAmount {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UsdcAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_units())
    }
}

// Wire form stays the raw smallest-unit string so the JSON API mirrors the indexer.
impl Serialize for UsdcAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(u64),
}

impl<'de> Deserialize<'de> for UsdcAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
            RawAmount::Number(units) => Ok(Self(u128::from(units))),
        }
    }
}
