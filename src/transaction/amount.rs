//! Exact decimal amounts and base-unit conversion.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Non-negative decimal amount kept in its exact textual form, e.g. `"100.0"`.
///
/// Floating point never touches the value; scaling to base units is done on
/// the digit string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenAmount(String);

impl TokenAmount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parts(&self) -> (&str, &str) {
        match self.0.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (self.0.as_str(), ""),
        }
    }

    /// Scale to integer base units. Fails when the amount carries more
    /// significant fractional digits than `decimals` or overflows 256 bits.
    pub fn to_base_units(&self, decimals: u8) -> Result<U256, ValidationError> {
        let (int, frac) = self.parts();
        let frac = frac.trim_end_matches('0');
        if frac.len() > decimals as usize {
            return Err(self.invalid(format!(
                "more than {} fractional digits",
                decimals
            )));
        }

        let mut digits = String::with_capacity(int.len() + decimals as usize);
        digits.push_str(if int.is_empty() { "0" } else { int });
        digits.push_str(frac);
        digits.extend(std::iter::repeat('0').take(decimals as usize - frac.len()));

        U256::from_str_radix(&digits, 10).map_err(|_| self.invalid("exceeds 256 bits".into()))
    }

    /// Scale to base units that must fit a `u64` (SequenceChain amounts).
    pub fn to_base_units_u64(&self, decimals: u8) -> Result<u64, ValidationError> {
        let raw = self.to_base_units(decimals)?;
        u64::try_from(raw).map_err(|_| self.invalid("exceeds u64 base units".into()))
    }

    pub fn is_zero(&self) -> bool {
        self.0.chars().all(|c| c == '0' || c == '.')
    }

    fn invalid(&self, reason: String) -> ValidationError {
        ValidationError::InvalidAmount {
            value: self.0.clone(),
            reason,
        }
    }
}

impl FromStr for TokenAmount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = |reason: &str| ValidationError::InvalidAmount {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (int, frac) = match trimmed.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (trimmed, ""),
        };
        if int.is_empty() && frac.is_empty() {
            return Err(invalid("empty amount"));
        }
        if !int.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("expected a non-negative decimal number"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for TokenAmount {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenAmount> for String {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render integer base units as a decimal string without trailing zeros.
pub fn format_units(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (int, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{}.{}", int, frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> TokenAmount {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_accepts_decimals() {
        assert_eq!(amount("100.0").as_str(), "100.0");
        assert_eq!(amount(" 42 ").as_str(), "42");
        assert_eq!(amount(".5").as_str(), ".5");
        assert_eq!(amount("7.").as_str(), "7.");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", ".", "-1", "1e18", "1.2.3", "abc", "+5"] {
            assert!(bad.parse::<TokenAmount>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(
            amount("100.0").to_base_units(18).unwrap(),
            U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64))
        );
        assert_eq!(amount("1.5").to_base_units(9).unwrap(), U256::from(1_500_000_000u64));
        assert_eq!(amount(".25").to_base_units(2).unwrap(), U256::from(25u64));
        assert_eq!(amount("3").to_base_units(0).unwrap(), U256::from(3u64));
        // trailing zeros beyond the precision are harmless
        assert_eq!(amount("1.500").to_base_units(1).unwrap(), U256::from(15u64));
    }

    #[test]
    fn test_excess_precision_rejected() {
        assert!(matches!(
            amount("0.0000000001").to_base_units(9),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_u64_overflow_rejected() {
        assert!(amount("18446744073709551616").to_base_units_u64(0).is_err());
        assert_eq!(amount("18446744073709551615").to_base_units_u64(0).unwrap(), u64::MAX);
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000_000u64), 9), "1.5");
        assert_eq!(format_units(U256::from(5u64), 3), "0.005");
        assert_eq!(format_units(U256::from(1000u64), 3), "1");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(12u64), 0), "12");
    }

    #[test]
    fn test_serde_validates() {
        let parsed: TokenAmount = serde_json::from_str("\"2.5\"").unwrap();
        assert_eq!(parsed, amount("2.5"));
        assert!(serde_json::from_str::<TokenAmount>("\"-2\"").is_err());
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"2.5\"");
    }

    #[test]
    fn test_is_zero() {
        assert!(amount("0.000").is_zero());
        assert!(!amount("0.001").is_zero());
    }
}
