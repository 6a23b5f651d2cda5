use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors produced while turning user input into a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("Price is required")]
    Missing,
    #[error("'{0}' is not a valid price")]
    Invalid(String),
    #[error("Price cannot be negative")]
    Negative,
}

/// A non-negative currency amount held at exactly two decimal places.
///
/// Serializes as a string (`"12.00"`) so the remote store never sees a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Parses free-form input such as `"5"`, `" 5.999 "` or `"$12.5"`.
    ///
    /// Midpoints round away from zero, so `"0.125"` becomes `"0.13"`.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(PriceError::Missing);
        }

        let value =
            Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(input.trim().to_string()))?;
        Self::from_decimal(value)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, PriceError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PriceError::Negative);
        }
        let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        // Values near the 96-bit mantissa limit cannot carry two decimals.
        if rounded.scale() != 2 {
            return Err(PriceError::Invalid(value.to_string()));
        }
        // "-0" keeps its sign bit through rounding.
        rounded.set_sign_positive(true);
        Ok(Self(rounded))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Number(number) => number.to_string(),
        };
        Price::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_number_gets_two_decimals() {
        assert_eq!(Price::parse("5").unwrap().to_string(), "5.00");
        assert_eq!(Price::parse("12").unwrap().to_string(), "12.00");
    }

    #[test]
    fn test_excess_precision_rounds() {
        assert_eq!(Price::parse("5.999").unwrap().to_string(), "6.00");
        assert_eq!(Price::parse("0.125").unwrap().to_string(), "0.13");
        assert_eq!(Price::parse("3.141").unwrap().to_string(), "3.14");
    }

    #[test]
    fn test_input_is_trimmed_and_dollar_sign_accepted() {
        assert_eq!(Price::parse("  7.5 ").unwrap().to_string(), "7.50");
        assert_eq!(Price::parse("$9").unwrap().to_string(), "9.00");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(Price::parse(""), Err(PriceError::Missing));
        assert_eq!(Price::parse("   "), Err(PriceError::Missing));
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_rejects_amounts_without_room_for_cents() {
        assert!(matches!(
            Price::parse("7922816251426433759354395033.5"),
            Err(PriceError::Invalid(_))
        ));
        assert!(matches!(
            Price::parse("79228162514264337593543950335"),
            Err(PriceError::Invalid(_))
        ));
        assert_eq!(Price::parse("1e3").unwrap().to_string(), "1000.00");
        assert_eq!(Price::parse("-0").unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::parse("12").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"12.00\"");
    }

    #[test]
    fn test_deserializes_from_string_or_number() {
        let from_text: Price = serde_json::from_str("\"4.5\"").unwrap();
        let from_number: Price = serde_json::from_str("4.5").unwrap();
        assert_eq!(from_text, from_number);
        assert_eq!(from_number.to_string(), "4.50");
    }
}
