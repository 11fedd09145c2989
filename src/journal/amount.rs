use std::fmt;

use num::bigint::BigInt;
use num::{BigRational, Signed, Zero};
use thiserror::Error;

use crate::parser::nodes::{AmountNode, PostingNode};

/// Error converting a posting quantity into a rational.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("cannot parse quantity: {0}")]
    InvalidQuantity(String),
}

/// An aggregated amount: a commodity plus an arbitrary-precision rational
/// quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Amount {
    pub commodity: String,
    pub quantity: BigRational,
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", rational_to_decimal(&self.quantity), self.commodity)
    }
}

/// Parses a decimal quantity string into a rational. Thousands-grouping
/// commas are stripped; anything else that is not a plain decimal number
/// is rejected.
pub fn parse_quantity(text: &str) -> Result<BigRational, AmountError> {
    let cleaned: String = text.chars().filter(|&c| c != ',').collect();
    let unsigned = cleaned.strip_prefix('-').unwrap_or(&cleaned);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (unsigned, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AmountError::InvalidQuantity(text.to_string()));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::InvalidQuantity(text.to_string()));
    }
    let digits: String = format!("{int_part}{frac_part}");
    let mut numerator: BigInt = digits
        .parse()
        .map_err(|_| AmountError::InvalidQuantity(text.to_string()))?;
    if cleaned.starts_with('-') {
        numerator = -numerator;
    }
    let denominator = BigInt::from(10u32).pow(frac_part.len() as u32);
    Ok(BigRational::new(numerator, denominator))
}

/// Formats a rational as a plain decimal string with up to ten fractional
/// digits, trailing zeros trimmed.
pub fn rational_to_decimal(quantity: &BigRational) -> String {
    let mut out = String::new();
    if quantity.is_negative() {
        out.push('-');
    }
    let abs = quantity.abs();
    out.push_str(&abs.trunc().to_integer().to_string());
    let mut frac = abs.fract();
    let ten = BigRational::from_integer(BigInt::from(10u32));
    let mut digits = String::new();
    for _ in 0..10 {
        if frac.is_zero() {
            break;
        }
        frac = frac * &ten;
        digits.push_str(&frac.trunc().to_integer().to_string());
        frac = frac.fract();
    }
    let digits = digits.trim_end_matches('0');
    if !digits.is_empty() {
        out.push('.');
        out.push_str(digits);
    }
    out
}

/// The numeric inputs accepted by [`PostingNode::set_amount`]. Each is
/// converted to a canonical decimal string at entry.
#[derive(Debug, Clone)]
pub enum AmountValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Rational(BigRational),
}

impl From<&str> for AmountValue {
    fn from(v: &str) -> Self {
        AmountValue::Text(v.to_string())
    }
}

impl From<String> for AmountValue {
    fn from(v: String) -> Self {
        AmountValue::Text(v)
    }
}

impl From<i64> for AmountValue {
    fn from(v: i64) -> Self {
        AmountValue::Integer(v)
    }
}

impl From<i32> for AmountValue {
    fn from(v: i32) -> Self {
        AmountValue::Integer(v.into())
    }
}

impl From<f64> for AmountValue {
    fn from(v: f64) -> Self {
        AmountValue::Float(v)
    }
}

impl From<BigRational> for AmountValue {
    fn from(v: BigRational) -> Self {
        AmountValue::Rational(v)
    }
}

impl AmountValue {
    fn to_decimal_string(&self) -> String {
        match self {
            AmountValue::Text(v) => v.clone(),
            AmountValue::Integer(v) => v.to_string(),
            AmountValue::Float(v) => v.to_string(),
            AmountValue::Rational(v) => rational_to_decimal(v),
        }
    }
}

impl PostingNode {
    /// Sets the posting amount, dropping any captured raw spelling so the
    /// printer emits the canonical notation. A leading `-` in the value
    /// moves into the sign flag.
    pub fn set_amount(&mut self, commodity: &str, value: impl Into<AmountValue>) {
        let text = value.into().to_decimal_string();
        let (negative, quantity) = match text.strip_prefix('-') {
            Some(rest) => (true, rest.to_string()),
            None => (false, text),
        };
        let amount = self.amount.get_or_insert_with(AmountNode::default);
        amount.raw.clear();
        amount.value_expr.clear();
        amount.commodity = commodity.to_string();
        amount.quantity = quantity;
        amount.negative = negative;
    }

    /// The posting amount as a rational, or `None` when the posting has no
    /// numeric amount (elided, or a value expression).
    pub fn amount_value(&self) -> Result<Option<Amount>, AmountError> {
        let node = match &self.amount {
            Some(node) => node,
            None => return Ok(None),
        };
        if node.quantity.is_empty() {
            return Ok(None);
        }
        let mut quantity = parse_quantity(&node.quantity)?;
        if node.negative {
            quantity = -quantity;
        }
        Ok(Some(Amount {
            commodity: node.commodity.clone(),
            quantity,
        }))
    }
}
