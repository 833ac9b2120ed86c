//! Value Objects for the catalog

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest SKU accepted anywhere in the catalog; fits a 20-char prefix plus 10 codes of 10 chars.
pub const MAX_SKU_LEN: usize = 160;
pub const MAX_SKU_CODE_LEN: usize = 10;

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > MAX_SKU_LEN { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Sku> for String {
    fn from(sku: Sku) -> Self { sku.0 }
}

/// Short per-option token that makes up one segment of a derived SKU.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkuCode(String);

impl SkuCode {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > MAX_SKU_CODE_LEN { return Err(SkuError::TooLong); }
        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SkuError::InvalidCharacter(value));
        }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SkuCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for SkuCode {
    type Error = SkuError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<SkuCode> for String {
    fn from(code: SkuCode) -> Self { code.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuError {
    #[error("SKU empty")]
    Empty,
    #[error("SKU too long")]
    TooLong,
    #[error("SKU code {0:?} must be letters and digits only")]
    InvalidCharacter(String),
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        let amount = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Result<Money, MoneyError> {
        let amount = self.amount.checked_mul(Decimal::from(qty)).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(amount, &self.currency))
    }
}

impl Default for Money { fn default() -> Self { Self::zero("USD") } }

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Currency mismatch")]
    CurrencyMismatch,
    #[error("Amount out of range")]
    Overflow,
}

/// A price as typed into an admin form: a JSON number, a string, or nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Number(f64),
    Text(String),
}

impl PriceField {
    /// Coerces the field to a decimal. Anything unparseable becomes zero.
    ///
    /// Text is read like a form field: leading whitespace is skipped and the
    /// longest numeric prefix is used, so `"12.5 EUR"` yields `12.5`.
    pub fn coerce(&self) -> Decimal {
        match self {
            Self::Number(n) if n.is_finite() => Decimal::from_str(&n.to_string())
                .ok()
                .or_else(|| Decimal::from_f64(*n))
                .unwrap_or(Decimal::ZERO),
            Self::Number(_) => Decimal::ZERO,
            Self::Text(s) => parse_leading_decimal(s).unwrap_or(Decimal::ZERO),
        }
    }
}

impl From<f64> for PriceField {
    fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<&str> for PriceField {
    fn from(s: &str) -> Self { Self::Text(s.to_string()) }
}

fn parse_leading_decimal(input: &str) -> Option<Decimal> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut sign = "";
    if let Some(&b) = bytes.first() {
        if b == b'-' || b == b'+' {
            if b == b'-' { sign = "-"; }
            i += 1;
        }
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() { i += 1; }
    let int_part = &s[int_start..i];
    let mut frac_part = "";
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() { j += 1; }
        frac_part = &s[frac_start..j];
        i = j;
    }
    if int_part.is_empty() && frac_part.is_empty() { return None; }

    let mut mantissa = format!("{sign}{}", if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        mantissa.push('.');
        mantissa.push_str(frac_part);
    }

    // exponent only counts when digits follow it
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        let exp_sign = match bytes.get(j) {
            Some(b'-') => { j += 1; "-" }
            Some(b'+') => { j += 1; "" }
            _ => "",
        };
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() { j += 1; }
        if j > exp_start {
            let scientific = format!("{mantissa}e{exp_sign}{}", &s[exp_start..j]);
            return Decimal::from_scientific(&scientific)
                .ok()
                .or_else(|| scientific.parse::<f64>().ok().and_then(Decimal::from_f64));
        }
    }
    Decimal::from_str(&mantissa).ok()
}

/// Base price template typed by the admin; every field may be blank.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceSeed {
    pub cost_price: Option<PriceField>,
    pub original_price: Option<PriceField>,
    pub sale_price: Option<PriceField>,
    pub bronze_price: Option<PriceField>,
    pub silver_price: Option<PriceField>,
    pub gold_price: Option<PriceField>,
}

/// Membership level that decides which price a shopper pays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberTier {
    #[default]
    Guest,
    Bronze,
    Silver,
    Gold,
}

impl MemberTier {
    pub const ALL: [MemberTier; 4] = [MemberTier::Guest, MemberTier::Bronze, MemberTier::Silver, MemberTier::Gold];
}

/// Concrete price record attached to each SKU.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTiers {
    pub cost_price: Decimal,
    pub original_price: Decimal,
    pub sale_price: Decimal,
    pub bronze_price: Decimal,
    pub silver_price: Decimal,
    pub gold_price: Decimal,
}

impl PriceTiers {
    pub fn from_seed(seed: &PriceSeed) -> Self {
        let coerce = |field: &Option<PriceField>| field.as_ref().map(PriceField::coerce).unwrap_or(Decimal::ZERO);
        Self {
            cost_price: coerce(&seed.cost_price),
            original_price: coerce(&seed.original_price),
            sale_price: coerce(&seed.sale_price),
            bronze_price: coerce(&seed.bronze_price),
            silver_price: coerce(&seed.silver_price),
            gold_price: coerce(&seed.gold_price),
        }
    }

    /// Price charged to a shopper of the given tier.
    ///
    /// An unset (zero) tier price falls back to the sale price, then the
    /// original price.
    pub fn price_for(&self, tier: MemberTier) -> Decimal {
        let tier_price = match tier {
            MemberTier::Guest => Decimal::ZERO,
            MemberTier::Bronze => self.bronze_price,
            MemberTier::Silver => self.silver_price,
            MemberTier::Gold => self.gold_price,
        };
        [tier_price, self.sale_price]
            .into_iter()
            .find(|p| p.is_sign_positive() && !p.is_zero())
            .unwrap_or(self.original_price)
    }

    /// True when a shopper could actually be charged something.
    pub fn is_sellable(&self) -> bool {
        let p = self.price_for(MemberTier::Guest);
        p.is_sign_positive() && !p.is_zero()
    }
}
