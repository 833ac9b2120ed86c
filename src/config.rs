//! Service configuration, read from the environment (after `.env` is loaded).

use anyhow::{bail, Context, Result};
use std::env;
use crate::domain::aggregates::combination::DEFAULT_SKU_PREFIX;

pub const DEFAULT_MAX_COMBINATIONS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP port (`PORT`, default 8083)
    pub port: u16,
    /// Prefix for previews submitted without one (`SKU_PREFIX_FALLBACK`)
    pub sku_prefix_fallback: String,
    /// Currency for new carts (`CART_CURRENCY`, default USD)
    pub cart_currency: String,
    /// Allow any origin (`CORS_PERMISSIVE`, default true)
    pub cors_permissive: bool,
    /// Largest combination preview served (`MAX_COMBINATIONS`, default 1000)
    pub max_combinations: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8083".to_string())
            .parse()
            .context("Failed to parse PORT as a number")?;

        let sku_prefix_fallback = lookup("SKU_PREFIX_FALLBACK")
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_SKU_PREFIX.to_string());

        let cart_currency = lookup("CART_CURRENCY").unwrap_or_else(|| "USD".to_string()).trim().to_uppercase();
        if cart_currency.len() != 3 {
            bail!("CART_CURRENCY must be a 3-letter code, got {cart_currency:?}");
        }

        let cors_permissive = match lookup("CORS_PERMISSIVE").as_deref().map(str::trim) {
            None | Some("") => true,
            Some(v) => v.parse::<bool>().with_context(|| format!("Failed to parse CORS_PERMISSIVE={v:?} as a bool"))?,
        };

        let max_combinations = lookup("MAX_COMBINATIONS")
            .unwrap_or_else(|| DEFAULT_MAX_COMBINATIONS.to_string())
            .trim()
            .parse::<usize>()
            .context("Failed to parse MAX_COMBINATIONS as a number")?;
        if max_combinations == 0 {
            bail!("MAX_COMBINATIONS must be at least 1");
        }

        Ok(Self { port, sku_prefix_fallback, cart_currency, cors_permissive, max_combinations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8083);
        assert_eq!(config.sku_prefix_fallback, "SKU");
        assert_eq!(config.cart_currency, "USD");
        assert!(config.cors_permissive);
        assert_eq!(config.max_combinations, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"), ("SKU_PREFIX_FALLBACK", " item "), ("CART_CURRENCY", "cny"), ("CORS_PERMISSIVE", "false"),
            ("MAX_COMBINATIONS", "250"),
        ])).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.sku_prefix_fallback, "ITEM");
        assert_eq!(config.cart_currency, "CNY");
        assert!(!config.cors_permissive);
        assert_eq!(config.max_combinations, 250);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CART_CURRENCY", "dollars")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CORS_PERMISSIVE", "maybe")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MAX_COMBINATIONS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MAX_COMBINATIONS", "-5")])).is_err());
    }
}
