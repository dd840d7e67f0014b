//! # Trader Configuration
//!
//! Store-wide pricing settings every refresh depends on.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TRADER_PRICES_INCLUDE_VAT=false                                    │
//! │     TRADER_PRIMARY_VAT_COUNTRY=NL                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     trader.toml (path chosen by the caller)                            │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     EUR, BE, 21%, prices and tariffs include VAT                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module only parses and validates. Reading the file and the
//! environment happens in trader-store (`load_config`), which feeds the
//! variables through [`TraderConfig::apply_overrides`].
//!
//! ## Configuration File Format
//! ```toml
//! currency = "EUR"
//! primary_vat_country = "BE"
//! fallback_standard_vat_rate = "21"
//! prices_include_vat = true
//! tariffs_include_vat = true
//! allow_vat_exemption = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::CountryId;
use crate::types::VatPercentage;
use crate::validation::validate_country_code;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "TRADER_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderConfig {
    /// ISO 4217 code. Amounts are minor units of this currency.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Country whose VAT rates apply when the order has no address, and
    /// against which VAT exemption is judged.
    #[serde(default = "default_primary_vat_country")]
    pub primary_vat_country: CountryId,

    /// Rate for shipping, payment and amounts with no line to prorate over.
    #[serde(default = "default_fallback_standard_vat_rate")]
    pub fallback_standard_vat_rate: VatPercentage,

    /// Catalog prices are VAT-inclusive. Also the mode discounts are
    /// computed in.
    #[serde(default = "default_true")]
    pub prices_include_vat: bool,

    /// Shipping tariffs and payment fees are VAT-inclusive.
    #[serde(default = "default_true")]
    pub tariffs_include_vat: bool,

    /// Business shoppers with a VAT number from another country pay no VAT.
    #[serde(default = "default_true")]
    pub allow_vat_exemption: bool,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_primary_vat_country() -> CountryId {
    CountryId::new("BE")
}

fn default_fallback_standard_vat_rate() -> VatPercentage {
    VatPercentage::from_whole(21)
}

fn default_true() -> bool {
    true
}

impl Default for TraderConfig {
    fn default() -> Self {
        TraderConfig {
            currency: default_currency(),
            primary_vat_country: default_primary_vat_country(),
            fallback_standard_vat_rate: default_fallback_standard_vat_rate(),
            prices_include_vat: true,
            tariffs_include_vat: true,
            allow_vat_exemption: true,
        }
    }
}

impl TraderConfig {
    /// Parses and validates a TOML document. Missing keys take defaults.
    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        let config: TraderConfig =
            toml::from_str(contents).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CoreError::Config(format!(
                "currency must be a three letter ISO code, got: '{}'",
                self.currency
            )));
        }

        validate_country_code(self.primary_vat_country.as_str())
            .map_err(|e| CoreError::Config(format!("primary_vat_country: {}", e)))?;

        Ok(())
    }

    /// Applies `TRADER_*` overrides. `lookup` returns the value of a
    /// variable, if set.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(currency) = var("CURRENCY") {
            self.currency = currency.trim().to_uppercase();
        }

        if let Some(country) = var("PRIMARY_VAT_COUNTRY") {
            tracing::debug!(country = %country, "Overriding primary VAT country from environment");
            self.primary_vat_country = CountryId::new(country.trim().to_uppercase());
        }

        if let Some(rate) = var("FALLBACK_STANDARD_VAT_RATE") {
            match rate.parse() {
                Ok(parsed) => self.fallback_standard_vat_rate = parsed,
                Err(e) => {
                    tracing::warn!(rate = %rate, error = %e, "Ignoring invalid fallback VAT rate")
                }
            }
        }

        let flags: [(&str, &mut bool); 3] = [
            ("PRICES_INCLUDE_VAT", &mut self.prices_include_vat),
            ("TARIFFS_INCLUDE_VAT", &mut self.tariffs_include_vat),
            ("ALLOW_VAT_EXEMPTION", &mut self.allow_vat_exemption),
        ];
        for (name, flag) in flags {
            if let Some(value) = var(name) {
                match parse_flag(&value) {
                    Some(parsed) => *flag = parsed,
                    None => {
                        tracing::warn!(variable = name, value = %value, "Ignoring invalid boolean")
                    }
                }
            }
        }
    }

    /// Allocator fallback rate for an order.
    pub fn fallback_vat_percentage(&self, vat_exempt: bool) -> VatPercentage {
        if vat_exempt {
            VatPercentage::zero()
        } else {
            self.fallback_standard_vat_rate
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = TraderConfig::default();
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.primary_vat_country.as_str(), "BE");
        assert_eq!(config.fallback_standard_vat_rate, VatPercentage::from_whole(21));
        assert!(config.prices_include_vat);
        assert!(config.tariffs_include_vat);
        assert!(config.allow_vat_exemption);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let config = TraderConfig::from_toml_str(
            r#"
            primary_vat_country = "NL"
            fallback_standard_vat_rate = "9"
            prices_include_vat = false
            "#,
        )
        .unwrap();
        assert_eq!(config.primary_vat_country.as_str(), "NL");
        assert_eq!(config.fallback_standard_vat_rate, VatPercentage::from_whole(9));
        assert!(!config.prices_include_vat);
        assert!(config.tariffs_include_vat);
        assert_eq!(config.currency, "EUR");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TraderConfig::from_toml_str(r#"fallback_standard_vat_rate = "abc""#);
        assert!(matches!(result, Err(CoreError::Config(_))));

        let result = TraderConfig::from_toml_str(r#"primary_vat_country = "belgium""#);
        assert!(matches!(result, Err(CoreError::Config(_))));

        let result = TraderConfig::from_toml_str(r#"currency = "euro""#);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TRADER_PRIMARY_VAT_COUNTRY", "nl"),
            ("TRADER_PRICES_INCLUDE_VAT", "false"),
            ("TRADER_ALLOW_VAT_EXEMPTION", "maybe"),
            ("TRADER_FALLBACK_STANDARD_VAT_RATE", "5.5"),
        ]);
        let mut config = TraderConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.primary_vat_country.as_str(), "NL");
        assert!(!config.prices_include_vat);
        // unparseable values leave the setting untouched
        assert!(config.allow_vat_exemption);
        assert_eq!(config.fallback_standard_vat_rate.to_string(), "5.5%");
    }

    #[test]
    fn test_fallback_vat_percentage() {
        let config = TraderConfig::default();
        assert_eq!(config.fallback_vat_percentage(false), VatPercentage::from_whole(21));
        assert!(config.fallback_vat_percentage(true).is_zero());
    }
}
