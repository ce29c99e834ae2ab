//! # Quote Configuration
//!
//! Loads the pricing policy the CLI quotes against.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TARIFA_VAT_RATE=0.16                                               │
//! │     TARIFA_GUARDRAIL_CAP=399                                           │
//! │     TARIFA_STRIPE_PERCENT=0.041                                        │
//! │     TARIFA_STRIPE_FIXED=3                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <PATH>, or                                                │
//! │     ~/.config/tarifa/tarifa.toml (Linux)                               │
//! │     ~/Library/Application Support/com.tarifa.tarifa/tarifa.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     tarifa_core::config::DEFAULT_* constants                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [pricing]
//! vat_rate = 0.16
//! guardrail_cap_pesos = 500
//!
//! [visit]
//! total_pesos = 140
//! provider_pesos = 90
//!
//! [[processing_fees.rules]]
//! id = "mx_domestic_debit"
//! label = "Mexican debit cards"
//! match = { funding = "debit", country = "MX" }
//! percent = 0.036
//! fixed = 3
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tarifa_core::{FeeRuleTable, PricingConfig, VisitPreauthConfig};
use tracing::{debug, info, warn};

use crate::error::QuoteResult;

/// Processing-fee section of the policy file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingFeeSettings {
    /// Ordered rule table. Defaults to the built-in table.
    #[serde(default)]
    pub rules: FeeRuleTable,
}

/// Complete policy for the quote CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Sliding engine policy.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Visit product split.
    #[serde(default)]
    pub visit: VisitPreauthConfig,

    /// Processing-fee rule table.
    #[serde(default)]
    pub processing_fees: ProcessingFeeSettings,
}

impl QuoteConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (tarifa.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> QuoteResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pricing policy from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a policy file body.
    pub fn from_toml(contents: &str) -> QuoteResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates both engine policies.
    pub fn validate(&self) -> QuoteResult<()> {
        self.pricing.validate()?;
        self.visit.validate()?;
        Ok(())
    }

    /// Applies `TARIFA_*` overrides read through `lookup`.
    ///
    /// Rates shared by both engines are applied to both.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rate) = decimal_var(&lookup, "TARIFA_VAT_RATE") {
            debug!(vat_rate = %rate, "Overriding VAT rate from environment");
            self.pricing.vat_rate = rate;
            self.visit.vat_rate = rate;
        }

        if let Some(cap) = decimal_var(&lookup, "TARIFA_GUARDRAIL_CAP") {
            debug!(cap = %cap, "Overriding guardrail cap from environment");
            self.pricing.guardrail_cap_pesos = cap;
        }

        if let Some(percent) = decimal_var(&lookup, "TARIFA_STRIPE_PERCENT") {
            debug!(percent = %percent, "Overriding processor percent from environment");
            self.pricing.stripe_percent = percent;
            self.visit.stripe_percent = percent;
        }

        if let Some(fixed) = decimal_var(&lookup, "TARIFA_STRIPE_FIXED") {
            self.pricing.stripe_fixed = fixed;
            self.visit.stripe_fixed = fixed;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tarifa", "tarifa")
            .map(|dirs| dirs.config_dir().join("tarifa.toml"))
    }
}

fn decimal_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Decimal> {
    let raw = lookup(key)?;
    match raw.trim().parse::<Decimal>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring non-numeric environment override");
            None
        }
    }
}
