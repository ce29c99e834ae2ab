//! # Processing-Fee Rules
//!
//! Picks the processor fee (percent + fixed) that applies to a card.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CardInfo { brand, funding, country }                                  │
//! │     │  normalize: brand/funding lowercase, country uppercase,          │
//! │     │             trim, "" → absent                                    │
//! │     ▼                                                                   │
//! │  no metadata at all? ──yes──► worst-case rule                          │
//! │     │ no                                                                │
//! │     ▼                                                                   │
//! │  first rule (table order) whose every present match field agrees       │
//! │     │                         (country "*" agrees with anything)       │
//! │     ▼                                                                   │
//! │  nothing matched? ──yes──► worst-case rule                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The worst case is the rule with the highest `percent + fixed / 100`. It is
//! derived when the table is built, never hardcoded, so editing the table
//! always re-derives the fallback.
//!
//! Quotes themselves use the pinned `stripe_percent` from the pricing policy;
//! the resolver reports what a given card will actually cost the platform.
//!
//! ## Example
//! ```rust
//! use tarifa_core::fee_rules::FeeRuleTable;
//! use tarifa_core::types::CardInfo;
//!
//! let table = FeeRuleTable::default();
//! let rule = table.resolve(&CardInfo::new(None, Some("Debit"), Some("mx")));
//! assert_eq!(rule.id, "mx_domestic_debit");
//! ```

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreResult, PricingError, ValidationError};
use crate::types::{CardInfo, ProcessingFeeRule, RuleMatch};

/// Country value that matches any card country.
pub const COUNTRY_WILDCARD: &str = "*";

// =============================================================================
// Built-in Table
// =============================================================================

/// The built-in rule table, domestic rules before the catch-all.
pub fn default_rules() -> Vec<ProcessingFeeRule> {
    vec![
        ProcessingFeeRule {
            id: "mx_domestic_debit".to_string(),
            label: "Mexican debit cards".to_string(),
            matcher: RuleMatch {
                brand: None,
                funding: Some("debit".to_string()),
                country: Some("MX".to_string()),
            },
            percent: dec!(0.036),
            fixed: dec!(3),
        },
        ProcessingFeeRule {
            id: "mx_domestic_credit".to_string(),
            label: "Mexican credit cards".to_string(),
            matcher: RuleMatch {
                brand: None,
                funding: Some("credit".to_string()),
                country: Some("MX".to_string()),
            },
            percent: dec!(0.036),
            fixed: dec!(3),
        },
        ProcessingFeeRule {
            id: "international".to_string(),
            label: "International and unclassified cards".to_string(),
            matcher: RuleMatch::default(),
            percent: dec!(0.041),
            fixed: dec!(3),
        },
    ]
}

// =============================================================================
// Worst-Case Derivation
// =============================================================================

/// Returns the index of the costliest rule (`percent + fixed / 100`).
///
/// Ties keep the earliest rule. `None` for an empty slice.
pub fn worst_case_index(rules: &[ProcessingFeeRule]) -> Option<usize> {
    rules
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, &ProcessingFeeRule)>, (index, rule)| match best {
            Some((_, current)) if rule.combined_cost() <= current.combined_cost() => best,
            _ => Some((index, rule)),
        })
        .map(|(index, _)| index)
}

/// Returns the costliest rule, see [`worst_case_index`].
pub fn worst_case_rule(rules: &[ProcessingFeeRule]) -> Option<&ProcessingFeeRule> {
    worst_case_index(rules).map(|index| &rules[index])
}

// =============================================================================
// Rule Table
// =============================================================================

/// An ordered, immutable rule table with its derived fallback.
///
/// Deserializes from a plain list of rules:
/// ```toml
/// [[processing_fees.rules]]
/// id = "mx_domestic_debit"
/// label = "Mexican debit cards"
/// match = { funding = "debit", country = "MX" }
/// percent = 0.036
/// fixed = 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProcessingFeeRule>", into = "Vec<ProcessingFeeRule>")]
pub struct FeeRuleTable {
    rules: Vec<ProcessingFeeRule>,
    default_index: usize,
}

impl FeeRuleTable {
    /// Builds a table and derives its worst-case fallback.
    ///
    /// ## Errors
    /// [`PricingError::InvalidConfiguration`] for an empty table.
    pub fn new(rules: Vec<ProcessingFeeRule>) -> CoreResult<Self> {
        let default_index = worst_case_index(&rules).ok_or_else(|| {
            PricingError::InvalidConfiguration(ValidationError::Required {
                field: "processing_fees.rules".to_string(),
            })
        })?;

        Ok(FeeRuleTable {
            rules,
            default_index,
        })
    }

    /// Rules in match order.
    pub fn rules(&self) -> &[ProcessingFeeRule] {
        &self.rules
    }

    /// The worst-case rule used when a card cannot be classified.
    pub fn default_rule(&self) -> &ProcessingFeeRule {
        &self.rules[self.default_index]
    }

    /// Selects the rule for a card. Never fails.
    pub fn resolve(&self, card: &CardInfo) -> &ProcessingFeeRule {
        let card = NormalizedCard::from(card);

        if card.is_empty() {
            debug!(rule = %self.default_rule().id, "No card metadata, using worst-case rule");
            return self.default_rule();
        }

        match self.rules.iter().find(|rule| card.matches(&rule.matcher)) {
            Some(rule) => {
                debug!(rule = %rule.id, ?card, "Resolved processing-fee rule");
                rule
            }
            None => {
                debug!(rule = %self.default_rule().id, ?card, "No rule matched, using worst-case rule");
                self.default_rule()
            }
        }
    }
}

/// The built-in table with its derived fallback.
pub fn default_rule_table() -> FeeRuleTable {
    let rules = default_rules();
    let default_index = worst_case_index(&rules).unwrap_or(0);
    FeeRuleTable {
        rules,
        default_index,
    }
}

impl Default for FeeRuleTable {
    fn default() -> Self {
        default_rule_table()
    }
}

impl TryFrom<Vec<ProcessingFeeRule>> for FeeRuleTable {
    type Error = PricingError;

    fn try_from(rules: Vec<ProcessingFeeRule>) -> Result<Self, Self::Error> {
        FeeRuleTable::new(rules)
    }
}

impl From<FeeRuleTable> for Vec<ProcessingFeeRule> {
    fn from(table: FeeRuleTable) -> Self {
        table.rules
    }
}

// =============================================================================
// Normalization
// =============================================================================

#[derive(Debug, Default, PartialEq, Eq)]
struct NormalizedCard {
    brand: Option<String>,
    funding: Option<String>,
    country: Option<String>,
}

fn normalize_lower(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn normalize_upper(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_uppercase)
}

impl From<&CardInfo> for NormalizedCard {
    fn from(card: &CardInfo) -> Self {
        NormalizedCard {
            brand: normalize_lower(card.brand.as_deref()),
            funding: normalize_lower(card.funding.as_deref()),
            country: normalize_upper(card.country.as_deref()),
        }
    }
}

impl NormalizedCard {
    fn is_empty(&self) -> bool {
        self.brand.is_none() && self.funding.is_none() && self.country.is_none()
    }

    fn matches(&self, matcher: &RuleMatch) -> bool {
        field_matches(
            normalize_lower(matcher.brand.as_deref()),
            self.brand.as_deref(),
        ) && field_matches(
            normalize_lower(matcher.funding.as_deref()),
            self.funding.as_deref(),
        ) && country_matches(
            normalize_upper(matcher.country.as_deref()),
            self.country.as_deref(),
        )
    }
}

fn field_matches(expected: Option<String>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual == Some(expected.as_str()),
    }
}

fn country_matches(expected: Option<String>, actual: Option<&str>) -> bool {
    match expected.as_deref() {
        None | Some(COUNTRY_WILDCARD) => true,
        Some(expected) => actual == Some(expected),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
