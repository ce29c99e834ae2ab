//! # Tarifa Quote CLI
//!
//! Prints itemized booking quotes as JSON.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          tarifa-quote                                   │
//! │                                                                         │
//! │  tarifa.toml + TARIFA_* ──► QuoteConfig ──► tarifa-core ──► stdout     │
//! │                                                  │          (JSON)      │
//! │                                                  ▼                      │
//! │                                               stderr                    │
//! │                                              (tracing)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Examples
//! ```text
//! tarifa-quote sliding 1200
//! tarifa-quote sliding 350 --vat-rate 0.08
//! tarifa-quote visit --total 200 --provider 150
//! tarifa-quote resolve --funding debit --country MX
//! tarifa-quote --config ./tarifa.toml policy
//! ```

mod config;
mod error;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tarifa_core::{
    compute_pricing, compute_visit_preauth, CardInfo, PricingInput, PricingOverrides,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::QuoteConfig;
use crate::error::QuoteResult;

// =============================================================================
// Command Line
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "tarifa-quote", version, about = "Itemized booking quotes")]
struct Cli {
    /// Pricing policy file (defaults to the platform config dir)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quote a provider price through the sliding engine
    Sliding {
        /// Provider price, pesos
        #[arg(allow_negative_numbers = true)]
        price: Decimal,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Split the fixed-price visit product
    Visit {
        /// Customer total, pesos
        #[arg(long)]
        total: Option<Decimal>,

        /// Provider share, pesos
        #[arg(long)]
        provider: Option<Decimal>,
    },

    /// Show which processing-fee rule a card falls under
    Resolve {
        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        funding: Option<String>,

        /// ISO country code
        #[arg(long)]
        country: Option<String>,
    },

    /// Print the effective policy as TOML
    Policy,
}

/// Per-call policy overrides for the sliding engine.
#[derive(clap::Args, Debug, Default)]
struct OverrideArgs {
    #[arg(long)]
    alpha_max: Option<f64>,
    #[arg(long)]
    alpha_min: Option<f64>,
    #[arg(long)]
    alpha_p0: Option<f64>,
    #[arg(long)]
    alpha_gamma: Option<f64>,
    #[arg(long)]
    beta: Option<Decimal>,
    #[arg(long)]
    vat_rate: Option<Decimal>,
    #[arg(long)]
    stripe_fixed: Option<Decimal>,
    #[arg(long)]
    stripe_fee_vat_rate: Option<Decimal>,
}

impl From<OverrideArgs> for PricingOverrides {
    fn from(args: OverrideArgs) -> Self {
        PricingOverrides {
            alpha_max: args.alpha_max,
            alpha_min: args.alpha_min,
            alpha_p0: args.alpha_p0,
            alpha_gamma: args.alpha_gamma,
            beta: args.beta,
            vat_rate: args.vat_rate,
            stripe_fixed: args.stripe_fixed,
            stripe_fee_vat_rate: args.stripe_fee_vat_rate,
        }
    }
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> QuoteResult<()> {
    // Logs on stderr, JSON on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    run(cli).map_err(|e| {
        error!(error = %e, "Quote failed");
        e
    })
}

fn run(cli: Cli) -> QuoteResult<()> {
    let config = QuoteConfig::load(cli.config)?;

    match cli.command {
        Command::Sliding { price, overrides } => {
            let input = PricingInput::new(price).with_overrides(overrides.into());
            let result = compute_pricing(&input, &config.pricing)?;
            info!(total_cents = result.total_amount_cents, "Sliding quote computed");
            print_json(&result)
        }
        Command::Visit { total, provider } => {
            let mut visit = config.visit;
            if let Some(total) = total {
                visit.total_pesos = total;
            }
            if let Some(provider) = provider {
                visit.provider_pesos = provider;
            }
            let result = compute_visit_preauth(&visit)?;
            info!(
                booking_cents = result.booking_fee_amount_cents,
                "Visit split computed"
            );
            print_json(&result)
        }
        Command::Resolve {
            brand,
            funding,
            country,
        } => {
            let card = CardInfo {
                brand,
                funding,
                country,
            };
            let rule = config.processing_fees.rules.resolve(&card);
            info!(rule = %rule.id, "Processing-fee rule resolved");
            print_json(rule)
        }
        Command::Policy => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> QuoteResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sliding_with_overrides() {
        let cli = Cli::parse_from(["tarifa-quote", "sliding", "350", "--vat-rate", "0.08"]);
        match cli.command {
            Command::Sliding { price, overrides } => {
                assert_eq!(price, dec!(350));
                let overrides: PricingOverrides = overrides.into();
                assert_eq!(overrides.vat_rate, Some(dec!(0.08)));
                assert_eq!(overrides.beta, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_negative_price() {
        let cli = Cli::parse_from(["tarifa-quote", "sliding", "-5"]);
        assert!(matches!(cli.command, Command::Sliding { price, .. } if price == dec!(-5)));
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["tarifa-quote", "visit", "--config", "/tmp/t.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
    }
}
