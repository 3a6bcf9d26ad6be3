use crate::billing::GatewayConfig;
use crate::billing::stripe::DEFAULT_API_BASE;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay ticket purchases against a concert catalog
#[derive(Parser, Debug)]
#[command(name = "ticket-inventory-engine")]
#[command(about = "Replay ticket purchases against a concert catalog", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing purchase requests
    #[arg(value_name = "PURCHASES", help = "Path to the purchases CSV file")]
    pub purchases_file: PathBuf,

    /// Concert catalog CSV file
    #[arg(
        long = "concerts",
        value_name = "FILE",
        help = "Path to the concerts CSV file"
    )]
    pub concerts_file: PathBuf,

    /// Where to write the placed orders
    #[arg(
        long = "orders",
        value_name = "FILE",
        help = "Write placed orders to this CSV file"
    )]
    pub orders_file: Option<PathBuf>,

    /// Processing strategy to use for purchases
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of purchase requests per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of purchase requests per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of purchases in flight (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of purchases processing concurrently (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Payment gateway charged for purchases
    #[arg(
        long = "gateway",
        value_name = "GATEWAY",
        default_value = "fake",
        help = "Payment gateway: 'fake' for test tokens or 'stripe'"
    )]
    pub gateway: GatewayType,

    #[arg(
        long = "stripe-secret",
        value_name = "KEY",
        env = "STRIPE_SECRET",
        hide_env_values = true,
        help = "Stripe secret key (required with --gateway stripe)"
    )]
    pub stripe_secret: Option<String>,

    #[arg(
        long = "stripe-api-base",
        value_name = "URL",
        env = "STRIPE_API_BASE",
        default_value = DEFAULT_API_BASE,
        help = "Stripe API base URL"
    )]
    pub stripe_api_base: String,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available payment gateways
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GatewayType {
    Fake,
    Stripe,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values are rejected by
    /// `BatchConfig::new` with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent.unwrap_or(default.max_concurrent),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a GatewayConfig from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error message when the Stripe gateway is selected without a
    /// secret key.
    pub fn to_gateway_config(&self) -> Result<GatewayConfig, String> {
        match self.gateway {
            GatewayType::Fake => Ok(GatewayConfig::Fake),
            GatewayType::Stripe => {
                let secret_key = self
                    .stripe_secret
                    .clone()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| {
                        "The stripe gateway requires --stripe-secret or STRIPE_SECRET".to_string()
                    })?;
                Ok(GatewayConfig::Stripe {
                    secret_key,
                    api_base: self.stripe_api_base.clone(),
                })
            }
        }
    }
}
