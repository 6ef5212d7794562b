//! Main entry point for the pool seeder service.
//!
//! This binary runs the bid-seeding workflow against a gaming pool
//! contract: deploy (or rediscover) the pool, provision the gamer wallet,
//! and fill the pool with bids. The chain behind it is selected by
//! configuration; the in-process simulated chain is the only client wired
//! in here.

use clap::Parser;
use seeder_config::Config;
use seeder_contract::ContractClient;
use seeder_delivery::implementations::sim::SimChain;
use seeder_delivery::DeliveryService;
use seeder_types::{Address, FeeConfig};
use std::path::PathBuf;
use std::sync::Arc;

mod scenario;

use scenario::Scenario;

/// Command-line arguments for the pool seeder.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	tracing::info!("Started pool seeder");

	execute(&args).await;
}

/// Runs the workflow and reports the outcome.
///
/// Failures are logged, never rethrown; the process exits zero either way.
async fn execute(args: &Args) {
	if let Err(e) = run(args).await {
		tracing::error!("Seeding run failed: {}", e);
	}
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.chain.chain_id);

	let delivery = build_delivery(&config).await?;
	let client = ContractClient::new(delivery.clone(), FeeConfig::from(&config.fee));
	let scenario = Scenario::new(config, client);

	let result = scenario.run().await;

	// Gas is reported whether the run succeeded or not.
	tracing::info!(gas_used = delivery.gas_used(), "total gas consumed");

	let outcome = result?;
	tracing::info!(
		contract = outcome.deployment.gaming,
		pool_id = outcome.deployment.pool_id,
		"Stopped pool seeder"
	);
	Ok(())
}

/// Builds the delivery gateway for the configured chain implementation.
async fn build_delivery(config: &Config) -> Result<Arc<DeliveryService>, Box<dyn std::error::Error>> {
	match config.chain.implementation.as_str() {
		"sim" => {
			let genesis = config
				.sim
				.as_ref()
				.ok_or("a [sim] section is required for the sim chain implementation")?;

			let chain = Arc::new(SimChain::new());
			chain
				.register_pair(
					&Address::from(config.contracts.proxy.as_str()),
					genesis.pair_token_reserve,
					genesis.pair_native_reserve,
				)
				.await;
			chain
				.register_token(
					&Address::from(config.contracts.token.as_str()),
					&genesis.token_name,
					genesis
						.token_balances
						.iter()
						.map(|b| (Address::from(b.address.as_str()), b.amount))
						.collect(),
				)
				.await;
			for balance in &genesis.bank_balances {
				chain
					.set_bank_balance(
						&Address::from(balance.address.as_str()),
						&config.chain.native_denom,
						balance.amount,
					)
					.await;
			}

			Ok(Arc::new(DeliveryService::new(chain)))
		}
		other => Err(format!("unknown chain implementation: {}", other).into()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args_for(config: &std::path::Path) -> Args {
		Args {
			config: config.to_path_buf(),
			log_level: "info".to_string(),
		}
	}

	async fn failing_config(dir: &std::path::Path) -> PathBuf {
		// skip_setup with an empty artifact cache makes the scenario fail.
		let path = dir.join("config.toml");
		let toml = format!(
			r#"
			[chain]
			chain_id = "localterra"

			[wallets]
			admin = "sim1admin"
			gamer = "sim1gamer"
			funding = "sim1funding"

			[contracts]
			token = "sim1token"
			proxy = "sim1pair"

			[seeding]
			skip_setup = true
			artifacts_dir = "{artifacts}"

			[sim]
			pair_token_reserve = 5000000
			pair_native_reserve = 1000000
			"#,
			artifacts = dir.join("artifacts").display(),
		);
		tokio::fs::write(&path, toml).await.unwrap();
		path
	}

	#[tokio::test]
	async fn test_failed_run_is_logged_not_rethrown() {
		let dir = tempfile::tempdir().unwrap();
		let config = failing_config(dir.path()).await;

		// The underlying run fails...
		let err = run(&args_for(&config)).await.unwrap_err();
		assert!(err.to_string().contains("no cached deployment"));

		// ...but the entry point swallows it, so the process exits zero.
		execute(&args_for(&config)).await;
	}

	#[tokio::test]
	async fn test_unknown_implementation_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let config = failing_config(dir.path()).await;
		let toml = tokio::fs::read_to_string(&config).await.unwrap();
		tokio::fs::write(
			&config,
			toml.replace("[chain]", "[chain]\nimplementation = \"lcd\""),
		)
		.await
		.unwrap();

		let err = run(&args_for(&config)).await.unwrap_err();
		assert!(err.to_string().contains("unknown chain implementation"));
	}
}
