//! The end-to-end seeding scenario.
//!
//! A scenario ties the components together in the order the workflow
//! requires: deploy or rediscover the gaming pool, provision the gamer
//! wallet, then run the bid loop. Setup results are cached as artifacts so
//! a rerun with `skip_setup` picks up the same deployment instead of
//! creating a new one. The `auto_confirm` flag gates the seeding loop
//! itself; without it the scenario stops after provisioning and reports
//! what a confirmed run would do.

use seeder_config::Config;
use seeder_contract::{ContractClient, ContractError};
use seeder_core::{BidOrchestrator, BidSettings, FundingPlanner, SeedError, SeedReport};
use seeder_storage::{ArtifactStore, StorageError};
use seeder_types::{Address, Wallet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Artifact name under which the deployment is cached.
const DEPLOYMENT_ARTIFACT: &str = "gaming_pool";

/// Errors that can occur while running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
	/// The configuration names resources the scenario cannot use.
	#[error("Setup error: {0}")]
	Setup(String),
	/// Error propagated from a contract operation.
	#[error("Contract error: {0}")]
	Contract(#[from] ContractError),
	/// Error propagated from planning or bidding.
	#[error("Seeding error: {0}")]
	Seed(#[from] SeedError),
	/// Error writing a deployment artifact.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
}

/// Cached result of a contract deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
	/// Gaming pool contract address.
	pub gaming: String,
	/// Code ID the pool was instantiated from.
	pub code_id: u64,
	/// Pool created during setup.
	pub pool_id: String,
}

/// Outcome of a scenario run.
#[derive(Debug)]
pub struct ScenarioOutcome {
	/// The deployment the run used, freshly created or rediscovered.
	pub deployment: Deployment,
	/// Bid loop result; `None` when seeding was not confirmed.
	pub report: Option<SeedReport>,
}

/// The seeding workflow over one gaming pool.
pub struct Scenario {
	config: Config,
	client: ContractClient,
	store: ArtifactStore,
}

impl Scenario {
	/// Creates a scenario from validated configuration and a contract
	/// client bound to the target chain.
	pub fn new(config: Config, client: ContractClient) -> Self {
		let store = ArtifactStore::new(config.seeding.artifacts_dir.clone());
		Self {
			config,
			client,
			store,
		}
	}

	/// Runs the workflow: setup (or artifact rediscovery), provisioning,
	/// and, when confirmed, the bid loop.
	pub async fn run(&self) -> Result<ScenarioOutcome, ScenarioError> {
		let admin = Wallet::new(self.config.wallets.admin.as_str());
		let gamer = Wallet::new(self.config.wallets.gamer.as_str());
		let funding = Wallet::new(self.config.wallets.funding.as_str());

		let deployment = if self.config.seeding.skip_setup {
			self.rediscover().await?
		} else {
			self.deploy(&admin).await?
		};
		let game = Address::from(deployment.gaming.as_str());

		let planner = FundingPlanner::new(
			self.client.clone(),
			Address::from(self.config.contracts.token.as_str()),
			Address::from(self.config.contracts.proxy.as_str()),
			self.config.chain.native_denom.as_str(),
		);
		let plan = planner
			.provision(
				&funding,
				&gamer.address,
				self.config.seeding.max_teams_for_pool,
				&self.config.seeding,
			)
			.await?;
		tracing::info!(
			planned_bids = plan.planned_bids,
			token_fee_per_bid = plan.token_fee_per_bid,
			native_fee_per_bid = plan.native_fee_per_bid,
			"wallet provisioned"
		);

		if !self.config.seeding.auto_confirm {
			tracing::warn!(
				"seeding not confirmed; set seeding.auto_confirm to run the bid loop"
			);
			return Ok(ScenarioOutcome {
				deployment,
				report: None,
			});
		}

		let orchestrator = BidOrchestrator::new(
			self.client.clone(),
			game,
			deployment.pool_id.clone(),
			gamer,
			BidSettings {
				team_id_offset: self.config.seeding.team_id_offset,
				platform_fee_numerator: self.config.seeding.platform_fee_numerator,
				platform_fee_denominator: self.config.seeding.platform_fee_denominator,
				native_denom: self.config.chain.native_denom.clone(),
			},
		);
		let report = orchestrator.run().await?;
		tracing::info!(
			bids_placed = report.bids_placed,
			pool_full = report.pool_full,
			"seeding run complete"
		);

		Ok(ScenarioOutcome {
			deployment,
			report: Some(report),
		})
	}

	/// Deploys the gaming pool, configures the pool type, creates the pool,
	/// and caches the deployment artifact.
	async fn deploy(&self, admin: &Wallet) -> Result<Deployment, ScenarioError> {
		let wasm_path = self.config.contracts.gaming_wasm.as_ref().ok_or_else(|| {
			ScenarioError::Setup(
				"contracts.gaming_wasm is required unless seeding.skip_setup is set".to_string(),
			)
		})?;

		let code_id = self.client.store_code(admin, wasm_path).await?;
		tracing::info!(code_id, "gaming pool bytecode uploaded");

		let seeding = &self.config.seeding;
		let gaming = self
			.client
			.instantiate(
				admin,
				code_id,
				&serde_json::json!({
					"game_id": seeding.game_id,
					"minting_contract_address": self.config.contracts.token,
					"astro_proxy_address": self.config.contracts.proxy,
					"admin_address": admin.address.as_str(),
				}),
			)
			.await?;
		tracing::info!(contract = %gaming, "gaming pool instantiated");

		self.client
			.execute(
				admin,
				&gaming,
				&serde_json::json!({ "set_pool_type_params": {
					"pool_type": seeding.pool_type,
					"pool_fee": seeding.pool_fee.to_string(),
					"min_teams_for_pool": seeding.min_teams_for_pool,
					"max_teams_for_pool": seeding.max_teams_for_pool,
					"max_teams_for_gamer": seeding.max_teams_for_gamer,
					"wallet_percentages": [],
				}}),
				&[],
			)
			.await?;

		let result = self
			.client
			.execute(
				admin,
				&gaming,
				&serde_json::json!({ "create_pool": { "pool_type": seeding.pool_type } }),
				&[],
			)
			.await?;
		let pool_id = result
			.event_attr("wasm", "pool_id")
			.ok_or(ContractError::MissingEvent {
				event: "wasm",
				attribute: "pool_id",
			})?
			.to_string();
		tracing::info!(pool_id, "pool created");

		let deployment = Deployment {
			gaming: gaming.as_str().to_string(),
			code_id,
			pool_id,
		};
		self.store.write(DEPLOYMENT_ARTIFACT, &deployment).await?;

		Ok(deployment)
	}

	/// Rediscovers a previous deployment from configuration and the
	/// artifact cache.
	async fn rediscover(&self) -> Result<Deployment, ScenarioError> {
		let cached: Option<Deployment> = self.store.read_typed(DEPLOYMENT_ARTIFACT).await;

		// A configured address overrides the cache; the pool ID still comes
		// from the artifact.
		match (&self.config.contracts.gaming, cached) {
			(Some(gaming), Some(mut deployment)) => {
				deployment.gaming = gaming.clone();
				Ok(deployment)
			}
			(None, Some(deployment)) => {
				tracing::info!(
					contract = deployment.gaming,
					pool_id = deployment.pool_id,
					"reusing cached deployment"
				);
				Ok(deployment)
			}
			(_, None) => Err(ScenarioError::Setup(
				"skip_setup is set but no cached deployment was found".to_string(),
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use seeder_config::Config;
	use seeder_delivery::implementations::sim::SimChain;
	use seeder_delivery::DeliveryService;
	use seeder_types::FeeConfig;
	use std::sync::Arc;

	fn test_config(dir: &std::path::Path, max_teams: u32, auto_confirm: bool) -> Config {
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
			gaming_wasm = "{wasm}"

			[seeding]
			max_teams_for_pool = {max_teams}
			min_teams_for_pool = 1
			max_teams_for_gamer = {max_teams}
			auto_confirm = {auto_confirm}
			artifacts_dir = "{artifacts}"
			"#,
			wasm = dir.join("gaming_pool.wasm").display(),
			artifacts = dir.join("artifacts").display(),
			max_teams = max_teams,
			auto_confirm = auto_confirm,
		);
		toml.parse().unwrap()
	}

	async fn seeded_chain(config: &Config) -> Arc<SimChain> {
		let chain = Arc::new(SimChain::new());
		chain
			.register_pair(
				&Address::from(config.contracts.proxy.as_str()),
				5_000_000,
				1_000_000,
			)
			.await;
		chain
			.register_token(
				&Address::from(config.contracts.token.as_str()),
				"FURY",
				vec![(Address::from("sim1funding"), 100_000_000_000)],
			)
			.await;
		chain
			.set_bank_balance(&Address::from("sim1funding"), "uusd", 100_000_000_000_000)
			.await;
		chain
	}

	fn scenario_over(config: Config, chain: Arc<SimChain>) -> Scenario {
		let delivery = Arc::new(DeliveryService::new(chain));
		let client = ContractClient::new(delivery, FeeConfig::default());
		Scenario::new(config, client)
	}

	#[tokio::test]
	async fn test_full_run_deploys_funds_and_seeds() {
		let dir = tempfile::tempdir().unwrap();
		tokio::fs::write(dir.path().join("gaming_pool.wasm"), b"\0asm")
			.await
			.unwrap();
		let config = test_config(dir.path(), 3, true);
		let chain = seeded_chain(&config).await;

		let scenario = scenario_over(config, chain.clone());
		let outcome = scenario.run().await.unwrap();

		let report = outcome.report.unwrap();
		assert_eq!(report.bids_placed, 3);
		assert!(report.pool_full);

		// Three 5000-token bids landed in the pool contract.
		assert_eq!(
			chain
				.token_balance(
					&Address::from("sim1token"),
					&Address::from(outcome.deployment.gaming.as_str()),
				)
				.await,
			15_000
		);
	}

	#[tokio::test]
	async fn test_unconfirmed_run_stops_after_provisioning() {
		let dir = tempfile::tempdir().unwrap();
		tokio::fs::write(dir.path().join("gaming_pool.wasm"), b"\0asm")
			.await
			.unwrap();
		let config = test_config(dir.path(), 3, false);
		let chain = seeded_chain(&config).await;

		let scenario = scenario_over(config, chain.clone());
		let outcome = scenario.run().await.unwrap();

		assert!(outcome.report.is_none());
		// The gamer wallet was still provisioned for 3 bids.
		assert_eq!(
			chain
				.token_balance(&Address::from("sim1token"), &Address::from("sim1gamer"))
				.await,
			15_000
		);
		// No bids reached the pool.
		assert_eq!(
			chain
				.token_balance(
					&Address::from("sim1token"),
					&Address::from(outcome.deployment.gaming.as_str()),
				)
				.await,
			0
		);
	}

	#[tokio::test]
	async fn test_skip_setup_reuses_cached_deployment() {
		let dir = tempfile::tempdir().unwrap();
		tokio::fs::write(dir.path().join("gaming_pool.wasm"), b"\0asm")
			.await
			.unwrap();
		let config = test_config(dir.path(), 2, true);
		let chain = seeded_chain(&config).await;

		// First run deploys and fills the pool.
		let scenario = scenario_over(config.clone(), chain.clone());
		let first = scenario.run().await.unwrap();
		assert_eq!(first.report.unwrap().bids_placed, 2);

		// Second run with skip_setup finds the same, already full pool.
		let mut rerun_config = config;
		rerun_config.seeding.skip_setup = true;
		let scenario = scenario_over(rerun_config, chain);
		let second = scenario.run().await.unwrap();

		assert_eq!(second.deployment.gaming, first.deployment.gaming);
		assert_eq!(second.deployment.pool_id, first.deployment.pool_id);
		let report = second.report.unwrap();
		assert_eq!(report.bids_placed, 0);
		assert!(report.pool_full);
	}

	#[tokio::test]
	async fn test_skip_setup_without_artifact_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let mut config = test_config(dir.path(), 2, true);
		config.seeding.skip_setup = true;
		let chain = seeded_chain(&config).await;

		let err = scenario_over(config, chain).run().await.unwrap_err();
		assert!(matches!(err, ScenarioError::Setup(_)));
	}
}
