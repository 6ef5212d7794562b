//! Configuration module for the pool seeder toolkit.
//!
//! Configuration is loaded from a TOML file and validated before use. The
//! interactive prompts of the original scripts ("Do Skip Setup Operations?",
//! "Continue Operations?") are replaced by the `skip_setup` and
//! `auto_confirm` flags so scenario control flow is decoupled from a
//! terminal. The fixed team-ID offset and the platform-fee constants are
//! surfaced here rather than hardcoded; their defaults preserve the
//! observed script behavior.

use seeder_types::FeeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for a seeding run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Target chain settings.
	pub chain: ChainConfig,
	/// Transaction fee settings.
	#[serde(default)]
	pub fee: FeeSettings,
	/// Wallet addresses used by the scenario.
	pub wallets: WalletsConfig,
	/// Known contract addresses and bytecode paths.
	pub contracts: ContractsConfig,
	/// Bid-seeding parameters.
	#[serde(default)]
	pub seeding: SeedingConfig,
	/// Genesis state for the simulated chain, when it is the client.
	pub sim: Option<SimConfig>,
}

/// Target chain settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	/// Chain identifier, e.g. "localterra".
	pub chain_id: String,
	/// Which chain client implementation to use.
	#[serde(default = "default_chain_implementation")]
	pub implementation: String,
	/// Native-currency denomination.
	#[serde(default = "default_native_denom")]
	pub native_denom: String,
}

fn default_chain_implementation() -> String {
	"sim".to_string()
}

fn default_native_denom() -> String {
	"uusd".to_string()
}

/// Transaction fee settings, fixed for every submission.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeeSettings {
	#[serde(default = "default_native_denom")]
	pub gas_price_denom: String,
	#[serde(default = "default_gas_price")]
	pub gas_price: f64,
	#[serde(default = "default_gas_adjustment")]
	pub gas_adjustment: f64,
}

fn default_gas_price() -> f64 {
	0.15
}

fn default_gas_adjustment() -> f64 {
	1.75
}

impl Default for FeeSettings {
	fn default() -> Self {
		Self {
			gas_price_denom: default_native_denom(),
			gas_price: default_gas_price(),
			gas_adjustment: default_gas_adjustment(),
		}
	}
}

impl From<&FeeSettings> for FeeConfig {
	fn from(settings: &FeeSettings) -> Self {
		FeeConfig {
			gas_price_denom: settings.gas_price_denom.clone(),
			gas_price: settings.gas_price,
			gas_adjustment: settings.gas_adjustment,
		}
	}
}

/// Wallet addresses used by the scenario; keys live in the chain client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletsConfig {
	/// Deploys contracts and owns the game.
	pub admin: String,
	/// Places the bids.
	pub gamer: String,
	/// Covers balance shortfalls of the gamer.
	pub funding: String,
}

/// Known contract addresses and bytecode paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContractsConfig {
	/// CW20 minting contract address.
	pub token: String,
	/// Liquidity-pair proxy address.
	pub proxy: String,
	/// Gaming pool address; taken from the artifact cache when absent.
	pub gaming: Option<String>,
	/// Path to the gaming pool bytecode, needed when setup runs.
	pub gaming_wasm: Option<PathBuf>,
}

/// Bid-seeding parameters.
///
/// `team_id_offset` and the platform-fee fraction default to the values
/// observed in the original scripts (offset 10, fee 1301/100000); they are
/// configuration rather than business rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedingConfig {
	#[serde(default = "default_game_id")]
	pub game_id: String,
	#[serde(default = "default_pool_type")]
	pub pool_type: String,
	/// Pool entry fee in native currency, used when setup creates the pool
	/// type.
	#[serde(default = "default_pool_fee")]
	pub pool_fee: u128,
	#[serde(default = "default_max_teams")]
	pub min_teams_for_pool: u32,
	#[serde(default = "default_max_teams")]
	pub max_teams_for_pool: u32,
	#[serde(default = "default_max_teams")]
	pub max_teams_for_gamer: u32,
	/// Offset added to the current team count to derive a candidate team
	/// ID.
	#[serde(default = "default_team_id_offset")]
	pub team_id_offset: u32,
	/// Platform fee as a fraction of the pool fee, rounded up.
	#[serde(default = "default_platform_fee_numerator")]
	pub platform_fee_numerator: u128,
	#[serde(default = "default_platform_fee_denominator")]
	pub platform_fee_denominator: u128,
	/// Estimated native-currency gas cost per bid, used for provisioning.
	#[serde(default = "default_estimated_gas_native")]
	pub estimated_gas_native: u128,
	/// Run the seeding loop without asking for confirmation.
	#[serde(default)]
	pub auto_confirm: bool,
	/// Skip contract deployment and reuse cached artifacts.
	#[serde(default)]
	pub skip_setup: bool,
	/// Directory for the deployment artifact cache.
	#[serde(default = "default_artifacts_dir")]
	pub artifacts_dir: PathBuf,
}

fn default_game_id() -> String {
	"Game001".to_string()
}

fn default_pool_type() -> String {
	"MP1".to_string()
}

fn default_pool_fee() -> u128 {
	1000
}

fn default_max_teams() -> u32 {
	10_000
}

fn default_team_id_offset() -> u32 {
	10
}

fn default_platform_fee_numerator() -> u128 {
	1301
}

fn default_platform_fee_denominator() -> u128 {
	100_000
}

fn default_estimated_gas_native() -> u128 {
	351_263
}

fn default_artifacts_dir() -> PathBuf {
	PathBuf::from("artifacts")
}

impl Default for SeedingConfig {
	fn default() -> Self {
		Self {
			game_id: default_game_id(),
			pool_type: default_pool_type(),
			pool_fee: default_pool_fee(),
			min_teams_for_pool: default_max_teams(),
			max_teams_for_pool: default_max_teams(),
			max_teams_for_gamer: default_max_teams(),
			team_id_offset: default_team_id_offset(),
			platform_fee_numerator: default_platform_fee_numerator(),
			platform_fee_denominator: default_platform_fee_denominator(),
			estimated_gas_native: default_estimated_gas_native(),
			auto_confirm: false,
			skip_setup: false,
			artifacts_dir: default_artifacts_dir(),
		}
	}
}

/// A genesis native-currency balance for the simulated chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenesisBalance {
	pub address: String,
	pub amount: u128,
}

/// Genesis state for the simulated chain client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
	/// Display name for the registered token.
	#[serde(default = "default_token_name")]
	pub token_name: String,
	/// Token reserve of the registered pair proxy.
	pub pair_token_reserve: u128,
	/// Native-currency reserve of the registered pair proxy.
	pub pair_native_reserve: u128,
	/// Native balances credited at genesis.
	#[serde(default)]
	pub bank_balances: Vec<GenesisBalance>,
	/// Token balances credited at genesis.
	#[serde(default)]
	pub token_balances: Vec<GenesisBalance>,
}

fn default_token_name() -> String {
	"FURY".to_string()
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates value ranges that serde cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.seeding.platform_fee_denominator == 0 {
			return Err(ConfigError::Validation(
				"platform_fee_denominator must be non-zero".to_string(),
			));
		}
		if self.fee.gas_adjustment < 1.0 {
			return Err(ConfigError::Validation(
				"gas_adjustment must be at least 1.0".to_string(),
			));
		}
		if self.seeding.max_teams_for_pool == 0 {
			return Err(ConfigError::Validation(
				"max_teams_for_pool must be at least 1".to_string(),
			));
		}
		if let Some(sim) = &self.sim {
			if sim.pair_native_reserve == 0 {
				return Err(ConfigError::Validation(
					"pair_native_reserve must be non-zero".to_string(),
				));
			}
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let config: Config = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
		[chain]
		chain_id = "localterra"

		[wallets]
		admin = "sim1admin"
		gamer = "sim1gamer"
		funding = "sim1funding"

		[contracts]
		token = "sim1token"
		proxy = "sim1pair"
	"#;

	#[test]
	fn test_minimal_config_gets_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.chain.implementation, "sim");
		assert_eq!(config.chain.native_denom, "uusd");
		assert_eq!(config.fee.gas_price, 0.15);
		assert_eq!(config.fee.gas_adjustment, 1.75);
		assert_eq!(config.seeding.team_id_offset, 10);
		assert_eq!(config.seeding.platform_fee_numerator, 1301);
		assert_eq!(config.seeding.platform_fee_denominator, 100_000);
		assert_eq!(config.seeding.estimated_gas_native, 351_263);
		assert!(!config.seeding.auto_confirm);
		assert!(!config.seeding.skip_setup);
	}

	#[test]
	fn test_zero_fee_denominator_rejected() {
		let toml = format!(
			"{}\n[seeding]\nplatform_fee_denominator = 0\n",
			MINIMAL
		);
		let err = toml.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_gas_adjustment_below_one_rejected() {
		let toml = format!("{}\n[fee]\ngas_adjustment = 0.5\n", MINIMAL);
		let err = toml.parse::<Config>().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_sim_section_parsed() {
		let toml = format!(
			r#"{}
			[sim]
			pair_token_reserve = 5000000
			pair_native_reserve = 1000000

			[[sim.bank_balances]]
			address = "sim1funding"
			amount = 100000000000

			[[sim.token_balances]]
			address = "sim1funding"
			amount = 500000000
			"#,
			MINIMAL
		);
		let config: Config = toml.parse().unwrap();
		let sim = config.sim.unwrap();
		assert_eq!(sim.pair_token_reserve, 5_000_000);
		assert_eq!(sim.bank_balances.len(), 1);
		assert_eq!(sim.token_balances[0].amount, 500_000_000);
	}
}
