//! Balance sufficiency planning and top-up transfers.
//!
//! Before a seeding run, the planner checks whether the gamer wallet can
//! cover the full planned batch in each currency independently. When a
//! balance falls short, exactly one top-up transfer closes the entire gap;
//! there is no partial-fill logic. The token/native exchange rate is read
//! from the pair proxy at planning time and may shift before the transfer
//! executes; that race is an accepted limitation of the scripts this
//! reimplements.

use crate::{fees, SeedError};
use seeder_config::SeedingConfig;
use seeder_contract::ContractClient;
use seeder_types::{Address, Coin, PairReserves, Wallet};

/// The per-bid costs and computed shortfalls for a planned batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingPlan {
	/// Bids the plan covers.
	pub planned_bids: u32,
	/// Token cost of one bid at the sampled exchange rate.
	pub token_fee_per_bid: u128,
	/// Native-currency cost of one bid (estimated gas plus platform fee).
	pub native_fee_per_bid: u128,
	/// Tokens missing from the target wallet, zero when sufficient.
	pub token_shortfall: u128,
	/// Native currency missing from the target wallet, zero when
	/// sufficient.
	pub native_shortfall: u128,
}

impl FundingPlan {
	/// Whether the target wallet already covers the whole batch.
	pub fn is_sufficient(&self) -> bool {
		self.token_shortfall == 0 && self.native_shortfall == 0
	}
}

/// Computes funding plans and issues top-up transfers.
pub struct FundingPlanner {
	client: ContractClient,
	/// CW20 token paid as the bid amount.
	token: Address,
	/// Pair proxy queried for the exchange rate.
	proxy: Address,
	/// Native-currency denomination.
	native_denom: String,
}

impl FundingPlanner {
	/// Creates a planner over the given contract client and contracts.
	pub fn new(
		client: ContractClient,
		token: Address,
		proxy: Address,
		native_denom: impl Into<String>,
	) -> Self {
		Self {
			client,
			token,
			proxy,
			native_denom: native_denom.into(),
		}
	}

	/// Sizes the batch: samples the exchange rate, derives per-bid costs,
	/// and compares `planned_bids x cost` against the target's balances in
	/// each currency independently.
	pub async fn plan(
		&self,
		target: &Address,
		planned_bids: u32,
		seeding: &SeedingConfig,
	) -> Result<FundingPlan, SeedError> {
		let reserves: PairReserves = self
			.client
			.query(&self.proxy, &serde_json::json!({ "pool": {} }))
			.await?;
		let rate = reserves
			.rate()
			.ok_or_else(|| SeedError::Rate("pair reserves are empty".to_string()))?;

		let token_fee_per_bid = fees::token_fee(seeding.pool_fee, rate);
		let native_fee_per_bid = seeding.estimated_gas_native
			+ fees::platform_fee(
				seeding.pool_fee,
				seeding.platform_fee_numerator,
				seeding.platform_fee_denominator,
			);

		let token_balance = self.client.token_balance(&self.token, target).await?;
		let native_balance = self
			.client
			.bank_balance(target, &self.native_denom)
			.await?;

		tracing::info!(
			wallet = %target,
			token_balance,
			native_balance,
			token_fee_per_bid,
			native_fee_per_bid,
			rate,
			"funding plan"
		);

		Ok(FundingPlan {
			planned_bids,
			token_fee_per_bid,
			native_fee_per_bid,
			token_shortfall: fees::shortfall(
				token_balance,
				planned_bids.into(),
				token_fee_per_bid,
			),
			native_shortfall: fees::shortfall(
				native_balance,
				planned_bids.into(),
				native_fee_per_bid,
			),
		})
	}

	/// Issues the top-up transfers a plan calls for: at most one token
	/// transfer and one native bank send, each for the exact shortfall.
	pub async fn ensure_funded(
		&self,
		funding: &Wallet,
		target: &Address,
		plan: &FundingPlan,
	) -> Result<(), SeedError> {
		if plan.is_sufficient() {
			tracing::info!(wallet = %target, "wallet already funded for the planned batch");
			return Ok(());
		}

		if plan.token_shortfall > 0 {
			tracing::info!(
				shortfall = plan.token_shortfall,
				"more tokens required for bid fees than available in wallet"
			);
			self.client
				.transfer_token(funding, &self.token, target, plan.token_shortfall)
				.await?;
		}

		if plan.native_shortfall > 0 {
			tracing::info!(
				shortfall = plan.native_shortfall,
				"more native currency required for gas and platform fees than available in wallet"
			);
			self.client
				.bank_send(
					funding,
					target,
					vec![Coin::new(self.native_denom.clone(), plan.native_shortfall)],
					"Initial Funding!",
				)
				.await?;
		}

		Ok(())
	}

	/// Plans and funds a batch in one step, returning the plan.
	pub async fn provision(
		&self,
		funding: &Wallet,
		target: &Address,
		planned_bids: u32,
		seeding: &SeedingConfig,
	) -> Result<FundingPlan, SeedError> {
		let plan = self.plan(target, planned_bids, seeding).await?;
		self.ensure_funded(funding, target, &plan).await?;
		Ok(plan)
	}
}
