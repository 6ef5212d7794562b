//! Contract response documents for the gaming pool, token, and proxy.
//!
//! Field names and encodings follow the contracts' JSON interfaces; `Uint128`
//! values arrive as decimal strings.

use serde::{Deserialize, Serialize};

/// Response to the gaming contract's `pool_details` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDetails {
	pub pool_id: String,
	pub game_id: String,
	pub pool_type: String,
	/// How many teams are currently in the pool.
	pub current_teams_count: u32,
	pub rewards_distributed: bool,
}

/// Response to the gaming contract's `pool_type_details` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolTypeDetails {
	pub pool_type: String,
	/// Entry fee per team, quoted in the native currency.
	#[serde(with = "crate::utils::uint128_str")]
	pub pool_fee: u128,
	pub min_teams_for_pool: u32,
	pub max_teams_for_pool: u32,
	pub max_teams_for_gamer: u32,
}

/// Response to the gaming contract's `game_details` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetails {
	pub game_id: String,
	pub game_status: u32,
}

/// One side of the proxy pair's reserves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairAsset {
	#[serde(with = "crate::utils::uint128_str")]
	pub amount: u128,
}

/// Response to the proxy contract's `{pool: {}}` query.
///
/// `assets[0]` holds the token reserve and `assets[1]` the native-currency
/// reserve; their ratio is the token/native exchange rate at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairReserves {
	pub assets: Vec<PairAsset>,
}

impl PairReserves {
	/// Token units per native unit, or `None` when either reserve is
	/// missing or the native side is empty.
	pub fn rate(&self) -> Option<f64> {
		let token = self.assets.first()?.amount;
		let native = self.assets.get(1)?.amount;
		if native == 0 {
			return None;
		}
		Some(token as f64 / native as f64)
	}
}

/// Response to the token contract's `balance` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
	#[serde(with = "crate::utils::uint128_str")]
	pub balance: u128,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pair_rate() {
		let reserves = PairReserves {
			assets: vec![PairAsset { amount: 5_000_000 }, PairAsset { amount: 1_000_000 }],
		};
		assert_eq!(reserves.rate(), Some(5.0));
	}

	#[test]
	fn test_pair_rate_empty_native_side() {
		let reserves = PairReserves {
			assets: vec![PairAsset { amount: 5_000_000 }, PairAsset { amount: 0 }],
		};
		assert_eq!(reserves.rate(), None);
	}

	#[test]
	fn test_pool_type_details_wire_format() {
		let json = r#"{
			"pool_type": "MP1",
			"pool_fee": "1000",
			"min_teams_for_pool": 10,
			"max_teams_for_pool": 100,
			"max_teams_for_gamer": 5
		}"#;
		let details: PoolTypeDetails = serde_json::from_str(json).unwrap();
		assert_eq!(details.pool_fee, 1000);
		assert_eq!(details.max_teams_for_pool, 100);
	}
}
