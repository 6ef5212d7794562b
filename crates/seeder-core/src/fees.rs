//! Fee arithmetic shared by planner and orchestrator.

/// Ceiling division for u128 amounts.
fn ceil_div(numerator: u128, denominator: u128) -> u128 {
	numerator.div_ceil(denominator)
}

/// Flat platform fee for a bid: `ceil(pool_fee * numerator / denominator)`.
///
/// The default 1301/100000 fraction approximates the chain's gas-and-
/// platform fee as a fixed share of the pool fee.
pub fn platform_fee(pool_fee: u128, numerator: u128, denominator: u128) -> u128 {
	ceil_div(pool_fee * numerator, denominator)
}

/// Token cost of one bid at the given token/native exchange rate, rounded
/// up to a whole token unit.
pub fn token_fee(pool_fee: u128, rate: f64) -> u128 {
	(pool_fee as f64 * rate).ceil() as u128
}

/// Amount missing from `balance` to cover `planned * per_unit_cost`, or
/// zero when the balance already suffices.
pub fn shortfall(balance: u128, planned: u128, per_unit_cost: u128) -> u128 {
	(planned * per_unit_cost).saturating_sub(balance)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_platform_fee_rounds_up() {
		// 1000 * 1301 / 100000 = 13.01 -> 14
		assert_eq!(platform_fee(1000, 1301, 100_000), 14);
		// Exact division does not round.
		assert_eq!(platform_fee(100_000, 1301, 100_000), 1301);
		assert_eq!(platform_fee(0, 1301, 100_000), 0);
	}

	#[test]
	fn test_token_fee_rounds_up() {
		assert_eq!(token_fee(1000, 5.0), 5000);
		assert_eq!(token_fee(1000, 5.0001), 5001);
		assert_eq!(token_fee(0, 5.0), 0);
	}

	#[test]
	fn test_shortfall() {
		assert_eq!(shortfall(0, 10_000, 5000), 50_000_000);
		assert_eq!(shortfall(49_999_999, 10_000, 5000), 1);
		// Sufficient balance yields no shortfall.
		assert_eq!(shortfall(50_000_000, 10_000, 5000), 0);
		assert_eq!(shortfall(60_000_000, 10_000, 5000), 0);
		// Zero planned bids never need funds.
		assert_eq!(shortfall(0, 0, 5000), 0);
	}
}
