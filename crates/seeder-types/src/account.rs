//! Wallet, address, and coin primitives.
//!
//! Addresses are opaque bech32 strings; key material never appears here.
//! Signing happens behind the chain client, so a wallet is identified to
//! the rest of the system by its address alone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A bech32 account or contract address on the target chain.
///
/// The seeder never validates or decodes addresses; they are passed through
/// to the chain client and the contracts as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
	/// Returns the address as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Address {
	fn from(s: &str) -> Self {
		Address(s.to_string())
	}
}

impl From<String> for Address {
	fn from(s: String) -> Self {
		Address(s)
	}
}

/// A wallet known to the chain client.
///
/// The client holds the signing key for this address; the seeder only ever
/// names the wallet as a transaction sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
	/// The wallet's account address.
	pub address: Address,
}

impl Wallet {
	/// Creates a wallet handle for the given address.
	pub fn new(address: impl Into<Address>) -> Self {
		Self {
			address: address.into(),
		}
	}
}

/// A native-currency amount in a specific denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
	/// Denomination label, e.g. "uusd".
	pub denom: String,
	/// Amount in the smallest unit of the denomination.
	#[serde(with = "crate::utils::uint128_str")]
	pub amount: u128,
}

impl Coin {
	/// Creates a coin of the given denomination and amount.
	pub fn new(denom: impl Into<String>, amount: u128) -> Self {
		Self {
			denom: denom.into(),
			amount,
		}
	}
}

impl fmt::Display for Coin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.amount, self.denom)
	}
}
