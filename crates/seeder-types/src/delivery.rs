//! Chain messages, transaction requests, and broadcast results.
//!
//! These types mirror the wasm/bank message set accepted by the chain and
//! the shape of a broadcast response. A transaction is an ordered list of
//! messages signed by a single sender and submitted atomically.

use crate::account::{Address, Coin};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single message inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainMsg {
	/// Upload contract bytecode; the chain assigns a code ID.
	StoreCode {
		sender: Address,
		wasm_byte_code: Vec<u8>,
	},
	/// Instantiate a contract from an uploaded code ID.
	Instantiate {
		sender: Address,
		admin: Option<Address>,
		code_id: u64,
		msg: Value,
	},
	/// Execute a message on a deployed contract, optionally attaching funds.
	Execute {
		sender: Address,
		contract: Address,
		msg: Value,
		funds: Vec<Coin>,
	},
	/// Migrate a contract to a new code ID.
	Migrate {
		sender: Address,
		contract: Address,
		new_code_id: u64,
		msg: Value,
	},
	/// Move native coins between accounts.
	BankSend {
		from: Address,
		to: Address,
		amount: Vec<Coin>,
	},
}

/// An ordered batch of messages to be signed and broadcast as one
/// transaction.
///
/// A request must carry at least one message; the delivery service rejects
/// empty requests before they reach the chain client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxRequest {
	/// The wallet whose key signs the transaction.
	pub sender: Address,
	/// Messages executed in order within the transaction.
	pub msgs: Vec<ChainMsg>,
	/// Optional transaction memo.
	pub memo: Option<String>,
}

impl TxRequest {
	/// Creates a request with the given sender and messages.
	pub fn new(sender: Address, msgs: Vec<ChainMsg>) -> Self {
		Self {
			sender,
			msgs,
			memo: None,
		}
	}

	/// Attaches a memo to the request.
	pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
		self.memo = Some(memo.into());
		self
	}
}

/// Fee settings applied to every submitted transaction.
///
/// Fees are fixed per call: a gas price in a single denomination and an
/// adjustment multiplier. No dynamic fee estimation is performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
	/// Denomination the gas price is quoted in.
	pub gas_price_denom: String,
	/// Price per unit of gas.
	pub gas_price: f64,
	/// Multiplier applied to the simulated gas amount.
	pub gas_adjustment: f64,
}

impl Default for FeeConfig {
	fn default() -> Self {
		Self {
			gas_price_denom: "uusd".to_string(),
			gas_price: 0.15,
			gas_adjustment: 1.75,
		}
	}
}

/// A key/value attribute attached to a transaction event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxAttribute {
	pub key: String,
	pub value: String,
}

/// An event emitted by a message during transaction execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxEvent {
	/// Event type, e.g. "store_code" or "instantiate".
	#[serde(rename = "type")]
	pub kind: String,
	pub attributes: Vec<TxAttribute>,
}

/// The event log of one message inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxLog {
	pub events: Vec<TxEvent>,
}

/// The chain's response to a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxResult {
	/// Transaction hash.
	pub txhash: String,
	/// Result code; zero means success.
	pub code: u32,
	/// Module namespace of the result code.
	pub codespace: String,
	/// Raw log string reported by the chain.
	pub raw_log: String,
	/// Gas consumed by the transaction.
	pub gas_used: u64,
	/// Per-message event logs, present on success.
	pub logs: Vec<TxLog>,
}

impl TxResult {
	/// Whether the chain reported a failure for this transaction.
	pub fn is_error(&self) -> bool {
		self.code != 0
	}

	/// Looks up the first attribute value for an event type across all
	/// message logs, e.g. `event_attr("store_code", "code_id")`.
	pub fn event_attr(&self, event_type: &str, key: &str) -> Option<&str> {
		self.logs
			.iter()
			.flat_map(|log| log.events.iter())
			.filter(|event| event.kind == event_type)
			.flat_map(|event| event.attributes.iter())
			.find(|attr| attr.key == key)
			.map(|attr| attr.value.as_str())
	}
}

/// Metadata for a deployed contract, including the instantiate message it
/// was created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractInfo {
	pub address: Address,
	pub code_id: u64,
	pub creator: Address,
	pub init_msg: Value,
}

/// Metadata for uploaded contract bytecode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeInfo {
	pub code_id: u64,
	pub creator: Address,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn result_with_events() -> TxResult {
		TxResult {
			txhash: "ABC123".to_string(),
			code: 0,
			codespace: String::new(),
			raw_log: String::new(),
			gas_used: 120_000,
			logs: vec![TxLog {
				events: vec![
					TxEvent {
						kind: "message".to_string(),
						attributes: vec![TxAttribute {
							key: "action".to_string(),
							value: "store_code".to_string(),
						}],
					},
					TxEvent {
						kind: "store_code".to_string(),
						attributes: vec![TxAttribute {
							key: "code_id".to_string(),
							value: "42".to_string(),
						}],
					},
				],
			}],
		}
	}

	#[test]
	fn test_event_attr_lookup() {
		let result = result_with_events();
		assert_eq!(result.event_attr("store_code", "code_id"), Some("42"));
		assert_eq!(result.event_attr("store_code", "creator"), None);
		assert_eq!(result.event_attr("instantiate", "code_id"), None);
	}

	#[test]
	fn test_error_flag_follows_code() {
		let mut result = result_with_events();
		assert!(!result.is_error());
		result.code = 5;
		assert!(result.is_error());
	}
}
