//! Contract access module for the pool seeder toolkit.
//!
//! This module provides typed read and write operations against deployed
//! contracts, built on the delivery gateway: uploading bytecode,
//! instantiating, executing, migrating, and querying, plus the token and
//! bank transfer helpers the seeding scripts use. Every write is a
//! single-transaction submission through [`DeliveryService`]; reads are
//! stateless with no retry or caching.

use seeder_delivery::{DeliveryError, DeliveryService};
use seeder_types::{
	Address, BalanceResponse, ChainMsg, CodeInfo, Coin, ContractInfo, FeeConfig, TxRequest,
	TxResult, Wallet,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// Errors that can occur during contract operations.
#[derive(Debug, Error)]
pub enum ContractError {
	/// Error propagated from the delivery gateway.
	#[error("Delivery error: {0}")]
	Delivery(#[from] DeliveryError),
	/// Error reading contract bytecode from disk.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// A transaction succeeded but its logs are missing an expected event
	/// attribute (e.g. the assigned code ID).
	#[error("Missing event attribute {event}.{attribute} in transaction logs")]
	MissingEvent {
		event: &'static str,
		attribute: &'static str,
	},
	/// A query response did not match the expected document shape.
	#[error("Response error: {0}")]
	Response(#[from] serde_json::Error),
	/// A value in a transaction log or query response failed to parse.
	#[error("Failed to parse value: {0}")]
	Parse(String),
}

/// Typed contract accessor over the delivery gateway.
///
/// Holds the fee configuration applied to every write; queries carry no
/// fee. Clone-cheap via the shared delivery service.
#[derive(Clone)]
pub struct ContractClient {
	/// Gateway used for all submissions and reads.
	delivery: Arc<DeliveryService>,
	/// Fee settings for every submitted transaction.
	fee: FeeConfig,
}

impl ContractClient {
	/// Creates a new ContractClient with the given gateway and fee settings.
	pub fn new(delivery: Arc<DeliveryService>, fee: FeeConfig) -> Self {
		Self { delivery, fee }
	}

	/// Returns the underlying delivery service.
	pub fn delivery(&self) -> &Arc<DeliveryService> {
		&self.delivery
	}

	/// Uploads contract bytecode and returns the assigned code ID.
	pub async fn store_code(
		&self,
		sender: &Wallet,
		wasm_path: &Path,
	) -> Result<u64, ContractError> {
		let wasm_byte_code = fs::read(wasm_path).await?;
		let request = TxRequest::new(
			sender.address.clone(),
			vec![ChainMsg::StoreCode {
				sender: sender.address.clone(),
				wasm_byte_code,
			}],
		);
		let result = self.delivery.submit(&request, &self.fee).await?;

		let code_id = result
			.event_attr("store_code", "code_id")
			.ok_or(ContractError::MissingEvent {
				event: "store_code",
				attribute: "code_id",
			})?;
		code_id
			.parse::<u64>()
			.map_err(|e| ContractError::Parse(e.to_string()))
	}

	/// Instantiates a contract from a code ID and returns its address.
	pub async fn instantiate(
		&self,
		sender: &Wallet,
		code_id: u64,
		init_msg: &Value,
	) -> Result<Address, ContractError> {
		let request = TxRequest::new(
			sender.address.clone(),
			vec![ChainMsg::Instantiate {
				sender: sender.address.clone(),
				admin: Some(sender.address.clone()),
				code_id,
				msg: init_msg.clone(),
			}],
		);
		let result = self.delivery.submit(&request, &self.fee).await?;

		let address = result
			.event_attr("instantiate", "contract_address")
			.ok_or(ContractError::MissingEvent {
				event: "instantiate",
				attribute: "contract_address",
			})?;
		Ok(Address::from(address))
	}

	/// Executes a single message on a contract, optionally attaching funds.
	pub async fn execute(
		&self,
		sender: &Wallet,
		contract: &Address,
		msg: &Value,
		funds: &[Coin],
	) -> Result<TxResult, ContractError> {
		self.execute_batch(sender, contract, std::slice::from_ref(msg), funds)
			.await
	}

	/// Executes an ordered list of messages against one contract, batched
	/// into a single transaction. Funds are attached to each message.
	pub async fn execute_batch(
		&self,
		sender: &Wallet,
		contract: &Address,
		msgs: &[Value],
		funds: &[Coin],
	) -> Result<TxResult, ContractError> {
		let chain_msgs = msgs
			.iter()
			.map(|msg| ChainMsg::Execute {
				sender: sender.address.clone(),
				contract: contract.clone(),
				msg: msg.clone(),
				funds: funds.to_vec(),
			})
			.collect();
		let request = TxRequest::new(sender.address.clone(), chain_msgs);
		Ok(self.delivery.submit(&request, &self.fee).await?)
	}

	/// Migrates a contract to a new code ID.
	pub async fn migrate(
		&self,
		sender: &Wallet,
		contract: &Address,
		new_code_id: u64,
		migrate_msg: &Value,
	) -> Result<TxResult, ContractError> {
		let request = TxRequest::new(
			sender.address.clone(),
			vec![ChainMsg::Migrate {
				sender: sender.address.clone(),
				contract: contract.clone(),
				new_code_id,
				msg: migrate_msg.clone(),
			}],
		);
		Ok(self.delivery.submit(&request, &self.fee).await?)
	}

	/// Queries a contract and deserializes the response document.
	pub async fn query<T: DeserializeOwned>(
		&self,
		contract: &Address,
		msg: &Value,
	) -> Result<T, ContractError> {
		let response = self.delivery.query_contract(contract, msg).await?;
		Ok(serde_json::from_value(response)?)
	}

	/// Queries a contract and returns the raw response document.
	pub async fn query_raw(
		&self,
		contract: &Address,
		msg: &Value,
	) -> Result<Value, ContractError> {
		Ok(self.delivery.query_contract(contract, msg).await?)
	}

	/// Fetches metadata for a deployed contract.
	pub async fn contract_info(&self, contract: &Address) -> Result<ContractInfo, ContractError> {
		Ok(self.delivery.contract_info(contract).await?)
	}

	/// Fetches metadata for uploaded bytecode.
	pub async fn code_info(&self, code_id: u64) -> Result<CodeInfo, ContractError> {
		Ok(self.delivery.code_info(code_id).await?)
	}

	/// Returns the latest block timestamp in Unix seconds.
	pub async fn block_time(&self) -> Result<i64, ContractError> {
		Ok(self.delivery.block_time().await?)
	}

	/// CW20 token balance of an account.
	pub async fn token_balance(
		&self,
		token: &Address,
		owner: &Address,
	) -> Result<u128, ContractError> {
		let response: BalanceResponse = self
			.query(token, &serde_json::json!({ "balance": { "address": owner.as_str() } }))
			.await?;
		Ok(response.balance)
	}

	/// Native-currency balance of an account.
	pub async fn bank_balance(
		&self,
		address: &Address,
		denom: &str,
	) -> Result<u128, ContractError> {
		Ok(self.delivery.bank_balance(address, denom).await?)
	}

	/// Transfers CW20 tokens via the token contract's `transfer` message.
	pub async fn transfer_token(
		&self,
		from: &Wallet,
		token: &Address,
		recipient: &Address,
		amount: u128,
	) -> Result<TxResult, ContractError> {
		let info = self.contract_info(token).await?;
		let name = info
			.init_msg
			.get("name")
			.and_then(|v| v.as_str())
			.unwrap_or("token");
		tracing::info!(
			from = %from.address,
			to = %recipient,
			amount,
			token = name,
			"funding with tokens"
		);
		self.execute(
			from,
			token,
			&serde_json::json!({ "transfer": {
				"recipient": recipient.as_str(),
				"amount": amount.to_string(),
			}}),
			&[],
		)
		.await
	}

	/// Moves native coins between accounts with a bank send message.
	pub async fn bank_send(
		&self,
		from: &Wallet,
		to: &Address,
		amount: Vec<Coin>,
		memo: &str,
	) -> Result<TxResult, ContractError> {
		tracing::info!(from = %from.address, to = %to, ?amount, "funding with native coins");
		let request = TxRequest::new(
			from.address.clone(),
			vec![ChainMsg::BankSend {
				from: from.address.clone(),
				to: to.clone(),
				amount,
			}],
		)
		.with_memo(memo);
		Ok(self.delivery.submit(&request, &self.fee).await?)
	}
}
