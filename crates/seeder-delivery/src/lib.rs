//! Transaction delivery module for the pool seeder toolkit.
//!
//! This module handles the submission of chain transactions and stateless
//! chain reads. It defines the [`ChainClient`] abstraction over the remote
//! chain (signing, broadcast, queries) and the [`DeliveryService`] gateway
//! that submits message batches through it, surfaces broadcast failures
//! uniformly, and accumulates gas usage for the run.

use async_trait::async_trait;
use seeder_types::{Address, CodeInfo, ContractInfo, FeeConfig, TxRequest, TxResult};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod sim;
}

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication; propagated from the
	/// chain client unchanged.
	#[error("Network error: {0}")]
	Network(String),
	/// The chain accepted the broadcast but reported a non-zero result code.
	#[error("Transaction failed! code: {code} codespace: {codespace} raw_log: {raw_log}")]
	TxFailed {
		code: u32,
		codespace: String,
		raw_log: String,
	},
	/// A transaction request carried no messages.
	#[error("Transaction has no messages")]
	EmptyTransaction,
}

/// Trait defining the interface to the remote chain.
///
/// Implementations own wallet keys and the transport; the seeder only sees
/// message-level operations. Queries are stateless with no retry or caching;
/// a transport failure propagates unchanged to the caller.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Signs and broadcasts a transaction, returning the chain's response.
	///
	/// A non-zero result code is reported inside the returned [`TxResult`],
	/// not as an `Err`; `Err` is reserved for transport failures.
	async fn broadcast(
		&self,
		request: &TxRequest,
		fee: &FeeConfig,
	) -> Result<TxResult, DeliveryError>;

	/// Queries a contract's stored state with a JSON message.
	async fn query_contract(
		&self,
		contract: &Address,
		msg: &Value,
	) -> Result<Value, DeliveryError>;

	/// Fetches metadata for a deployed contract.
	async fn contract_info(&self, contract: &Address) -> Result<ContractInfo, DeliveryError>;

	/// Fetches metadata for uploaded bytecode.
	async fn code_info(&self, code_id: u64) -> Result<CodeInfo, DeliveryError>;

	/// Fetches a native-currency account balance in the given denomination.
	///
	/// Accounts with no balance entry report zero.
	async fn bank_balance(&self, address: &Address, denom: &str) -> Result<u128, DeliveryError>;

	/// Returns the latest block timestamp in Unix seconds.
	async fn block_time(&self) -> Result<i64, DeliveryError>;
}

/// Gateway that submits transactions through a chain client.
///
/// The service validates requests, maps chain-reported failures into
/// [`DeliveryError::TxFailed`], and accumulates the gas usage of every
/// successful transaction. The accumulator belongs to the service instance,
/// so each run owns its own counter.
pub struct DeliveryService {
	/// The chain client used for broadcast and queries.
	client: Arc<dyn ChainClient>,
	/// Total gas used by transactions submitted through this service.
	gas_used: AtomicU64,
}

impl DeliveryService {
	/// Creates a new DeliveryService over the given chain client.
	pub fn new(client: Arc<dyn ChainClient>) -> Self {
		Self {
			client,
			gas_used: AtomicU64::new(0),
		}
	}

	/// Submits a transaction and returns the chain's result.
	///
	/// Fails with [`DeliveryError::EmptyTransaction`] when the request has
	/// no messages and with [`DeliveryError::TxFailed`] when the chain
	/// reports a non-zero code. On success the transaction's gas usage is
	/// added to the running total. No retry is attempted on failure.
	pub async fn submit(
		&self,
		request: &TxRequest,
		fee: &FeeConfig,
	) -> Result<TxResult, DeliveryError> {
		if request.msgs.is_empty() {
			return Err(DeliveryError::EmptyTransaction);
		}

		let result = self.client.broadcast(request, fee).await?;

		if result.is_error() {
			return Err(DeliveryError::TxFailed {
				code: result.code,
				codespace: result.codespace,
				raw_log: result.raw_log,
			});
		}

		self.gas_used.fetch_add(result.gas_used, Ordering::Relaxed);
		tracing::info!(txhash = %result.txhash, gas = result.gas_used, "transaction submitted");

		Ok(result)
	}

	/// Total gas used by all transactions submitted through this service.
	pub fn gas_used(&self) -> u64 {
		self.gas_used.load(Ordering::Relaxed)
	}

	/// Queries a contract's stored state.
	pub async fn query_contract(
		&self,
		contract: &Address,
		msg: &Value,
	) -> Result<Value, DeliveryError> {
		self.client.query_contract(contract, msg).await
	}

	/// Fetches metadata for a deployed contract.
	pub async fn contract_info(&self, contract: &Address) -> Result<ContractInfo, DeliveryError> {
		self.client.contract_info(contract).await
	}

	/// Fetches metadata for uploaded bytecode.
	pub async fn code_info(&self, code_id: u64) -> Result<CodeInfo, DeliveryError> {
		self.client.code_info(code_id).await
	}

	/// Fetches a native-currency balance.
	pub async fn bank_balance(
		&self,
		address: &Address,
		denom: &str,
	) -> Result<u128, DeliveryError> {
		self.client.bank_balance(address, denom).await
	}

	/// Returns the latest block timestamp in Unix seconds.
	pub async fn block_time(&self) -> Result<i64, DeliveryError> {
		self.client.block_time().await
	}
}
