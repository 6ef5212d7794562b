//! Core seeding logic for the pool seeder toolkit.
//!
//! This module contains the two decision-making components of the seeder:
//! the [`FundingPlanner`], which sizes and issues balance top-ups ahead of
//! a planned batch of bids, and the [`BidOrchestrator`], which drives the
//! bounded bid-submission loop against the gaming pool contract.

/// Fee arithmetic shared by planner and orchestrator.
pub mod fees;
/// Balance sufficiency planning and top-up transfers.
pub mod funding;
/// The bid submission loop.
pub mod orchestrator;

pub use funding::{FundingPlan, FundingPlanner};
pub use orchestrator::{BidOrchestrator, BidSettings, SeedReport};

use seeder_contract::ContractError;
use thiserror::Error;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
	/// Error propagated from a contract operation.
	#[error("Contract error: {0}")]
	Contract(#[from] ContractError),
	/// The pair proxy reported reserves from which no exchange rate can be
	/// derived.
	#[error("Exchange rate unavailable: {0}")]
	Rate(String),
	/// A contract response was missing an expected field.
	#[error("Malformed contract response: {0}")]
	Response(String),
}
