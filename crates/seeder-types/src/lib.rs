//! Common types module for the pool seeder toolkit.
//!
//! This module defines the core data types shared by all seeder components:
//! wallet and coin primitives, chain message and transaction types, and the
//! response documents returned by the gaming, token, and proxy contracts.

/// Wallet, address, and coin primitives.
pub mod account;
/// Chain messages, transaction requests, and broadcast results.
pub mod delivery;
/// Contract response documents for the gaming pool, token, and proxy.
pub mod pool;
/// Serde helpers for contract wire formats.
pub mod utils;

// Re-export all types for convenient access
pub use account::*;
pub use delivery::*;
pub use pool::*;
pub use utils::uint128_str;
