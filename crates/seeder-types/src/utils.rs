//! Serde helpers for contract wire formats.

/// Serializes a `u128` as a decimal string and back.
///
/// CosmWasm contracts encode `Uint128` values as JSON strings; every amount
/// that crosses the contract boundary goes through this representation.
pub mod uint128_str {
	use serde::{de, Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse::<u128>().map_err(de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Amount {
		#[serde(with = "super::uint128_str")]
		value: u128,
	}

	#[test]
	fn test_uint128_round_trip() {
		let amount = Amount { value: 1000 };
		let json = serde_json::to_string(&amount).unwrap();
		assert_eq!(json, r#"{"value":"1000"}"#);

		let back: Amount = serde_json::from_str(&json).unwrap();
		assert_eq!(back, amount);
	}

	#[test]
	fn test_uint128_rejects_non_numeric() {
		let result = serde_json::from_str::<Amount>(r#"{"value":"abc"}"#);
		assert!(result.is_err());
	}
}
