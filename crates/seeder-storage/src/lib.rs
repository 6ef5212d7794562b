//! Artifact storage for the pool seeder toolkit.
//!
//! Deployment results (contract addresses, code IDs) are cached as JSON
//! files on disk so later runs can reuse them instead of redeploying.
//! Artifacts are keyed by a logical name, written wholesale, and read back
//! leniently: a missing or corrupt artifact reads as an empty JSON object,
//! never an error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

/// Errors that can occur when writing artifacts.
///
/// Reads are infallible by design; only writes surface errors.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when serializing an artifact payload.
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// On-disk JSON artifact cache.
///
/// One `<name>.json` file per artifact under the base directory. Writes
/// replace the whole document; there is no partial merge.
pub struct ArtifactStore {
	/// Base directory for artifact files.
	base_path: PathBuf,
}

impl ArtifactStore {
	/// Creates a store rooted at the given directory.
	///
	/// The directory is created lazily on first write.
	pub fn new(base_path: impl Into<PathBuf>) -> Self {
		Self {
			base_path: base_path.into(),
		}
	}

	/// Converts an artifact name to a filesystem-safe file path.
	fn file_path(&self, name: &str) -> PathBuf {
		let safe_name = name.replace(['/', ':'], "_");
		self.base_path.join(format!("{}.json", safe_name))
	}

	/// Writes an artifact wholesale, replacing any previous payload.
	///
	/// The write goes to a temp file first and is renamed into place so a
	/// crashed run never leaves a half-written artifact behind.
	pub async fn write<T: Serialize>(&self, name: &str, payload: &T) -> Result<(), StorageError> {
		let path = self.file_path(name);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).await?;
		}

		let data = serde_json::to_vec_pretty(payload)?;
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, data).await?;
		fs::rename(&temp_path, &path).await?;

		Ok(())
	}

	/// Reads an artifact by name.
	///
	/// Returns the parsed document, or an empty JSON object when the file
	/// is missing or unparseable.
	pub async fn read(&self, name: &str) -> Value {
		let path = self.file_path(name);
		match fs::read(&path).await {
			Ok(data) => match serde_json::from_slice(&data) {
				Ok(value) => value,
				Err(e) => {
					tracing::warn!(artifact = name, "corrupt artifact ignored: {}", e);
					Value::Object(Default::default())
				}
			},
			Err(_) => Value::Object(Default::default()),
		}
	}

	/// Reads an artifact and deserializes it into a typed payload.
	///
	/// Returns `None` when the artifact is missing or does not match the
	/// expected shape.
	pub async fn read_typed<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
		serde_json::from_value(self.read(name).await).ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Deployment {
		contract: String,
		code_id: u64,
	}

	#[tokio::test]
	async fn test_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let store = ArtifactStore::new(dir.path());

		let payload = Deployment {
			contract: "sim1contract0001".to_string(),
			code_id: 7,
		};
		store.write("gaming", &payload).await.unwrap();

		let value = store.read("gaming").await;
		assert_eq!(value["contract"], "sim1contract0001");
		assert_eq!(value["code_id"], 7);

		let typed: Deployment = store.read_typed("gaming").await.unwrap();
		assert_eq!(typed, payload);
	}

	#[tokio::test]
	async fn test_missing_artifact_reads_as_empty_object() {
		let dir = tempfile::tempdir().unwrap();
		let store = ArtifactStore::new(dir.path());

		let value = store.read("nonexistent").await;
		assert_eq!(value, serde_json::json!({}));
		assert!(store.read_typed::<Deployment>("nonexistent").await.is_none());
	}

	#[tokio::test]
	async fn test_corrupt_artifact_reads_as_empty_object() {
		let dir = tempfile::tempdir().unwrap();
		tokio::fs::write(dir.path().join("broken.json"), b"{not json")
			.await
			.unwrap();
		let store = ArtifactStore::new(dir.path());

		let value = store.read("broken").await;
		assert_eq!(value, serde_json::json!({}));
	}

	#[tokio::test]
	async fn test_write_replaces_wholesale() {
		let dir = tempfile::tempdir().unwrap();
		let store = ArtifactStore::new(dir.path());

		store
			.write("artifact", &serde_json::json!({ "a": 1, "b": 2 }))
			.await
			.unwrap();
		store
			.write("artifact", &serde_json::json!({ "c": 3 }))
			.await
			.unwrap();

		// No merge with the previous payload.
		let value = store.read("artifact").await;
		assert_eq!(value, serde_json::json!({ "c": 3 }));
	}

	#[tokio::test]
	async fn test_name_sanitization() {
		let dir = tempfile::tempdir().unwrap();
		let store = ArtifactStore::new(dir.path());

		store
			.write("net/gaming:v2", &serde_json::json!({ "ok": true }))
			.await
			.unwrap();
		assert_eq!(
			store.read("net/gaming:v2").await,
			serde_json::json!({ "ok": true })
		);
		assert!(dir.path().join("net_gaming_v2.json").exists());
	}
}
