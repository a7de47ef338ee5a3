use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::PersistError;

use super::{PreferenceKVs, PreferenceKey, PreferenceValue};

/// Remote key/value preference storage shared by every view of a library.
///
/// Writes are upserts with last-writer-wins semantics per key, there is no concurrency token.
#[async_trait]
pub trait PreferenceStore: Send + Sync + 'static {
	async fn read(&self) -> Result<PreferenceKVs, PersistError>;

	async fn upsert(&self, kvs: PreferenceKVs) -> Result<(), PersistError>;
}

/// In process [`PreferenceStore`], rows are kept already encoded like the library database does.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
	rows: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryPreferenceStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn len(&self) -> usize {
		self.rows.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.rows.read().await.is_empty()
	}

	pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
		self.rows.read().await.get(key).cloned()
	}
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
	async fn read(&self) -> Result<PreferenceKVs, PersistError> {
		Ok(self
			.rows
			.read()
			.await
			.iter()
			.map(|(key, value)| {
				(
					PreferenceKey::new(key.clone()),
					PreferenceValue::from_bytes(value.clone()),
				)
			})
			.collect())
	}

	async fn upsert(&self, kvs: PreferenceKVs) -> Result<(), PersistError> {
		let mut rows = self.rows.write().await;

		for (key, value) in kvs {
			trace!(%key, "Upserting preference");
			rows.insert(key.to_string(), value.into_bytes());
		}

		Ok(())
	}
}
