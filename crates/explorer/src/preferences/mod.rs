mod kv;
mod library;
mod store;

pub use kv::*;
pub use library::*;
pub use store::*;

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use crate::error::PersistError;

pub trait Preferences: Sized {
	fn to_kvs(self) -> Result<PreferenceKVs, PersistError>;

	fn from_entries(entries: Entries) -> Self;
}

impl<V> Preferences for HashMap<Uuid, V>
where
	V: Preferences,
{
	fn to_kvs(self) -> Result<PreferenceKVs, PersistError> {
		let mut kvs = PreferenceKVs::default();

		for (id, value) in self {
			let mut buf = Uuid::encode_buffer();

			let id = id.as_simple().encode_lower(&mut buf);

			kvs.extend(value.to_kvs()?.with_prefix(id));
		}

		Ok(kvs)
	}

	fn from_entries(entries: Entries) -> Self {
		entries
			.into_iter()
			.filter_map(|(key, entry)| match Uuid::parse_str(&key) {
				Ok(id) => {
					let entries = entry.into_nested(&key);
					Some((id, V::from_entries(entries)))
				}
				Err(e) => {
					warn!(%key, ?e, "Skipping preferences with an invalid id");
					None
				}
			})
			.collect()
	}
}
