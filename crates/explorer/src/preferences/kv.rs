use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::PersistError;

use super::Preferences;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PreferenceKey(String);

impl PreferenceKey {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn prepend_path(&mut self, prefix: &str) {
		self.0 = format!("{}.{}", prefix, self.0);
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for PreferenceKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// MessagePack encoded preference value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceValue(Vec<u8>);

impl PreferenceValue {
	pub fn new(value: impl Serialize) -> Result<Self, PersistError> {
		Ok(Self(rmp_serde::to_vec_named(&value)?))
	}

	pub const fn from_bytes(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.0
	}
}

/// Flat list of preference rows, keyed by dotted paths like `location.<uuid>.explorer`.
#[derive(Debug, Default)]
pub struct PreferenceKVs(Vec<(PreferenceKey, PreferenceValue)>);

impl IntoIterator for PreferenceKVs {
	type Item = (PreferenceKey, PreferenceValue);
	type IntoIter = std::vec::IntoIter<Self::Item>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl FromIterator<(PreferenceKey, PreferenceValue)> for PreferenceKVs {
	fn from_iter<T: IntoIterator<Item = (PreferenceKey, PreferenceValue)>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl PreferenceKVs {
	pub const fn new(values: Vec<(PreferenceKey, PreferenceValue)>) -> Self {
		Self(values)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn with_prefix(mut self, prefix: &str) -> Self {
		for (key, _) in &mut self.0 {
			key.prepend_path(prefix);
		}

		self
	}

	pub fn extend(&mut self, other: Self) {
		self.0.extend(other.0);
	}

	/// Rebuilds the nested tree from the dotted keys and hands it to `T`.
	pub fn parse<T: Preferences>(self) -> T {
		let mut entries = Entries::new();

		for (key, value) in self.0 {
			let mut segments = key.0.split('.').peekable();
			let mut current = &mut entries;

			while let Some(segment) = segments.next() {
				if segments.peek().is_none() {
					current.insert(segment.to_string(), Entry::Value(value.0));
					break;
				}

				let entry = current
					.entry(segment.to_string())
					.or_insert_with(|| Entry::Nested(Entries::new()));

				if let Entry::Value(_) = entry {
					warn!(%key, "Preference value shadowed by nested preferences");
					*entry = Entry::Nested(Entries::new());
				}

				let Entry::Nested(nested) = entry else {
					unreachable!("entry was just made nested");
				};

				current = nested;
			}
		}

		T::from_entries(entries)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
	Value(Vec<u8>),
	Nested(Entries),
}

pub type Entries = BTreeMap<String, Entry>;

impl Entry {
	/// Decodes a leaf value. Corrupt or mismatched values are skipped so a single bad row
	/// doesn't take every other preference down with it.
	pub fn into_value<T: DeserializeOwned>(self, key: &str) -> Option<T> {
		match self {
			Self::Value(bytes) => rmp_serde::from_slice(&bytes)
				.map_err(|source| {
					let e = PersistError::Decode {
						key: key.to_string(),
						source,
					};
					warn!("{e:#}");
				})
				.ok(),
			Self::Nested(_) => {
				warn!(%key, "Expected a preference value, found nested preferences");
				None
			}
		}
	}

	pub fn into_nested(self, key: &str) -> Entries {
		match self {
			Self::Nested(entries) => entries,
			Self::Value(_) => {
				warn!(%key, "Expected nested preferences, found a value");
				Entries::new()
			}
		}
	}
}
