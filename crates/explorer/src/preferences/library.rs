use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	error::PersistError,
	search::{FilePathOrder, ObjectOrder},
	settings::ExplorerSettingsFragment,
};

use super::{Entries, PreferenceKVs, PreferenceKey, PreferenceStore, PreferenceValue, Preferences};

/// Every explorer preference of a library, per entity kind and then per entity `pub_id`.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPreferences {
	#[serde(default)]
	pub location: HashMap<Uuid, Settings<FilePathOrder>>,
	#[serde(default)]
	pub tag: HashMap<Uuid, Settings<ObjectOrder>>,
}

impl LibraryPreferences {
	/// Upserts only the rows present in `self`, other preferences are left untouched.
	pub async fn write(self, store: &(impl PreferenceStore + ?Sized)) -> Result<(), PersistError> {
		let kvs = self.to_kvs()?;

		store.upsert(kvs).await
	}

	pub async fn read(store: &(impl PreferenceStore + ?Sized)) -> Result<Self, PersistError> {
		Ok(store.read().await?.parse())
	}
}

/// Settings stored for a single entity.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings<TOrder> {
	/// All writes are overwrites!
	pub explorer: Option<ExplorerSettingsFragment<TOrder>>,
}

impl<TOrder> Default for Settings<TOrder> {
	fn default() -> Self {
		Self { explorer: None }
	}
}

impl<TOrder> Preferences for Settings<TOrder>
where
	TOrder: Serialize + DeserializeOwned,
{
	fn to_kvs(self) -> Result<PreferenceKVs, PersistError> {
		let Self { explorer } = self;

		explorer
			.map(|explorer| {
				PreferenceValue::new(explorer).map(|value| (PreferenceKey::new("explorer"), value))
			})
			.into_iter()
			.collect::<Result<Vec<_>, _>>()
			.map(PreferenceKVs::new)
	}

	fn from_entries(mut entries: Entries) -> Self {
		Self {
			explorer: entries
				.remove("explorer")
				.and_then(|entry| entry.into_value("explorer")),
		}
	}
}

impl Preferences for LibraryPreferences {
	fn to_kvs(self) -> Result<PreferenceKVs, PersistError> {
		let Self { location, tag } = self;

		let mut kvs = location.to_kvs()?.with_prefix("location");
		kvs.extend(tag.to_kvs()?.with_prefix("tag"));

		Ok(kvs)
	}

	fn from_entries(mut entries: Entries) -> Self {
		Self {
			location: entries
				.remove("location")
				.map(|value| HashMap::from_entries(value.into_nested("location")))
				.unwrap_or_default(),
			tag: entries
				.remove("tag")
				.map(|value| HashMap::from_entries(value.into_nested("tag")))
				.unwrap_or_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		search::SortOrder,
		settings::{ExplorerLayout, ExplorerSettings},
	};

	use super::*;

	#[test]
	fn keys_are_dotted_paths_per_kind() {
		let location_id = Uuid::new_v4();
		let tag_id = Uuid::new_v4();

		let preferences = LibraryPreferences {
			location: HashMap::from([(
				location_id,
				Settings {
					explorer: Some(ExplorerSettings::with_order(None).into()),
				},
			)]),
			tag: HashMap::from([(
				tag_id,
				Settings {
					explorer: Some(ExplorerSettings::with_order(None).into()),
				},
			)]),
		};

		let mut keys = preferences
			.to_kvs()
			.unwrap()
			.into_iter()
			.map(|(key, _)| key.to_string())
			.collect::<Vec<_>>();
		keys.sort();

		let mut expected = vec![
			format!("location.{}.explorer", location_id.as_simple()),
			format!("tag.{}.explorer", tag_id.as_simple()),
		];
		expected.sort();

		assert_eq!(keys, expected);
	}

	#[test]
	fn parse_rebuilds_what_was_written() {
		let location_id = Uuid::new_v4();

		let preferences = LibraryPreferences {
			location: HashMap::from([(
				location_id,
				Settings {
					explorer: Some(ExplorerSettingsFragment {
						layout_mode: Some(ExplorerLayout::Media),
						order: Some(FilePathOrder::DateModified(SortOrder::Desc)),
						..Default::default()
					}),
				},
			)]),
			..Default::default()
		};

		let parsed: LibraryPreferences = preferences.clone().to_kvs().unwrap().parse();

		assert_eq!(parsed, preferences);
	}

	#[test]
	fn rows_written_with_fewer_fields_still_parse() {
		let location_id = Uuid::new_v4();

		let kvs = PreferenceKVs::new(vec![(
			PreferenceKey::new(format!("location.{}.explorer", location_id.as_simple())),
			PreferenceValue::new(serde_json::json!({ "gridGap": 12 })).unwrap(),
		)]);

		let parsed: LibraryPreferences = kvs.parse();

		assert_eq!(
			parsed.location[&location_id].explorer,
			Some(ExplorerSettingsFragment {
				grid_gap: Some(12),
				..Default::default()
			})
		);
	}

	#[test]
	fn corrupt_rows_are_skipped() {
		let good_id = Uuid::new_v4();

		let kvs = PreferenceKVs::new(vec![
			(
				PreferenceKey::new(format!("location.{}.explorer", Uuid::new_v4().as_simple())),
				PreferenceValue::from_bytes(vec![0xc1]),
			),
			(
				PreferenceKey::new("location.not-a-uuid.explorer"),
				PreferenceValue::new(ExplorerSettingsFragment::<FilePathOrder>::default()).unwrap(),
			),
			(
				PreferenceKey::new(format!("location.{}.explorer", good_id.as_simple())),
				PreferenceValue::new(ExplorerSettingsFragment::<FilePathOrder> {
					show_hidden_files: Some(true),
					..Default::default()
				})
				.unwrap(),
			),
		]);

		let parsed: LibraryPreferences = kvs.parse();

		assert_eq!(parsed.location.len(), 2);
		assert_eq!(
			parsed.location[&good_id]
				.explorer
				.as_ref()
				.and_then(|explorer| explorer.show_hidden_files),
			Some(true)
		);
		assert!(parsed
			.location
			.iter()
			.any(|(id, settings)| *id != good_id && settings.explorer.is_none()));
	}
}
