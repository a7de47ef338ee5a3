use std::{collections::HashMap, fmt};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	backend::{QuickRescanArgs, SearchTarget},
	cache::Model,
	config::{ExplorerConfig, MAX_TAKE},
	preferences::{LibraryPreferences, Settings},
	route::RouteState,
	search::{
		FilePathFilterArgs, FilePathOrder, FilterTarget, InOrNotIn, ObjectFilterArgs, ObjectOrder,
		SearchFilterArgs, SortOrder,
	},
	settings::{ExplorerSettings, ExplorerSettingsFragment},
};

/// A filesystem root indexed by the library.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Location {
	pub id: i32,
	pub pub_id: Uuid,
	pub name: String,
}

impl Location {
	/// Online status isn't part of the record, it comes from the set of connected locations.
	pub fn is_online(&self, online_locations: &[Uuid]) -> bool {
		online_locations.contains(&self.pub_id)
	}
}

impl Model for Location {
	fn name() -> &'static str {
		"Location"
	}
}

/// A user defined label attached to objects.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	pub id: i32,
	pub pub_id: Uuid,
	pub name: Option<String>,
	pub color: Option<String>,
}

impl Model for Tag {
	fn name() -> &'static str {
		"Tag"
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
	Location,
	Tag,
}

impl EntityKind {
	/// Top level key of this kind in the preference store.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Location => "location",
			Self::Tag => "tag",
		}
	}
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
	pub kind: EntityKind,
	pub id: i32,
}

impl fmt::Display for EntityRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<{}_id='{}'>", self.kind, self.id)
	}
}

/// What is currently being browsed. Location routes carry their sub-path, tag routes don't.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationalIdentity {
	pub entity: EntityRef,
	pub sub_path: Option<String>,
}

impl fmt::Display for NavigationalIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.sub_path {
			Some(sub_path) => write!(f, "{} <sub_path='{sub_path}'>", self.entity),
			None => write!(f, "{}", self.entity),
		}
	}
}

/// Per kind capabilities the explorer algorithms are parameterized by.
pub trait ExplorerKind: Send + Sync + 'static {
	const KIND: EntityKind;
	/// What the search bar filters by default.
	const SEARCH_TARGET: FilterTarget;

	type Entity: Clone + fmt::Debug + Send + Sync + 'static;
	type Order: Clone
		+ PartialEq
		+ fmt::Debug
		+ Serialize
		+ DeserializeOwned
		+ Send
		+ Sync
		+ 'static;

	fn id(entity: &Self::Entity) -> i32;

	fn pub_id(entity: &Self::Entity) -> Uuid;

	fn default_order() -> Option<Self::Order>;

	/// Membership clause binding results to `entity`.
	fn scope_filters(entity: &Self::Entity) -> Vec<SearchFilterArgs>;

	/// Extra clause restricting results to a directory, only meaningful for locations.
	fn path_filter(
		_entity: &Self::Entity,
		_route: &RouteState,
		_include_descendants: bool,
	) -> Option<SearchFilterArgs> {
		None
	}

	fn sub_path(_route: &RouteState) -> Option<String> {
		None
	}

	fn rescan_args(_entity: &Self::Entity, _route: &RouteState) -> Option<QuickRescanArgs> {
		None
	}

	fn search_target(order: Option<Self::Order>, config: &ExplorerConfig) -> SearchTarget;

	fn page_size(route: &RouteState, config: &ExplorerConfig) -> u8;

	fn stored(preferences: &LibraryPreferences) -> &HashMap<Uuid, Settings<Self::Order>>;

	fn update(pub_id: Uuid, settings: Settings<Self::Order>) -> LibraryPreferences;

	fn default_settings() -> ExplorerSettings<Self::Order> {
		ExplorerSettings::with_order(Self::default_order())
	}

	fn entity_ref(entity: &Self::Entity) -> EntityRef {
		EntityRef {
			kind: Self::KIND,
			id: Self::id(entity),
		}
	}

	fn identity(entity: &Self::Entity, route: &RouteState) -> NavigationalIdentity {
		NavigationalIdentity {
			entity: Self::entity_ref(entity),
			sub_path: Self::sub_path(route),
		}
	}

	fn stored_fragment<'p>(
		preferences: &'p LibraryPreferences,
		entity: &Self::Entity,
	) -> Option<&'p ExplorerSettingsFragment<Self::Order>> {
		Self::stored(preferences)
			.get(&Self::pub_id(entity))
			.and_then(|settings| settings.explorer.as_ref())
	}
}

#[derive(Debug, Clone, Copy)]
pub struct LocationKind;

impl ExplorerKind for LocationKind {
	const KIND: EntityKind = EntityKind::Location;
	const SEARCH_TARGET: FilterTarget = FilterTarget::FilePath;

	type Entity = Location;
	type Order = FilePathOrder;

	fn id(entity: &Location) -> i32 {
		entity.id
	}

	fn pub_id(entity: &Location) -> Uuid {
		entity.pub_id
	}

	fn default_order() -> Option<FilePathOrder> {
		Some(FilePathOrder::Name(SortOrder::Asc))
	}

	fn scope_filters(entity: &Location) -> Vec<SearchFilterArgs> {
		vec![SearchFilterArgs::FilePath(FilePathFilterArgs::Locations(
			InOrNotIn::In(vec![entity.id]),
		))]
	}

	fn path_filter(
		entity: &Location,
		route: &RouteState,
		include_descendants: bool,
	) -> Option<SearchFilterArgs> {
		Some(SearchFilterArgs::FilePath(FilePathFilterArgs::Path {
			location_id: entity.id,
			path: route.path.clone().unwrap_or_default(),
			include_descendants,
		}))
	}

	fn sub_path(route: &RouteState) -> Option<String> {
		Some(route.path.clone().unwrap_or_default())
	}

	fn rescan_args(entity: &Location, route: &RouteState) -> Option<QuickRescanArgs> {
		Some(QuickRescanArgs {
			location_id: entity.id,
			sub_path: route.path.clone().unwrap_or_default(),
		})
	}

	fn search_target(order: Option<FilePathOrder>, config: &ExplorerConfig) -> SearchTarget {
		SearchTarget::Paths {
			order,
			group_directories: config.group_directories,
		}
	}

	fn page_size(route: &RouteState, config: &ExplorerConfig) -> u8 {
		config.clamp_take(route.take.unwrap_or(config.page_size))
	}

	fn stored(preferences: &LibraryPreferences) -> &HashMap<Uuid, Settings<FilePathOrder>> {
		&preferences.location
	}

	fn update(pub_id: Uuid, settings: Settings<FilePathOrder>) -> LibraryPreferences {
		LibraryPreferences {
			location: HashMap::from([(pub_id, settings)]),
			..Default::default()
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct TagKind;

impl ExplorerKind for TagKind {
	const KIND: EntityKind = EntityKind::Tag;
	const SEARCH_TARGET: FilterTarget = FilterTarget::Object;

	type Entity = Tag;
	type Order = ObjectOrder;

	fn id(entity: &Tag) -> i32 {
		entity.id
	}

	fn pub_id(entity: &Tag) -> Uuid {
		entity.pub_id
	}

	fn default_order() -> Option<ObjectOrder> {
		None
	}

	fn scope_filters(entity: &Tag) -> Vec<SearchFilterArgs> {
		vec![SearchFilterArgs::Object(ObjectFilterArgs::Tags(InOrNotIn::In(
			vec![entity.id],
		)))]
	}

	fn search_target(order: Option<ObjectOrder>, _config: &ExplorerConfig) -> SearchTarget {
		SearchTarget::Objects { order }
	}

	fn page_size(_route: &RouteState, _config: &ExplorerConfig) -> u8 {
		MAX_TAKE
	}

	fn stored(preferences: &LibraryPreferences) -> &HashMap<Uuid, Settings<ObjectOrder>> {
		&preferences.tag
	}

	fn update(pub_id: Uuid, settings: Settings<ObjectOrder>) -> LibraryPreferences {
		LibraryPreferences {
			tag: HashMap::from([(pub_id, settings)]),
			..Default::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn location() -> Location {
		Location {
			id: 1,
			pub_id: Uuid::new_v4(),
			name: "Location A".into(),
		}
	}

	#[test]
	fn identity_tracks_sub_path_only_for_locations() {
		let location = location();
		let tag = Tag {
			id: 1,
			pub_id: Uuid::new_v4(),
			name: Some("Vacation".into()),
			color: None,
		};
		let route = RouteState {
			path: Some("/Photos".into()),
			take: None,
		};

		let location_identity = LocationKind::identity(&location, &route);
		assert_eq!(location_identity.sub_path.as_deref(), Some("/Photos"));

		let tag_identity = TagKind::identity(&tag, &route);
		assert_eq!(tag_identity.sub_path, None);

		// Same numeric id, different kinds
		assert_ne!(location_identity.entity, tag_identity.entity);
	}

	#[test]
	fn root_path_is_an_empty_sub_path() {
		let identity = LocationKind::identity(&location(), &RouteState::default());
		assert_eq!(identity.sub_path.as_deref(), Some(""));
	}

	#[test]
	fn online_status_comes_from_connected_set() {
		let location = location();
		assert!(location.is_online(&[location.pub_id]));
		assert!(!location.is_online(&[Uuid::new_v4()]));
	}

	#[test]
	fn tags_always_take_a_full_page() {
		let config = ExplorerConfig {
			page_size: 20,
			..Default::default()
		};
		let route = RouteState {
			path: None,
			take: Some(5),
		};

		assert_eq!(TagKind::page_size(&route, &config), MAX_TAKE);
		assert_eq!(LocationKind::page_size(&route, &config), 5);
		assert_eq!(LocationKind::page_size(&RouteState::default(), &config), 20);
	}

	#[test]
	fn default_orderings_differ_per_kind() {
		assert_eq!(
			LocationKind::default_settings().order,
			Some(FilePathOrder::Name(SortOrder::Asc))
		);
		assert_eq!(TagKind::default_settings().order, None);
	}
}
