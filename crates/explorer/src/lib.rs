//!
//! # Explorer
//!
//! View-state reconciliation for Spacedrive's explorer routes. An explorer is a paginated,
//! filterable and orderable listing scoped to either a [`Location`] (optionally at a sub-path)
//! or a [`Tag`]. This crate keeps that listing consistent with:
//! - per-entity display preferences persisted in the library preference store;
//! - rescan events pushed by the backend;
//! - the navigational state encoded in the route (sub-path, page size).
//!
//! The transport (queries, mutations and subscriptions) is abstracted behind
//! [`ExplorerBackend`], so the same state machine drives any client.
//!
//! ## Basic example
//!
//! ```
//! use sd_explorer::{
//! 	build_filters, ExplorerSettings, FilePathOrder, LocationKind, SearchState, SortOrder,
//! 	ExplorerKind, Location, RouteState,
//! };
//! use uuid::Uuid;
//!
//! let location = Location {
//! 	id: 1,
//! 	pub_id: Uuid::new_v4(),
//! 	name: "Location A".to_string(),
//! };
//!
//! let settings: ExplorerSettings<FilePathOrder> = LocationKind::default_settings();
//! assert_eq!(settings.order, Some(FilePathOrder::Name(SortOrder::Asc)));
//!
//! let filters = build_filters::<LocationKind>(
//! 	&location,
//! 	&SearchState::default(),
//! 	&settings,
//! 	&RouteState::default(),
//! );
//! assert_eq!(filters.len(), 3);
//! ```

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod backend;
mod cache;
mod config;
mod entity;
mod error;
mod filters;
mod live;
mod notifications;
mod persistence;
mod preferences;
mod query;
mod route;
mod search;
mod settings;
mod shell;

pub use backend::{
	ExplorerBackend, ExplorerItem, QuickRescanArgs, RescanEvent, SearchArgs, SearchData,
	SearchTarget,
};
pub use cache::{CacheError, CacheNode, Model, NormalisedCache, NormalisedResult, Reference};
pub use config::{ExplorerConfig, MAX_TAKE};
pub use entity::{
	EntityKind, EntityRef, ExplorerKind, Location, LocationKind, NavigationalIdentity, Tag, TagKind,
};
pub use error::{
	ConfigError, Error, FileIOError, PersistError, QueryError, SubscriptionError, ValidationError,
};
pub use filters::{build_filters, include_descendants};
pub use live::{LiveUpdate, LiveUpdateListener};
pub use notifications::{Notification, Notifier};
pub use persistence::{
	CommitOutcome, DebouncedCommitter, LoadTicket, PendingLoads, SettingsPersistence,
};
pub use preferences::{
	Entries, Entry, LibraryPreferences, MemoryPreferenceStore, PreferenceKVs, PreferenceKey,
	PreferenceStore, PreferenceValue, Preferences, Settings,
};
pub use query::{
	ExplorerQuery, FetchKind, FetchRequest, QueryKey, QueryState, RequestId, TransientState,
};
pub use route::{EntityIdParams, RouteState};
pub use search::{
	state::SearchState, FilePathFilterArgs, FilePathOrder, FilterTarget, InOrNotIn,
	ObjectFilterArgs, ObjectHiddenFilter, ObjectOrder, Range, SearchFilterArgs, SortOrder,
	TextMatch,
};
pub use settings::{
	resolve_settings, DoubleClickAction, ExplorerLayout, ExplorerSettings,
	ExplorerSettingsFragment,
};
pub use shell::{
	ContentState, EmptyNotice, ExplorerView, LocationShell, RouteView, TagShell, TopBarAction,
};
