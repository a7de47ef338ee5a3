use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	cache::NormalisedResult,
	entity::{Location, Tag},
	error::{QueryError, SubscriptionError},
	search::{FilePathOrder, ObjectOrder, SearchFilterArgs},
};

/// Which listing the search service runs and how it's ordered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SearchTarget {
	Paths {
		order: Option<FilePathOrder>,
		group_directories: bool,
	},
	Objects {
		order: Option<ObjectOrder>,
	},
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchArgs {
	pub target: SearchTarget,
	pub filters: Vec<SearchFilterArgs>,
	pub take: u8,
}

/// One page of a listing. `cursor` is opaque and only present when there are more pages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchData<T> {
	pub items: Vec<T>,
	pub cursor: Option<Vec<u8>>,
}

impl<T> Default for SearchData<T> {
	fn default() -> Self {
		Self {
			items: Vec::new(),
			cursor: None,
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ExplorerItem {
	Path {
		id: i32,
		name: Option<String>,
		extension: Option<String>,
		is_dir: bool,
		hidden: bool,
		has_created_thumbnail: bool,
	},
	Object {
		id: i32,
		kind: i32,
		favorite: bool,
		has_created_thumbnail: bool,
	},
}

impl ExplorerItem {
	/// Stable key used by selections.
	pub fn id(&self) -> String {
		match self {
			Self::Path { id, .. } => format!("FilePath:{id}"),
			Self::Object { id, .. } => format!("Object:{id}"),
		}
	}

	pub const fn has_created_thumbnail(&self) -> bool {
		match self {
			Self::Path {
				has_created_thumbnail,
				..
			}
			| Self::Object {
				has_created_thumbnail,
				..
			} => *has_created_thumbnail,
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuickRescanArgs {
	pub location_id: i32,
	pub sub_path: String,
}

/// Pushed by the backend when something under a watched directory changed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RescanEvent {
	pub location_id: i32,
	pub sub_path: String,
}

/// Queries, mutations and subscriptions the explorer consumes.
#[async_trait]
pub trait ExplorerBackend: Send + Sync + 'static {
	async fn get_location(&self, id: i32) -> Result<NormalisedResult<Location>, QueryError>;

	async fn get_tag(&self, id: i32) -> Result<NormalisedResult<Tag>, QueryError>;

	async fn search(
		&self,
		args: SearchArgs,
		cursor: Option<Vec<u8>>,
	) -> Result<SearchData<ExplorerItem>, QueryError>;

	async fn online_locations(&self) -> Result<Vec<Uuid>, QueryError>;

	async fn is_location_indexing(&self, location_id: i32) -> Result<bool, QueryError>;

	async fn quick_rescan(&self, args: QuickRescanArgs) -> Result<(), QueryError>;

	async fn subscribe_quick_rescan(
		&self,
		args: QuickRescanArgs,
	) -> Result<BoxStream<'static, RescanEvent>, SubscriptionError>;
}

#[cfg(test)]
pub(crate) mod mock {
	use std::{
		collections::{HashMap, VecDeque},
		sync::{
			atomic::{AtomicBool, Ordering},
			Mutex,
		},
	};

	use futures::StreamExt;

	use super::*;

	/// Scripted backend: search pops queued pages, subscriptions hand out channels.
	#[derive(Default)]
	pub struct MockBackend {
		pub locations: Mutex<HashMap<i32, Location>>,
		pub tags: Mutex<HashMap<i32, Tag>>,
		pub pages: Mutex<VecDeque<Result<SearchData<ExplorerItem>, QueryError>>>,
		pub searches: Mutex<Vec<(SearchArgs, Option<Vec<u8>>)>>,
		pub online: Mutex<Vec<Uuid>>,
		pub indexing: AtomicBool,
		pub rescans: Mutex<Vec<QuickRescanArgs>>,
		pub subscriptions: Mutex<Vec<(QuickRescanArgs, async_channel::Sender<RescanEvent>)>>,
		pub fail_subscriptions: AtomicBool,
	}

	impl MockBackend {
		pub fn push_page(&self, page: Result<SearchData<ExplorerItem>, QueryError>) {
			self.pages.lock().unwrap().push_back(page);
		}

		pub fn subscribed(&self) -> Vec<QuickRescanArgs> {
			self.subscriptions
				.lock()
				.unwrap()
				.iter()
				.map(|(args, _)| args.clone())
				.collect()
		}

		/// Pushes `event` to every live subscription on `args`.
		pub async fn emit(&self, args: &QuickRescanArgs, event: RescanEvent) {
			let senders = self
				.subscriptions
				.lock()
				.unwrap()
				.iter()
				.filter(|(subscribed, tx)| subscribed == args && !tx.is_closed())
				.map(|(_, tx)| tx.clone())
				.collect::<Vec<_>>();

			for tx in senders {
				tx.send(event.clone()).await.ok();
			}
		}
	}

	pub fn path_item(id: i32) -> ExplorerItem {
		ExplorerItem::Path {
			id,
			name: Some(format!("file {id}")),
			extension: None,
			is_dir: false,
			hidden: false,
			has_created_thumbnail: false,
		}
	}

	#[async_trait]
	impl ExplorerBackend for MockBackend {
		async fn get_location(&self, id: i32) -> Result<NormalisedResult<Location>, QueryError> {
			let location = self
				.locations
				.lock()
				.unwrap()
				.get(&id)
				.cloned()
				.ok_or_else(|| QueryError::NotFound(format!("location {id}")))?;

			NormalisedResult::from_item(id, &location)
				.map_err(|e| QueryError::Transport(e.to_string()))
		}

		async fn get_tag(&self, id: i32) -> Result<NormalisedResult<Tag>, QueryError> {
			let tag = self
				.tags
				.lock()
				.unwrap()
				.get(&id)
				.cloned()
				.ok_or_else(|| QueryError::NotFound(format!("tag {id}")))?;

			NormalisedResult::from_item(id, &tag).map_err(|e| QueryError::Transport(e.to_string()))
		}

		async fn search(
			&self,
			args: SearchArgs,
			cursor: Option<Vec<u8>>,
		) -> Result<SearchData<ExplorerItem>, QueryError> {
			self.searches.lock().unwrap().push((args, cursor));

			self.pages
				.lock()
				.unwrap()
				.pop_front()
				.unwrap_or_else(|| Ok(SearchData::default()))
		}

		async fn online_locations(&self) -> Result<Vec<Uuid>, QueryError> {
			Ok(self.online.lock().unwrap().clone())
		}

		async fn is_location_indexing(&self, _location_id: i32) -> Result<bool, QueryError> {
			Ok(self.indexing.load(Ordering::SeqCst))
		}

		async fn quick_rescan(&self, args: QuickRescanArgs) -> Result<(), QueryError> {
			self.rescans.lock().unwrap().push(args);
			Ok(())
		}

		async fn subscribe_quick_rescan(
			&self,
			args: QuickRescanArgs,
		) -> Result<BoxStream<'static, RescanEvent>, SubscriptionError> {
			if self.fail_subscriptions.load(Ordering::SeqCst) {
				return Err(SubscriptionError::Subscribe {
					name: "locations.quickRescan",
					reason: "not connected".into(),
				});
			}

			let (tx, rx) = async_channel::unbounded();
			self.subscriptions.lock().unwrap().push((args, tx));

			Ok(rx.boxed())
		}
	}
}
