use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
	time::Duration,
};

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use sd_explorer::{
	ExplorerBackend, ExplorerItem, FilePathFilterArgs, Location, NormalisedResult,
	QueryError, QuickRescanArgs, RescanEvent, SearchArgs, SearchData, SearchFilterArgs,
	SubscriptionError, Tag,
};
use uuid::Uuid;

/// Serves a fixed directory tree. Listings of slow paths take a while to arrive.
#[derive(Default)]
pub struct LibraryBackend {
	pub locations: HashMap<i32, Location>,
	pub tags: HashMap<i32, Tag>,
	pub tree: HashMap<String, Vec<i32>>,
	pub slow_paths: Vec<String>,
	pub searches: Mutex<Vec<SearchArgs>>,
	subscriptions: Mutex<Vec<(QuickRescanArgs, async_channel::Sender<RescanEvent>)>>,
}

impl LibraryBackend {
	pub fn with_location(location: Location) -> Self {
		Self {
			locations: HashMap::from([(location.id, location)]),
			tree: HashMap::from([
				(String::new(), vec![1, 2]),
				("/Photos".to_string(), vec![3]),
			]),
			..Default::default()
		}
	}

	pub fn searches(&self) -> Vec<SearchArgs> {
		self.searches.lock().unwrap().clone()
	}

	pub async fn emit(&self, args: &QuickRescanArgs) {
		let senders = self
			.subscriptions
			.lock()
			.unwrap()
			.iter()
			.filter(|(subscribed, tx)| subscribed == args && !tx.is_closed())
			.map(|(_, tx)| tx.clone())
			.collect::<Vec<_>>();

		for tx in senders {
			tx.send(RescanEvent {
				location_id: args.location_id,
				sub_path: args.sub_path.clone(),
			})
			.await
			.ok();
		}
	}
}

pub fn location_a() -> Location {
	Location {
		id: 1,
		pub_id: Uuid::new_v4(),
		name: "Location A".to_string(),
	}
}

fn file(id: i32) -> ExplorerItem {
	ExplorerItem::Path {
		id,
		name: Some(format!("file {id}")),
		extension: Some("png".to_string()),
		is_dir: false,
		hidden: false,
		has_created_thumbnail: true,
	}
}

#[async_trait]
impl ExplorerBackend for LibraryBackend {
	async fn get_location(&self, id: i32) -> Result<NormalisedResult<Location>, QueryError> {
		let location = self
			.locations
			.get(&id)
			.ok_or_else(|| QueryError::NotFound(format!("location {id}")))?;

		NormalisedResult::from_item(id, location).map_err(|e| QueryError::Transport(e.to_string()))
	}

	async fn get_tag(&self, id: i32) -> Result<NormalisedResult<Tag>, QueryError> {
		let tag = self
			.tags
			.get(&id)
			.ok_or_else(|| QueryError::NotFound(format!("tag {id}")))?;

		NormalisedResult::from_item(id, tag).map_err(|e| QueryError::Transport(e.to_string()))
	}

	async fn search(
		&self,
		args: SearchArgs,
		_cursor: Option<Vec<u8>>,
	) -> Result<SearchData<ExplorerItem>, QueryError> {
		self.searches.lock().unwrap().push(args.clone());

		let path = args
			.filters
			.iter()
			.find_map(|filter| match filter {
				SearchFilterArgs::FilePath(FilePathFilterArgs::Path { path, .. }) => {
					Some(path.clone())
				}
				_ => None,
			})
			.unwrap_or_default();

		if self.slow_paths.contains(&path) {
			tokio::time::sleep(Duration::from_millis(500)).await;
		}

		Ok(SearchData {
			items: self
				.tree
				.get(&path)
				.map(|ids| ids.iter().copied().map(file).collect())
				.unwrap_or_default(),
			cursor: None,
		})
	}

	async fn online_locations(&self) -> Result<Vec<Uuid>, QueryError> {
		Ok(self.locations.values().map(|location| location.pub_id).collect())
	}

	async fn is_location_indexing(&self, _location_id: i32) -> Result<bool, QueryError> {
		Ok(false)
	}

	async fn quick_rescan(&self, _args: QuickRescanArgs) -> Result<(), QueryError> {
		Ok(())
	}

	async fn subscribe_quick_rescan(
		&self,
		args: QuickRescanArgs,
	) -> Result<BoxStream<'static, RescanEvent>, SubscriptionError> {
		let (tx, rx) = async_channel::unbounded();
		self.subscriptions.lock().unwrap().push((args, tx));

		Ok(rx.boxed())
	}
}

pub fn shared(backend: LibraryBackend) -> Arc<LibraryBackend> {
	Arc::new(backend)
}
