use std::{collections::HashMap, pin::pin, sync::Arc};

use async_channel as chan;
use futures::StreamExt;
use futures_concurrency::stream::Merge;
use tokio::spawn;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
	backend::{ExplorerBackend, ExplorerItem, SearchArgs, SearchData},
	cache::NormalisedCache,
	config::ExplorerConfig,
	entity::{ExplorerKind, Location, LocationKind, NavigationalIdentity, Tag, TagKind},
	error::{Error, PersistError, QueryError, ValidationError},
	filters::build_filters,
	live::{LiveUpdate, LiveUpdateListener},
	persistence::{CommitOutcome, DebouncedCommitter, SettingsPersistence},
	preferences::LibraryPreferences,
	query::{ExplorerQuery, FetchKind, FetchRequest, QueryKey, QueryState, RequestId},
	route::{EntityIdParams, RouteState},
	search::{state::SearchState, FilterTarget},
	settings::{resolve_settings, ExplorerSettings},
};

const DEFAULT_TAG_COLOR: &str = "#efefef";
const DEFAULT_TAG_TITLE: &str = "Tag";

enum ViewMessage {
	Preferences(Result<LibraryPreferences, PersistError>),
	Fetched(RequestId, Result<SearchData<ExplorerItem>, QueryError>),
	Live(LiveUpdate),
}

/// One explorer instance: settings, search, route and listing of a single entity, kept in sync.
///
/// Remote calls run on spawned tasks and report back through a channel. Nothing is applied
/// until [`ExplorerView::process`] picks the result up, so all state changes happen on the
/// owner's task.
pub struct ExplorerView<K: ExplorerKind, B: ExplorerBackend> {
	backend: Arc<B>,
	persistence: Arc<SettingsPersistence>,
	committer: Option<DebouncedCommitter>,
	config: ExplorerConfig,

	entity: K::Entity,
	route: RouteState,
	search: SearchState,
	settings: ExplorerSettings<K::Order>,

	query: ExplorerQuery<ExplorerItem>,
	live: LiveUpdateListener,
	live_rx: chan::Receiver<LiveUpdate>,

	msgs_tx: chan::Sender<ViewMessage>,
	msgs_rx: chan::Receiver<ViewMessage>,
}

impl<K: ExplorerKind, B: ExplorerBackend> ExplorerView<K, B> {
	pub async fn open(
		backend: Arc<B>,
		persistence: Arc<SettingsPersistence>,
		config: ExplorerConfig,
		entity: K::Entity,
		route: RouteState,
	) -> Self {
		let (live, live_rx) = LiveUpdateListener::new();
		let (msgs_tx, msgs_rx) = chan::unbounded();

		let committer = (config.persist_debounce_ms > 0)
			.then(|| DebouncedCommitter::spawn(Arc::clone(&persistence), config.persist_debounce()));

		// Whatever is already cached is better than the bare defaults while the load runs
		let settings =
			resolve_settings::<K>(Some(&entity), persistence.preferences().await.as_ref());

		let mut view = Self {
			backend,
			persistence,
			committer,
			query: ExplorerQuery::new(config.keep_previous_data),
			config,
			entity,
			route,
			search: SearchState::default(),
			settings,
			live,
			live_rx,
			msgs_tx,
			msgs_rx,
		};

		view.load_preferences().await;
		view.sync().await;

		view
	}

	async fn load_preferences(&mut self) {
		let ticket = self
			.persistence
			.begin_load(K::entity_ref(&self.entity))
			.await;

		self.query.set_loading_preferences(true);

		let persistence = Arc::clone(&self.persistence);
		let msgs_tx = self.msgs_tx.clone();

		spawn(async move {
			let res = persistence.run_load(ticket).await;
			msgs_tx.send(ViewMessage::Preferences(res)).await.ok();
		});
	}

	fn query_key(&self) -> QueryKey {
		QueryKey {
			identity: self.identity(),
			args: SearchArgs {
				target: K::search_target(self.settings.order.clone(), &self.config),
				filters: build_filters::<K>(&self.entity, &self.search, &self.settings, &self.route),
				take: K::page_size(&self.route, &self.config),
			},
		}
	}

	/// Brings the listing and the live subscription in line with the current state.
	async fn sync(&mut self) {
		let key = self.query_key();
		let identity = key.identity.clone();

		if let Some(request) = self.query.sync(key) {
			self.dispatch(request);
		}

		self.live
			.track(
				&*self.backend,
				identity,
				K::rescan_args(&self.entity, &self.route),
			)
			.await;
	}

	fn dispatch(&self, request: FetchRequest) {
		let FetchRequest {
			id, args, cursor, ..
		} = request;

		let backend = Arc::clone(&self.backend);
		let msgs_tx = self.msgs_tx.clone();

		spawn(async move {
			let res = backend.search(args, cursor).await;
			msgs_tx.send(ViewMessage::Fetched(id, res)).await.ok();
		});
	}

	/// Waits for the next completed request or live update and applies it.
	pub async fn process(&mut self) -> bool {
		let msg = pin!((
			self.msgs_rx.clone(),
			self.live_rx.clone().map(ViewMessage::Live),
		)
			.merge())
		.next()
		.await;

		let Some(msg) = msg else {
			return false;
		};

		match msg {
			ViewMessage::Preferences(Ok(preferences)) => {
				self.query.set_loading_preferences(false);
				self.settings = resolve_settings::<K>(Some(&self.entity), Some(&preferences));
				self.sync().await;
			}
			ViewMessage::Preferences(Err(e)) => {
				// Already logged when the load finished
				debug!(?e, "Rendering with default explorer settings");
				self.query.set_loading_preferences(false);
			}
			ViewMessage::Fetched(id, res) => {
				self.query.complete(id, res);
			}
			ViewMessage::Live(update) => {
				debug!(identity = %update.identity, "Rescan event received");
				if let Some(request) = self.query.invalidate(&update.identity) {
					self.dispatch(request);
				}
			}
		}

		true
	}

	/// Processes messages until preferences are loaded and no fetch is in flight.
	pub async fn settle(&mut self) {
		while self.query.in_flight().is_some() || self.query.is_loading_preferences() {
			if !self.process().await {
				break;
			}
		}
	}

	/// Moves to another place inside the same entity. A new sub-path starts with a clean search.
	pub async fn navigate(&mut self, route: RouteState) {
		if K::identity(&self.entity, &route) != self.identity() {
			self.search = SearchState::default();
		}

		self.route = route;
		self.sync().await;
	}

	pub async fn set_search(&mut self, search: SearchState) {
		self.search = search;
		self.sync().await;
	}

	/// Applies `update` to the effective settings right away, then persists them.
	///
	/// The applied settings stay in place whatever happens to the write.
	#[instrument(skip_all, fields(entity = %K::entity_ref(&self.entity)), err)]
	pub async fn update_settings(
		&mut self,
		update: impl FnOnce(&mut ExplorerSettings<K::Order>) + Send,
	) -> Result<CommitOutcome, PersistError> {
		update(&mut self.settings);
		self.sync().await;

		if self
			.persistence
			.is_loading(&K::entity_ref(&self.entity))
			.await
		{
			debug!("Not persisting settings, preferences are still loading");
			return Ok(CommitOutcome::Skipped);
		}

		match &self.committer {
			Some(committer) => committer
				.schedule::<K>(&self.entity, &self.settings)
				.await
				.map(|()| CommitOutcome::Scheduled),
			None => {
				self.persistence
					.commit::<K>(&self.entity, &self.settings)
					.await
			}
		}
	}

	pub fn fetch_next_page(&mut self) -> bool {
		self.query
			.fetch_next_page()
			.map(|request| self.dispatch(request))
			.is_some()
	}

	pub fn retry(&mut self) -> bool {
		self.query
			.retry()
			.map(|request| self.dispatch(request))
			.is_some()
	}

	pub fn reset_selected_items(&mut self) {
		self.query.reset_selected_items();
	}

	/// Asks the backend to rescan what is being browsed. No-op for kinds without rescans.
	pub async fn rescan(&self) -> Result<(), QueryError> {
		match K::rescan_args(&self.entity, &self.route) {
			Some(args) => self.backend.quick_rescan(args).await,
			None => Ok(()),
		}
	}

	pub fn identity(&self) -> NavigationalIdentity {
		K::identity(&self.entity, &self.route)
	}

	pub const fn entity(&self) -> &K::Entity {
		&self.entity
	}

	pub const fn route(&self) -> &RouteState {
		&self.route
	}

	pub const fn search(&self) -> &SearchState {
		&self.search
	}

	pub const fn settings(&self) -> &ExplorerSettings<K::Order> {
		&self.settings
	}

	pub const fn query(&self) -> &ExplorerQuery<ExplorerItem> {
		&self.query
	}

	pub fn query_mut(&mut self) -> &mut ExplorerQuery<ExplorerItem> {
		&mut self.query
	}

	pub const fn live(&self) -> &LiveUpdateListener {
		&self.live
	}

	pub const fn backend(&self) -> &Arc<B> {
		&self.backend
	}

	pub const fn is_loading_preferences(&self) -> bool {
		self.query.is_loading_preferences()
	}

	/// Stops live updates and writes out any settings still waiting in the debounce window.
	pub async fn close(self) {
		let Self {
			committer,
			mut live,
			..
		} = self;

		live.stop();

		if let Some(committer) = committer {
			committer.shutdown().await;
		}
	}

	fn content(&self, notice: EmptyNotice) -> ContentState {
		if self.is_loading_preferences() {
			return ContentState::LoadingPreferences;
		}

		if let QueryState::Failed { error, during } = self.query.state() {
			return ContentState::Error {
				error: error.clone(),
				during: *during,
			};
		}

		ContentState::Explorer {
			empty_notice: (self.query.state() == &QueryState::Ready
				&& self.query.items().is_empty())
			.then_some(notice),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarAction {
	Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyNotice {
	pub icon: &'static str,
	pub message: &'static str,
}

impl EmptyNotice {
	pub const LOCATION: Self = Self {
		icon: "FolderNoSpace",
		message: "location_empty_notice_message",
	};

	pub const TAG: Self = Self {
		icon: "Tags",
		message: "tags_notice_message",
	};
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentState {
	/// The location is being indexed, nothing meaningful to list yet.
	Indexing,
	LoadingPreferences,
	/// The last fetch failed, [`ExplorerView::retry`] issues it again.
	Error { error: QueryError, during: FetchKind },
	Explorer { empty_notice: Option<EmptyNotice> },
}

/// What a route renders around its explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteView {
	pub title: String,
	pub offline: bool,
	pub color: Option<String>,
	pub actions: Vec<TopBarAction>,
	pub search_open: bool,
	pub search_target: FilterTarget,
	pub content: ContentState,
}

/// `/location/:id` route.
pub struct LocationShell<B: ExplorerBackend> {
	view: ExplorerView<LocationKind, B>,
	cache: NormalisedCache,
	online_locations: Option<Vec<Uuid>>,
	indexing: bool,
}

impl<B: ExplorerBackend> LocationShell<B> {
	#[instrument(skip_all, err)]
	pub async fn open(
		backend: Arc<B>,
		persistence: Arc<SettingsPersistence>,
		config: ExplorerConfig,
		params: &HashMap<String, String>,
		search_params: &HashMap<String, String>,
	) -> Result<Self, Error> {
		let EntityIdParams { id } = EntityIdParams::parse(params)?;
		let route = RouteState::parse(search_params)?;

		let mut cache = NormalisedCache::new();
		let location: Location = cache.resolve(backend.get_location(id).await?)?;

		let view = ExplorerView::open(backend, persistence, config, location, route).await;

		let mut shell = Self {
			view,
			cache,
			online_locations: None,
			indexing: false,
		};

		shell.refresh_status().await;

		Ok(shell)
	}

	/// Re-reads the online set and the indexing flag. Failures keep the previous values.
	pub async fn refresh_status(&mut self) {
		let backend = Arc::clone(self.view.backend());
		let location_id = self.view.entity().id;

		match backend.online_locations().await {
			Ok(online_locations) => self.online_locations = Some(online_locations),
			Err(e) => warn!(?e, "Failed to fetch online locations"),
		}

		match backend.is_location_indexing(location_id).await {
			Ok(indexing) => self.indexing = indexing,
			Err(e) => warn!(%location_id, ?e, "Failed to fetch location indexing status"),
		}
	}

	pub async fn navigate(
		&mut self,
		search_params: &HashMap<String, String>,
	) -> Result<(), ValidationError> {
		let route = RouteState::parse(search_params)?;
		self.view.navigate(route).await;

		Ok(())
	}

	pub async fn trigger(&self, action: TopBarAction) -> Result<(), QueryError> {
		match action {
			TopBarAction::Reload => self.view.rescan().await,
		}
	}

	/// Unknown online status isn't reported as offline.
	pub fn is_offline(&self) -> bool {
		self.online_locations
			.as_deref()
			.is_some_and(|online| !self.view.entity().is_online(online))
	}

	pub fn render(&self) -> RouteView {
		let location = self.view.entity();

		let title = self
			.view
			.route()
			.last_section()
			.map_or_else(|| location.name.clone(), ToString::to_string);

		let content = if self.indexing {
			ContentState::Indexing
		} else {
			self.view.content(EmptyNotice::LOCATION)
		};

		RouteView {
			title,
			offline: self.is_offline(),
			color: None,
			actions: vec![TopBarAction::Reload],
			search_open: self.view.search().open,
			search_target: LocationKind::SEARCH_TARGET,
			content,
		}
	}

	pub const fn cache(&self) -> &NormalisedCache {
		&self.cache
	}

	pub const fn view(&self) -> &ExplorerView<LocationKind, B> {
		&self.view
	}

	pub fn view_mut(&mut self) -> &mut ExplorerView<LocationKind, B> {
		&mut self.view
	}

	pub async fn close(self) {
		self.view.close().await;
	}
}

/// `/tag/:id` route.
pub struct TagShell<B: ExplorerBackend> {
	view: ExplorerView<TagKind, B>,
	cache: NormalisedCache,
}

impl<B: ExplorerBackend> TagShell<B> {
	#[instrument(skip_all, err)]
	pub async fn open(
		backend: Arc<B>,
		persistence: Arc<SettingsPersistence>,
		config: ExplorerConfig,
		params: &HashMap<String, String>,
	) -> Result<Self, Error> {
		let EntityIdParams { id } = EntityIdParams::parse(params)?;

		let mut cache = NormalisedCache::new();
		let tag: Tag = cache.resolve(backend.get_tag(id).await?)?;

		let view =
			ExplorerView::open(backend, persistence, config, tag, RouteState::default()).await;

		Ok(Self { view, cache })
	}

	pub fn render(&self) -> RouteView {
		let tag = self.view.entity();

		RouteView {
			title: tag
				.name
				.clone()
				.unwrap_or_else(|| DEFAULT_TAG_TITLE.to_string()),
			offline: false,
			color: Some(
				tag.color
					.clone()
					.filter(|color| !color.is_empty())
					.unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
			),
			actions: vec![],
			search_open: self.view.search().open,
			search_target: TagKind::SEARCH_TARGET,
			content: self.view.content(EmptyNotice::TAG),
		}
	}

	pub const fn cache(&self) -> &NormalisedCache {
		&self.cache
	}

	pub const fn view(&self) -> &ExplorerView<TagKind, B> {
		&self.view
	}

	pub fn view_mut(&mut self) -> &mut ExplorerView<TagKind, B> {
		&mut self.view
	}

	pub async fn close(self) {
		self.view.close().await;
	}
}
