use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
	backend::{SearchArgs, SearchData},
	entity::NavigationalIdentity,
	error::QueryError,
};

/// Generation of an issued fetch. Only the latest one may land.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<request_id='{}'>", self.0)
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
	Initial,
	NextPage,
}

/// Everything a listing is keyed by: what is browsed plus the query sent for it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryKey {
	pub identity: NavigationalIdentity,
	pub args: SearchArgs,
}

/// A fetch the caller must run and hand back through [`ExplorerQuery::complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
	pub id: RequestId,
	pub kind: FetchKind,
	pub identity: NavigationalIdentity,
	pub args: SearchArgs,
	pub cursor: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
	Idle,
	Loading,
	Ready,
	FetchingNextPage,
	Failed { error: QueryError, during: FetchKind },
}

/// View state scoped to a navigational identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransientState {
	pub selected: HashSet<String>,
	pub scroll_offset: u32,
	pub new_thumbnails: HashSet<String>,
	/// Bumped once per identity change.
	pub epoch: u64,
}

impl TransientState {
	fn reset(&mut self) {
		self.selected.clear();
		self.scroll_offset = 0;
		self.new_thumbnails.clear();
		self.epoch += 1;
	}
}

/// Paginated listing state machine.
///
/// The coordinator never performs I/O itself: every transition that needs data hands out a
/// [`FetchRequest`], and the caller feeds the outcome back with [`ExplorerQuery::complete`].
/// Responses carrying anything but the latest [`RequestId`] are dropped.
#[derive(Debug)]
pub struct ExplorerQuery<T> {
	key: Option<QueryKey>,
	state: QueryState,
	items: Vec<T>,
	cursor: Option<Vec<u8>>,
	next_request_id: u64,
	in_flight: Option<FetchRequest>,
	failed: Option<FetchRequest>,
	keep_previous_data: bool,
	is_loading_preferences: bool,
	transient: TransientState,
}

impl<T> ExplorerQuery<T> {
	pub fn new(keep_previous_data: bool) -> Self {
		Self {
			key: None,
			state: QueryState::Idle,
			items: Vec::new(),
			cursor: None,
			next_request_id: 0,
			in_flight: None,
			failed: None,
			keep_previous_data,
			is_loading_preferences: false,
			transient: TransientState::default(),
		}
	}

	fn issue(
		&mut self,
		kind: FetchKind,
		identity: NavigationalIdentity,
		args: SearchArgs,
		cursor: Option<Vec<u8>>,
	) -> FetchRequest {
		self.next_request_id += 1;

		let request = FetchRequest {
			id: RequestId(self.next_request_id),
			kind,
			identity,
			args,
			cursor,
		};

		self.state = match kind {
			FetchKind::Initial => QueryState::Loading,
			FetchKind::NextPage => QueryState::FetchingNextPage,
		};
		self.failed = None;
		self.in_flight = Some(request.clone());

		debug!(
			id = %request.id,
			identity = %request.identity,
			?kind,
			"Issuing explorer fetch"
		);

		request
	}

	/// Aligns the listing with `key`.
	///
	/// A new navigational identity discards the listing and the transient state. Same
	/// identity with other filters, ordering or page size restarts pagination but keeps the
	/// transient state. An unchanged key is a no-op.
	pub fn sync(&mut self, key: QueryKey) -> Option<FetchRequest> {
		match &self.key {
			Some(current) if *current == key => return None,
			Some(current) if current.identity == key.identity => {
				debug!(identity = %key.identity, "Query arguments changed, restarting pagination");
			}
			_ => {
				debug!(identity = %key.identity, "Navigational identity changed");
				self.transient.reset();
			}
		}

		self.items.clear();
		self.cursor = None;

		let request = self.issue(FetchKind::Initial, key.identity.clone(), key.args.clone(), None);
		self.key = Some(key);

		Some(request)
	}

	/// Requests the page after the last loaded one, if there is one and nothing is in flight.
	pub fn fetch_next_page(&mut self) -> Option<FetchRequest> {
		if self.state != QueryState::Ready {
			return None;
		}

		let cursor = self.cursor.clone()?;
		let key = self.key.clone()?;

		Some(self.issue(FetchKind::NextPage, key.identity, key.args, Some(cursor)))
	}

	/// Refetches from the first page after a live update for `identity`.
	///
	/// Updates for anything but the current identity are ignored.
	pub fn invalidate(&mut self, identity: &NavigationalIdentity) -> Option<FetchRequest> {
		let key = match &self.key {
			Some(key) if key.identity == *identity => key.clone(),
			_ => {
				debug!(%identity, "Ignoring invalidation for a superseded identity");
				return None;
			}
		};

		if !self.keep_previous_data {
			self.items.clear();
		}

		Some(self.issue(FetchKind::Initial, key.identity, key.args, None))
	}

	/// Re-issues the failed fetch with the same arguments and cursor.
	pub fn retry(&mut self) -> Option<FetchRequest> {
		let failed = self.failed.take()?;

		Some(self.issue(failed.kind, failed.identity, failed.args, failed.cursor))
	}

	/// Applies the outcome of request `id`. Returns `false` when the response is stale.
	pub fn complete(
		&mut self,
		id: RequestId,
		result: Result<SearchData<T>, QueryError>,
	) -> bool {
		let Some(request) = self.in_flight.take_if(|request| request.id == id) else {
			warn!(%id, "Dropping stale explorer response");
			return false;
		};

		match result {
			Ok(SearchData { items, cursor }) => {
				match request.kind {
					FetchKind::Initial => self.items = items,
					FetchKind::NextPage => self.items.extend(items),
				}

				self.cursor = cursor;
				self.state = QueryState::Ready;
				self.transient.new_thumbnails.clear();

				debug!(%id, items = self.items.len(), "Explorer fetch completed");
			}
			Err(error) => {
				warn!(%id, %error, "Explorer fetch failed");

				self.state = QueryState::Failed {
					error,
					during: request.kind,
				};
				self.failed = Some(request);
			}
		}

		true
	}

	pub fn items(&self) -> &[T] {
		&self.items
	}

	pub const fn state(&self) -> &QueryState {
		&self.state
	}

	pub fn key(&self) -> Option<&QueryKey> {
		self.key.as_ref()
	}

	pub fn identity(&self) -> Option<&NavigationalIdentity> {
		self.key.as_ref().map(|key| &key.identity)
	}

	pub fn in_flight(&self) -> Option<&FetchRequest> {
		self.in_flight.as_ref()
	}

	pub const fn is_loading(&self) -> bool {
		matches!(self.state, QueryState::Loading)
	}

	pub const fn is_fetching_next_page(&self) -> bool {
		matches!(self.state, QueryState::FetchingNextPage)
	}

	pub const fn has_next_page(&self) -> bool {
		self.cursor.is_some()
	}

	pub const fn error(&self) -> Option<&QueryError> {
		match &self.state {
			QueryState::Failed { error, .. } => Some(error),
			_ => None,
		}
	}

	pub const fn is_loading_preferences(&self) -> bool {
		self.is_loading_preferences
	}

	pub fn set_loading_preferences(&mut self, is_loading: bool) {
		self.is_loading_preferences = is_loading;
	}

	pub const fn transient(&self) -> &TransientState {
		&self.transient
	}

	pub fn select(&mut self, key: impl Into<String>) {
		self.transient.selected.insert(key.into());
	}

	pub fn reset_selected_items(&mut self) {
		self.transient.selected.clear();
	}

	pub fn scroll_to(&mut self, offset: u32) {
		self.transient.scroll_offset = offset;
	}

	pub fn mark_new_thumbnail(&mut self, key: impl Into<String>) {
		self.transient.new_thumbnails.insert(key.into());
	}
}

impl<T> Default for ExplorerQuery<T> {
	fn default() -> Self {
		Self::new(true)
	}
}
