use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc,
	},
	time::Duration,
};

use async_channel as chan;
use tokio::{
	spawn,
	sync::RwLock,
	task::JoinHandle,
	time::timeout,
};
use tracing::{debug, error, instrument, warn};

use crate::{
	entity::{EntityRef, ExplorerKind},
	error::PersistError,
	notifications::{Notification, Notifier},
	preferences::{LibraryPreferences, PreferenceStore, Settings},
	settings::ExplorerSettings,
};

const PERSIST_ERROR_TITLE: &str = "Preferences";
const PERSIST_ERROR_MESSAGE: &str = "An error has occurred while updating your preferences.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
	Written,
	/// The entity's preferences were still loading, writing now would clobber them with defaults.
	Skipped,
	/// Handed to a [`DebouncedCommitter`].
	Scheduled,
}

/// Proof of an in flight preference load, consumed when the load completes.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
	entity: EntityRef,
	id: u64,
}

impl LoadTicket {
	pub const fn entity(&self) -> EntityRef {
		self.entity
	}
}

/// Tracks which entities have a preference load in flight.
///
/// Only the latest load of an entity counts: finishing an older ticket doesn't clear a newer one.
/// Ticket ids come from the same sequence as [`PendingLoads::next_read`], so they also order
/// store reads.
#[derive(Debug, Default)]
pub struct PendingLoads {
	loads: RwLock<HashMap<EntityRef, u64>>,
	next_id: AtomicU64,
}

impl PendingLoads {
	/// Sequence number for a store read that isn't tied to a load, never zero.
	pub fn next_read(&self) -> u64 {
		self.next_id.fetch_add(1, Ordering::Relaxed) + 1
	}

	pub async fn begin(&self, entity: EntityRef) -> LoadTicket {
		let id = self.next_read();

		self.loads.write().await.insert(entity, id);

		LoadTicket { entity, id }
	}

	/// Returns `false` if a newer load for the same entity superseded this one.
	pub async fn finish(&self, ticket: LoadTicket) -> bool {
		let mut loads = self.loads.write().await;

		if loads.get(&ticket.entity) == Some(&ticket.id) {
			loads.remove(&ticket.entity);
			true
		} else {
			false
		}
	}

	pub async fn is_loading(&self, entity: &EntityRef) -> bool {
		self.loads.read().await.contains_key(entity)
	}
}

#[derive(Debug, Default)]
struct CachedPreferences {
	/// Sequence number of the read that produced `preferences`, `0` before the first one.
	read: u64,
	preferences: Option<LibraryPreferences>,
}

/// Read through cache of the library preferences plus guarded write-back of explorer settings.
pub struct SettingsPersistence {
	store: Arc<dyn PreferenceStore>,
	cache: RwLock<CachedPreferences>,
	pending: PendingLoads,
	notifier: Arc<Notifier>,
}

impl SettingsPersistence {
	pub fn new(store: Arc<dyn PreferenceStore>, notifier: Arc<Notifier>) -> Arc<Self> {
		Arc::new(Self {
			store,
			cache: RwLock::default(),
			pending: PendingLoads::default(),
			notifier,
		})
	}

	pub const fn notifier(&self) -> &Arc<Notifier> {
		&self.notifier
	}

	/// Last successfully read preferences, `None` until the first read lands.
	pub async fn preferences(&self) -> Option<LibraryPreferences> {
		self.cache.read().await.preferences.clone()
	}

	/// Caches `preferences` unless a read that started later already landed.
	/// Returns whatever the cache holds afterwards.
	async fn store_read(&self, read: u64, preferences: LibraryPreferences) -> LibraryPreferences {
		let mut cache = self.cache.write().await;

		if read > cache.read {
			cache.read = read;
			cache.preferences = Some(preferences.clone());
			return preferences;
		}

		debug!(read, cached = cache.read, "Keeping preferences from a newer read");
		cache.preferences.clone().unwrap_or(preferences)
	}

	pub async fn is_loading(&self, entity: &EntityRef) -> bool {
		self.pending.is_loading(entity).await
	}

	pub async fn begin_load(&self, entity: EntityRef) -> LoadTicket {
		debug!(%entity, "Loading preferences");
		self.pending.begin(entity).await
	}

	pub async fn finish_load(
		&self,
		ticket: LoadTicket,
		res: Result<LibraryPreferences, PersistError>,
	) -> Result<LibraryPreferences, PersistError> {
		let (entity, id) = (ticket.entity, ticket.id);

		let current = self.pending.finish(ticket).await;

		match res {
			Ok(preferences) if current => Ok(self.store_read(id, preferences).await),
			Ok(preferences) => {
				debug!(%entity, "Preference load superseded by a newer one");
				Ok(self.preferences().await.unwrap_or(preferences))
			}
			Err(e) => {
				error!(%entity, ?e, "Failed to load preferences");
				Err(e)
			}
		}
	}

	/// Initial preference read on behalf of `entity`; commits for it are skipped meanwhile.
	#[instrument(skip(self), err)]
	pub async fn load(&self, entity: EntityRef) -> Result<LibraryPreferences, PersistError> {
		let ticket = self.begin_load(entity).await;

		self.run_load(ticket).await
	}

	/// Reads the store for a load begun with [`SettingsPersistence::begin_load`].
	pub async fn run_load(&self, ticket: LoadTicket) -> Result<LibraryPreferences, PersistError> {
		let res = LibraryPreferences::read(&*self.store).await;

		self.finish_load(ticket, res).await
	}

	/// Re-reads the store so subsequent resolves see the latest writes.
	/// On failure the previously cached preferences are kept.
	pub async fn refresh(&self) -> Result<(), PersistError> {
		let read = self.pending.next_read();
		let preferences = LibraryPreferences::read(&*self.store).await?;

		self.store_read(read, preferences).await;

		Ok(())
	}

	pub async fn commit<K: ExplorerKind>(
		&self,
		entity: &K::Entity,
		settings: &ExplorerSettings<K::Order>,
	) -> Result<CommitOutcome, PersistError> {
		self.commit_update(K::entity_ref(entity), settings_update::<K>(entity, settings))
			.await
	}

	/// Writes `update` unless `entity` still has its initial load in flight.
	///
	/// Failures are surfaced as a notification, whatever the view already applied stays applied.
	#[instrument(skip(self, update), err)]
	pub async fn commit_update(
		&self,
		entity: EntityRef,
		update: LibraryPreferences,
	) -> Result<CommitOutcome, PersistError> {
		if self.pending.is_loading(&entity).await {
			debug!("Skipping settings commit, preferences are still loading");
			return Ok(CommitOutcome::Skipped);
		}

		if let Err(e) = update.write(&*self.store).await {
			error!(?e, "Failed to persist explorer settings");

			self.notifier
				.emit(Notification::new(entity, PERSIST_ERROR_TITLE, PERSIST_ERROR_MESSAGE))
				.await;

			return Err(e);
		}

		if let Err(e) = self.refresh().await {
			warn!(?e, "Failed to refresh preferences after a write");
		}

		Ok(CommitOutcome::Written)
	}
}

fn settings_update<K: ExplorerKind>(
	entity: &K::Entity,
	settings: &ExplorerSettings<K::Order>,
) -> LibraryPreferences {
	K::update(
		K::pub_id(entity),
		Settings {
			explorer: Some(settings.clone().into()),
		},
	)
}

/// Coalesces bursts of settings edits, writing only the latest value per entity once the
/// edits have been quiet for a while.
pub struct DebouncedCommitter {
	tx: chan::Sender<(EntityRef, LibraryPreferences)>,
	handle: JoinHandle<()>,
}

impl DebouncedCommitter {
	pub fn spawn(persistence: Arc<SettingsPersistence>, quiet: Duration) -> Self {
		let (tx, rx) = chan::unbounded::<(EntityRef, LibraryPreferences)>();

		let handle = spawn(async move {
			let mut pending = HashMap::new();

			loop {
				let next = if pending.is_empty() {
					rx.recv().await.ok()
				} else {
					match timeout(quiet, rx.recv()).await {
						Ok(res) => res.ok(),
						Err(_elapsed) => {
							flush(&persistence, &mut pending).await;
							continue;
						}
					}
				};

				let Some((entity, update)) = next else {
					// All senders are gone, write whatever is left and stop
					flush(&persistence, &mut pending).await;
					break;
				};

				pending.insert(entity, update);
			}
		});

		Self { tx, handle }
	}

	pub async fn schedule<K: ExplorerKind>(
		&self,
		entity: &K::Entity,
		settings: &ExplorerSettings<K::Order>,
	) -> Result<(), PersistError> {
		let entity_ref = K::entity_ref(entity);

		self.tx
			.send((entity_ref, settings_update::<K>(entity, settings)))
			.await
			.map_err(|_| PersistError::CommitterClosed(entity_ref))
	}

	/// Writes anything still pending and waits for the committer to stop.
	pub async fn shutdown(self) {
		let Self { tx, handle } = self;

		tx.close();

		if let Err(e) = handle.await {
			error!(?e, "Settings committer task failed");
		}
	}
}

async fn flush(
	persistence: &SettingsPersistence,
	pending: &mut HashMap<EntityRef, LibraryPreferences>,
) {
	for (entity, update) in pending.drain() {
		// Failures were already reported to the user by `commit_update`
		if let Ok(CommitOutcome::Skipped) = persistence.commit_update(entity, update).await {
			debug!(%entity, "Debounced settings commit skipped");
		}
	}
}
