use async_channel as chan;
use futures::StreamExt;
use tokio::{spawn, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
	backend::{ExplorerBackend, QuickRescanArgs, RescanEvent},
	entity::NavigationalIdentity,
};

/// A rescan event tagged with the identity whose subscription delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveUpdate {
	pub identity: NavigationalIdentity,
	pub event: RescanEvent,
}

struct Subscription {
	identity: NavigationalIdentity,
	handle: Option<JoinHandle<()>>,
}

/// Keeps exactly one rescan subscription alive, the one for the current navigational identity.
///
/// Dropping the listener unsubscribes.
pub struct LiveUpdateListener {
	current: Option<Subscription>,
	tx: chan::Sender<LiveUpdate>,
}

impl LiveUpdateListener {
	pub fn new() -> (Self, chan::Receiver<LiveUpdate>) {
		let (tx, rx) = chan::unbounded();

		(Self { current: None, tx }, rx)
	}

	pub fn identity(&self) -> Option<&NavigationalIdentity> {
		self.current.as_ref().map(|subscription| &subscription.identity)
	}

	/// Whether events are currently flowing. `false` after a failed subscription.
	pub fn is_subscribed(&self) -> bool {
		self.current
			.as_ref()
			.and_then(|subscription| subscription.handle.as_ref())
			.is_some_and(|handle| !handle.is_finished())
	}

	/// Subscribes for `identity` unless already subscribed for it.
	///
	/// `args` is `None` for identities without rescan events, which still replaces the old
	/// subscription. A failed subscription only costs live updates, the view keeps working.
	pub async fn track(
		&mut self,
		backend: &impl ExplorerBackend,
		identity: NavigationalIdentity,
		args: Option<QuickRescanArgs>,
	) {
		if self.identity() == Some(&identity) {
			return;
		}

		self.stop();

		let handle = match args {
			None => None,
			Some(args) => match backend.subscribe_quick_rescan(args).await {
				Ok(mut events) => {
					debug!(%identity, "Subscribed to rescan events");

					let tx = self.tx.clone();
					let identity = identity.clone();

					Some(spawn(async move {
						while let Some(event) = events.next().await {
							let update = LiveUpdate {
								identity: identity.clone(),
								event,
							};

							if tx.send(update).await.is_err() {
								break;
							}
						}

						debug!(%identity, "Rescan event stream ended");
					}))
				}
				Err(e) => {
					warn!(%identity, ?e, "Live updates unavailable, falling back to manual refresh");
					None
				}
			},
		};

		self.current = Some(Subscription { identity, handle });
	}

	pub fn stop(&mut self) {
		if let Some(Subscription {
			identity,
			handle: Some(handle),
		}) = self.current.take()
		{
			debug!(%identity, "Unsubscribing from rescan events");
			handle.abort();
		}
	}
}

impl Drop for LiveUpdateListener {
	fn drop(&mut self) {
		self.stop();
	}
}

#[cfg(test)]
mod tests {
	use std::{sync::atomic::Ordering, time::Duration};

	use tokio::time::timeout;
	use tracing_test::traced_test;

	use crate::{
		backend::mock::MockBackend,
		entity::{EntityKind, EntityRef},
	};

	use super::*;

	fn identity(sub_path: &str) -> NavigationalIdentity {
		NavigationalIdentity {
			entity: EntityRef {
				kind: EntityKind::Location,
				id: 1,
			},
			sub_path: Some(sub_path.to_string()),
		}
	}

	fn args(sub_path: &str) -> QuickRescanArgs {
		QuickRescanArgs {
			location_id: 1,
			sub_path: sub_path.to_string(),
		}
	}

	fn event(sub_path: &str) -> RescanEvent {
		RescanEvent {
			location_id: 1,
			sub_path: sub_path.to_string(),
		}
	}

	#[tokio::test]
	async fn events_are_tagged_with_their_identity() {
		let backend = MockBackend::default();
		let (mut listener, rx) = LiveUpdateListener::new();

		listener.track(&backend, identity(""), Some(args(""))).await;
		assert!(listener.is_subscribed());

		backend.emit(&args(""), event("")).await;

		let update = timeout(Duration::from_secs(1), rx.recv())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(update.identity, identity(""));
		assert_eq!(update.event, event(""));
	}

	#[tokio::test]
	async fn same_identity_does_not_resubscribe() {
		let backend = MockBackend::default();
		let (mut listener, _rx) = LiveUpdateListener::new();

		listener.track(&backend, identity(""), Some(args(""))).await;
		listener.track(&backend, identity(""), Some(args(""))).await;

		assert_eq!(backend.subscribed(), vec![args("")]);
	}

	#[tokio::test]
	async fn sub_path_change_resubscribes() {
		let backend = MockBackend::default();
		let (mut listener, rx) = LiveUpdateListener::new();

		listener.track(&backend, identity(""), Some(args(""))).await;
		listener
			.track(&backend, identity("/Photos"), Some(args("/Photos")))
			.await;

		assert_eq!(backend.subscribed(), vec![args(""), args("/Photos")]);

		// The old subscription is gone, only the new one delivers
		tokio::task::yield_now().await;
		backend.emit(&args(""), event("")).await;
		backend.emit(&args("/Photos"), event("/Photos")).await;

		let update = timeout(Duration::from_secs(1), rx.recv())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(update.identity, identity("/Photos"));
		assert!(rx.is_empty());
	}

	#[tokio::test]
	#[traced_test]
	async fn failed_subscriptions_degrade_silently() {
		let backend = MockBackend::default();
		backend.fail_subscriptions.store(true, Ordering::SeqCst);
		let (mut listener, _rx) = LiveUpdateListener::new();

		listener.track(&backend, identity(""), Some(args(""))).await;

		assert_eq!(listener.identity(), Some(&identity("")));
		assert!(!listener.is_subscribed());
		assert!(logs_contain("Live updates unavailable"));
	}

	#[tokio::test]
	async fn dropping_the_listener_unsubscribes() {
		let backend = MockBackend::default();
		let (mut listener, rx) = LiveUpdateListener::new();

		listener.track(&backend, identity(""), Some(args(""))).await;
		drop(listener);
		tokio::task::yield_now().await;

		backend.emit(&args(""), event("")).await;
		assert!(rx.recv().await.is_err());
	}
}
