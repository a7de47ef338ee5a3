use std::{collections::VecDeque, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::entity::EntityRef;

const HISTORY_LEN: usize = 32;

/// An error the user has to be told about, shown as a toast by the frontend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
	pub entity: EntityRef,
	pub title: String,
	pub content: String,
	pub created_at: DateTime<Utc>,
}

impl Notification {
	pub fn new(entity: EntityRef, title: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			entity,
			title: title.into(),
			content: content.into(),
			created_at: Utc::now(),
		}
	}
}

/// Broadcasts notifications and keeps the last few for views that subscribe late.
pub struct Notifier {
	history: Mutex<VecDeque<Notification>>,
	tx: broadcast::Sender<Notification>,
}

impl Notifier {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			history: Mutex::new(VecDeque::with_capacity(HISTORY_LEN)),
			tx: broadcast::channel(HISTORY_LEN).0,
		})
	}

	pub async fn emit(&self, notification: Notification) {
		debug!(entity = %notification.entity, title = %notification.title, "Notifying user");

		{
			let mut history = self.history.lock().await;
			if history.len() == HISTORY_LEN {
				history.pop_front();
			}
			history.push_back(notification.clone());
		}

		// Only fails when nobody is listening
		self.tx.send(notification).ok();
	}

	/// Oldest first.
	pub async fn history(&self) -> Vec<Notification> {
		self.history.lock().await.iter().cloned().collect()
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
		self.tx.subscribe()
	}
}
