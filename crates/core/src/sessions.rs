//! In-process session registry.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tandem_primitives::{ConnectionId, PadKey, ProjectId};
use tokio::sync::mpsc;

use crate::clients::{ClientMessage, Clients, DeliveryError};

struct SessionEntry {
	project: ProjectId,
	tx: mpsc::UnboundedSender<ClientMessage>,
	pads: FxHashSet<PadKey>,
}

/// Tracks live connections, the project each belongs to and the pads each views.
///
/// Each session receives its messages on an unbounded channel. A send to a
/// closed channel unregisters the session.
#[derive(Default)]
pub struct SessionRegistry {
	sessions: RwLock<FxHashMap<ConnectionId, SessionEntry>>,
}

impl SessionRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `connection` as a member of `project`, replacing any previous
	/// registration, and returns its message stream.
	pub fn register(&self, connection: ConnectionId, project: ProjectId) -> mpsc::UnboundedReceiver<ClientMessage> {
		let (tx, rx) = mpsc::unbounded_channel();
		let entry = SessionEntry {
			project,
			tx,
			pads: FxHashSet::default(),
		};
		self.sessions.write().insert(connection, entry);
		tracing::debug!(connection = ?connection, "session.register");
		rx
	}

	/// Marks `connection` as viewing `key`. Returns false if the connection is unknown.
	pub fn open(&self, connection: ConnectionId, key: PadKey) -> bool {
		match self.sessions.write().get_mut(&connection) {
			Some(entry) => {
				entry.pads.insert(key);
				true
			}
			None => false,
		}
	}

	/// Stops `connection` viewing `key`.
	pub fn close(&self, connection: ConnectionId, key: &PadKey) {
		if let Some(entry) = self.sessions.write().get_mut(&connection) {
			entry.pads.remove(key);
		}
	}

	/// Removes `connection` and everything it viewed.
	pub fn unregister(&self, connection: ConnectionId) {
		if self.sessions.write().remove(&connection).is_some() {
			tracing::debug!(connection = ?connection, "session.unregister");
		}
	}

	/// Returns true if `connection` is registered.
	pub fn is_registered(&self, connection: ConnectionId) -> bool {
		self.sessions.read().contains_key(&connection)
	}
}

impl Clients for SessionRegistry {
	fn viewers(&self, key: &PadKey) -> Vec<ConnectionId> {
		let mut viewers: Vec<_> = self
			.sessions
			.read()
			.iter()
			.filter(|(_, entry)| entry.pads.contains(key))
			.map(|(id, _)| *id)
			.collect();
		viewers.sort_unstable();
		viewers
	}

	fn subscribers(&self, project: &ProjectId) -> Vec<ConnectionId> {
		let mut subscribers: Vec<_> = self
			.sessions
			.read()
			.iter()
			.filter(|(_, entry)| &entry.project == project)
			.map(|(id, _)| *id)
			.collect();
		subscribers.sort_unstable();
		subscribers
	}

	fn deliver(&self, connection: ConnectionId, msg: ClientMessage) -> Result<(), DeliveryError> {
		let sent = {
			let sessions = self.sessions.read();
			let entry = sessions
				.get(&connection)
				.ok_or(DeliveryError::UnknownConnection(connection))?;
			entry.tx.send(msg).is_ok()
		};
		if sent {
			return Ok(());
		}
		tracing::warn!(connection = ?connection, "session.send_failed; unregistering");
		self.unregister(connection);
		Err(DeliveryError::Closed(connection))
	}
}

#[cfg(test)]
mod tests {
	use tandem_primitives::{TestId, TestResult};

	use super::*;

	fn msg() -> ClientMessage {
		ClientMessage::TestResult {
			test: TestId::new("T#a"),
			result: TestResult::pass(),
		}
	}

	#[test]
	fn test_viewers_and_subscribers() {
		let reg = SessionRegistry::new();
		let key = PadKey::resolve(&"u".into(), &"/f".into());
		let _a = reg.register(ConnectionId(1), "p".into());
		let _b = reg.register(ConnectionId(2), "p".into());
		let _c = reg.register(ConnectionId(3), "q".into());
		assert!(reg.open(ConnectionId(2), key.clone()));
		assert!(!reg.open(ConnectionId(9), key.clone()));

		assert_eq!(reg.viewers(&key), vec![ConnectionId(2)]);
		assert_eq!(reg.subscribers(&"p".into()), vec![ConnectionId(1), ConnectionId(2)]);

		reg.close(ConnectionId(2), &key);
		assert!(reg.viewers(&key).is_empty());
	}

	#[test]
	fn test_dead_session_unregistered_on_send() {
		let reg = SessionRegistry::new();
		let rx = reg.register(ConnectionId(1), "p".into());
		drop(rx);
		assert_eq!(reg.deliver(ConnectionId(1), msg()), Err(DeliveryError::Closed(ConnectionId(1))));
		assert!(!reg.is_registered(ConnectionId(1)));
		assert_eq!(
			reg.deliver(ConnectionId(1), msg()),
			Err(DeliveryError::UnknownConnection(ConnectionId(1)))
		);
	}

	#[test]
	fn test_deliver_reaches_receiver() {
		let reg = SessionRegistry::new();
		let mut rx = reg.register(ConnectionId(1), "p".into());
		reg.deliver(ConnectionId(1), msg()).unwrap();
		assert_eq!(rx.try_recv().unwrap(), msg());
	}
}
