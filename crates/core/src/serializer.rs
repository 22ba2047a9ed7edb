//! Per-pad exclusive access.

use std::hash::BuildHasher;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxBuildHasher, FxHashMap};
use tandem_primitives::PadKey;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::pad::Pad;

const SHARDS: usize = 16;

type Shard = Mutex<FxHashMap<PadKey, Arc<AsyncMutex<Pad>>>>;

/// Grants at most one concurrent mutator per pad key.
///
/// Pads are created as absent placeholders on first reference and never
/// removed. The shard map lock is only held to look up or insert a pad's
/// mutex; waiting for the pad itself happens on the async mutex, so distinct
/// keys never block each other and same-key waiters are served in FIFO order.
pub struct PadAccessSerializer {
	shards: Box<[Shard]>,
}

impl Default for PadAccessSerializer {
	fn default() -> Self {
		Self::new()
	}
}

impl PadAccessSerializer {
	/// Creates an empty serializer.
	pub fn new() -> Self {
		Self {
			shards: (0..SHARDS).map(|_| Mutex::new(FxHashMap::default())).collect(),
		}
	}

	fn shard(&self, key: &PadKey) -> &Shard {
		&self.shards[FxBuildHasher.hash_one(key) as usize % SHARDS]
	}

	fn slot(&self, key: &PadKey) -> Arc<AsyncMutex<Pad>> {
		let mut shard = self.shard(key).lock();
		shard
			.entry(key.clone())
			.or_insert_with(|| Arc::new(AsyncMutex::new(Pad::placeholder(key.clone()))))
			.clone()
	}

	/// Waits for exclusive access to the pad for `key`.
	///
	/// The returned guard releases the pad when dropped, including when the
	/// holding future is cancelled.
	pub async fn lock(&self, key: &PadKey) -> PadGuard {
		let slot = self.slot(key);
		let guard = slot.lock_owned().await;
		tracing::trace!(pad = %key, "pad.lock");
		PadGuard { guard }
	}

	/// Runs `f` with exclusive access to the pad for `key`.
	pub async fn with_pad<R>(&self, key: &PadKey, f: impl FnOnce(&mut Pad) -> R) -> R {
		let mut guard = self.lock(key).await;
		f(&mut guard)
	}

	/// Returns true if `key` has ever been referenced.
	pub fn contains(&self, key: &PadKey) -> bool {
		self.shard(key).lock().contains_key(key)
	}

	/// Snapshot of every referenced key.
	pub fn keys(&self) -> Vec<PadKey> {
		self.shards
			.iter()
			.flat_map(|shard| shard.lock().keys().cloned().collect::<Vec<_>>())
			.collect()
	}
}

/// Exclusive handle to one pad.
pub struct PadGuard {
	guard: OwnedMutexGuard<Pad>,
}

impl Deref for PadGuard {
	type Target = Pad;

	fn deref(&self) -> &Pad {
		&self.guard
	}
}

impl DerefMut for PadGuard {
	fn deref_mut(&mut self) -> &mut Pad {
		&mut self.guard
	}
}
