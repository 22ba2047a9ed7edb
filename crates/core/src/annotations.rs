use std::sync::Arc;

use tandem_primitives::Annotation;

use crate::clients::{ClientMessage, Clients};
use crate::pad::Pad;

/// Publishes per-channel annotation sets to the viewers of a pad.
pub struct AnnotationDispatcher {
	clients: Arc<dyn Clients>,
}

impl AnnotationDispatcher {
	/// Creates a dispatcher delivering through `clients`.
	pub fn new(clients: Arc<dyn Clients>) -> Self {
		Self { clients }
	}

	/// Replaces the set under `channel` on `pad` and pushes it to every viewer.
	///
	/// Delivery is best effort: failures are logged and the remaining viewers
	/// still receive the set. Returns the number of successful deliveries.
	pub fn publish(&self, pad: &mut Pad, channel: &str, annotations: Vec<Annotation>) -> usize {
		let msg = ClientMessage::Annotations {
			pad: pad.key().clone(),
			channel: channel.to_string(),
			annotations: annotations.clone(),
		};
		pad.replace_annotations(channel, annotations);

		let mut delivered = 0;
		for connection in self.clients.viewers(pad.key()) {
			match self.clients.deliver(connection, msg.clone()) {
				Ok(()) => delivered += 1,
				Err(err) => {
					tracing::warn!(pad = %pad.key(), connection = ?connection, channel, error = %err, "annotations.deliver_failed");
				}
			}
		}
		tracing::debug!(pad = %pad.key(), channel, delivered, "annotations.publish");
		delivered
	}
}
