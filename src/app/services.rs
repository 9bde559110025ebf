//! Injectable collaborators of the message board.
//!
//! Both seams exist so tests can substitute deterministic stand-ins at host
//! construction time: [`QuoteService`] feeds the quote-of-the-day widget and
//! [`MessageStore`] backs the message list.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

/// A stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
	pub id: u64,
	pub text: String,
}

/// Seed data installed by the fixture's message reset.
pub const SEED_MESSAGES: [&str; 3] = [
	"You're standing on my scarf.",
	"Would you like a jelly baby?",
	"To the rational mind, nothing is inexplicable; only unexplained.",
];

/// Messages longer than this are rejected with a validation error.
pub const MAX_MESSAGE_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("message store unavailable: {0}")]
	Unavailable(String),
}

/// Produces the quote-of-the-day text rendered into the `#quote` widget.
#[async_trait]
pub trait QuoteService: Send + Sync {
	async fn generate_quote(&self) -> String;
}

/// Default quote provider with a fixed quote.
pub struct CannedQuoteService;

#[async_trait]
impl QuoteService for CannedQuoteService {
	async fn generate_quote(&self) -> String {
		"Courage isn't just a matter of not being frightened, you know. \
		 It's being afraid and doing what you have to do anyway."
			.to_string()
	}
}

/// Persistence seam for the message list.
#[async_trait]
pub trait MessageStore: Send + Sync {
	/// All messages in insertion order.
	async fn messages(&self) -> Result<Vec<Message>, StoreError>;

	/// Append a message, returning it with its assigned id.
	async fn add(&self, text: String) -> Result<Message, StoreError>;

	/// Delete one message; returns whether it existed.
	async fn delete(&self, id: u64) -> Result<bool, StoreError>;

	/// Delete every message.
	async fn delete_all(&self) -> Result<(), StoreError>;

	/// Replace the full contents with the given texts, reassigning ids.
	async fn replace_all(&self, texts: &[&str]) -> Result<(), StoreError>;
}

struct StoreInner {
	next_id: u64,
	messages: Vec<Message>,
}

/// In-memory [`MessageStore`] used both as the application default and as
/// the per-test isolated store.
pub struct InMemoryMessageStore {
	inner: RwLock<StoreInner>,
}

impl InMemoryMessageStore {
	/// An empty store.
	pub fn empty() -> Self {
		Self {
			inner: RwLock::new(StoreInner {
				next_id: 1,
				messages: Vec::new(),
			}),
		}
	}

	/// A store preloaded with [`SEED_MESSAGES`].
	pub fn seeded() -> Self {
		let store = Self::empty();
		{
			let mut inner = store.inner.write();
			for text in SEED_MESSAGES {
				let id = inner.next_id;
				inner.next_id += 1;
				inner.messages.push(Message {
					id,
					text: text.to_string(),
				});
			}
		}
		store
	}
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
	async fn messages(&self) -> Result<Vec<Message>, StoreError> {
		Ok(self.inner.read().messages.clone())
	}

	async fn add(&self, text: String) -> Result<Message, StoreError> {
		let mut inner = self.inner.write();
		let id = inner.next_id;
		inner.next_id += 1;
		let message = Message { id, text };
		inner.messages.push(message.clone());
		Ok(message)
	}

	async fn delete(&self, id: u64) -> Result<bool, StoreError> {
		let mut inner = self.inner.write();
		let before = inner.messages.len();
		inner.messages.retain(|m| m.id != id);
		Ok(inner.messages.len() != before)
	}

	async fn delete_all(&self) -> Result<(), StoreError> {
		self.inner.write().messages.clear();
		Ok(())
	}

	async fn replace_all(&self, texts: &[&str]) -> Result<(), StoreError> {
		let mut inner = self.inner.write();
		inner.messages.clear();
		inner.next_id = 1;
		for text in texts {
			let id = inner.next_id;
			inner.next_id += 1;
			inner.messages.push(Message {
				id,
				text: text.to_string(),
			});
		}
		Ok(())
	}
}
