//! In-memory application fixture.
//!
//! A [`TestApp`] owns one isolated instance of the application under test.
//! Service overrides are plain constructor parameters, so every override is
//! in place before the host can see its first request: there is no window
//! where a default collaborator could serve a request that a test meant to
//! intercept.
//!
//! Tests get isolation by constructing their own `TestApp`; nothing is
//! shared between fixtures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::error;

use super::client::Client;
use crate::app::MessageBoard;
use crate::app::services::{
	CannedQuoteService, InMemoryMessageStore, MessageStore, QuoteService, SEED_MESSAGES,
};
use crate::http::Handler;

/// Shared host state behind every [`Client`] bound to a fixture.
pub(crate) struct HostInner {
	handler: Arc<dyn Handler>,
	disposed: AtomicBool,
}

impl HostInner {
	pub(crate) fn handler(&self) -> Arc<dyn Handler> {
		Arc::clone(&self.handler)
	}

	pub(crate) fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::SeqCst)
	}
}

/// Builder collecting service overrides before the host starts.
pub struct TestAppBuilder {
	quotes: Option<Arc<dyn QuoteService>>,
	store: Option<Arc<dyn MessageStore>>,
}

impl TestAppBuilder {
	fn new() -> Self {
		Self {
			quotes: None,
			store: None,
		}
	}

	/// Substitute the quote provider.
	pub fn with_quote_service(mut self, quotes: Arc<dyn QuoteService>) -> Self {
		self.quotes = Some(quotes);
		self
	}

	/// Substitute the message store.
	pub fn with_message_store(mut self, store: Arc<dyn MessageStore>) -> Self {
		self.store = Some(store);
		self
	}

	/// Construct the running host. All overrides are applied here, before
	/// any request can be issued.
	pub fn build(self) -> TestApp {
		let store = self
			.store
			.unwrap_or_else(|| Arc::new(InMemoryMessageStore::seeded()));
		let quotes = self.quotes.unwrap_or_else(|| Arc::new(CannedQuoteService));
		let board = Arc::new(MessageBoard::new(quotes, Arc::clone(&store)));
		TestApp {
			host: Arc::new(HostInner {
				handler: board,
				disposed: AtomicBool::new(false),
			}),
			store: Some(store),
		}
	}
}

/// An isolated, disposable in-memory instance of the application under test.
pub struct TestApp {
	host: Arc<HostInner>,
	// Absent when hosting an arbitrary handler instead of the message board.
	store: Option<Arc<dyn MessageStore>>,
}

impl TestApp {
	/// A fixture with default services (seeded store, canned quote).
	pub fn spawn() -> Self {
		Self::builder().build()
	}

	pub fn builder() -> TestAppBuilder {
		TestAppBuilder::new()
	}

	/// Host an arbitrary handler. Useful for exercising the harness itself
	/// against synthetic applications.
	pub fn hosting(handler: Arc<dyn Handler>) -> Self {
		Self {
			host: Arc::new(HostInner {
				handler,
				disposed: AtomicBool::new(false),
			}),
			store: None,
		}
	}

	/// A fetcher bound to this host. Redirects are surfaced, not followed.
	pub fn client(&self) -> Client {
		Client::new(Arc::clone(&self.host), false)
	}

	/// A fetcher that transparently follows redirects to the final page.
	pub fn client_following_redirects(&self) -> Client {
		Client::new(Arc::clone(&self.host), true)
	}

	/// The message store backing this fixture, when hosting the board.
	pub fn store(&self) -> Option<Arc<dyn MessageStore>> {
		self.store.as_ref().map(Arc::clone)
	}

	/// Reset the message list to the well-known seed data.
	///
	/// Best-effort: a failing store is logged and not propagated, so a test
	/// still proceeds and its own assertions catch the inconsistency.
	pub async fn reinitialize_messages(&self) {
		let Some(store) = &self.store else {
			return;
		};
		if let Err(err) = store.replace_all(&SEED_MESSAGES).await {
			error!(error = %err, "failed to reinitialize test messages; continuing");
		}
	}

	/// Mark the host disposed. Any request issued afterwards fails loudly
	/// with `ClientError::HostDisposed` instead of returning stale data.
	pub fn dispose(&self) {
		self.host.disposed.store(true, Ordering::SeqCst);
	}
}
