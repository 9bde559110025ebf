//! The application under test: a server-rendered message board.
//!
//! One page, four operations. `GET /` renders the board; the three POST
//! endpoints mutate it and redirect back to `/` (add re-renders with a
//! validation error instead of redirecting when the message is rejected).
//! Collaborators are injected at construction, which is the seam the test
//! fixture uses to substitute deterministic stand-ins.

pub mod render;
pub mod services;

use bytes::Bytes;
use http::Method;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::http::{AppError, Handler, Request, Response};
use render::IndexPage;
use services::{MAX_MESSAGE_LEN, MessageStore, QuoteService};

/// The message board application.
///
/// State lives behind the injected [`MessageStore`]; the analysis result is
/// page-local and survives the redirect back to `/` (the server-rendered
/// equivalent of flash data, except it stays until the next analysis).
pub struct MessageBoard {
	quotes: Arc<dyn QuoteService>,
	store: Arc<dyn MessageStore>,
	analysis: Mutex<Option<String>>,
	csrf_token: String,
}

impl MessageBoard {
	pub fn new(quotes: Arc<dyn QuoteService>, store: Arc<dyn MessageStore>) -> Self {
		Self {
			quotes,
			store,
			analysis: Mutex::new(None),
			csrf_token: uuid::Uuid::new_v4().to_string(),
		}
	}

	/// The store backing this board instance.
	pub fn store(&self) -> Arc<dyn MessageStore> {
		Arc::clone(&self.store)
	}

	/// Render the index page with the given add-form state.
	async fn render_index(
		&self,
		draft: String,
		error: Option<String>,
	) -> Result<Response, AppError> {
		let page = IndexPage {
			quote: self.quotes.generate_quote().await,
			messages: self.store.messages().await?,
			analysis: self.analysis.lock().clone(),
			draft,
			error,
			csrf_token: self.csrf_token.clone(),
		};
		let html = page.render()?;
		Ok(Response::ok().with_html(html))
	}

	/// Reject POSTs whose hidden token does not match this host's token.
	fn csrf_failure(&self, request: &Request) -> Option<Response> {
		match request.form_value("csrf_token") {
			Some(token) if token == self.csrf_token => None,
			_ => Some(Response::bad_request().with_body("invalid or missing csrf_token")),
		}
	}

	/// Delete-all or delete-one, depending on which button was pressed.
	async fn delete_messages(&self, request: Request) -> Result<Response, AppError> {
		if let Some(response) = self.csrf_failure(&request) {
			return Ok(response);
		}
		if let Some(raw_id) = request.form_value("delete") {
			let id: u64 = raw_id
				.parse()
				.map_err(|_| AppError::BadRequest(format!("invalid message id `{raw_id}`")))?;
			self.store.delete(id).await?;
		} else {
			self.store.delete_all().await?;
		}
		Ok(Response::redirect("/"))
	}

	async fn add_message(&self, request: Request) -> Result<Response, AppError> {
		if let Some(response) = self.csrf_failure(&request) {
			return Ok(response);
		}
		let text = request.form_value("Message.Text").unwrap_or_default();
		if text.is_empty() {
			return self
				.render_index(text, Some("The Message field is required.".to_string()))
				.await;
		}
		if text.chars().count() > MAX_MESSAGE_LEN {
			let error = format!(
				"The message must be at most {MAX_MESSAGE_LEN} characters long."
			);
			return self.render_index(text, Some(error)).await;
		}
		self.store.add(text).await?;
		Ok(Response::redirect("/"))
	}

	async fn analyze_messages(&self, request: Request) -> Result<Response, AppError> {
		if let Some(response) = self.csrf_failure(&request) {
			return Ok(response);
		}
		let messages = self.store.messages().await?;
		let result = if messages.is_empty() {
			"There are no messages to analyze.".to_string()
		} else {
			let total: usize = messages.iter().map(|m| m.text.chars().count()).sum();
			let average = (total as f64 / messages.len() as f64).round() as u64;
			format!("The average message length is {average} characters.")
		};
		*self.analysis.lock() = Some(result);
		Ok(Response::redirect("/"))
	}
}

#[async_trait::async_trait]
impl Handler for MessageBoard {
	async fn handle(&self, request: Request) -> Result<Response, AppError> {
		debug!(method = %request.method, path = request.path(), "dispatching request");
		match (&request.method, request.path()) {
			(&Method::GET, "/") => self.render_index(String::new(), None).await,
			(&Method::POST, "/messages") => self.delete_messages(request).await,
			(&Method::POST, "/messages/add") => self.add_message(request).await,
			(&Method::POST, "/analyze") => self.analyze_messages(request).await,
			_ => Ok(Response::not_found().with_body(Bytes::from_static(b"page not found"))),
		}
	}
}
