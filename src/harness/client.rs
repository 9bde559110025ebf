//! In-memory document fetcher.
//!
//! A [`Client`] is bound to one fixture host and dispatches requests straight
//! to the host's [`Handler`](crate::http::Handler), never a socket. Redirects
//! are *not* followed by default so a 302 is observable directly; the
//! redirect-following variant exists for tests that only care about the
//! final page.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use super::fixture::HostInner;
use super::response::PageResponse;
use crate::http::Request;

/// Transport-level failures, distinct from HTTP error statuses.
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("host has been disposed; no further requests are accepted")]
	HostDisposed,

	#[error("request construction failed: {0}")]
	InvalidRequest(#[from] http::Error),

	#[error("invalid request url: {0}")]
	Url(#[from] url::ParseError),

	#[error("request did not complete within {0:?}")]
	Timeout(Duration),

	#[error("redirect chain exceeded {0} hops")]
	TooManyRedirects(usize),

	#[error("redirect response carried no Location header")]
	MissingLocation,
}

const MAX_REDIRECT_HOPS: usize = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetcher bound to a single in-memory host.
pub struct Client {
	host: Arc<HostInner>,
	base_url: Url,
	follow_redirects: bool,
	timeout: Duration,
}

impl Client {
	pub(crate) fn new(host: Arc<HostInner>, follow_redirects: bool) -> Self {
		Self {
			host,
			base_url: Url::parse("http://testserver/").expect("static base url parses"),
			follow_redirects,
			timeout: DEFAULT_TIMEOUT,
		}
	}

	/// Whether this client transparently follows 3xx responses.
	pub fn follows_redirects(&self) -> bool {
		self.follow_redirects
	}

	/// Issue a GET against a path (or absolute URL) on the host.
	pub async fn get(&self, path: &str) -> Result<PageResponse, ClientError> {
		let url = self.base_url.join(path)?;
		self.send(Method::GET, url, None).await
	}

	/// Issue a request with an optional URL-encoded form body.
	pub async fn send(
		&self,
		method: Method,
		url: Url,
		form_body: Option<String>,
	) -> Result<PageResponse, ClientError> {
		let mut response = self.dispatch(method, url, form_body).await?;
		if self.follow_redirects {
			let mut hops = 0;
			while response.status().is_redirection() {
				hops += 1;
				if hops > MAX_REDIRECT_HOPS {
					return Err(ClientError::TooManyRedirects(MAX_REDIRECT_HOPS));
				}
				let location = response.location().ok_or(ClientError::MissingLocation)?;
				let next = response.url().join(location)?;
				// 301/302/303 all downgrade to GET on follow, like a browser.
				response = self.dispatch(Method::GET, next, None).await?;
			}
		}
		Ok(response)
	}

	async fn dispatch(
		&self,
		method: Method,
		url: Url,
		form_body: Option<String>,
	) -> Result<PageResponse, ClientError> {
		if self.host.is_disposed() {
			return Err(ClientError::HostDisposed);
		}
		debug!(%method, %url, "dispatching in-memory request");

		let mut builder = Request::builder().method(method).uri(url.as_str());
		if form_body.is_some() {
			builder = builder.header("Content-Type", "application/x-www-form-urlencoded")?;
		}
		let request = builder
			.body(Bytes::from(form_body.unwrap_or_default()))
			.build()?;

		let handler = self.host.handler();
		let outcome = tokio::time::timeout(self.timeout, handler.handle(request))
			.await
			.map_err(|_| ClientError::Timeout(self.timeout))?;

		let response = match outcome {
			Ok(response) => response,
			Err(app_error) => {
				// Application failures surface as 500s, not transport errors.
				error!(error = %app_error, "handler failed; returning 500");
				let mut headers = HeaderMap::new();
				headers.insert(
					http::header::CONTENT_TYPE,
					HeaderValue::from_static("text/plain; charset=utf-8"),
				);
				return Ok(PageResponse::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					headers,
					Bytes::from(app_error.to_string()),
					url,
				));
			}
		};

		Ok(PageResponse::new(
			response.status,
			response.headers,
			response.body,
			url,
		))
	}
}
