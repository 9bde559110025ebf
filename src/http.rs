//! Minimal HTTP vocabulary shared by the application and the harness.
//!
//! The application under test never touches a socket: a [`Handler`] receives
//! a [`Request`] and produces a [`Response`], and the harness dispatches to it
//! in memory. Handlers signal internal failures through [`AppError`]; HTTP
//! error statuses (4xx/5xx) are ordinary [`Response`] values.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised inside the application under test.
///
/// These are converted by the harness into 500 responses; they are distinct
/// from transport failures, which never reach a handler.
#[derive(Debug, Error)]
pub enum AppError {
	#[error("template rendering failed: {0}")]
	Render(#[from] tera::Error),

	#[error("message store error: {0}")]
	Store(#[from] crate::app::services::StoreError),

	#[error("malformed request: {0}")]
	BadRequest(String),
}

/// HTTP request representation.
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Request {
	pub fn builder() -> RequestBuilder {
		RequestBuilder::new()
	}

	/// Path component of the request URI.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Decode the body as `application/x-www-form-urlencoded` pairs,
	/// in the order they were submitted.
	pub fn form_pairs(&self) -> Vec<(String, String)> {
		url::form_urlencoded::parse(&self.body).into_owned().collect()
	}

	/// First submitted value for a form field, if any.
	pub fn form_value(&self, name: &str) -> Option<String> {
		self.form_pairs()
			.into_iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v)
	}
}

/// Builder for [`Request`].
pub struct RequestBuilder {
	method: Method,
	uri: String,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	pub fn new() -> Self {
		Self {
			method: Method::GET,
			uri: "/".to_string(),
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = uri.into();
		self
	}

	pub fn header(mut self, name: &str, value: &str) -> Result<Self, http::Error> {
		let name: http::header::HeaderName = name.parse().map_err(http::Error::from)?;
		let value = HeaderValue::from_str(value).map_err(http::Error::from)?;
		self.headers.insert(name, value);
		Ok(self)
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	pub fn build(self) -> Result<Request, http::Error> {
		let uri: Uri = self.uri.parse().map_err(http::Error::from)?;
		Ok(Request {
			method: self.method,
			uri,
			headers: self.headers,
			body: self.body,
		})
	}
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// HTTP response representation.
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new response with the given status code.
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// 200 OK.
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// 302 Found with a `Location` header.
	pub fn redirect(location: &str) -> Self {
		let mut response = Self::new(StatusCode::FOUND);
		response.headers.insert(
			http::header::LOCATION,
			HeaderValue::from_str(location).expect("redirect location must be a valid header value"),
		);
		response
	}

	/// 400 Bad Request.
	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	/// 404 Not Found.
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set an HTML body with the matching `Content-Type`.
	pub fn with_html(mut self, body: impl Into<Bytes>) -> Self {
		self.headers.insert(
			http::header::CONTENT_TYPE,
			HeaderValue::from_static("text/html; charset=utf-8"),
		);
		self.body = body.into();
		self
	}
}

/// Handler trait for processing requests.
///
/// All request handling goes through this seam, which is what lets the test
/// fixture host an application entirely in memory.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed at all; HTTP
	/// error statuses are returned as successful `Response` values.
	async fn handle(&self, request: Request) -> Result<Response, AppError>;
}

/// Blanket implementation so `Arc<dyn Handler>` is itself a handler.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response, AppError> {
		(**self).handle(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn form_pairs_preserve_submission_order() {
		// Arrange
		let request = Request::builder()
			.method(Method::POST)
			.uri("/messages/add")
			.body("b=2&a=1&b=3")
			.build()
			.unwrap();

		// Act
		let pairs = request.form_pairs();

		// Assert
		assert_eq!(
			pairs,
			vec![
				("b".to_string(), "2".to_string()),
				("a".to_string(), "1".to_string()),
				("b".to_string(), "3".to_string()),
			]
		);
	}

	#[rstest]
	fn form_value_decodes_percent_encoding() {
		// Arrange
		let request = Request::builder()
			.method(Method::POST)
			.uri("/messages/add")
			.body("Message.Text=hello%20world%21")
			.build()
			.unwrap();

		// Act
		let value = request.form_value("Message.Text");

		// Assert
		assert_eq!(value.as_deref(), Some("hello world!"));
	}

	#[rstest]
	fn redirect_sets_location_header() {
		// Arrange & Act
		let response = Response::redirect("/");

		// Assert
		assert_eq!(response.status, StatusCode::FOUND);
		assert_eq!(
			response.headers.get(http::header::LOCATION).unwrap(),
			"/"
		);
	}
}
