//! Response wrapper returned by the harness [`Client`](super::client::Client).

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use url::Url;

/// An HTTP response observed by a test, frozen at receipt.
///
/// HTTP error statuses are ordinary values here; only transport problems
/// surface as `ClientError`.
pub struct PageResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Bytes,
	url: Url,
}

impl PageResponse {
	pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes, url: Url) -> Self {
		Self {
			status,
			headers,
			body,
			url,
		}
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// First value of a header, if present and valid UTF-8.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	/// The `Location` header of a redirect, exactly as the server sent it.
	pub fn location(&self) -> Option<&str> {
		self.header(http::header::LOCATION.as_str())
	}

	pub fn body(&self) -> &Bytes {
		&self.body
	}

	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).to_string()
	}

	/// The URL this response was fetched from (after any followed redirects).
	pub fn url(&self) -> &Url {
		&self.url
	}

	pub fn is_redirect(&self) -> bool {
		self.status.is_redirection()
	}
}

/// Assertion helpers for tests.
pub trait ResponseExt {
	fn assert_status(&self, expected: StatusCode) -> &Self;
	fn assert_ok(&self) -> &Self;
	/// Assert a 302 whose `Location` equals `target` exactly.
	fn assert_redirect_to(&self, target: &str) -> &Self;
}

impl ResponseExt for PageResponse {
	fn assert_status(&self, expected: StatusCode) -> &Self {
		assert_eq!(
			self.status,
			expected,
			"expected status {} for {}, got {}. Body: {}",
			expected,
			self.url,
			self.status,
			self.text()
		);
		self
	}

	fn assert_ok(&self) -> &Self {
		self.assert_status(StatusCode::OK)
	}

	fn assert_redirect_to(&self, target: &str) -> &Self {
		self.assert_status(StatusCode::FOUND);
		assert_eq!(
			self.location(),
			Some(target),
			"expected redirect from {} to {target}",
			self.url
		);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn response(status: StatusCode, location: Option<&str>) -> PageResponse {
		let mut headers = HeaderMap::new();
		if let Some(location) = location {
			headers.insert(http::header::LOCATION, location.parse().unwrap());
		}
		PageResponse::new(
			status,
			headers,
			Bytes::from_static(b"body"),
			Url::parse("http://testserver/").unwrap(),
		)
	}

	#[rstest]
	fn location_is_exposed_verbatim() {
		// Arrange
		let response = response(StatusCode::FOUND, Some("/"));

		// Act & Assert
		assert_eq!(response.location(), Some("/"));
		assert!(response.is_redirect());
	}

	#[rstest]
	fn non_redirect_has_no_location() {
		// Arrange
		let response = response(StatusCode::OK, None);

		// Act & Assert
		assert_eq!(response.location(), None);
		response.assert_ok();
	}

	#[rstest]
	#[should_panic(expected = "expected status")]
	fn assert_status_panics_with_body_context() {
		// Arrange
		let response = response(StatusCode::NOT_FOUND, None);

		// Act
		response.assert_ok();
	}
}
