//! Lenient HTML parsing with CSS selector lookups.
//!
//! Wraps `scraper` (html5ever underneath), so anything a browser would
//! render parses here too. Single-element lookups treat absence as a hard
//! failure because tests assume presence; multi-element lookups return an
//! empty, ordered sequence instead.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use super::response::PageResponse;

#[derive(Debug, Error)]
pub enum DomError {
	#[error("invalid selector `{0}`")]
	Selector(String),

	#[error("no element matched `{0}`")]
	NodeNotFound(String),
}

/// A parsed HTML document, remembering the URL it was fetched from so
/// relative form actions can be resolved against it.
pub struct Document {
	html: Html,
	url: Url,
}

impl Document {
	/// Parse a response body. Malformed-but-renderable markup is accepted.
	pub fn parse(response: &PageResponse) -> Self {
		Self {
			html: Html::parse_document(&response.text()),
			url: response.url().clone(),
		}
	}

	/// Parse raw markup as if fetched from `url`. Used by replay tests that
	/// don't want a live host behind the document.
	pub fn from_html(html: &str, url: Url) -> Self {
		Self {
			html: Html::parse_document(html),
			url,
		}
	}

	pub fn url(&self) -> &Url {
		&self.url
	}

	fn selector(selector: &str) -> Result<Selector, DomError> {
		Selector::parse(selector).map_err(|_| DomError::Selector(selector.to_string()))
	}

	/// Single-element lookup; absence is an error naming the selector.
	pub fn query(&self, selector: &str) -> Result<ElementRef<'_>, DomError> {
		let parsed = Self::selector(selector)?;
		self.html
			.select(&parsed)
			.next()
			.ok_or_else(|| DomError::NodeNotFound(selector.to_string()))
	}

	/// All matches in document order; no match is an empty vec, not an error.
	pub fn query_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, DomError> {
		let parsed = Self::selector(selector)?;
		Ok(self.html.select(&parsed).collect())
	}

	/// Concatenated descendant text of each match, trimmed.
	pub fn texts(&self, selector: &str) -> Result<Vec<String>, DomError> {
		Ok(self
			.query_all(selector)?
			.into_iter()
			.map(|element| element_text(&element))
			.collect())
	}
}

/// Concatenated descendant text of one element, trimmed.
pub fn element_text(element: &ElementRef<'_>) -> String {
	element.text().collect::<String>().trim().to_string()
}
