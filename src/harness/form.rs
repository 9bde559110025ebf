//! Form extraction and request replay.
//!
//! The replay pipeline is a small pure-function chain: parse the document,
//! extract a [`FormDescriptor`] (the form's submittable state as a browser
//! would see it), overlay caller overrides, serialize, send. Keeping each
//! stage separate lets the pipeline be tested without a live host.
//!
//! Extraction follows standard form-submission semantics: only named,
//! non-disabled controls contribute; checkboxes and radios contribute only
//! when checked; a `<select>` contributes its selected option (or the first
//! one); submit controls contribute nothing unless chosen as the activated
//! button.

use http::Method;
use scraper::ElementRef;
use thiserror::Error;
use url::Url;

use super::client::{Client, ClientError};
use super::dom::{Document, DomError, element_text};
use super::response::PageResponse;

#[derive(Debug, Error)]
pub enum FormError {
	#[error(transparent)]
	Dom(#[from] DomError),

	#[error("`{0}` matched an element, but not a <form>")]
	NotAForm(String),

	#[error("submit control `{0}` not found in the document or the form")]
	SubmitControlNotFound(String),

	#[error("override names field `{0}`, which the rendered form does not contain")]
	UnknownField(String),

	#[error("cannot resolve form action `{action}`: {source}")]
	Action {
		action: String,
		source: url::ParseError,
	},

	#[error("form declares unsupported method `{0}`")]
	UnsupportedMethod(String),
}

/// Errors from the full submit pipeline: extraction or transport.
#[derive(Debug, Error)]
pub enum SubmitError {
	#[error(transparent)]
	Form(#[from] FormError),

	#[error(transparent)]
	Client(#[from] ClientError),
}

impl From<DomError> for SubmitError {
	fn from(err: DomError) -> Self {
		SubmitError::Form(FormError::Dom(err))
	}
}

/// The extracted, replayable model of a form's submittable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDescriptor {
	/// Absolute submission target, resolved against the document URL.
	pub action: Url,
	pub method: Method,
	/// Named fields with their rendered default values, in document order.
	pub fields: Vec<(String, String)>,
}

impl FormDescriptor {
	/// Extract the form matched by `form_selector` from `document`.
	pub fn extract(document: &Document, form_selector: &str) -> Result<Self, FormError> {
		let form = document.query(form_selector)?;
		if form.value().name() != "form" {
			return Err(FormError::NotAForm(form_selector.to_string()));
		}
		Self::from_element(document, &form)
	}

	fn from_element(document: &Document, form: &ElementRef<'_>) -> Result<Self, FormError> {
		let action = match form.value().attr("action") {
			None | Some("") => document.url().clone(),
			Some(action) => document.url().join(action).map_err(|source| {
				FormError::Action {
					action: action.to_string(),
					source,
				}
			})?,
		};
		let method = match form.value().attr("method") {
			None => Method::GET,
			Some(raw) if raw.eq_ignore_ascii_case("get") => Method::GET,
			Some(raw) if raw.eq_ignore_ascii_case("post") => Method::POST,
			Some(raw) => return Err(FormError::UnsupportedMethod(raw.to_string())),
		};
		Ok(Self {
			action,
			method,
			fields: field_defaults(form),
		})
	}

	/// Overlay overrides onto the defaults by field name.
	///
	/// Every override must name a field the rendered form contains: replay
	/// simulates what a real browser could submit, not arbitrary injection.
	pub fn apply_overrides(&mut self, overrides: &[(&str, &str)]) -> Result<(), FormError> {
		for (name, value) in overrides {
			let mut found = false;
			for (field, default) in &mut self.fields {
				if field == name {
					*default = value.to_string();
					found = true;
				}
			}
			if !found {
				return Err(FormError::UnknownField(name.to_string()));
			}
		}
		Ok(())
	}

	/// URL-encode the field map for submission.
	pub fn encode(&self) -> String {
		let mut serializer = url::form_urlencoded::Serializer::new(String::new());
		for (name, value) in &self.fields {
			serializer.append_pair(name, value);
		}
		serializer.finish()
	}
}

/// Rendered default values of a form's submittable controls.
fn field_defaults(form: &ElementRef<'_>) -> Vec<(String, String)> {
	let controls =
		scraper::Selector::parse("input, textarea, select").expect("static selector parses");
	let mut fields = Vec::new();
	for control in form.select(&controls) {
		let element = control.value();
		if element.attr("disabled").is_some() {
			continue;
		}
		let Some(name) = element.attr("name") else {
			continue;
		};
		match element.name() {
			"input" => {
				let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
				match kind.as_str() {
					// Submit controls join the payload only as the activated
					// button, which submit() appends separately.
					"submit" | "button" | "image" | "reset" | "file" => continue,
					"checkbox" | "radio" => {
						if element.attr("checked").is_some() {
							let value = element.attr("value").unwrap_or("on");
							fields.push((name.to_string(), value.to_string()));
						}
					}
					_ => {
						let value = element.attr("value").unwrap_or("");
						fields.push((name.to_string(), value.to_string()));
					}
				}
			}
			"textarea" => {
				fields.push((name.to_string(), element_text(&control)));
			}
			"select" => {
				if let Some(value) = selected_option(&control) {
					fields.push((name.to_string(), value));
				}
			}
			_ => {}
		}
	}
	fields
}

/// Value of the selected option, falling back to the first option.
fn selected_option(select: &ElementRef<'_>) -> Option<String> {
	let options = scraper::Selector::parse("option").expect("static selector parses");
	let all: Vec<ElementRef<'_>> = select.select(&options).collect();
	let chosen = all
		.iter()
		.find(|option| option.value().attr("selected").is_some())
		.or_else(|| all.first())?;
	Some(
		chosen
			.value()
			.attr("value")
			.map(str::to_string)
			.unwrap_or_else(|| element_text(chosen)),
	)
}

/// Replay a form submission as a browser would perform it.
///
/// The submit control is looked up inside the form first, then globally;
/// if it carries a name/value pair, that pair joins the payload (this is
/// how multi-button forms tell the server which button was pressed).
pub async fn submit(
	client: &Client,
	document: &Document,
	form_selector: &str,
	submit_selector: &str,
	overrides: &[(&str, &str)],
) -> Result<PageResponse, SubmitError> {
	let form = document.query(form_selector)?;
	if form.value().name() != "form" {
		return Err(FormError::NotAForm(form_selector.to_string()).into());
	}
	let mut descriptor = FormDescriptor::from_element(document, &form)?;
	descriptor.apply_overrides(overrides)?;

	let control = find_submit_control(document, &form, submit_selector)?;
	if let Some(name) = control.value().attr("name") {
		let value = control.value().attr("value").unwrap_or("");
		descriptor
			.fields
			.push((name.to_string(), value.to_string()));
	}

	let encoded = descriptor.encode();
	let response = match descriptor.method {
		Method::POST => {
			client
				.send(Method::POST, descriptor.action, Some(encoded))
				.await?
		}
		_ => {
			let mut target = descriptor.action;
			target.set_query(if encoded.is_empty() {
				None
			} else {
				Some(&encoded)
			});
			client.send(Method::GET, target, None).await?
		}
	};
	Ok(response)
}

fn find_submit_control<'a>(
	document: &'a Document,
	form: &ElementRef<'a>,
	submit_selector: &str,
) -> Result<ElementRef<'a>, SubmitError> {
	let parsed = scraper::Selector::parse(submit_selector)
		.map_err(|_| DomError::Selector(submit_selector.to_string()))?;
	if let Some(control) = form.select(&parsed).next() {
		return Ok(control);
	}
	document
		.query_all(submit_selector)?
		.into_iter()
		.next()
		.ok_or_else(|| FormError::SubmitControlNotFound(submit_selector.to_string()).into())
}
