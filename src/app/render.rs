//! Index page rendering.
//!
//! Templates are embedded with `include_str!` and registered once in a
//! global Tera instance; `.html` names keep Tera's autoescaping on, so quote
//! text lands in the `value` attribute HTML-escaped and survives a round
//! trip through an attribute-decoding parser byte for byte.

use once_cell::sync::Lazy;
use serde::Serialize;
use tera::{Context, Tera};

use super::services::Message;

static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
	let mut tera = Tera::default();
	tera.add_raw_template("index.html", include_str!("templates/index.html"))
		.expect("index.html template must parse");
	tera
});

/// Everything the index page needs to render.
#[derive(Debug, Serialize)]
pub struct IndexPage {
	pub quote: String,
	pub messages: Vec<Message>,
	pub analysis: Option<String>,
	pub draft: String,
	pub error: Option<String>,
	pub csrf_token: String,
}

impl IndexPage {
	pub fn render(&self) -> Result<String, tera::Error> {
		let context = Context::from_serialize(self)?;
		TEMPLATES.render("index.html", &context)
	}
}
