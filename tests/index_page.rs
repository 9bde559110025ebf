//! Integration tests for the index page: every interaction goes through a
//! real GET, HTML parse and form replay against an isolated in-memory host.

use std::sync::Arc;
use std::sync::Once;

use async_trait::async_trait;
use http::StatusCode;
use rstest::rstest;

use pinboard::harness::{Document, ResponseExt, TestApp, submit};
use pinboard::{QuoteService, SEED_MESSAGES};

static INIT: Once = Once::new();

fn init_test_logging() {
	INIT.call_once(|| {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_test_writer()
			.try_init();
	});
}

/// Message `li` texts currently rendered under `form#messages`.
fn message_texts(document: &Document) -> Vec<String> {
	document.texts("#messages li").unwrap()
}

#[rstest]
#[tokio::test]
async fn post_delete_all_messages_redirects_to_root() {
	init_test_logging();

	// Arrange
	let app = TestApp::spawn();
	let client = app.client();
	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);

	// Act
	let response = submit(
		&client,
		&document,
		"form[id='messages']",
		"button[id='deleteAllBtn']",
		&[],
	)
	.await
	.unwrap();

	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);

	// Assert
	page.assert_ok();
	response.assert_redirect_to("/");
	assert!(message_texts(&document).is_empty());
}

#[rstest]
#[tokio::test]
async fn added_message_appears_in_the_list() {
	init_test_logging();

	// Arrange
	let app = TestApp::spawn();
	let client = app.client();
	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);
	assert!(
		!message_texts(&document)
			.iter()
			.any(|text| text.contains("Fetched from a replayed form")),
	);

	// Act
	let response = submit(
		&client,
		&document,
		"form[id='addMessage']",
		"button[id='addMessageBtn']",
		&[("Message.Text", "Fetched from a replayed form")],
	)
	.await
	.unwrap();

	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);

	// Assert
	response.assert_redirect_to("/");
	page.assert_ok();
	assert!(
		message_texts(&document)
			.iter()
			.any(|text| text.contains("Fetched from a replayed form")),
	);
}

#[rstest]
#[tokio::test]
async fn message_over_200_chars_rerenders_without_redirect() {
	init_test_logging();

	// Arrange
	let app = TestApp::spawn();
	let client = app.client();
	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);
	let too_long = "a".repeat(201);

	// Act
	let response = submit(
		&client,
		&document,
		"form[id='addMessage']",
		"button[id='addMessageBtn']",
		&[("Message.Text", too_long.as_str())],
	)
	.await
	.unwrap();

	// Assert: re-rendered with a validation error, nothing persisted
	response.assert_status(StatusCode::OK);
	assert_eq!(response.location(), None);
	let rerendered = Document::parse(&response);
	assert!(!rerendered.texts(".field-validation-error").unwrap().is_empty());

	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);
	assert!(!message_texts(&document).iter().any(|text| text == &too_long));
}

#[rstest]
#[tokio::test]
async fn analyze_with_messages_reports_the_average_length() {
	init_test_logging();

	// Arrange
	let app = TestApp::spawn();
	let client = app.client();
	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);
	assert!(
		!document
			.texts("#analyze div.form-group")
			.unwrap()
			.iter()
			.any(|text| text.contains("The average message length")),
	);

	// Act
	let response = submit(
		&client,
		&document,
		"form[id='analyze']",
		"button[id='analyzeBtn']",
		&[],
	)
	.await
	.unwrap();

	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);

	// Assert
	response.assert_redirect_to("/");
	page.assert_ok();
	assert!(
		document
			.texts("#analyze div.form-group")
			.unwrap()
			.iter()
			.any(|text| text.contains("The average message length")),
	);
}

#[rstest]
#[tokio::test]
async fn analyze_after_delete_all_reports_nothing_to_analyze() {
	init_test_logging();

	// Arrange
	let app = TestApp::spawn();
	let client = app.client();
	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);

	// Act
	submit(
		&client,
		&document,
		"form[id='messages']",
		"button[id='deleteAllBtn']",
		&[],
	)
	.await
	.unwrap();

	let response = submit(
		&client,
		&document,
		"form[id='analyze']",
		"button[id='analyzeBtn']",
		&[],
	)
	.await
	.unwrap();

	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);

	// Assert
	response.assert_redirect_to("/");
	assert!(
		document
			.texts("#analyze div.form-group")
			.unwrap()
			.iter()
			.any(|text| text.contains("There are no messages to analyze.")),
	);
}

#[rstest]
#[tokio::test]
async fn deleting_one_message_leaves_the_others() {
	init_test_logging();

	// Arrange
	let app = TestApp::spawn();
	app.reinitialize_messages().await;
	let client = app.client();
	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);
	let before = message_texts(&document);
	assert_eq!(before.len(), SEED_MESSAGES.len());

	// Act: press the first per-message delete button inside the panel
	let response = submit(
		&client,
		&document,
		"form[id='messages']",
		"div[class='panel-body'] button",
		&[],
	)
	.await
	.unwrap();

	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);
	let after = message_texts(&document);

	// Assert: exactly the first message is gone
	page.assert_ok();
	response.assert_redirect_to("/");
	assert_eq!(after, before[1..].to_vec());
}

struct TestQuoteService;

#[async_trait]
impl QuoteService for TestQuoteService {
	async fn generate_quote(&self) -> String {
		"Something's interfering with time, Mr. Scarman, and time is my business.".to_string()
	}
}

#[rstest]
#[tokio::test]
async fn overridden_quote_service_feeds_the_quote_widget_verbatim() {
	init_test_logging();

	// Arrange
	let app = TestApp::builder()
		.with_quote_service(Arc::new(TestQuoteService))
		.build();
	let client = app.client();

	// Act
	let page = client.get("/").await.unwrap();
	let document = Document::parse(&page);
	let quote = document.query("#quote").unwrap();

	// Assert
	page.assert_ok();
	assert_eq!(
		quote.value().attr("value"),
		Some("Something's interfering with time, Mr. Scarman, and time is my business."),
	);
}

#[rstest]
#[tokio::test]
async fn repeated_get_renders_an_identical_message_list() {
	init_test_logging();

	// Arrange
	let app = TestApp::spawn();
	let client = app.client();

	// Act
	let first = Document::parse(&client.get("/").await.unwrap());
	let second = Document::parse(&client.get("/").await.unwrap());

	// Assert
	assert_eq!(message_texts(&first), message_texts(&second));
}
