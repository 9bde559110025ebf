//! Integration-test harness: in-memory fixture, fetcher, HTML parsing and
//! form replay.
//!
//! The usual shape of a test:
//!
//! ```rust
//! use pinboard::harness::{Document, ResponseExt, TestApp, submit};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = TestApp::spawn();
//! let client = app.client();
//!
//! let page = client.get("/").await.unwrap();
//! let document = Document::parse(&page);
//!
//! let response = submit(
//!     &client,
//!     &document,
//!     "form[id='analyze']",
//!     "button[id='analyzeBtn']",
//!     &[],
//! )
//! .await
//! .unwrap();
//!
//! response.assert_redirect_to("/");
//! # }
//! ```

pub mod client;
pub mod dom;
pub mod fixture;
pub mod form;
pub mod response;

pub use client::{Client, ClientError};
pub use dom::{Document, DomError, element_text};
pub use fixture::{TestApp, TestAppBuilder};
pub use form::{FormDescriptor, FormError, SubmitError, submit};
pub use response::{PageResponse, ResponseExt};
