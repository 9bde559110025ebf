//! # Pinboard
//!
//! A server-rendered message board together with the integration-test
//! harness that drives it entirely in memory.
//!
//! The interesting part is the harness ([`harness`]): a disposable
//! application fixture with constructor-time service overrides
//! ([`harness::TestApp`]), an in-memory document fetcher
//! ([`harness::Client`]), lenient HTML parsing ([`harness::Document`]) and
//! browser-faithful form replay ([`harness::submit`]). The application
//! ([`app`]) is the black box those tests exercise: one page with
//! add/delete/analyze actions and a quote-of-the-day widget.

pub mod app;
pub mod harness;
pub mod http;

pub use app::MessageBoard;
pub use app::services::{
	CannedQuoteService, InMemoryMessageStore, Message, MessageStore, QuoteService, SEED_MESSAGES,
};
pub use harness::{Client, Document, FormDescriptor, PageResponse, ResponseExt, TestApp, submit};
