//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! The video library core never talks to the network directly. It builds
//! [`HttpRequest`](http::HttpRequest) values and hands them to whatever
//! [`HttpClient`](http::HttpClient) the host injected. Desktop hosts get a
//! `reqwest` implementation from `bridge-desktop`; tests inject mocks.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Provide actionable error messages
//! - Never retry on their own unless a [`RetryPolicy`](http::RetryPolicy) asks for it
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so that one client can be
//! shared between the loader and every per-video controller.
//!
//! ## Examples
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod http;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
