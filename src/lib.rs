//! `flakymock` is a single HTTP endpoint that fails on demand, to exercise the error handling
//! and retry logic of HTTP clients.
//!
//! The endpoint, `/api`, replies according to a [`Configuration`] that can be changed at any
//! time, over HTTP or in-process.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Network faults](#network-faults)
//! 3. [Control channel](#control-channel)
//! 4. [Test isolation](#test-isolation)
//! 5. [Standalone mode](#standalone-mode)
//!
//! ## Getting started
//! ```rust
//! use flakymock::{ConfigurationUpdate, MockServer, ResponseEnvelope};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Start a background HTTP server on a random local port
//!     let mock_server = MockServer::start().await;
//!
//!     // By default, `/api` replies with a 200.
//!     let response = reqwest::get(format!("{}/api", mock_server.uri()))
//!         .await
//!         .unwrap();
//!     assert_eq!(response.status(), 200);
//!
//!     // Make it fail with a 503 from now on.
//!     mock_server
//!         .configuration()
//!         .update(ConfigurationUpdate::default().status_code(503));
//!
//!     let response = reqwest::get(format!("{}/api", mock_server.uri()))
//!         .await
//!         .unwrap();
//!     assert_eq!(response.status(), 503);
//!     let envelope: ResponseEnvelope = response.json().await.unwrap();
//!     assert_eq!(envelope.status, "error");
//!     assert_eq!(envelope.code, 503);
//! }
//! ```
//!
//! ## Network faults
//!
//! [`NetworkFault`] goes below HTTP:
//! - `timeout`: the request is read and never answered. Your client's own timeout is the only
//!   way out;
//! - `reset`: the request is read, then the connection is reset (TCP RST);
//! - `refuse`: the connection is reset as soon as the request head has been parsed, before
//!   its body is read.
//!
//! In both `reset` and `refuse` the client never receives a status line.
//!
//! ## Control channel
//!
//! - `GET /config` returns the current configuration,
//!   e.g. `{"statusCode": 200, "delay": 0, "networkError": "none"}`;
//! - `POST /config` applies a partial update with the same field names. Fields that are left
//!   out keep their value. Invalid updates are rejected as a whole with a `400`.
//!
//! Every response carries permissive CORS headers, so a browser-based control panel served
//! from anywhere can drive the server.
//!
//! ## Test isolation
//!
//! Each instance of [`MockServer`] is fully isolated: [`start`] finds a random port available on
//! your local machine and gives the new server its own [`ConfigurationStore`].
//!
//! When a [`MockServer`] instance goes out of scope the HTTP server running in the background
//! is shut down to free up the port it was using.
//!
//! ## Standalone mode
//!
//! The `flakymock` binary serves the same endpoints on a fixed address - check
//! `flakymock --help`. Embed the server in your own binary with [`serve`].
//!
//! [`start`]: MockServer::start
mod configuration;
mod error;
mod mock_server;
mod request;
mod responder;
mod response_template;
mod store;

pub use configuration::{Configuration, ConfigurationUpdate, NetworkFault};
pub use error::{Error, InvalidConfiguration};
pub use mock_server::{serve, MockServer, MockServerBuilder};
pub(crate) use request::Request;
pub use responder::ResponseEnvelope;
pub use store::ConfigurationStore;
