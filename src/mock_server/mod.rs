//! All bits and pieces concerning the HTTP server are in this module.
//!
//! `bare_server::BareMockServer` is the "front-end" to drive the `hyper` HTTP server running in
//! the background, defined in the `hyper` sub-module. Crate users only get to interact with
//! `exposed_server::MockServer`, a thin wrapper around it.
//!
//! `routes` maps requests to the mock endpoint or to the control channel, while `connection`
//! holds the socket plumbing needed to reset a connection on demand.
mod bare_server;
mod builder;
mod connection;
mod exposed_server;
mod hyper;
mod routes;

pub use builder::MockServerBuilder;
pub use exposed_server::MockServer;
pub use self::hyper::serve;
