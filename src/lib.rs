//! # vereda
//!
//! Expressive route registration — prefixes, groups, middleware, named
//! routes — over a minimal [`matchit`]-backed router and a hyper server.
//!
//! ## The shape of it
//!
//! Two layers, one direction of dependency:
//!
//! - The [`Registrar`] is a startup-phase builder. It speaks the vocabulary
//!   applications want — `get`/`post`/…, nestable [`prefix`](Registrar::prefix)
//!   scopes, [`group`](Registrar::group)-shared [`middleware`](Registrar::middleware)
//!   chains, optional route names — and forwards every fully-resolved
//!   registration to the router.
//! - The [`Router`] is the matching engine: one radix tree per method,
//!   O(path-length) lookup, trailing-slash-insensitive. It serves requests
//!   and knows nothing about how they were registered.
//!
//! Once registration completes, the registrar surrenders the router
//! ([`Registrar::into_router`]) and is gone; the serving path shares the
//! router immutably.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use vereda::{health, Registrar, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut reg = Registrar::new(Router::new());
//!
//!     reg.get("healthz", health::liveness, None);
//!     reg.prefix("users", |r| {
//!         r.get("{id}", get_user, Some("users.show"));
//!         r.post("", create_user, None);
//!     });
//!
//!     Server::bind("0.0.0.0:3000")
//!         .serve(reg.into_router())
//!         .await
//!         .unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     # let _ = req.body();
//!     Response::status(vereda::StatusCode::CREATED)
//! }
//! ```
//!
//! ## Middleware
//!
//! A middleware is a handler decorator. The pending chain set via
//! [`Registrar::middleware`] applies to exactly one registration — unless a
//! `prefix` or `group` scope is active, in which case it applies to every
//! registration inside the scope. See the [`middleware`] module.
//!
//! ## Errors
//!
//! Registration-phase mistakes — an empty prefix segment, an invalid or
//! conflicting route pattern — panic at startup; they are configuration
//! errors and there is nothing sensible to recover to. Serve-time conditions
//! (unmatched path, unroutable method, unreadable body) are HTTP responses,
//! never errors. The only [`Error`] the crate returns is a failed listener
//! bind.

mod error;
mod handler;
mod method;
mod registrar;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use http::StatusCode;
pub use method::Method;
pub use registrar::Registrar;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::{RouteHandle, Router, RouterScope};
pub use server::Server;
