//! Middleware layer.
//!
//! A middleware is a handler decorator: it takes the inner
//! [`BoxedHandler`] and returns a new one that runs code before and/or after
//! the inner call. The [`Registrar`](crate::Registrar) composes the pending
//! chain at registration time, first-listed outermost, so there is zero
//! chain-walking on the request path — a wrapped route is just another
//! handler.
//!
//! Writing one by hand:
//!
//! ```rust
//! use std::sync::Arc;
//! use vereda::{middleware, ErasedHandler, Handler, Request, Response, StatusCode};
//! use vereda::middleware::Middleware;
//!
//! fn require_token() -> Middleware {
//!     middleware::from_fn(|inner| {
//!         (move |req: Request| {
//!             let inner = Arc::clone(&inner);
//!             async move {
//!                 if req.header("authorization").is_none() {
//!                     return Response::status(StatusCode::UNAUTHORIZED);
//!                 }
//!                 inner.call(req).await
//!             }
//!         })
//!         .into_boxed_handler()
//!     })
//! }
//! ```
//!
//! The closure handed to [`from_fn`] runs once per *registration*; the
//! closure it returns runs once per *request*.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::handler::{BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;

/// A handler decorator. Order-sensitive: when the registrar applies a chain,
/// the first middleware in the list observes the request first.
pub type Middleware = Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static>;

/// Wraps a plain function as a [`Middleware`].
pub fn from_fn<F>(f: F) -> Middleware
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Per-request tracing: method, path, status, latency.
///
/// Emits one `info` event per request through the wrapped route. Pair with a
/// `tracing_subscriber` in `main` to get structured access logs.
pub fn trace() -> Middleware {
    from_fn(|inner| {
        (move |req: Request| {
            let inner = Arc::clone(&inner);
            let method = req.method();
            let path = req.path().to_owned();
            async move {
                let start = Instant::now();
                let res = inner.call(req).await;
                info!(
                    %method,
                    %path,
                    status = res.status_code().as_u16(),
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "request",
                );
                res
            }
        })
        .into_boxed_handler()
    })
}
