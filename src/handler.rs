//! Handler trait and type erasure.
//!
//! The router stores handlers of *different* concrete types in one table, and
//! middleware must be able to wrap any of them uniformly. Both needs are met
//! the same way: every handler is erased behind `Arc<dyn ErasedHandler>`.
//!
//! The chain from user code to vtable call:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }    ← user writes this
//!        ↓ registrar.get("hello", hello, None)
//! hello.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                        ← stored as BoxedHandler
//!        ↓ optionally re-wrapped by each Middleware layer
//! handler.call(req)  at request time                ← one vtable dispatch
//! ```
//!
//! The per-request cost is one `Arc` clone and one virtual call — negligible
//! next to network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` because the runtime polls the future in-place; `Send +
/// 'static` so tokio may move it across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Type-erased dispatch interface.
///
/// Public because middleware receives the inner handler as a
/// [`BoxedHandler`] and must be able to invoke it via [`call`](Self::call).
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// This is the currency of the middleware layer: a
/// [`Middleware`](crate::middleware::Middleware) is a function from
/// `BoxedHandler` to `BoxedHandler`.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it, which keeps the API surface stable
/// across versions.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed {}
}

/// Implement the sealing trait for any function with the right signature.
///
/// `Fn(Request) -> Fut` covers named `async fn` items, `async` closures, and
/// any struct that implements `Fn` — including the closures middleware
/// layers produce when they wrap an inner handler.
impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
