//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them through the registrar:
//!
//! ```rust
//! use vereda::{health, Registrar, Router};
//!
//! let mut reg = Registrar::new(Router::new());
//! reg.get("healthz", health::liveness, None);
//! reg.get("readyz", health::readiness, None);
//! ```
//!
//! Override `readiness` with a custom handler if you need to gate on
//! dependency availability (database connections, downstream services, etc.).

use crate::{Request, Response};

/// Kubernetes liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive — this handler intentionally has no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace this with your own handler
/// if your application needs a warm-up period or must verify dependency
/// health before accepting traffic.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
