//! Minimal vereda example — prefixed admin routes, grouped middleware,
//! static assets, health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/healthz
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/admin/dashboard              # 401
//!   curl -H 'authorization: token' http://localhost:3000/admin/dashboard
//!   curl http://localhost:3000/static/css/site.css

use std::sync::Arc;

use vereda::middleware::Middleware;
use vereda::{
    health, middleware, ErasedHandler, Handler, Registrar, Request, Response, Router, Server,
    StatusCode,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut reg = Registrar::new(Router::new());

    reg.get("healthz", health::liveness, None);
    reg.get("readyz", health::readiness, None);

    // Pending middleware is single-use: it wraps this one registration only.
    reg.middleware(vec![middleware::trace()])
        .get("users/{id}", get_user, Some("users.show"));

    // Inside a prefix, one middleware chain covers every registration.
    reg.prefix("admin", |r| {
        r.middleware(vec![middleware::trace(), require_token()]);
        r.get("dashboard", dashboard, Some("admin.dashboard"));
        r.prefix("users", |r| {
            r.delete("{id}", delete_user, None); // DELETE /admin/users/{id}
        });
    });

    // Groups share middleware without sharing a path prefix.
    reg.group(|r| {
        r.middleware(vec![middleware::trace()]);
        r.post("login", login, None);
        r.post("logout", logout, None);
    });

    // Static assets: prefix match, no middleware, GET only.
    reg.handle_filesystem("/static", static_asset);

    Server::bind("0.0.0.0:3000")
        .serve(reg.into_router())
        .await
        .expect("server error");
}

/// Rejects requests without an `authorization` header.
fn require_token() -> Middleware {
    middleware::from_fn(|inner| {
        (move |req: Request| {
            let inner = Arc::clone(&inner);
            async move {
                if req.header("authorization").is_none() {
                    return Response::status(StatusCode::UNAUTHORIZED);
                }
                inner.call(req).await
            }
        })
        .into_boxed_handler()
    })
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// GET /admin/dashboard (token required)
async fn dashboard(_req: Request) -> Response {
    Response::json(br#"{"visits":1024}"#.to_vec())
}

// DELETE /admin/users/{id} → 204 No Content
async fn delete_user(_req: Request) -> Response {
    Response::status(StatusCode::NO_CONTENT)
}

// POST /login
async fn login(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::json(br#"{"token":"t-123"}"#.to_vec())
}

// POST /logout → 204 No Content
async fn logout(_req: Request) -> Response {
    Response::status(StatusCode::NO_CONTENT)
}

// GET /static/** — a real application would stream files here.
async fn static_asset(req: Request) -> Response {
    Response::text(format!("asset at {}", req.path()))
}
