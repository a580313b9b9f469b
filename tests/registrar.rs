//! End-to-end registration behavior, exercised through `Router::dispatch` —
//! the same way a served request would reach a handler, minus the socket.

use std::sync::{Arc, Mutex};

use vereda::middleware::{self, Middleware};
use vereda::{ErasedHandler, Handler, Method, Registrar, Request, Response, Router, StatusCode};

/// Shared observation log for middleware ordering assertions.
type Log = Arc<Mutex<Vec<&'static str>>>;

fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn taken(log: &Log) -> Vec<&'static str> {
    std::mem::take(&mut *log.lock().unwrap())
}

/// A middleware that records `label` before delegating to the inner handler.
fn record(log: &Log, label: &'static str) -> Middleware {
    let log = Arc::clone(log);
    middleware::from_fn(move |inner| {
        let log = Arc::clone(&log);
        (move |req: Request| {
            let inner = Arc::clone(&inner);
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(label);
                inner.call(req).await
            }
        })
        .into_boxed_handler()
    })
}

/// A handler that answers with a fixed body, for telling routes apart.
fn answer(body: &'static str) -> impl Handler {
    move |_req: Request| async move { Response::text(body) }
}

async fn get(router: &Router, path: &str) -> Response {
    router.dispatch(Request::new(Method::Get, path)).await
}

// ── Prefix composition ────────────────────────────────────────────────────────

#[tokio::test]
async fn nested_prefixes_compose_the_full_path() {
    let mut reg = Registrar::new(Router::new());
    reg.prefix("api", |r| {
        r.prefix("v1", |r| {
            r.get("users", answer("users"), None);
        });
    });
    let router = reg.into_router();

    let res = get(&router, "/api/v1/users").await;
    assert_eq!(res.body(), b"users");
    assert_eq!(get(&router, "/v1/users").await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/users").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_path_registers_the_scope_root() {
    let mut reg = Registrar::new(Router::new());
    reg.prefix("admin", |r| {
        r.get("", answer("root"), None);
    });
    let router = reg.into_router();

    assert_eq!(get(&router, "/admin").await.body(), b"root");
}

#[tokio::test]
async fn prefix_state_does_not_leak_after_exit() {
    let mut reg = Registrar::new(Router::new());
    reg.prefix("admin", |r| {
        r.get("dashboard", answer("dash"), None);
    });
    reg.get("top", answer("top"), None);
    let router = reg.into_router();

    assert_eq!(get(&router, "/top").await.body(), b"top");
    assert_eq!(get(&router, "/admin/top").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sibling_prefixes_resume_correctly_after_nesting() {
    let mut reg = Registrar::new(Router::new());
    reg.prefix("admin", |r| {
        r.get("dashboard", answer("h1"), None);
        r.prefix("users", |r| {
            r.get("me", answer("h2"), None);
        });
        r.prefix("posts", |r| {
            r.get("", answer("h3"), None);
        });
    });
    let router = reg.into_router();

    assert_eq!(get(&router, "/admin/dashboard").await.body(), b"h1");
    assert_eq!(get(&router, "/admin/users/me").await.body(), b"h2");
    assert_eq!(get(&router, "/admin/posts").await.body(), b"h3");
}

#[tokio::test]
async fn prefixed_route_misses_fall_through_to_404() {
    let mut reg = Registrar::new(Router::new());
    reg.prefix("admin", |r| {
        r.get("dashboard", answer("dash"), None);
    });
    let router = reg.into_router();

    assert_eq!(get(&router, "/admin/dashboard").await.status_code(), StatusCode::OK);
    assert_eq!(get(&router, "/admin/missing").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trailing_slash_is_equivalent_on_prefixed_routes() {
    let mut reg = Registrar::new(Router::new());
    reg.prefix("admin", |r| {
        r.get("dashboard", answer("dash"), None);
    });
    let router = reg.into_router();

    assert_eq!(get(&router, "/admin/dashboard/").await.body(), b"dash");
}

// ── Middleware scope ──────────────────────────────────────────────────────────

#[tokio::test]
async fn first_listed_middleware_observes_the_request_first() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.middleware(vec![record(&log, "m1"), record(&log, "m2")])
        .get("x", answer("x"), None);
    let router = reg.into_router();

    get(&router, "/x").await;
    assert_eq!(taken(&log), vec!["m1", "m2"]);
}

#[tokio::test]
async fn middleware_is_single_use_outside_any_scope() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.middleware(vec![record(&log, "m1")]);
    reg.get("first", answer("a"), None);
    reg.get("second", answer("b"), None);
    let router = reg.into_router();

    get(&router, "/first").await;
    assert_eq!(taken(&log), vec!["m1"]);

    get(&router, "/second").await;
    assert_eq!(taken(&log), Vec::<&str>::new());
}

#[tokio::test]
async fn group_shares_middleware_across_registrations() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.middleware(vec![record(&log, "m1")]);
    reg.group(|r| {
        r.get("a", answer("a"), None);
        r.get("b", answer("b"), None);
    });
    let router = reg.into_router();

    get(&router, "/a").await;
    assert_eq!(taken(&log), vec!["m1"]);
    get(&router, "/b").await;
    assert_eq!(taken(&log), vec!["m1"]);
}

#[tokio::test]
async fn prefix_shares_middleware_across_registrations() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.prefix("admin", |r| {
        r.middleware(vec![record(&log, "auth")]);
        r.get("a", answer("a"), None);
        r.get("b", answer("b"), None);
    });
    let router = reg.into_router();

    get(&router, "/admin/a").await;
    assert_eq!(taken(&log), vec!["auth"]);
    get(&router, "/admin/b").await;
    assert_eq!(taken(&log), vec!["auth"]);
}

#[tokio::test]
async fn group_inside_prefix_keeps_middleware_alive() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.prefix("p", |r| {
        r.group(|r| {
            r.middleware(vec![record(&log, "m")]);
            r.get("a", answer("a"), None);
            r.get("b", answer("b"), None);
        });
    });
    let router = reg.into_router();

    get(&router, "/p/a").await;
    assert_eq!(taken(&log), vec!["m"]);
    get(&router, "/p/b").await;
    assert_eq!(taken(&log), vec!["m"]);
}

#[tokio::test]
async fn middleware_set_inside_a_scope_stays_inside_it() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.group(|r| {
        r.middleware(vec![record(&log, "scoped")]);
        r.get("inside", answer("in"), None);
    });
    reg.get("outside", answer("out"), None);
    let router = reg.into_router();

    get(&router, "/inside").await;
    assert_eq!(taken(&log), vec!["scoped"]);

    get(&router, "/outside").await;
    assert_eq!(taken(&log), Vec::<&str>::new());
}

#[tokio::test]
async fn middleware_replaces_the_chain_wholesale() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.middleware(vec![record(&log, "m1")]);
    reg.middleware(vec![record(&log, "m2")]);
    reg.get("x", answer("x"), None);
    let router = reg.into_router();

    get(&router, "/x").await;
    assert_eq!(taken(&log), vec!["m2"]);
}

#[tokio::test]
async fn empty_middleware_list_clears_the_chain() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.middleware(vec![record(&log, "m1")]);
    reg.middleware(Vec::new());
    reg.get("x", answer("x"), None);
    let router = reg.into_router();

    get(&router, "/x").await;
    assert_eq!(taken(&log), Vec::<&str>::new());
}

// ── Filesystem / static prefix routes ─────────────────────────────────────────

#[tokio::test]
async fn filesystem_routes_match_nested_paths() {
    let mut reg = Registrar::new(Router::new());
    reg.handle_filesystem("/static", answer("asset"));
    let router = reg.into_router();

    assert_eq!(get(&router, "/static/anything/nested").await.body(), b"asset");
    assert_eq!(
        router
            .dispatch(Request::new(Method::Post, "/static/x"))
            .await
            .status_code(),
        StatusCode::NOT_FOUND,
    );
}

#[tokio::test]
async fn filesystem_routes_ignore_active_prefix_scopes() {
    let mut reg = Registrar::new(Router::new());
    reg.prefix("p", |r| {
        r.handle_filesystem("/static", answer("asset"));
        r.get("page", answer("page"), None);
    });
    let router = reg.into_router();

    // The static registration lands on the base router: reachable at its
    // bare prefix, not under the enclosing scope.
    assert_eq!(get(&router, "/static/x").await.body(), b"asset");
    assert_eq!(get(&router, "/p/static/x").await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(get(&router, "/p/page").await.body(), b"page");
}

#[tokio::test]
async fn filesystem_routes_bypass_pending_middleware() {
    let log = new_log();
    let mut reg = Registrar::new(Router::new());
    reg.middleware(vec![record(&log, "m1")]);
    reg.handle_filesystem("/static", answer("asset"));
    // The pending chain is untouched by the filesystem registration; the
    // next verb registration still consumes it.
    reg.get("next", answer("next"), None);
    let router = reg.into_router();

    get(&router, "/static/app.js").await;
    assert_eq!(taken(&log), Vec::<&str>::new());

    get(&router, "/next").await;
    assert_eq!(taken(&log), vec!["m1"]);
}

// ── Verbs and names ───────────────────────────────────────────────────────────

#[tokio::test]
async fn every_verb_registers_under_its_own_method() {
    let mut reg = Registrar::new(Router::new());
    reg.get("r", answer("get"), None);
    reg.head("r", answer("head"), None);
    reg.post("r", answer("post"), None);
    reg.put("r", answer("put"), None);
    reg.patch("r", answer("patch"), None);
    reg.delete("r", answer("delete"), None);
    reg.options("r", answer("options"), None);
    let router = reg.into_router();

    for (method, body) in [
        (Method::Get, "get"),
        (Method::Head, "head"),
        (Method::Post, "post"),
        (Method::Put, "put"),
        (Method::Patch, "patch"),
        (Method::Delete, "delete"),
        (Method::Options, "options"),
    ] {
        let res = router.dispatch(Request::new(method, "/r")).await;
        assert_eq!(res.body(), body.as_bytes(), "method {method}");
    }
}

#[tokio::test]
async fn names_record_the_full_prefixed_path() {
    let mut reg = Registrar::new(Router::new());
    reg.get("users/{id}", answer("user"), Some("users.show"));
    reg.prefix("admin", |r| {
        r.get("stats", answer("stats"), Some("admin.stats"));
    });

    assert_eq!(reg.router().path_for("users.show"), Some("/users/{id}"));
    assert_eq!(reg.router().path_for("admin.stats"), Some("/admin/stats"));
    assert_eq!(reg.router().path_for("nope"), None);
}

#[tokio::test]
async fn request_bodies_reach_handlers() {
    async fn echo(req: Request) -> Response {
        Response::json(req.body().to_vec())
    }

    let mut reg = Registrar::new(Router::new());
    reg.post("echo", echo, None);
    let router = reg.into_router();

    let req = Request::new(Method::Post, "/echo")
        .with_body(br#"{"name":"alice"}"#.as_slice());
    let res = router.dispatch(req).await;
    assert_eq!(res.body(), br#"{"name":"alice"}"#);
}

#[tokio::test]
async fn handlers_see_path_params_through_the_registrar() {
    async fn echo_id(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("missing").to_owned())
    }

    let mut reg = Registrar::new(Router::new());
    reg.prefix("users", |r| {
        r.get("{id}", echo_id, None);
    });
    let router = reg.into_router();

    assert_eq!(get(&router, "/users/42").await.body(), b"42");
}
