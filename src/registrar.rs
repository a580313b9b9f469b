//! Expressive route registration: verbs, prefixes, groups, middleware.
//!
//! The [`Registrar`] is a startup-phase builder in front of the
//! [`Router`](crate::Router). It adds the vocabulary the router deliberately
//! lacks:
//!
//! - **verbs** — `get`/`post`/… instead of `on(Method::…)`, with an optional
//!   route name
//! - **prefixes** — nestable path scopes: everything registered inside
//!   `prefix("admin", …)` lands under `/admin`
//! - **middleware** — a pending decorator chain applied to the next
//!   registration; single-use outside any scope
//! - **groups** — extend the pending middleware across several registrations
//!   without introducing a path prefix
//!
//! ```rust
//! use vereda::{Registrar, Request, Response, Router};
//!
//! async fn dashboard(_req: Request) -> Response { Response::text("dashboard") }
//! async fn profile(_req: Request) -> Response { Response::text("profile") }
//!
//! let mut reg = Registrar::new(Router::new());
//! reg.prefix("admin", |r| {
//!     r.get("dashboard", dashboard, Some("admin.dashboard"));
//!     r.prefix("users", |r| {
//!         r.get("me", profile, None); // GET /admin/users/me
//!     });
//! });
//! let router = reg.into_router();
//! ```
//!
//! # Middleware lifetime
//!
//! [`middleware`](Registrar::middleware) sets a *pending* chain. The next
//! verb registration consumes it: outside any `prefix` or `group` the chain
//! is cleared right after that one registration. Inside a `prefix` or
//! `group` the chain persists for every registration the scope makes — the
//! clearing condition is a single flat check, not per-scope bookkeeping.
//!
//! Scope state is never mutated in place. Each `prefix`/`group` call derives
//! a child context for its callback and reinstates the parent afterwards —
//! also when the callback panics — so no scope can leak prefixes, group
//! flags, or middleware into its surroundings.

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::router::Router;

/// Startup-phase route registration builder.
///
/// Owns the [`Router`] while routes are being registered; surrender it with
/// [`into_router`](Registrar::into_router) when done. Registration is
/// single-threaded and synchronous — the serving path never sees a
/// `Registrar`.
pub struct Registrar {
    router: Router,
    ctx: Context,
}

/// The registration context: active prefix segments, pending middleware,
/// group flag. Passed down by value into scopes (cloned on entry, parent
/// reinstated on exit), never shared.
#[derive(Clone, Default)]
struct Context {
    prefixes: Vec<String>,
    middleware: Vec<Middleware>,
    in_group: bool,
}

impl Context {
    /// True while any `prefix` or `group` scope is active — the one flat
    /// condition that decides whether pending middleware survives a
    /// registration.
    fn scoped(&self) -> bool {
        !self.prefixes.is_empty() || self.in_group
    }

    /// The joined path of all active prefix segments, rooted at `/`.
    /// `None` when no prefix scope is active.
    fn scope_root(&self) -> Option<String> {
        if self.prefixes.is_empty() {
            None
        } else {
            Some(format!("/{}", self.prefixes.join("/")))
        }
    }
}

impl Registrar {
    pub fn new(router: Router) -> Self {
        Self { router, ctx: Context::default() }
    }

    // ── Verb registration ─────────────────────────────────────────────────

    /// Registers `handler` for `GET` at `path`, optionally named.
    ///
    /// `path` needs no leading slash; an empty path registers the current
    /// scope root. The pending middleware chain wraps the handler,
    /// first-listed outermost.
    pub fn get(&mut self, path: &str, handler: impl Handler, name: Option<&str>) {
        self.compose(Method::Get, path, handler.into_boxed_handler(), name);
    }

    /// Registers `handler` for `HEAD` at `path`, optionally named.
    pub fn head(&mut self, path: &str, handler: impl Handler, name: Option<&str>) {
        self.compose(Method::Head, path, handler.into_boxed_handler(), name);
    }

    /// Registers `handler` for `POST` at `path`, optionally named.
    pub fn post(&mut self, path: &str, handler: impl Handler, name: Option<&str>) {
        self.compose(Method::Post, path, handler.into_boxed_handler(), name);
    }

    /// Registers `handler` for `PUT` at `path`, optionally named.
    pub fn put(&mut self, path: &str, handler: impl Handler, name: Option<&str>) {
        self.compose(Method::Put, path, handler.into_boxed_handler(), name);
    }

    /// Registers `handler` for `PATCH` at `path`, optionally named.
    pub fn patch(&mut self, path: &str, handler: impl Handler, name: Option<&str>) {
        self.compose(Method::Patch, path, handler.into_boxed_handler(), name);
    }

    /// Registers `handler` for `DELETE` at `path`, optionally named.
    pub fn delete(&mut self, path: &str, handler: impl Handler, name: Option<&str>) {
        self.compose(Method::Delete, path, handler.into_boxed_handler(), name);
    }

    /// Registers `handler` for `OPTIONS` at `path`, optionally named.
    pub fn options(&mut self, path: &str, handler: impl Handler, name: Option<&str>) {
        self.compose(Method::Options, path, handler.into_boxed_handler(), name);
    }

    /// Registers a GET handler for every request path beginning with
    /// `prefix` — static asset trees.
    ///
    /// Static serving bypasses the middleware pipeline and ignores any
    /// active prefix scope: the registration always lands on the base
    /// router, unwrapped, and leaves the pending middleware untouched.
    pub fn handle_filesystem(&mut self, prefix: &str, handler: impl Handler) {
        self.router.register_prefix(Method::Get, prefix, handler);
    }

    // ── Middleware ────────────────────────────────────────────────────────

    /// Replaces the pending middleware chain wholesale.
    ///
    /// Order matters: the first element observes the request first. An empty
    /// list clears the chain. Returns `&mut Self` so a registration can
    /// follow directly:
    ///
    /// ```rust
    /// # use vereda::{middleware, Registrar, Request, Response, Router};
    /// # async fn secret(_req: Request) -> Response { Response::text("secret") }
    /// # let auth = middleware::trace();
    /// # let mut reg = Registrar::new(Router::new());
    /// reg.middleware(vec![auth]).get("secret", secret, None);
    /// ```
    pub fn middleware(&mut self, middleware: Vec<Middleware>) -> &mut Self {
        self.ctx.middleware = middleware;
        self
    }

    // ── Scopes ────────────────────────────────────────────────────────────

    /// Runs `f` with `segment` pushed onto the prefix stack.
    ///
    /// Every registration inside `f` lands under the joined path of all
    /// active segments — `prefix` calls nest arbitrarily, and the scope is
    /// always rooted against the top-level router, not the parent scope.
    /// Pending middleware persists across registrations for as long as the
    /// scope is active.
    ///
    /// # Panics
    ///
    /// Panics if `segment` is empty (or only slashes) — an empty prefix is a
    /// configuration error, caught at startup.
    pub fn prefix(&mut self, segment: &str, f: impl FnOnce(&mut Registrar)) {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            panic!("prefix(): the prefix segment can't be empty");
        }

        let mut child = self.ctx.clone();
        child.prefixes.push(segment.to_owned());
        self.enter(child, f);
    }

    /// Runs `f` with the group flag set.
    ///
    /// A group has no path effect; its sole purpose is to let one
    /// [`middleware`](Registrar::middleware) chain apply to several
    /// registrations that share no prefix.
    pub fn group(&mut self, f: impl FnOnce(&mut Registrar)) {
        let mut child = self.ctx.clone();
        child.in_group = true;
        self.enter(child, f);
    }

    // ── Finishing ─────────────────────────────────────────────────────────

    /// Inspect the underlying router (e.g. for
    /// [`path_for`](Router::path_for) lookups mid-registration).
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Registration is done: surrender the router to the serving path.
    pub fn into_router(self) -> Router {
        self.router
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Swaps `child` in as the active context, runs `f`, and reinstates the
    /// parent context when `f` returns — or unwinds.
    fn enter(&mut self, child: Context, f: impl FnOnce(&mut Registrar)) {
        let parent = std::mem::replace(&mut self.ctx, child);
        let guard = ScopeExit { registrar: self, parent: Some(parent) };
        f(&mut *guard.registrar);
    }

    /// The single funnel every verb registration goes through.
    fn compose(&mut self, method: Method, path: &str, handler: BoxedHandler, name: Option<&str>) {
        // Reverse application: the first middleware in the chain becomes the
        // outermost wrapper and observes the request first.
        let mut wrapped = handler;
        for layer in self.ctx.middleware.iter().rev() {
            wrapped = (**layer)(wrapped);
        }

        let url = resolve(path);

        match self.ctx.scope_root() {
            Some(root) => {
                let mut scope = self.router.scope(&root);
                let handle = scope.register(method, &url, wrapped);
                if let Some(name) = name {
                    handle.set_name(name);
                }
            }
            None => {
                let handle = self.router.register(method, &url, wrapped);
                if let Some(name) = name {
                    handle.set_name(name);
                }
            }
        }

        // Pending middleware is single-use unless a prefix or group scope is
        // active. One flat check, not a per-scope record.
        if !self.ctx.scoped() {
            self.ctx.middleware.clear();
        }
    }
}

/// Reinstates the parent registration context when a scope exits, no matter
/// how — a panic escaping the callback must not leave a stale prefix stack
/// or group flag behind.
struct ScopeExit<'a> {
    registrar: &'a mut Registrar,
    parent: Option<Context>,
}

impl Drop for ScopeExit<'_> {
    fn drop(&mut self) {
        if let Some(parent) = self.parent.take() {
            self.registrar.ctx = parent;
        }
    }
}

/// Resolves a verb-registration path: exactly one leading `/`; an empty path
/// is the scope root `/`. Everything further (trailing-slash equivalence,
/// pattern syntax) is the router's business.
fn resolve(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::response::Response;

    async fn ok(_req: Request) -> Response {
        Response::text("ok")
    }

    #[test]
    fn context_is_at_rest_between_scopes() {
        let mut reg = Registrar::new(Router::new());

        reg.prefix("admin", |r| {
            assert_eq!(r.ctx.scope_root().as_deref(), Some("/admin"));
            r.prefix("users", |r| {
                assert_eq!(r.ctx.scope_root().as_deref(), Some("/admin/users"));
            });
            assert_eq!(r.ctx.scope_root().as_deref(), Some("/admin"));
        });

        assert!(reg.ctx.scope_root().is_none());
        assert!(!reg.ctx.scoped());
    }

    #[test]
    fn group_flag_does_not_outlive_the_callback() {
        let mut reg = Registrar::new(Router::new());

        reg.group(|r| assert!(r.ctx.in_group));
        assert!(!reg.ctx.in_group);
    }

    #[test]
    fn panicking_callback_restores_the_context() {
        let mut reg = Registrar::new(Router::new());

        let escaped = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            reg.prefix("admin", |r| {
                r.group(|_| panic!("registration failed"));
            });
        }));
        assert!(escaped.is_err());

        // Both scopes unwound; the registrar is usable and at rest.
        assert!(!reg.ctx.scoped());
        reg.get("after", ok, None);
    }

    #[test]
    #[should_panic(expected = "can't be empty")]
    fn empty_prefix_segment_is_fatal() {
        let mut reg = Registrar::new(Router::new());
        reg.prefix("", |_| {});
    }

    #[test]
    #[should_panic(expected = "can't be empty")]
    fn slash_only_prefix_segment_is_fatal() {
        let mut reg = Registrar::new(Router::new());
        reg.prefix("//", |_| {});
    }

    #[test]
    fn resolve_adds_exactly_one_leading_slash() {
        assert_eq!(resolve("dashboard"), "/dashboard");
        assert_eq!(resolve("/dashboard"), "/dashboard");
        assert_eq!(resolve(""), "/");
        assert_eq!(resolve("/"), "/");
    }
}
