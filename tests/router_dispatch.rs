//! End-to-end dispatch: routing, middleware and bearer authentication.

use std::collections::HashMap;
use std::sync::Arc;

use httpapp_core::jwt::policy::now_epoch_seconds;
use httpapp_core::jwt::{
    CryptoProvider, EngineOptions, ErrorCode, HmacCryptoProvider, Jwt, JwtAlg, JwtError,
    SerdeJsonProvider, Verification,
};
use httpapp_core::middleware::bearer::{parse_authorization, require_bearer, BearerContext};
use httpapp_core::middleware::{Middleware, Next, Outcome};
use httpapp_core::routing::{HttpMethod, RouteContext, Router, RouterOptions, SharedRouter};

/// Minimal request/response pair an HTTP adapter would build.
#[derive(Default)]
struct Exchange {
    headers: HashMap<String, String>,
    params: HashMap<String, String>,
    subject: Option<String>,
    status: u16,
    body: String,
    trace: Vec<&'static str>,
}

impl Exchange {
    fn with_auth(token: &str) -> Self {
        let mut exchange = Exchange::default();
        exchange
            .headers
            .insert("Authorization".to_string(), format!("Bearer {token}"));
        exchange
    }
}

impl RouteContext for Exchange {
    fn set_param(&mut self, name: &str, value: &str) {
        self.params.insert(name.to_string(), value.to_string());
    }
}

impl BearerContext for Exchange {
    fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get("Authorization")
            .and_then(|value| parse_authorization(value))
    }

    fn attach_verification(&mut self, verification: Verification) {
        self.subject = verification.claim_str("sub").map(str::to_owned);
    }

    fn reject(&mut self, error: &JwtError) {
        self.status = 401;
        self.body = error.to_string();
    }
}

fn engine() -> Arc<Jwt> {
    let crypto = HmacCryptoProvider::new();
    crypto.generate_key_pair("api", JwtAlg::HS256, "").unwrap();
    Arc::new(Jwt::new(
        Arc::new(crypto),
        Arc::new(SerdeJsonProvider),
        EngineOptions::default(),
    ))
}

fn app(jwt: &Arc<Jwt>) -> Router<Exchange> {
    let mut router = Router::new();

    router.use_middleware(|ex: &mut Exchange, next: Next<'_, Exchange>| {
        ex.trace.push("log:before");
        next.run(ex);
        ex.trace.push("log:after");
    });

    router.get("/health", |ex: &mut Exchange| {
        ex.status = 200;
        ex.body = "ok".to_string();
    });

    router.get("/users/<id:int>", |ex: &mut Exchange| {
        ex.status = 200;
        ex.body = format!("user {}", ex.params["id"]);
    });

    router.get("/users/<name:string>", |ex: &mut Exchange| {
        ex.status = 200;
        ex.body = format!("named {}", ex.params["name"]);
    });

    router
        .get("/me", |ex: &mut Exchange| {
            ex.status = 200;
            ex.body = format!("hello {}", ex.subject.as_deref().unwrap_or("?"));
        })
        .push_middleware(require_bearer(Arc::clone(jwt)));

    router.any("/echo/<rest>", |ex: &mut Exchange| {
        ex.status = 200;
        ex.body = ex.params["rest"].clone();
    });

    router
}

fn token_for(jwt: &Jwt, sub: &str) -> String {
    jwt.token()
        .kid("api")
        .subject(sub)
        .expires_at(now_epoch_seconds() + 300)
        .sign()
        .unwrap()
}

#[test]
fn test_typed_params_drive_handler_choice() {
    let jwt = engine();
    let router = app(&jwt);

    let mut ex = Exchange::default();
    assert_eq!(
        router.dispatch(HttpMethod::Get, "/users/42", &mut ex),
        Some(Outcome::Completed)
    );
    assert_eq!(ex.body, "user 42");

    let mut ex = Exchange::default();
    router.dispatch(HttpMethod::Get, "/users/alice", &mut ex);
    assert_eq!(ex.body, "named alice");
    assert_eq!(ex.trace, vec!["log:before", "log:after"]);
}

#[test]
fn test_no_route_leaves_context_untouched_by_handlers() {
    let jwt = engine();
    let router = app(&jwt);

    let mut ex = Exchange::default();
    assert_eq!(router.dispatch(HttpMethod::Post, "/users/42", &mut ex), None);
    assert_eq!(router.dispatch(HttpMethod::Get, "/nope", &mut ex), None);
    assert_eq!(ex.status, 0);
    assert!(ex.trace.is_empty());
}

#[test]
fn test_any_route_serves_every_method() {
    let jwt = engine();
    let router = app(&jwt);

    for method in HttpMethod::CONCRETE {
        let mut ex = Exchange::default();
        assert!(router.dispatch(method, "/echo/ping", &mut ex).is_some());
        assert_eq!(ex.body, "ping");
    }
}

#[test]
fn test_bearer_accepts_valid_token() {
    let jwt = engine();
    let router = app(&jwt);

    let mut ex = Exchange::with_auth(&token_for(&jwt, "alice"));
    assert_eq!(
        router.dispatch(HttpMethod::Get, "/me", &mut ex),
        Some(Outcome::Completed)
    );
    assert_eq!(ex.body, "hello alice");
}

#[test]
fn test_bearer_rejection_interrupts_but_outer_layers_unwind() {
    let jwt = engine();
    let router = app(&jwt);

    let mut ex = Exchange::default();
    assert_eq!(
        router.dispatch(HttpMethod::Get, "/me", &mut ex),
        Some(Outcome::Interrupted)
    );
    assert_eq!(ex.status, 401);
    assert!(ex.body.starts_with("InvalidFormat"));
    assert_eq!(ex.trace, vec!["log:before", "log:after"]);

    let other = engine();
    let mut ex = Exchange::with_auth(&token_for(&other, "mallory"));
    router.dispatch(HttpMethod::Get, "/me", &mut ex);
    assert_eq!(ex.status, 401);
    assert!(ex.body.starts_with(ErrorCode::SignatureMismatch.as_str()));
    assert!(ex.subject.is_none());
}

#[test]
fn test_route_middleware_attached_after_registration() {
    let jwt = engine();
    let mut router = app(&jwt);

    let deny: Middleware<Exchange> = Arc::new(|ex: &mut Exchange, _next: Next<'_, Exchange>| {
        ex.status = 403;
    });
    assert!(router.add_route_middleware(HttpMethod::Get, "/health", deny.clone()));
    assert!(!router.add_route_middleware(HttpMethod::Post, "/health", deny.clone()));
    assert!(!router.add_route_middleware(HttpMethod::Get, "/users/<uid:int>", deny));

    let mut ex = Exchange::default();
    assert_eq!(
        router.dispatch(HttpMethod::Get, "/health", &mut ex),
        Some(Outcome::Interrupted)
    );
    assert_eq!(ex.status, 403);
}

#[test]
fn test_strict_trailing_slash_router() {
    let mut router: Router<Exchange> = Router::with_options(RouterOptions {
        normalize_trailing_slash: false,
    });
    router.get("/users", |ex: &mut Exchange| ex.status = 200);

    let mut ex = Exchange::default();
    assert!(router.dispatch(HttpMethod::Get, "/users", &mut ex).is_some());
    assert!(router.dispatch(HttpMethod::Get, "/users/", &mut ex).is_none());
}

#[test]
fn test_shared_router_hot_registration() {
    let jwt = engine();
    let shared = SharedRouter::new(app(&jwt));

    let before = shared.load();
    shared.update(|router| {
        router.get("/version", |ex: &mut Exchange| ex.body = "1".to_string());
    });

    let mut ex = Exchange::default();
    assert!(before.dispatch(HttpMethod::Get, "/version", &mut ex).is_none());
    assert!(shared
        .load()
        .dispatch(HttpMethod::Get, "/version", &mut ex)
        .is_some());
    assert_eq!(ex.body, "1");
}
