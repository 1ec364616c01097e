mod common;

use axum::body::Body;
use http::{Request, StatusCode, header};
use tower::ServiceExt as _;

use common::*;

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request builds successfully")
}

#[tokio::test]
async fn dashboard_without_cookie_redirects_to_login() {
    let app = folio::app(test_state());

    let res = app
        .oneshot(get("/admin/dashboard", None))
        .await
        .expect("service call succeeds");

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), Some("/admin"));
}

#[tokio::test]
async fn nested_dashboard_path_is_protected() {
    let app = folio::app(test_state());

    let res = app
        .oneshot(get("/admin/dashboard/projects", None))
        .await
        .expect("service call succeeds");

    assert_eq!(location(&res), Some("/admin"));
}

#[tokio::test]
async fn dashboard_with_admin_session_passes_through() {
    let state = test_state();
    let cookie = session_header(&state, "42", "admin");
    let app = folio::app(state);

    let res = app
        .oneshot(get("/admin/dashboard", Some(&cookie)))
        .await
        .expect("service call succeeds");

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::SET_COOKIE).is_none());

    let body: serde_json::Value =
        serde_json::from_str(&body_string(res.into_body()).await).expect("body is json");
    assert_eq!(body["userId"], "42");
    assert_eq!(body["role"], "admin");
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn dashboard_refuses_non_admin_role() {
    let state = test_state();
    let cookie = session_header(&state, "7", "user");
    let app = folio::app(state);

    let res = app
        .oneshot(get("/admin/dashboard", Some(&cookie)))
        .await
        .expect("service call succeeds");

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_surface_with_session_redirects_to_dashboard() {
    let state = test_state();
    let cookie = session_header(&state, "42", "admin");
    let app = folio::app(state);

    for path in ["/admin", "/admin/"] {
        let res = app
            .clone()
            .oneshot(get(path, Some(&cookie)))
            .await
            .expect("service call succeeds");

        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
        assert_eq!(location(&res), Some("/admin/dashboard"), "{path}");
    }
}

#[tokio::test]
async fn login_surface_without_session_renders() {
    let app = folio::app(test_state());

    let res = app
        .oneshot(get("/admin", None))
        .await
        .expect("service call succeeds");

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res.into_body()).await.contains("/api/auth/login"));
}

#[tokio::test]
async fn invalid_cookies_fail_closed() {
    let state = test_state();
    let expired = expired_session_header(&state, "42", "admin");

    let other = folio::crypto::token::TokenCodec::new(
        b"a-completely-different-secret-32b!",
        chrono::Duration::days(7),
    )
    .expect("codec builds");
    let foreign = format!("session={}", other.issue("42", "admin").expect("token issues").token);

    let app = folio::app(state);

    for cookie in [
        expired.as_str(),
        foreign.as_str(),
        "session=",
        "session=bogus",
        "session=a.b.c",
    ] {
        let res = app
            .clone()
            .oneshot(get("/admin/dashboard", Some(cookie)))
            .await
            .expect("service call succeeds");

        assert_eq!(location(&res), Some("/admin"), "{cookie}");

        let res = app
            .clone()
            .oneshot(get("/admin", Some(cookie)))
            .await
            .expect("service call succeeds");

        assert_eq!(res.status(), StatusCode::OK, "{cookie}");
    }
}

#[tokio::test]
async fn unclassified_paths_pass_through() {
    let app = folio::app(test_state());

    let res = app
        .clone()
        .oneshot(get("/health", None))
        .await
        .expect("service call succeeds");
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(get("/does-not-exist", None))
        .await
        .expect("service call succeeds");
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn excluded_paths_skip_verification() {
    use axum::{Router, extract::Request, middleware::from_fn_with_state, routing::get as get_route};
    use folio::models::session::SessionPayload;
    use tower_cookies::CookieManagerLayer;

    async fn probe(request: Request) -> &'static str {
        if request.extensions().get::<SessionPayload>().is_some() {
            "verified"
        } else {
            "skipped"
        }
    }

    let state = test_state();
    let cookie = session_header(&state, "42", "admin");

    let app = Router::new()
        .route("/static/app.css", get_route(probe))
        .route("/static", get_route(probe))
        .route("/favicon.ico", get_route(probe))
        .route("/about", get_route(probe))
        .layer(from_fn_with_state(
            state.clone(),
            folio::middleware_layer::guard::route_guard,
        ))
        .layer(CookieManagerLayer::new())
        .with_state(state);

    for path in ["/static/app.css", "/static", "/favicon.ico"] {
        let res = app
            .clone()
            .oneshot(get(path, Some(&cookie)))
            .await
            .expect("service call succeeds");
        assert_eq!(body_string(res.into_body()).await, "skipped", "{path}");
    }

    let res = app
        .oneshot(get("/about", Some(&cookie)))
        .await
        .expect("service call succeeds");
    assert_eq!(body_string(res.into_body()).await, "verified");
}
