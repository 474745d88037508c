mod common;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use calendar_dashboard::components::google_calendar::Category;
use calendar_dashboard::web::build_router;
use chrono::Duration;
use common::{all_day, app_state, numbered_events, timed, MockEventSource, MockIdentity, AUTH_CODE};
use http_body_util::BodyExt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, cookie: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Run the login round trip and return the tab cookie
async fn sign_in(app: &Router) -> String {
    let response = send(app, get("/auth/google", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response);

    let provider_url = Url::parse(&location(&response)).unwrap();
    let state = provider_url
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .unwrap();

    let callback = format!("/auth/callback?code={}&state={}", AUTH_CODE, state);
    let response = send(app, get(&callback, Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    cookie
}

async fn dashboard_page(app: &Router, cookie: &str) -> String {
    let response = send(app, get("/", Some(cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_text(response).await
}

fn identity() -> MockIdentity {
    MockIdentity { expires_in: None }
}

#[tokio::test]
async fn test_health() {
    let app = build_router(app_state(MockEventSource::new(Vec::new()), identity()));
    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn test_guard_redirects_without_session() {
    let source = MockEventSource::new(numbered_events(3));
    let app = build_router(app_state(Arc::clone(&source), identity()));

    for uri in ["/", "/export.csv", "/events/event-1"] {
        let response = send(&app, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    let response = send(&app, get("/", Some("dashboard_session=unknown"))).await;
    assert_eq!(location(&response), "/login");
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_login_page_shows_only_known_errors() {
    let app = build_router(app_state(MockEventSource::new(Vec::new()), identity()));

    let body = body_text(send(&app, get("/login?error=Sign-in+was+cancelled", None)).await).await;
    assert!(body.contains("Sign-in was cancelled"));

    let body = body_text(send(&app, get("/login?error=%3Cscript%3Ealert(1)%3C%2Fscript%3E", None)).await).await;
    assert!(!body.contains("alert(1)"));
    assert!(body.contains("/auth/google"));
}

#[tokio::test]
async fn test_callback_failures_stay_on_login() {
    let app = build_router(app_state(MockEventSource::new(Vec::new()), identity()));

    let response = send(&app, get("/auth/callback?error=access_denied", None)).await;
    assert_eq!(location(&response), "/login?error=Sign-in+was+cancelled");

    let response = send(&app, get("/auth/callback?code=abc&state=never-issued", None)).await;
    assert_eq!(location(&response), "/login?error=Sign-in+took+too+long%2C+please+try+again");

    // A valid state with a code the provider rejects
    let response = send(&app, get("/auth/google", None)).await;
    let cookie = session_cookie(&response);
    let provider_url = Url::parse(&location(&response)).unwrap();
    let (_, state) = provider_url.query_pairs().find(|(key, _)| key == "state").unwrap();
    let callback = format!("/auth/callback?code=wrong&state={}", state);
    let response = send(&app, get(&callback, Some(&cookie))).await;
    assert_eq!(location(&response), "/login?error=Could+not+sign+in+with+Google");

    // The state cannot be used twice
    let callback = format!("/auth/callback?code={}&state={}", AUTH_CODE, state);
    let response = send(&app, get(&callback, Some(&cookie))).await;
    assert!(location(&response).starts_with("/login?error="));
}

#[tokio::test]
async fn test_first_visit_loads_events_once() {
    let source = MockEventSource::new(numbered_events(23));
    let app = build_router(app_state(Arc::clone(&source), identity()));
    let cookie = sign_in(&app).await;

    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("Showing 23 of 23 events"));
    assert!(body.contains("Page 1 of 3"));
    assert!(body.contains("href=\"/events/event-0\""));
    assert!(body.contains("href=\"/events/event-9\""));
    assert!(!body.contains("href=\"/events/event-10\""));

    dashboard_page(&app, &cookie).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_pagination_clamps() {
    let app = build_router(app_state(MockEventSource::new(numbered_events(23)), identity()));
    let cookie = sign_in(&app).await;
    dashboard_page(&app, &cookie).await;

    for _ in 0..3 {
        let response = send(&app, post("/page/next", &cookie, "")).await;
        assert_eq!(location(&response), "/");
    }

    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Page 3 of 3"));
    assert!(body.contains("href=\"/events/event-20\""));
    assert!(body.contains("href=\"/events/event-22\""));
    assert!(!body.contains("href=\"/events/event-19\""));

    send(&app, post("/page", &cookie, "page=2")).await;
    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Page 2 of 3"));

    send(&app, post("/page/prev", &cookie, "")).await;
    send(&app, post("/page/prev", &cookie, "")).await;
    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Page 1 of 3"));
}

#[tokio::test]
async fn test_invalid_page_input_keeps_page() {
    let app = build_router(app_state(MockEventSource::new(numbered_events(23)), identity()));
    let cookie = sign_in(&app).await;
    dashboard_page(&app, &cookie).await;

    send(&app, post("/page", &cookie, "page=2")).await;

    for form in ["page=", "page=abc", "page=-2", ""] {
        let response = send(&app, post("/page", &cookie, form)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "form {:?}", form);
        assert_eq!(location(&response), "/");

        let body = dashboard_page(&app, &cookie).await;
        assert!(body.contains("Page 2 of 3"), "form {:?}", form);
    }
}

#[tokio::test]
async fn test_min_date_matches_shown_date() {
    // Late evening in New York is the next day in the configured UTC
    let events = vec![
        timed("late", "Late Call", "2024-01-05T22:00:00-05:00"),
        all_day("gym", "Gym", 2024, 1, 5),
    ];
    let app = build_router(app_state(MockEventSource::new(events), identity()));
    let cookie = sign_in(&app).await;

    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Sat 06 Jan 2024"));

    send(&app, post("/filter", &cookie, "title=&min_date=2024-01-06")).await;
    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Showing 1 of 2 events"));
    assert!(body.contains("href=\"/events/late\""));
    assert!(!body.contains("href=\"/events/gym\""));
}

#[tokio::test]
async fn test_filter_and_export() {
    let app = build_router(app_state(MockEventSource::new(numbered_events(23)), identity()));
    let cookie = sign_in(&app).await;
    dashboard_page(&app, &cookie).await;

    // Move to the last page, then narrow the list: the page clamps down
    send(&app, post("/page/next", &cookie, "")).await;
    send(&app, post("/page/next", &cookie, "")).await;
    send(&app, post("/filter", &cookie, "title=+EVENT+1+&min_date=")).await;

    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Showing 11 of 23 events"));
    assert!(body.contains("Page 2 of 2"));

    let response = send(&app, get("/export.csv", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"events.csv\""
    );

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[0], "title,start,description");
    assert!(lines[1].starts_with("Event 1,"));
    assert!(lines[2].starts_with("Event 10,"));

    send(&app, post("/filter/clear", &cookie, "")).await;
    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Showing 23 of 23 events"));
}

#[tokio::test]
async fn test_detail_overlay() {
    let app = build_router(app_state(MockEventSource::new(numbered_events(5)), identity()));
    let cookie = sign_in(&app).await;
    dashboard_page(&app, &cookie).await;

    let response = send(&app, get("/events/event-3", Some(&cookie))).await;
    assert_eq!(location(&response), "/");

    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("role=\"dialog\""));
    assert!(body.contains("Details for event 3"));
    assert!(body.contains("Category: Work"));

    send(&app, post("/detail/close", &cookie, "")).await;
    let body = dashboard_page(&app, &cookie).await;
    assert!(!body.contains("role=\"dialog\""));

    // Unknown ids open nothing
    send(&app, get("/events/missing", Some(&cookie))).await;
    let body = dashboard_page(&app, &cookie).await;
    assert!(!body.contains("role=\"dialog\""));
}

#[tokio::test]
async fn test_provider_markup_is_not_rendered() {
    let mut events = numbered_events(1);
    events[0].title = "<img src=x onerror=alert(1)>".to_string();
    events[0].description = Some("<script>alert(2)</script><p>Agenda</p>".to_string());
    events[0].category = Category::Personal;

    let app = build_router(app_state(MockEventSource::new(events), identity()));
    let cookie = sign_in(&app).await;
    dashboard_page(&app, &cookie).await;
    send(&app, get("/events/event-0", Some(&cookie))).await;

    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(!body.contains("<img src=x"));
    assert!(!body.contains("alert(2)"));
    assert!(body.contains("Agenda"));
}

#[tokio::test]
async fn test_failed_retrieval_offers_retry() {
    let source = MockEventSource::new(numbered_events(2));
    source.fail.store(true, Ordering::SeqCst);
    let app = build_router(app_state(Arc::clone(&source), identity()));
    let cookie = sign_in(&app).await;

    let body = dashboard_page(&app, &cookie).await;
    assert!(body.contains("Could not load your events"));
    assert!(body.contains("Retry"));
    assert!(body.contains("Showing 0 of 0 events"));

    source.fail.store(false, Ordering::SeqCst);
    let response = send(&app, post("/refresh", &cookie, "")).await;
    assert_eq!(location(&response), "/");

    let body = dashboard_page(&app, &cookie).await;
    assert!(!body.contains("Could not load your events"));
    assert!(body.contains("Showing 2 of 2 events"));
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_theme_toggle() {
    let app = build_router(app_state(MockEventSource::new(Vec::new()), identity()));
    let cookie = sign_in(&app).await;

    assert!(dashboard_page(&app, &cookie).await.contains("<body class=\"light\">"));
    send(&app, post("/theme", &cookie, "")).await;
    assert!(dashboard_page(&app, &cookie).await.contains("<body class=\"dark\">"));
}

#[tokio::test]
async fn test_logout_blocks_further_retrieval() {
    let source = MockEventSource::new(numbered_events(3));
    let app = build_router(app_state(Arc::clone(&source), identity()));
    let cookie = sign_in(&app).await;
    dashboard_page(&app, &cookie).await;

    let response = send(&app, post("/logout", &cookie, "")).await;
    assert_eq!(location(&response), "/login");

    let response = send(&app, post("/refresh", &cookie, "")).await;
    assert_eq!(location(&response), "/login");
    let response = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(location(&response), "/login");
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_expired_token_redirects_to_login() {
    let source = MockEventSource::new(numbered_events(3));
    let identity = MockIdentity {
        expires_in: Some(Duration::seconds(-1)),
    };
    let app = build_router(app_state(Arc::clone(&source), identity));
    let cookie = sign_in(&app).await;

    let response = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(source.calls(), 0);
}
