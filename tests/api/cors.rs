use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use wiremock::{matchers::any, Mock, ResponseTemplate};

use crate::helpers::{TestApp, ALLOWED_ORIGIN, OTHER_ALLOWED_ORIGIN, UNKNOWN_ORIGIN};

const ALLOW_ORIGIN: &str = "access-control-allow-origin";
const ALLOW_METHODS: &str = "access-control-allow-methods";
const ALLOW_HEADERS: &str = "access-control-allow-headers";

#[tokio::test]
async fn preflight_from_allowed_origins_echoes_the_origin() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&app.klaviyo_server)
        .await;

    for origin in [ALLOWED_ORIGIN, OTHER_ALLOWED_ORIGIN] {
        let res = app.request_subscribe(Method::OPTIONS, Some(origin)).await?;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[ALLOW_ORIGIN], origin);
        assert_eq!(res.headers()[ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(res.headers()[ALLOW_HEADERS], "Content-Type");
        assert!(res.text().await?.is_empty(), "Preflight body should be empty");
    }

    Ok(())
}

#[tokio::test]
async fn preflight_from_unknown_origin_has_no_allow_origin() -> Result<()> {
    let app = TestApp::spawn().await?;

    for origin in [Some(UNKNOWN_ORIGIN), None] {
        let res = app.request_subscribe(Method::OPTIONS, origin).await?;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(
            res.headers().get(ALLOW_ORIGIN).is_none(),
            "Allow-Origin must be absent for: {origin:?}"
        );
        assert_eq!(res.headers()[ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(res.headers()[ALLOW_HEADERS], "Content-Type");
    }

    Ok(())
}

#[tokio::test]
async fn post_from_unknown_origin_is_forwarded_without_allow_origin() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&app.klaviyo_server)
        .await;

    let res = app
        .http_client
        .post(app.url("/subscribe"))
        .header("Origin", UNKNOWN_ORIGIN)
        .json(&json!({ "email": "a@b.com" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert!(res.headers().get(ALLOW_ORIGIN).is_none());
    assert_eq!(res.headers()[ALLOW_METHODS], "POST, OPTIONS");

    Ok(())
}

#[tokio::test]
async fn unknown_origin_is_rejected_when_configured() -> Result<()> {
    let app =
        TestApp::spawn_with(|config| config.cors_config.reject_unknown_origins = true).await?;

    // Only the request from the allowed origin reaches Klaviyo.
    Mock::given(any())
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&app.klaviyo_server)
        .await;

    for method in [Method::OPTIONS, Method::POST] {
        let res = app
            .http_client
            .request(method.clone(), app.url("/subscribe"))
            .header("Origin", UNKNOWN_ORIGIN)
            .json(&json!({ "email": "a@b.com" }))
            .send()
            .await?;

        assert_eq!(
            res.status(),
            StatusCode::FORBIDDEN,
            "Wrong status for method: {method}"
        );
        assert!(res.headers().get(ALLOW_ORIGIN).is_none());
        let body: Value = res.json().await?;
        assert_eq!(body, json!({ "message": "Origin Not Allowed" }));
    }

    let res = app.post_subscribe(&json!({ "email": "a@b.com" })).await?;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert_eq!(res.headers()[ALLOW_ORIGIN], ALLOWED_ORIGIN);

    Ok(())
}

#[tokio::test]
async fn health_check_is_not_behind_cors() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .http_client
        .get(app.url("/health-check"))
        .header("Origin", ALLOWED_ORIGIN)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(ALLOW_METHODS).is_none());

    Ok(())
}
