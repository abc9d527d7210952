use actix_middleware::{Identity, IdentityMiddleware, IdentityPolicy, Logging};
use actix_web::{http::StatusCode, test, web, App, HttpResponse};
use std::sync::Arc;

async fn whoami(user: Identity) -> HttpResponse {
    HttpResponse::Ok().json(user)
}

/// Handler that reads the identity without the middleware in front of it
async fn unguarded(user: Identity) -> HttpResponse {
    HttpResponse::Ok().body(user.handle)
}

fn policy() -> Arc<IdentityPolicy> {
    Arc::new(IdentityPolicy::new("eboard", ["chair"]))
}

#[actix_rt::test]
async fn test_forwarded_identity_reaches_handler() {
    let app = test::init_service(
        App::new().wrap(Logging).service(
            web::scope("/api")
                .wrap(IdentityMiddleware::new(policy()))
                .route("/me", web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("X-Auth-User", "jdoe"))
        .insert_header(("X-Auth-Name", "Jane Doe"))
        .insert_header(("X-Auth-Groups", "members, eboard"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        serde_json::json!({"name": "Jane Doe", "username": "jdoe", "isEboard": true})
    );
}

#[actix_rt::test]
async fn test_missing_identity_gets_json_401() {
    let app = test::init_service(
        App::new().wrap(Logging).service(
            web::scope("/api")
                .wrap(IdentityMiddleware::new(policy()))
                .route("/me", web::get().to(whoami)),
        ),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let err = test::try_call_service(&app, req)
        .await
        .expect_err("request without identity must be rejected");
    let resp = err.error_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "IDENTITY_MISSING");
    assert_eq!(body["status"], 401);
}

#[actix_rt::test]
async fn test_routes_outside_scope_stay_public() {
    let app = test::init_service(
        App::new()
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/api")
                    .wrap(IdentityMiddleware::new(policy()))
                    .route("/me", web::get().to(whoami)),
            ),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_extractor_without_middleware_is_unauthorized() {
    let app = test::init_service(App::new().route("/raw", web::get().to(unguarded))).await;

    let req = test::TestRequest::get()
        .uri("/raw")
        .insert_header(("X-Auth-User", "jdoe"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
