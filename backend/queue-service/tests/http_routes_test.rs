/// HTTP surface tests: identity, status mapping, and response shapes
use actix_middleware::{IdentityMiddleware, IdentityPolicy};
use actix_web::{
    http::{header::HeaderValue, StatusCode},
    test, web, App,
};
use queue_service::{
    config::Config,
    routes,
    services::DiscussionService,
    state::AppState,
    websocket::{event_channel, ConnectionRegistry},
};
use serde_json::{json, Value};
use std::sync::Arc;

fn test_state() -> AppState {
    let config = Config::from_lookup(|_| None).expect("default config");
    let (publisher, _events) = event_channel();

    AppState {
        discussion: Arc::new(DiscussionService::new(config.root_topic.clone(), publisher)),
        registry: ConnectionRegistry::new(config.ws.buffer_capacity),
        config: Arc::new(config),
    }
}

macro_rules! init_app {
    () => {{
        let policy = Arc::new(IdentityPolicy::new("eboard", ["chair"]));
        test::init_service(
            App::new().app_data(web::Data::new(test_state())).service(
                web::scope("/api")
                    .wrap(IdentityMiddleware::new(policy))
                    .configure(routes::configure),
            ),
        )
        .await
    }};
}

fn as_alice(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("X-Auth-User", "alice"))
        .insert_header(("X-Auth-Name", "Alice Smith"))
        .insert_header(("X-Auth-Groups", "members"))
}

fn as_bob(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("X-Auth-User", "bob"))
        .insert_header(("X-Auth-Name", "Bob Jones"))
}

fn as_eboard(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("X-Auth-User", "treasurer"))
        .insert_header(("X-Auth-Name", "Tess Treasurer"))
        .insert_header(("X-Auth-Groups", "members,eboard"))
}

#[actix_rt::test]
async fn test_missing_identity_is_rejected() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/discussion").to_request();
    let err = test::try_call_service(&app, req)
        .await
        .expect_err("anonymous request must fail");

    assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_me_reports_privilege() {
    let app = init_app!();

    let req = as_eboard(test::TestRequest::get().uri("/api/me")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({"name": "Tess Treasurer", "username": "treasurer", "isEboard": true})
    );

    // allow-listed handle without the group
    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header(("X-Auth-User", "chair"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isEboard"], json!(true));
    assert_eq!(body["name"], json!("chair"));
}

#[actix_rt::test]
async fn test_utf8_display_name_reaches_entry() {
    let app = init_app!();

    let name = HeaderValue::from_bytes("José Núñez".as_bytes()).unwrap();
    let req = test::TestRequest::post()
        .uri("/api/queue/0/point")
        .insert_header(("X-Auth-User", "jose"))
        .insert_header(("X-Auth-Name", name))
        .to_request();
    let entry: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(entry["name"], json!("José Núñez"));
    assert_eq!(entry["username"], json!("jose"));
}

#[actix_rt::test]
async fn test_discussion_is_wrapped_in_queue() {
    let app = init_app!();

    let req = as_alice(test::TestRequest::get().uri("/api/discussion")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({"queue": {
            "id": 0,
            "topic": "Big long discussion",
            "points": [],
            "clarifiers": [],
            "children": []
        }})
    );
}

#[actix_rt::test]
async fn test_entry_lifecycle_over_http() {
    let app = init_app!();

    let req = as_eboard(test::TestRequest::post().uri("/api/queue/0/new-child"))
        .set_json(json!({"topic": "Side topic", "move-users": true}))
        .to_request();
    let child: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(child["id"], json!(1));
    assert_eq!(child["topic"], json!("Side topic"));

    let req = as_alice(test::TestRequest::post().uri("/api/queue/1/point")).to_request();
    let point: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        point,
        json!({"id": 1, "name": "Alice Smith", "username": "alice", "type": "point"})
    );

    let req = as_bob(test::TestRequest::post().uri("/api/queue/1/clarifier")).to_request();
    let clarifier: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(clarifier["id"], json!(2));
    assert_eq!(clarifier["type"], json!("clarifier"));

    // bob cannot remove alice's point
    let req = as_bob(test::TestRequest::delete().uri("/api/queue/1/point/1")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = as_eboard(test::TestRequest::delete().uri("/api/queue/1/point/1")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = as_eboard(test::TestRequest::delete().uri("/api/queue/1/point/1")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = as_alice(test::TestRequest::get().uri("/api/queue/1")).to_request();
    let queue: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(queue["points"], json!([]));
    assert_eq!(queue["clarifiers"][0]["username"], json!("bob"));
}

#[actix_rt::test]
async fn test_path_and_topic_change() {
    let app = init_app!();

    for (parent, topic) in [(0, "C1"), (1, "C2")] {
        let req = as_eboard(
            test::TestRequest::post().uri(&format!("/api/queue/{parent}/new-child")),
        )
        .set_json(json!({"topic": topic}))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = as_alice(test::TestRequest::patch().uri("/api/queue/2"))
        .set_json(json!({"newTopic": "Nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = as_eboard(test::TestRequest::patch().uri("/api/queue/2"))
        .set_json(json!({"new-topic": "Renamed"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = as_alice(test::TestRequest::get().uri("/api/queue/2/path")).to_request();
    let path: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        path,
        json!([
            {"topic": "Big long discussion", "id": 0},
            {"topic": "C1", "id": 1},
            {"topic": "Renamed", "id": 2}
        ])
    );
}

#[actix_rt::test]
async fn test_bad_ids_and_unknown_queues() {
    let app = init_app!();

    let req = as_alice(test::TestRequest::post().uri("/api/queue/abc/point")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = as_alice(test::TestRequest::delete().uri("/api/queue/0/point/xyz")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = as_alice(test::TestRequest::post().uri("/api/queue/42/point")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], json!("NOT_FOUND"));

    let req = as_alice(test::TestRequest::get().uri("/api/queue/42/path")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_non_eboard_cannot_create_queues() {
    let app = init_app!();

    let req = as_alice(test::TestRequest::post().uri("/api/queue/0/new-child"))
        .set_json(json!({"topic": "Mine"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = as_alice(test::TestRequest::get().uri("/api/discussion")).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["queue"]["children"], json!([]));
}

#[actix_rt::test]
async fn test_malformed_body_is_bad_request() {
    let app = init_app!();

    let req = as_eboard(test::TestRequest::post().uri("/api/queue/0/new-child"))
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
