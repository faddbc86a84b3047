use actix_web::http::StatusCode;
use actix_web::test;
use integration_tests::{create_subreddit, send, signup, spawn_app, test_env, TestUser};
use serde_json::{json, Value};

async fn add_rule<S>(app: &S, user: &TestUser, subreddit: i64, text: &str, order: i64) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let req = test::TestRequest::post()
        .uri("/api/rules")
        .insert_header(user.auth())
        .set_json(json!({ "subreddit": subreddit, "rule": text, "order": order, "creator": 0 }))
        .to_request();
    send(app, req).await
}

#[actix_web::test]
async fn rules_list_in_order() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();

    let (status, body) = add_rule(&app, &alice, sub, "No spam", 2).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["creator"], alice.id);
    assert_eq!(body["order"], 2);
    add_rule(&app, &alice, sub, "Be kind", 1).await;

    let req = test::TestRequest::get().uri(&format!("/api/rules?subreddit={sub}")).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let rules: Vec<&str> =
        body["results"].as_array().unwrap().iter().map(|r| r["rule"].as_str().unwrap()).collect();
    assert_eq!(rules, vec!["Be kind", "No spam"]);

    let req = test::TestRequest::get().uri("/api/rules?ordering=-order").to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["results"][0]["rule"], "No spam");

    let req = test::TestRequest::get().uri("/api/rules?search=2").to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["rule"], "No spam");
}

#[actix_web::test]
async fn anonymous_cannot_add_rules() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/rules")
        .set_json(json!({ "subreddit": sub, "rule": "Be kind", "order": 1 }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication credentials were not provided.");

    let req = test::TestRequest::get().uri("/api/rules").to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["count"], 0);
}

#[actix_web::test]
async fn rule_fields_are_validated() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();

    let (status, body) = add_rule(&app, &alice, sub, "", 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "rule: This field is required.");

    let req = test::TestRequest::post()
        .uri("/api/rules")
        .insert_header(alice.auth())
        .set_json(json!({ "subreddit": sub, "order": 1 }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "rule: This field is required.");

    let (status, body) = add_rule(&app, &alice, sub, &"x".repeat(500), 1).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rule"].as_str().unwrap().len(), 500);

    let (status, body) = add_rule(&app, &alice, 404, "Be kind", 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "subreddit: Invalid pk \"404\" - object does not exist.");

    let req = test::TestRequest::post()
        .uri("/api/rules")
        .insert_header(alice.auth())
        .set_json(json!({ "subreddit": sub, "rule": "Be kind" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "order: This field is required.");
}

#[actix_web::test]
async fn only_creator_edits_rules() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();
    let (_, rule) = add_rule(&app, &alice, sub, "Be kind", 1).await;
    let uri = format!("/api/rules/{}", rule["id"]);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bob.auth())
        .set_json(json!({ "rule": "Be mean" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(alice.auth())
        .set_json(json!({ "order": 5 }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rule"], "Be kind");
    assert_eq!(body["order"], 5);

    let req = test::TestRequest::delete().uri(&uri).insert_header(alice.auth()).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
