use actix_web::http::StatusCode;
use actix_web::test;
use integration_tests::{
    create_post, create_subreddit, login, seed_admin, send, signup, spawn_app, test_env,
};
use serde_json::json;

#[actix_web::test]
async fn creator_comes_from_the_token() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/post")
        .insert_header(bob.auth())
        .set_json(json!({
            "title": "Borrowck",
            "content": "Why does it hate me",
            "type": "text",
            "subreddit": sub,
            "creator": alice.id,
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["creator"], bob.id);
    assert_eq!(body["subreddit"], sub);
    assert_eq!(body["type"], "text");
}

#[actix_web::test]
async fn anonymous_cannot_post() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/post")
        .set_json(json!({ "title": "Anonymous", "content": "Who am I", "subreddit": sub }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication credentials were not provided.");

    let req = test::TestRequest::get().uri("/api/post").to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["count"], 0);
}

#[actix_web::test]
async fn unknown_subreddit_is_a_bad_request() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/post")
        .insert_header(alice.auth())
        .set_json(json!({ "title": "Hi", "content": "there", "subreddit": 42 }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "subreddit: Invalid pk \"42\" - object does not exist.");

    let req = test::TestRequest::post()
        .uri("/api/post")
        .insert_header(alice.auth())
        .set_json(json!({ "title": "Hi", "content": "there" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "subreddit: This field is required.");
}

#[actix_web::test]
async fn list_filters_by_subreddit_and_searches() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let rust = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();
    let go = create_subreddit(&app, &alice, "golang").await["id"].as_i64().unwrap();
    create_post(&app, &alice, rust, "Lifetimes").await;
    create_post(&app, &alice, rust, "Traits").await;
    create_post(&app, &alice, go, "Goroutines").await;

    let req = test::TestRequest::get().uri(&format!("/api/post?subreddit={rust}&ordering=title")).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["title"], "Lifetimes");
    assert_eq!(body["results"][1]["title"], "Traits");

    let req = test::TestRequest::get().uri("/api/post?search=goroutines").to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["subreddit"], go);

    let req = test::TestRequest::get().uri("/api/post?subreddit=abc").to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn owner_updates_and_others_are_forbidden() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();
    let id = create_post(&app, &alice, sub, "Draft").await["id"].as_i64().unwrap();
    let uri = format!("/api/post/{id}");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bob.auth())
        .set_json(json!({ "title": "Mine now" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(alice.auth())
        .set_json(json!({ "title": "Final" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Final");
    assert_eq!(body["content"], "Draft content");

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(alice.auth())
        .set_json(json!({ "title": "Only title" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "content: This field is required.");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(alice.auth())
        .set_json(json!({ "type": "link" }))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["type"], "link");
    assert_eq!(body["title"], "Final");

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(alice.auth())
        .set_json(json!({ "title": "Final", "content": "Rewritten" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Rewritten");
    assert!(body["type"].is_null());

    let req = test::TestRequest::put().uri(&uri).set_json(json!({ "title": "t", "content": "c" })).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_may_moderate_any_post() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    seed_admin(&env, "root").await;
    let admin = login(&app, "root").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();
    let id = create_post(&app, &alice, sub, "Spam").await["id"].as_i64().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/post/{id}"))
        .insert_header(admin.auth())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&format!("/api/post/{id}")).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
