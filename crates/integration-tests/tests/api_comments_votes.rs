use actix_web::http::StatusCode;
use actix_web::test;
use integration_tests::{create_post, create_subreddit, send, signup, spawn_app, test_env};
use serde_json::json;

#[actix_web::test]
async fn comment_lifecycle() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();
    let post = create_post(&app, &alice, sub, "Lifetimes").await["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/comment")
        .insert_header(bob.auth())
        .set_json(json!({ "content": "Great post", "post": post, "owner": alice.id }))
        .to_request();
    let (status, comment) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["owner"], bob.id);
    assert_eq!(comment["post"], post);
    let uri = format!("/api/comment/{}", comment["id"]);

    let req = test::TestRequest::get().uri(&format!("/api/comment?post={post}")).to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["count"], 1);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(alice.auth())
        .set_json(json!({ "content": "Edited by someone else" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch().uri(&uri).insert_header(bob.auth()).set_json(json!({})).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Great post");

    let req = test::TestRequest::put().uri(&uri).insert_header(bob.auth()).set_json(json!({})).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "content: This field is required.");

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bob.auth())
        .set_json(json!({ "content": "Really great post" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Really great post");

    let req = test::TestRequest::delete().uri(&uri).insert_header(bob.auth()).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn comment_on_missing_post_is_rejected() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/comment")
        .insert_header(alice.auth())
        .set_json(json!({ "content": "Hello?", "post": 77 }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "post: Invalid pk \"77\" - object does not exist.");
}

#[actix_web::test]
async fn one_post_vote_per_user() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let bob = signup(&app, "bob").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();
    let post = create_post(&app, &alice, sub, "Lifetimes").await["id"].as_i64().unwrap();
    let uri = format!("/api/post/{post}/vote");

    let req = test::TestRequest::post().uri(&uri).set_json(json!({ "vote": true })).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post().uri(&uri).insert_header(bob.auth()).set_json(json!({ "vote": true })).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"], bob.id);
    assert_eq!(body["vote"], true);

    let req = test::TestRequest::post().uri(&uri).insert_header(bob.auth()).set_json(json!({ "vote": false })).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You have already voted on this post");

    let req = test::TestRequest::post().uri(&uri).insert_header(alice.auth()).set_json(json!({ "vote": false })).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let req = test::TestRequest::delete().uri(&uri).insert_header(bob.auth()).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete().uri(&uri).insert_header(bob.auth()).to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::post().uri(&uri).insert_header(bob.auth()).set_json(json!({})).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "vote: This field is required.");
}

#[actix_web::test]
async fn one_comment_vote_per_user() {
    let env = test_env().await;
    let app = spawn_app(&env).await;
    let alice = signup(&app, "alice").await;
    let sub = create_subreddit(&app, &alice, "rust").await["id"].as_i64().unwrap();
    let post = create_post(&app, &alice, sub, "Lifetimes").await["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/comment")
        .insert_header(alice.auth())
        .set_json(json!({ "content": "First", "post": post }))
        .to_request();
    let (_, comment) = send(&app, req).await;
    let uri = format!("/api/comment/{}/vote", comment["id"]);

    let req = test::TestRequest::post().uri(&uri).insert_header(alice.auth()).set_json(json!({ "vote": true })).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"], comment["id"]);

    let req = test::TestRequest::post().uri(&uri).insert_header(alice.auth()).set_json(json!({ "vote": true })).to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You have already voted on this comment");

    let req = test::TestRequest::post()
        .uri("/api/comment/9999/vote")
        .insert_header(alice.auth())
        .set_json(json!({ "vote": true }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
