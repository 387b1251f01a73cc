//! End-to-end flows against a live MongoDB.
//!
//! Run with: cargo test -- --ignored
//! MONGODB_URI overrides the default localhost instance. Each test uses a
//! throwaway database that is dropped at the end.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mongodb::bson::doc;
use std::sync::Arc;
use tower::ServiceExt;

use busline::db::collections;
use busline::MongoDb;
use busline_server::config::Config;
use busline_server::routes::build_router;
use busline_server::state::AppState;

fn mongo_uri() -> String {
    std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

fn test_config(db_name: &str) -> Config {
    Config {
        database_url: mongo_uri(),
        database_name: db_name.to_string(),
        ..Config::default()
    }
}

fn unique_db_name(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Extract the session cookie's name=value pair from a login response
fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn test_register_login_session_logout_flow() {
    let db_name = unique_db_name("busline_auth_test");
    let app = build_router(Arc::new(AppState::new(test_config(&db_name))));

    // Fresh username registers cleanly.
    let response = app
        .clone()
        .oneshot(post_json(
            "/register",
            r#"{"username": "ada", "password": "difference-engine"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Second registration with the same username conflicts.
    let response = app
        .clone()
        .oneshot(post_json(
            "/register",
            r#"{"username": "ada", "password": "other-password"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Username already exists");

    // The stored document holds a hash, never the plaintext.
    let db = MongoDb::connect(&mongo_uri(), &db_name).await.unwrap();
    let user = db
        .collection::<mongodb::bson::Document>(collections::USERS)
        .find_one(doc! { "username": "ada" }, None)
        .await
        .unwrap()
        .expect("user should be stored");
    let stored_hash = user.get_str("password_hash").unwrap();
    assert_ne!(stored_hash, "difference-engine");
    assert!(!stored_hash.contains("difference-engine"));

    // Wrong password and unknown username fail with the identical message.
    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            r#"{"username": "ada", "password": "wrong"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let wrong_password_body = body_json(response).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            r#"{"username": "nobody", "password": "difference-engine"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let unknown_user_body = body_json(response).await;

    assert_eq!(wrong_password_body, unknown_user_body);
    assert_eq!(wrong_password_body["error"], "Invalid username or password");

    // Correct credentials establish a session.
    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            r#"{"username": "ada", "password": "difference-engine"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);

    // The session resolves to the logged-in user.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/session")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["username"], "ada");

    // Logout destroys the session.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/session")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    db.db().drop(None).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running MongoDB instance"]
async fn test_catalog_endpoints_pass_documents_through() {
    let db_name = unique_db_name("busline_catalog_test");
    let app = build_router(Arc::new(AppState::new(test_config(&db_name))));

    let db = MongoDb::connect(&mongo_uri(), &db_name).await.unwrap();
    db.collection::<mongodb::bson::Document>(collections::CITIES)
        .insert_one(doc! { "name": "Hamburg", "zone": 1 }, None)
        .await
        .unwrap();
    db.collection::<mongodb::bson::Document>(collections::ROUTES)
        .insert_one(
            doc! { "line": "M5", "stops": ["Hauptbahnhof", "Dammtor"] },
            None,
        )
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first_read = body_json(response).await;
    let cities = first_read.as_array().unwrap();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0]["name"], "Hamburg");
    assert_eq!(cities[0]["zone"], 1);

    // A second read with no intervening writes returns identical results.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/cities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await, first_read);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/routes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let routes = body_json(response).await;
    let routes = routes.as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["line"], "M5");

    db.db().drop(None).await.unwrap();
}
