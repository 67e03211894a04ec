#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use model_admin::{memory_pool, ModelAdmin};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

const SCHEMA: &str = r#"
CREATE TABLE "user" (
    id INTEGER PRIMARY KEY NOT NULL,
    first_name VARCHAR,
    last_name VARCHAR,
    is_admin BOOLEAN NOT NULL DEFAULT 0
);
CREATE TABLE address (
    id INTEGER PRIMARY KEY NOT NULL,
    email_address VARCHAR NOT NULL,
    user_id INTEGER REFERENCES "user"(id)
);
INSERT INTO "user" (first_name, last_name, is_admin) VALUES
    ('hello', 'world', 1),
    ('goodbye', 'world', 0),
    ('another', 'person', 0);
INSERT INTO address (email_address, user_id) VALUES
    ('hello.world@mail.com', 1),
    ('gb@aol.com', 2),
    ('lol@gg.co', 3);
"#;

pub async fn seeded_pool() -> SqlitePool {
    let pool = memory_pool().await.unwrap();
    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    pool
}

pub async fn app(admin: ModelAdmin) -> Router {
    admin.router(seeded_pool().await).await.unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    form: Option<&str>,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    let body = match form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Send a body with an arbitrary content type.
pub async fn send_raw(app: &Router, method: Method, uri: &str, content_type: &str, body: &str) -> TestResponse {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None, &[]).await
}
