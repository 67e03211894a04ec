mod common;

use axum::http::{Method, StatusCode};
use common::{app, get, seeded_pool, send, send_raw};
use model_admin::service::LISTING_LIMIT;
use model_admin::{HeaderGuard, ModelAdmin, ModelRegistration, Operation};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};

fn user_and_address() -> ModelAdmin {
    ModelAdmin::new()
        .register_model(ModelRegistration::new("user"))
        .register_model(ModelRegistration::new("address"))
}

#[tokio::test]
async fn index_lists_models_with_and_without_trailing_slash() {
    let app = app(user_and_address()).await;
    for uri in ["/model-management/", "/model-management"] {
        let resp = get(&app, uri).await;
        assert_eq!(resp.status, StatusCode::OK, "{}", uri);
        assert!(resp.body.contains("/model-management/user/"));
        assert!(resp.body.contains("/model-management/address/"));
        assert!(resp.body.contains("data-admin=\"model_management\""));
    }
}

#[tokio::test]
async fn every_operation_view_shows_every_visible_column() {
    let app = app(user_and_address()).await;
    let tables = [
        ("user", vec!["id", "first_name", "last_name", "is_admin"]),
        ("address", vec!["id", "email_address", "user_id"]),
    ];
    for (table, columns) in tables {
        for op in Operation::ALL {
            let uri = format!("/model-management/{}/{}", table, op);
            let resp = get(&app, &uri).await;
            assert_eq!(resp.status, StatusCode::OK, "{}", uri);
            for col in &columns {
                assert!(resp.body.contains(col), "{} missing column {}", uri, col);
            }
        }
    }
}

#[tokio::test]
async fn listing_shows_rows_and_operation_links() {
    let app = app(user_and_address()).await;
    for uri in ["/model-management/user/", "/model-management/user"] {
        let resp = get(&app, uri).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.body.contains("hello"));
        assert!(resp.body.contains("another"));
        assert!(resp.body.contains("/model-management/user/update?filter_id=1"));
        assert!(resp.body.contains("True"));
    }
}

#[tokio::test]
async fn excluded_operations_are_not_routed() {
    let admin = ModelAdmin::new().register_model(
        ModelRegistration::new("user").exclude_operations([Operation::Create, Operation::Update]),
    );
    let app = app(admin).await;

    assert_eq!(get(&app, "/model-management/user/create").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/model-management/user/update").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/model-management/user/read").await.status, StatusCode::OK);
    assert_eq!(get(&app, "/model-management/user/delete").await.status, StatusCode::OK);

    let resp = send(&app, Method::POST, "/model-management/api/user", Some("insert_first_name=x"), &[]).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["success"], json!(false));

    let resp = get(&app, "/model-management/api/user").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn api_create_then_read() {
    let app = app(user_and_address()).await;
    let resp = send(
        &app,
        Method::POST,
        "/model-management/api/user",
        Some("insert_first_name=ann&insert_last_name=lee&insert_is_admin=True"),
        &[],
    )
    .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["message"], json!("entry created"));
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["id"], json!(4));

    let resp = get(&app, "/model-management/api/user?filter_first_name=ann").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json()["data"],
        json!([{"id": 4, "first_name": "ann", "last_name": "lee", "is_admin": true}])
    );
}

#[tokio::test]
async fn api_update_changes_only_filtered_rows() {
    let app = app(user_and_address()).await;
    let resp = send(
        &app,
        Method::PUT,
        "/model-management/api/user",
        Some("filter_id=1&insert_last_name=changed"),
        &[],
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["message"], json!("1 entry updated"));

    let rows = get(&app, "/model-management/api/user").await.json()["data"].clone();
    let last_names: Vec<_> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["last_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(last_names, vec!["changed", "world", "person"]);
}

#[tokio::test]
async fn api_delete_then_read_is_empty() {
    let app = app(user_and_address()).await;
    let resp = send(&app, Method::DELETE, "/model-management/api/address", Some("filter_user_id=2"), &[]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["message"], json!("1 entry deleted"));
    assert_eq!(resp.json()["data"][0]["email_address"], json!("gb@aol.com"));

    let resp = get(&app, "/model-management/api/address?filter_user_id=2").await;
    assert_eq!(resp.json()["data"], json!([]));
    assert_eq!(resp.json()["message"], json!("0 entries read"));
}

#[tokio::test]
async fn failed_statement_rolls_back_and_reports_operation() {
    let app = app(user_and_address()).await;
    // address rows still reference user 1
    let resp = send(&app, Method::DELETE, "/model-management/api/user", Some("filter_id=1"), &[]).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let body = resp.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["operation"], json!("delete"));
    assert_eq!(body["model"], json!("user"));

    let resp = get(&app, "/model-management/api/user?filter_id=1").await;
    assert_eq!(resp.json()["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn excluded_required_column_fails_create_validation() {
    let admin = ModelAdmin::new()
        .register_model(ModelRegistration::new("user"))
        .register_model(ModelRegistration::new("address").exclude_columns(["email_address"]));
    let app = app(admin).await;

    let resp = send(&app, Method::POST, "/model-management/api/address", Some("insert_user_id=1"), &[]).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = &resp.json()["errors"];
    assert!(!errors["insert_email_address"].as_array().unwrap().is_empty());

    let resp = get(&app, "/model-management/api/address").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["data"].as_array().unwrap().len(), 3);
    assert!(resp.json()["data"][0].get("email_address").is_none());
}

#[tokio::test]
async fn api_validation_errors_are_per_field() {
    let app = app(user_and_address()).await;
    let resp = send(
        &app,
        Method::POST,
        "/model-management/api/user",
        Some("insert_is_admin=perhaps"),
        &[],
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.json()["errors"]["insert_is_admin"], json!(["Not a valid choice."]));
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let app = app(user_and_address()).await;
    let resp = send(&app, Method::PATCH, "/model-management/api/user", None, &[]).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn guard_rejects_before_handlers() {
    let admin = ModelAdmin::new()
        .register_model(ModelRegistration::new("user").guard(HeaderGuard::new("x-admin-token", "s3cret")))
        .register_model(ModelRegistration::new("address"));
    let app = app(admin).await;

    assert_eq!(get(&app, "/model-management/user/").await.status, StatusCode::FORBIDDEN);
    assert_eq!(get(&app, "/model-management/user/read").await.status, StatusCode::FORBIDDEN);
    let resp = send(
        &app,
        Method::DELETE,
        "/model-management/api/user",
        Some("filter_id=3"),
        &[("x-admin-token", "wrong")],
    )
    .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = send(&app, Method::GET, "/model-management/user/", None, &[("x-admin-token", "s3cret")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(get(&app, "/model-management/address/").await.status, StatusCode::OK);
}

#[tokio::test]
async fn operational_routes() {
    let app = app(user_and_address()).await;
    let resp = get(&app, "/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"], json!("ok"));

    let resp = get(&app, "/ready").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["models"], json!(2));

    let resp = get(&app, "/version").await;
    assert_eq!(resp.json()["name"], json!("model-admin"));
}

#[tokio::test]
async fn custom_name_and_prefix() {
    let admin = user_and_address().name("admin").url_prefix("/admin");
    let app = app(admin).await;
    let resp = get(&app, "/admin/user/read").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("data-admin=\"admin\""));
    assert!(resp.body.contains("id=\"admin.user_read\""));
    assert_eq!(get(&app, "/model-management/").await.status, StatusCode::NOT_FOUND);

    let app = common::app(user_and_address().url_prefix("")).await;
    assert_eq!(get(&app, "/").await.status, StatusCode::OK);
    assert_eq!(get(&app, "/address").await.status, StatusCode::OK);
}

#[tokio::test]
async fn padded_strings_round_trip_verbatim() {
    let app = app(user_and_address()).await;
    let resp = send(
        &app,
        Method::POST,
        "/model-management/api/user",
        Some("insert_first_name=%20%20ann%20"),
        &[],
    )
    .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.json()["data"]["first_name"], json!("  ann "));

    let resp = get(&app, "/model-management/api/user?filter_first_name=%20%20ann%20").await;
    assert_eq!(resp.json()["data"].as_array().unwrap().len(), 1);
    let resp = get(&app, "/model-management/api/user?filter_first_name=ann").await;
    assert_eq!(resp.json()["data"], json!([]));
}

#[tokio::test]
async fn non_form_body_is_rejected_without_touching_rows() {
    let app = app(user_and_address()).await;
    let resp = send_raw(
        &app,
        Method::DELETE,
        "/model-management/api/address",
        "application/json",
        r#"{"filter_id":"3"}"#,
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(resp.json()["success"], json!(false));

    let resp = send_raw(&app, Method::PUT, "/model-management/api/user", "text/plain", "filter_id=1").await;
    assert_eq!(resp.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let rows = get(&app, "/model-management/api/address").await.json();
    assert_eq!(rows["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn row_links_encode_key_values() {
    let pool = seeded_pool().await;
    sqlx::raw_sql(
        "CREATE TABLE tag (code TEXT PRIMARY KEY NOT NULL, label TEXT);
         INSERT INTO tag (code, label) VALUES ('a&b', 'x'), ('a', 'y');",
    )
    .execute(&pool)
    .await
    .unwrap();
    let app = ModelAdmin::new()
        .register_model(ModelRegistration::new("tag"))
        .router(pool)
        .await
        .unwrap();

    let listing = get(&app, "/model-management/tag/").await;
    assert!(listing.body.contains("/model-management/tag/read?filter_code=a%26b"));

    let resp = get(&app, "/model-management/tag/read?filter_code=a%26b").await;
    assert!(resp.body.contains("<td>x</td>"));
    assert!(!resp.body.contains("<td>y</td>"));
}

#[tokio::test]
async fn listing_is_capped_at_listing_limit() {
    let pool = seeded_pool().await;
    sqlx::query(
        r#"INSERT INTO "user" (first_name, is_admin)
           WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 147)
           SELECT 'bulk' || i, 0 FROM n"#,
    )
    .execute(&pool)
    .await
    .unwrap();
    let app = user_and_address().router(pool).await.unwrap();

    let resp = get(&app, "/model-management/user/").await;
    assert_eq!(resp.status, StatusCode::OK);
    let shown = resp.body.matches("/model-management/user/read?filter_id=").count();
    assert_eq!(shown, LISTING_LIMIT as usize);
    assert!(resp.body.contains("<td>bulk97</td>"));
    assert!(!resp.body.contains("<td>bulk98</td>"));

    let all = get(&app, "/model-management/api/user").await.json();
    assert_eq!(all["data"].as_array().unwrap().len(), 150);
}

#[tokio::test]
async fn columns_follow_live_schema_changes() {
    let pool = seeded_pool().await;
    let app = user_and_address().router(pool.clone()).await.unwrap();
    assert!(!get(&app, "/model-management/address/create").await.body.contains("insert_note"));

    sqlx::query("ALTER TABLE address ADD COLUMN note TEXT")
        .execute(&pool)
        .await
        .unwrap();
    let resp = get(&app, "/model-management/address/create").await;
    assert!(resp.body.contains("insert_note"));
    let rows = get(&app, "/model-management/api/address").await.json();
    assert_eq!(rows["data"][0]["note"], json!(null));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn excluding_required_column_warns_at_registration() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let pool = seeded_pool().await;
    let state = ModelAdmin::new()
        .register_model(ModelRegistration::new("address").exclude_columns(["email_address", "user_id"]))
        .build(pool.clone())
        .await
        .unwrap();

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("WARN"));
    assert!(output.contains("email_address"));
    assert!(!output.contains("user_id"));

    let columns = state.registry.get("address").unwrap().columns(&pool).await.unwrap();
    let required: Vec<_> = columns.excluded_required.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(required, vec!["email_address"]);
}
