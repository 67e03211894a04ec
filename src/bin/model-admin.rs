//! Server: connects to SQLite, builds the admin from a config file (or the demo
//! schema) and serves it.

use model_admin::{connect, load_from_path, AdminConfig, ModelAdmin, ModelRegistration, Operation};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEMO_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "user" (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    first_name VARCHAR,
    last_name VARCHAR,
    is_admin BOOLEAN NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS address (
    id INTEGER PRIMARY KEY NOT NULL,
    email_address VARCHAR NOT NULL,
    user_id INTEGER REFERENCES "user"(id)
);
"#;

const DEMO_USERS: [(&str, &str, bool, &str); 3] = [
    ("hello", "world", true, "hello.world@mail.com"),
    ("goodbye", "world", false, "gb@aol.com"),
    ("another", "person", false, "lol@gg.co"),
];

async fn seed_demo(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(DEMO_SCHEMA).execute(pool).await?;
    let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM "user""#)
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }
    let mut tx = pool.begin().await?;
    for (first, last, is_admin, email) in DEMO_USERS {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO "user" (first_name, last_name, is_admin) VALUES (?, ?, ?) RETURNING id"#,
        )
        .bind(first)
        .bind(last)
        .bind(is_admin)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO address (email_address, user_id) VALUES (?, ?)")
            .bind(email)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    tracing::info!(users = DEMO_USERS.len(), "seeded demo data");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("model_admin=info".parse()?))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://model-admin.db".into());
    let pool = connect(&database_url).await?;

    let demo = std::env::var("MODEL_ADMIN_DEMO").is_ok_and(|v| v == "1");
    if demo {
        seed_demo(&pool).await?;
    }

    let admin = match std::env::var("CONFIG_PATH") {
        Ok(path) => {
            let config = load_from_path(&path).await?.apply_env_overrides();
            tracing::info!(path = %path, models = config.models.len(), "loaded config");
            ModelAdmin::from_config(&config)?
        }
        Err(_) => {
            let config = AdminConfig::default().apply_env_overrides();
            let mut admin = ModelAdmin::from_config(&config)?;
            if demo {
                admin = admin
                    .register_model(
                        ModelRegistration::new("user")
                            .exclude_operations([Operation::Create, Operation::Update]),
                    )
                    .register_model(ModelRegistration::new("address").exclude_columns(["email_address"]));
            }
            admin
        }
    };

    let app = admin.router(pool).await?;

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
