use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use restaurant_ordering_api::{
    cart_store::CartStore,
    db::{create_orm_conn, run_migrations},
    dto::auth::RegisterRequest,
    middleware::auth::AuthUser,
    notify::Mailer,
    services::auth_service,
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

static DB_LOCK: Mutex<()> = Mutex::new(());

/// Tests in one binary share the database and truncate it, so they take turns.
pub fn serial() -> MutexGuard<'static, ()> {
    DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, menu_items, categories, restaurants, users CASCADE",
    ))
    .await?;

    Ok(AppState {
        orm,
        carts: Arc::new(CartStore::new(Duration::from_secs(600))),
        mailer: Mailer::disabled(),
    })
}

/// Register through the service and return a signed-in view of the new user.
pub async fn register(state: &AppState, name: &str, email: &str, role: &str) -> anyhow::Result<AuthUser> {
    let resp = auth_service::register_user(
        state,
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            phone: "555-0100".into(),
            address: "1 Test Street".into(),
            password: "secret123".into(),
            role: Some(role.into()),
        },
    )
    .await?;
    let user = resp.data.expect("registered user");

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
        session_id: Uuid::new_v4(),
    })
}
