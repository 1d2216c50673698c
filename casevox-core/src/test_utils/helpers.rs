// File: casevox-core/src/test_utils/helpers.rs

use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, Pool, Postgres};

use crate::db::Database;
use crate::Error;

/// Create the test database if it does not exist yet.
pub async fn ensure_test_database_exists() -> Result<(), Error> {
    // Connect to the "postgres" database as an admin or superuser.
    let admin_url = std::env::var("DATABASE_ADMIN_URL")
        .unwrap_or_else(|_| "postgres://casevox@localhost/postgres".to_string());

    let mut conn = PgConnection::connect(&admin_url).await?;

    let test_db = "casevox_test";

    // `CREATE DATABASE IF NOT EXISTS` is non-standard; try and ignore the
    // duplicate_database error instead.
    let create_db_sql = format!("CREATE DATABASE {test_db};");
    if let Err(e) = sqlx::query(&create_db_sql).execute(&mut conn).await {
        let duplicate = e
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code == "42P04")
            .unwrap_or(false);
        if !duplicate {
            return Err(Error::Database(e));
        }
    }

    Ok(())
}

/// Create a connection pool to the test DB.
/// Looks for `TEST_DATABASE_URL` in env, else uses
/// `postgres://casevox@localhost/casevox_test`.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://casevox@localhost/casevox_test".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            complaints,
            complaint_engagement,
            actions_log
        RESTART IDENTITY CASCADE;
    "#,
    )
        .execute(pool)
        .await?;

    Ok(())
}

/// Returns a migrated, empty test DB handle.
pub async fn setup_test_database() -> Result<Database, Error> {
    ensure_test_database_exists().await?;

    let pool = create_test_db_pool().await?;
    let db = Database::from_pool(pool);
    db.migrate().await?;
    clean_database(db.pool()).await?;

    Ok(db)
}
