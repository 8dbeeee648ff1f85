//! Candidate persistence for the deployment pipeline.
//!
//! [`CandidateStore`] is the storage contract; [`PgCandidateStore`] is the
//! Postgres implementation. The free functions here are operator-facing
//! plumbing (connect, migrate, status, registry upkeep) that sit outside the
//! pipeline core.

mod pg;
pub mod selection;
pub mod store;

pub use pg::PgCandidateStore;
pub use selection::select_for_e2e;
pub use store::CandidateStore;

use dpl_schemas::{PipelineError, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub const ENV_DB_URL: &str = "DPL_DATABASE_URL";

/// Connect to Postgres using DPL_DATABASE_URL.
pub async fn connect_from_env(max_connections: u32) -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL)
        .map_err(|_| PipelineError::Storage(format!("missing env var {ENV_DB_URL}")))?;
    connect(&url, max_connections).await
}

pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(storage_err("connect to Postgres"))
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| PipelineError::Storage(format!("db migrate failed: {e}")))
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_candidates_table: bool,
}

/// Connectivity + schema presence.
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .map_err(storage_err("status connectivity query"))?;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema = 'public' and table_name = 'deployment_candidates'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .map_err(storage_err("status table-exists query"))?;

    Ok(DbStatus {
        ok: one == 1,
        has_candidates_table: exists,
    })
}

/// Add a service to a catalog's registry, or refresh its description.
/// A service that is already tracked keeps its position in the listing.
pub async fn track_service(
    pool: &PgPool,
    catalog: &str,
    name: &str,
    description: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        insert into tracked_services (catalog, name, description)
        values ($1, $2, $3)
        on conflict (catalog, name) do update
          set description = excluded.description
        "#,
    )
    .bind(catalog)
    .bind(name)
    .bind(description)
    .execute(pool)
    .await
    .map_err(storage_err("track_service"))?;
    Ok(())
}

pub(crate) fn storage_err(op: &'static str) -> impl FnOnce(sqlx::Error) -> PipelineError {
    move |e| PipelineError::Storage(format!("{op} failed: {e}"))
}

/// Detect a Postgres unique constraint violation by name.
pub(crate) fn is_unique_constraint_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.constraint() == Some(constraint)
                || (db_err.code().as_deref() == Some("23505")
                    && db_err.message().contains(constraint))
        }
        _ => false,
    }
}
