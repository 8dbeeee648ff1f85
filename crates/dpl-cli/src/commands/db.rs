use anyhow::Result;
use dpl_config::PipelineConfig;
use sqlx::PgPool;

use crate::DbCmd;

pub async fn run(cmd: DbCmd, cfg: &PipelineConfig) -> Result<()> {
    let pool = dpl_db::connect_from_env(cfg.max_connections).await?;
    run_on(pool, cmd).await
}

/// Run `cmd` against `pool`, then close the pool whether or not `cmd` failed.
async fn run_on(pool: PgPool, cmd: DbCmd) -> Result<()> {
    let outcome = match cmd {
        DbCmd::Status => dpl_db::status(&pool).await.map(|s| {
            println!("db_ok={} has_candidates_table={}", s.ok, s.has_candidates_table);
        }),
        DbCmd::Migrate => dpl_db::migrate(&pool).await.map(|()| {
            println!("migrations_applied=true");
        }),
    };

    pool.close().await;
    Ok(outcome?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    #[tokio::test]
    async fn pool_is_closed_when_the_command_fails() {
        // Nothing listens on port 1.
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://dpl@127.0.0.1:1/dpl")
            .unwrap();
        let handle = pool.clone();

        let err = run_on(pool, DbCmd::Status).await.unwrap_err();

        assert!(err.to_string().contains("status connectivity query failed"));
        assert!(handle.is_closed());
    }
}
