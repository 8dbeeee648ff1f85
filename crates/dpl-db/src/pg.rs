use async_trait::async_trait;
use chrono::Utc;
use dpl_schemas::{
    DeploymentCandidate, NewCandidate, PipelineError, Result, Stage, TrackedService,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::store::CandidateStore;
use crate::{is_unique_constraint_violation, storage_err};

const UQ_CANDIDATE_VERSION: &str = "uq_candidate_service_version";

const ENSURE_VERSION_INDEX: &str = r#"
create unique index if not exists uq_candidate_service_version
  on deployment_candidates (service_name, version)
"#;

const CANDIDATE_COLUMNS: &str = "service_name, version, image, started_at_utc, \
     marathon_spec, marathon_version, unit, e2e, completed, succeeded, deployed";

/// Postgres-backed [`CandidateStore`].
///
/// Owns one connection pool for its whole lifetime; [`CandidateStore::close`]
/// shuts the pool down.
#[derive(Debug, Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
    catalog: String,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool, catalog: impl Into<String>) -> Self {
        Self {
            pool,
            catalog: catalog.into(),
        }
    }

    pub async fn connect_from_env(catalog: &str, max_connections: u32) -> Result<Self> {
        let pool = crate::connect_from_env(max_connections).await?;
        Ok(Self::new(pool, catalog))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Registry this store enumerates during selection.
    pub fn catalog(&self) -> &str {
        &self.catalog
    }
}

fn candidate_from_row(row: &PgRow) -> std::result::Result<DeploymentCandidate, sqlx::Error> {
    Ok(DeploymentCandidate {
        service_name: row.try_get("service_name")?,
        version: row.try_get("version")?,
        image: row.try_get("image")?,
        started_at_utc: row.try_get("started_at_utc")?,
        marathon_spec: row.try_get("marathon_spec")?,
        marathon_version: row.try_get("marathon_version")?,
        unit: row.try_get("unit")?,
        e2e: row.try_get("e2e")?,
        completed: row.try_get("completed")?,
        succeeded: row.try_get("succeeded")?,
        deployed: row.try_get("deployed")?,
    })
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn register_candidate(&self, new: &NewCandidate) -> Result<DeploymentCandidate> {
        sqlx::query(ENSURE_VERSION_INDEX)
            .execute(&self.pool)
            .await
            .map_err(storage_err("ensure version index"))?;

        let sql = format!(
            r#"
            insert into deployment_candidates (service_name, version, image, started_at_utc)
            values ($1, $2, $3, $4)
            returning {CANDIDATE_COLUMNS}
            "#
        );

        let res = sqlx::query(&sql)
            .bind(&new.service_name)
            .bind(&new.version)
            .bind(&new.image)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;

        match res {
            Ok(row) => {
                debug!(service = %new.service_name, version = %new.version, "candidate inserted");
                candidate_from_row(&row).map_err(storage_err("decode registered candidate"))
            }
            Err(e) if is_unique_constraint_violation(&e, UQ_CANDIDATE_VERSION) => Err(
                PipelineError::duplicate_version(&new.service_name, &new.version),
            ),
            Err(e) => Err(storage_err("register_candidate")(e)),
        }
    }

    async fn find_candidate(&self, service: &str, version: &str) -> Result<DeploymentCandidate> {
        let sql = format!(
            "select {CANDIDATE_COLUMNS} from deployment_candidates \
             where service_name = $1 and version = $2"
        );

        let row = sqlx::query(&sql)
            .bind(service)
            .bind(version)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err("find_candidate"))?
            .ok_or_else(|| PipelineError::not_found(service, version))?;

        candidate_from_row(&row).map_err(storage_err("decode candidate"))
    }

    async fn set_stage(&self, service: &str, version: &str, stage: Stage) -> Result<()> {
        // Column name comes from the Stage enum, never from caller text.
        let sql = format!(
            "update deployment_candidates set {} = true \
             where service_name = $1 and version = $2",
            stage.column()
        );

        let res = sqlx::query(&sql)
            .bind(service)
            .bind(version)
            .execute(&self.pool)
            .await
            .map_err(storage_err("set_stage"))?;

        if res.rows_affected() == 0 {
            return Err(PipelineError::not_found(service, version));
        }
        debug!(service, version, stage = %stage, "stage flag set");
        Ok(())
    }

    async fn assign_spec(&self, service: &str, version: &str, content: &str) -> Result<()> {
        let res = sqlx::query(
            r#"
            update deployment_candidates
            set marathon_spec = $3
            where service_name = $1 and version = $2
            "#,
        )
        .bind(service)
        .bind(version)
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(storage_err("assign_spec"))?;

        if res.rows_affected() == 0 {
            return Err(PipelineError::not_found(service, version));
        }
        debug!(service, version, bytes = content.len(), "descriptor assigned");
        Ok(())
    }

    async fn tracked_services(&self) -> Result<Vec<TrackedService>> {
        let rows = sqlx::query(
            r#"
            select name, description
            from tracked_services
            where catalog = $1
            order by seq asc
            "#,
        )
        .bind(&self.catalog)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err("tracked_services"))?;

        rows.iter()
            .map(|row| {
                Ok(TrackedService {
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(storage_err("decode tracked service"))
    }

    async fn eligible_for_e2e(&self, service: &str) -> Result<Vec<DeploymentCandidate>> {
        let sql = format!(
            "select {CANDIDATE_COLUMNS} from deployment_candidates \
             where service_name = $1 and unit = true and marathon_spec <> '' \
             order by started_at_utc asc, seq asc"
        );

        let rows = sqlx::query(&sql)
            .bind(service)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err("eligible_for_e2e"))?;

        rows.iter()
            .map(candidate_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(storage_err("decode candidate"))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
