//! Requires DPL_DATABASE_URL; ignored by default.

#[tokio::test]
#[ignore = "requires DPL_DATABASE_URL"]
async fn migrate_twice_then_status_reports_schema() -> anyhow::Result<()> {
    let pool = dpl_db::connect_from_env(1).await?;
    dpl_db::migrate(&pool).await?;
    dpl_db::migrate(&pool).await?;

    let st = dpl_db::status(&pool).await?;
    assert!(st.ok);
    assert!(st.has_candidates_table);
    Ok(())
}

#[tokio::test]
async fn connect_without_url_is_a_storage_error() {
    if std::env::var(dpl_db::ENV_DB_URL).is_ok() {
        eprintln!("SKIP: {} is set", dpl_db::ENV_DB_URL);
        return;
    }
    let err = dpl_db::connect_from_env(1).await.unwrap_err();
    assert!(err.to_string().contains(dpl_db::ENV_DB_URL));
}
