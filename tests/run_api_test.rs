// ==========================================
// RunApi 集成测试
// ==========================================
// 测试目标: 文件输入 → 计算 → 整体替换写回 → 只读查询
// ==========================================


use std::sync::Arc;

use chrono::Local;
use smartstock::api::{ApiError, RunApi};
use smartstock::config::{config_keys, ConfigManager, EngineConfig};
use smartstock::repository::RunOutputRepositoryImpl;
use test_helpers::*;

fn create_api(db_path: &str) -> (Arc<ConfigManager>, RunApi<ConfigManager, RunOutputRepositoryImpl>) {
    let config = Arc::new(ConfigManager::new(db_path).unwrap());
    let repo = Arc::new(RunOutputRepositoryImpl::new(db_path).unwrap());
    (config.clone(), RunApi::new(config, repo))
}

fn today_inputs() -> InputFiles {
    write_inputs(&sample_inventory(Local::now().date_naive()), &sample_distances())
}

#[tokio::test]
async fn test_run_files_persists_whole_output() {
    let (_db, db_path) = create_test_db();
    let (_config, api) = create_api(&db_path);
    let inputs = today_inputs();

    let response = api
        .run_files(&inputs.inventory, &inputs.distances, None)
        .await
        .unwrap();

    assert_eq!(response.batch_count, 12);
    assert_eq!(response.batch_count, response.batches.len());
    assert_eq!(api.list_inventory().await.unwrap(), response.batches);
    assert_eq!(api.list_transfers().await.unwrap(), response.transfers);
    assert_eq!(api.latest_run_id().await.unwrap(), Some(response.run_id.clone()));
}

#[tokio::test]
async fn test_second_run_replaces_first() {
    let (_db, db_path) = create_test_db();
    let (_config, api) = create_api(&db_path);
    let inputs = today_inputs();
    let first = api
        .run_files(&inputs.inventory, &inputs.distances, None)
        .await
        .unwrap();

    let small = write_inputs(
        &inventory_csv(&[inventory_line(
            "S9",
            "P9",
            10,
            Local::now().date_naive(),
            5,
            1.0,
            2.0,
        )]),
        &distance_csv(&[]),
    );
    let second = api
        .run_files(&small.inventory, &small.distances, None)
        .await
        .unwrap();

    let stored = api.list_inventory().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].run_id, second.run_id);
    assert!(api.list_transfers().await.unwrap().is_empty());

    let runs = api.list_runs(10).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().any(|r| r.run_id == first.run_id));
}

#[tokio::test]
async fn test_failed_run_keeps_previous_output() {
    let (_db, db_path) = create_test_db();
    let (_config, api) = create_api(&db_path);
    let inputs = today_inputs();
    let first = api
        .run_files(&inputs.inventory, &inputs.distances, None)
        .await
        .unwrap();

    let broken = write_inputs(
        "store_id,product_id,stock,expiry_date,avg_daily_sales,unit_price\nS1,P1,1,2026-01-01,1,1\n",
        &sample_distances(),
    );
    let err = api
        .run_files(&broken.inventory, &broken.distances, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "SCHEMA_ERROR");
    assert!(matches!(&err, ApiError::SchemaError { missing, .. } if missing == &vec!["shelf_life_days".to_string()]));
    assert_eq!(api.list_inventory().await.unwrap().len(), first.batch_count);
    assert_eq!(api.latest_run_id().await.unwrap(), Some(first.run_id));
}

#[tokio::test]
async fn test_missing_file_is_input_error() {
    let (_db, db_path) = create_test_db();
    let (_config, api) = create_api(&db_path);
    let inputs = today_inputs();

    let err = api
        .run_files(&inputs.dir.path().join("absent.csv"), &inputs.distances, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "INPUT_ERROR");
}

#[tokio::test]
async fn test_stored_config_and_overrides() {
    let (_db, db_path) = create_test_db();
    let (config, api) = create_api(&db_path);
    let inputs = today_inputs();

    config.set_value(config_keys::MAX_DISC, "0.2").unwrap();
    let stored = api
        .run_files(&inputs.inventory, &inputs.distances, None)
        .await
        .unwrap();
    assert!(stored.batches.iter().all(|b| b.discount <= 0.2));

    let mut overrides = EngineConfig::default();
    overrides.pricing.base_discount = 0.0;
    overrides.pricing.max_disc = 0.9;
    let overridden = api
        .run_files(&inputs.inventory, &inputs.distances, Some(overrides))
        .await
        .unwrap();
    assert!(overridden.batches.iter().any(|b| b.discount > 0.2));
    assert!(overridden.batches.iter().all(|b| b.discount <= 0.9));
}

#[tokio::test]
async fn test_invalid_override_rejected_before_run() {
    let (_db, db_path) = create_test_db();
    let (_config, api) = create_api(&db_path);
    let inputs = today_inputs();

    let mut overrides = EngineConfig::default();
    overrides.forecast.holdout_fraction = 1.5;

    let err = api
        .run_files(&inputs.inventory, &inputs.distances, Some(overrides))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "CONFIG_ERROR");
    assert_eq!(api.latest_run_id().await.unwrap(), None);
}

#[tokio::test]
async fn test_concurrent_runs_leave_one_consistent_result() {
    let (_db, db_path) = create_test_db();
    let (_config, api) = create_api(&db_path);
    let inputs = today_inputs();

    let (a, b) = tokio::join!(
        api.run_files(&inputs.inventory, &inputs.distances, None),
        api.run_files(&inputs.inventory, &inputs.distances, None),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let stored = api.list_inventory().await.unwrap();
    assert_eq!(stored.len(), a.batch_count);
    let run_id = &stored[0].run_id;
    assert!(run_id == &a.run_id || run_id == &b.run_id);
    assert!(stored.iter().all(|s| &s.run_id == run_id));
    // 最新运行号必须指向当前存储的结果集
    assert_eq!(api.latest_run_id().await.unwrap().as_ref(), Some(run_id));
}

#[tokio::test]
async fn test_run_tables_from_uploaded_content() {
    let (_db, db_path) = create_test_db();
    let (_config, api) = create_api(&db_path);

    let response = api
        .run_tables(
            parse_csv(&sample_inventory(Local::now().date_naive())),
            parse_csv(&sample_distances()),
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.batch_count, 12);
    assert!(matches!(api.list_runs(0).await, Err(ApiError::InvalidInput(_))));
}
