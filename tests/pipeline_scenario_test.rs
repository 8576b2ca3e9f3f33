// ==========================================
// 调拨计算流程集成测试
// ==========================================
// 测试目标: 端到端场景 + 输出不变量
// ==========================================


use std::collections::HashMap;

use smartstock::config::EngineConfig;
use smartstock::domain::{Route, RouteTable, RunOutput, TableKind};
use smartstock::engine::{EngineError, PipelineOrchestrator, RunContext, TransferPlanner};
use smartstock::importer::{DataLoader, ImportError};
use smartstock::logging;
use test_helpers::*;

fn run(inventory: &str, distances: &str, ctx: &RunContext) -> Result<RunOutput, EngineError> {
    let loaded = DataLoader::default().load_tables(parse_csv(inventory), parse_csv(distances))?;
    PipelineOrchestrator::default().execute(loaded.records, &loaded.routes, ctx)
}

fn sample_run(ctx: &RunContext) -> RunOutput {
    run(&sample_inventory(ctx.run_date), &sample_distances(), ctx).unwrap()
}

fn route(from: &str, to: &str, km: f64) -> Route {
    Route {
        from_store: from.to_string(),
        to_store: to.to_string(),
        distance_km: km,
    }
}

// ==========================================
// 场景
// ==========================================

#[test]
fn test_single_row_discount_is_capped() {
    logging::init_test();
    let ctx = fixed_context();
    let inventory = inventory_csv(&[inventory_line(
        "S1",
        "P1",
        100,
        days_from(ctx.run_date, 1),
        10,
        5.0,
        10.0,
    )]);

    let output = run(&inventory, &distance_csv(&[]), &ctx).unwrap();

    assert_eq!(output.batches.len(), 1);
    let b = &output.batches[0];
    assert_eq!(b.days_to_expiry, 1);
    assert!((b.remaining_ratio - 0.1).abs() < 1e-12);
    assert_eq!(b.expected_sales, 5.0);
    assert_eq!(b.predicted_demand, 5.0);
    assert_eq!(b.discount, 0.40);
    assert!((b.final_price - 6.0).abs() < 1e-9);
    assert!(output.forecast.fallback);
    assert_eq!(output.forecast.mse, None);
}

#[test]
fn test_donor_receiver_single_transfer() {
    let expiry = Some(days_from(fixed_context().run_date, 1));
    let batches = vec![
        planned_batch("S1", 100, 20.0, 1, expiry),
        planned_batch("S2", 5, 50.0, 1, expiry),
    ];
    let routes = RouteTable::from_routes(vec![route("S1", "S2", 12.0)]);

    let plan = TransferPlanner::default().plan(&batches, &routes, "test_run");

    assert_eq!(plan.orders.len(), 1);
    let order = &plan.orders[0];
    assert_eq!(order.quantity, 45);
    assert_eq!(order.distance_km, 12.0);
    assert_eq!(order.product_id, "P1");
    assert_eq!(order.expiry_date, expiry);
    // 调出方剩余 35，仍可服务同组其他调入方
    assert_eq!(batches[0].surplus - order.quantity as f64, 35.0);
}

#[test]
fn test_missing_route_yields_no_orders() {
    let expiry = Some(days_from(fixed_context().run_date, 1));
    let batches = vec![
        planned_batch("S1", 100, 20.0, 1, expiry),
        planned_batch("S2", 5, 50.0, 1, expiry),
    ];
    // 只有反向路线
    let routes = RouteTable::from_routes(vec![route("S2", "S1", 12.0)]);

    let plan = TransferPlanner::default().plan(&batches, &routes, "test_run");

    assert!(plan.orders.is_empty());
    assert_eq!(plan.summary.route_gaps, 1);
}

#[test]
fn test_missing_shelf_life_column_is_schema_error() {
    let inventory = "store_id,product_id,stock,expiry_date,avg_daily_sales,unit_price\n\
                     S1,P1,100,2026-03-02,5,10\n";

    let err = run(inventory, &distance_csv(&[]), &fixed_context()).unwrap_err();

    match err {
        EngineError::Import(ImportError::SchemaError { table, missing }) => {
            assert_eq!(table, TableKind::Inventory);
            assert_eq!(missing, vec!["shelf_life_days".to_string()]);
        }
        other => panic!("expected SchemaError, got {:?}", other),
    }
}

#[test]
fn test_unparsable_expiry_row_is_kept_with_zero_days() {
    let ctx = fixed_context();
    let inventory = inventory_csv(&[
        "S1,P1,Milk,10,not-a-date,10,2,4".to_string(),
        inventory_line("S2", "P1", 10, days_from(ctx.run_date, 4), 10, 2.0, 4.0),
    ]);

    let output = run(&inventory, &distance_csv(&[]), &ctx).unwrap();

    assert_eq!(output.batches.len(), 2);
    assert_eq!(output.batches[0].expiry_date, None);
    assert_eq!(output.batches[0].days_to_expiry, 0);
    assert_eq!(output.batches[0].expected_sales, 0.0);
    assert_eq!(output.plan_summary.unknown_expiry_batches, 1);
}

#[test]
fn test_non_numeric_stock_aborts_run() {
    let inventory = inventory_csv(&["S1,P1,Milk,lots,2026-03-02,10,2,4".to_string()]);

    let err = run(&inventory, &distance_csv(&[]), &fixed_context()).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Import(ImportError::DataError { row: 1, ref field, .. }) if field == "stock"
    ));
}

#[test]
fn test_legacy_price_column_is_accepted() {
    let ctx = fixed_context();
    let inventory = format!(
        "store_id,product_id,stock,expiry_date,shelf_life_days,avg_daily_sales,price\n\
         S1,P1,100,{},10,5,10\n",
        days_from(ctx.run_date, 1)
    );

    let output = run(&inventory, &distance_csv(&[]), &ctx).unwrap();

    assert_eq!(output.batches[0].unit_price, 10.0);
    assert_eq!(output.batches[0].product_name, "Unknown");
}

// ==========================================
// 不变量
// ==========================================

#[test]
fn test_pricing_bounds_hold_for_all_rows() {
    let output = sample_run(&fixed_context());
    let config = EngineConfig::default();

    assert!(!output.batches.is_empty());
    for b in &output.batches {
        assert!(b.discount >= config.pricing.base_discount);
        assert!(b.discount <= config.pricing.max_disc);
        assert!(b.final_price >= 0.0);
        assert!(b.days_to_expiry >= 0);
        assert!(b.predicted_demand >= 0.0);
        assert_eq!(b.surplus, b.stock as f64 - b.predicted_demand);
    }
    assert!(!output.forecast.fallback);
    assert!(output.forecast.mse.is_some());
}

#[test]
fn test_transfers_stay_within_cohort_and_routes() {
    let ctx = fixed_context();
    let output = sample_run(&ctx);
    let loaded = DataLoader::default()
        .load_tables(parse_csv(&sample_inventory(ctx.run_date)), parse_csv(&sample_distances()))
        .unwrap();

    let by_store: HashMap<(String, String, Option<chrono::NaiveDate>), _> = output
        .batches
        .iter()
        .map(|b| ((b.store_id.clone(), b.product_id.clone(), b.expiry_date), b))
        .collect();

    for order in &output.transfers {
        assert!(order.quantity > 0);
        assert!(loaded.routes.contains(&order.from_store, &order.to_store));

        let donor = by_store[&(order.from_store.clone(), order.product_id.clone(), order.expiry_date)];
        let receiver = by_store[&(order.to_store.clone(), order.product_id.clone(), order.expiry_date)];
        assert_eq!(donor.product_id, receiver.product_id);
        assert_eq!(donor.expiry_date, receiver.expiry_date);
        assert!(donor.surplus > 0.0);
        assert!(receiver.surplus < 0.0);
        assert_eq!(order.distance_km, loaded.routes.distance(&order.from_store, &order.to_store).unwrap());
    }
}

#[test]
fn test_donor_and_receiver_totals_never_exceed_balance() {
    let output = sample_run(&fixed_context());

    let mut shipped: HashMap<(String, String, Option<chrono::NaiveDate>), i64> = HashMap::new();
    let mut received: HashMap<(String, String, Option<chrono::NaiveDate>), i64> = HashMap::new();
    for order in &output.transfers {
        *shipped
            .entry((order.from_store.clone(), order.product_id.clone(), order.expiry_date))
            .or_default() += order.quantity;
        *received
            .entry((order.to_store.clone(), order.product_id.clone(), order.expiry_date))
            .or_default() += order.quantity;
    }

    for b in &output.batches {
        let key = (b.store_id.clone(), b.product_id.clone(), b.expiry_date);
        if let Some(&qty) = shipped.get(&key) {
            assert!(qty as f64 <= b.surplus);
        }
        if let Some(&qty) = received.get(&key) {
            assert!(qty as f64 <= -b.surplus);
        }
    }

    let total: i64 = output.transfers.iter().map(|o| o.quantity).sum();
    assert_eq!(total, output.plan_summary.units_moved);
}

#[test]
fn test_identical_inputs_are_deterministic_except_run_id() {
    let first = sample_run(&context_at_millis(0));
    let second = sample_run(&context_at_millis(1));

    assert_ne!(first.run_id, second.run_id);

    let strip = |output: &RunOutput| {
        let batches: Vec<_> = output
            .batches
            .iter()
            .cloned()
            .map(|mut b| {
                b.run_id.clear();
                b
            })
            .collect();
        let transfers: Vec<_> = output
            .transfers
            .iter()
            .cloned()
            .map(|mut o| {
                o.run_id.clear();
                o
            })
            .collect();
        (
            serde_json::to_string(&batches).unwrap(),
            serde_json::to_string(&transfers).unwrap(),
        )
    };

    assert_eq!(strip(&first), strip(&second));
    assert_eq!(first.forecast, second.forecast);
}

#[test]
fn test_all_rows_share_run_id() {
    let ctx = fixed_context();
    let output = sample_run(&ctx);

    assert!(output.batches.iter().all(|b| b.run_id == ctx.run_id));
    assert!(output.transfers.iter().all(|o| o.run_id == ctx.run_id));
}
