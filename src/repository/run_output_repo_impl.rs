// ==========================================
// 智能库存调拨系统 - 运行结果 Repository 实现
// ==========================================
// 职责: 实现运行结果的数据访问（使用 rusqlite）
// 红线: 删除旧结果与写入新结果在同一事务内完成
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::batch::Batch;
use crate::domain::run::RunOutput;
use crate::domain::transfer::TransferOrder;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::run_output_repo::{RunLogEntry, RunOutputRepository};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};

// ==========================================
// RunOutputRepositoryImpl
// ==========================================
pub struct RunOutputRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl RunOutputRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建（与 ConfigManager 共享同一连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中写入批次
    fn insert_batches_tx(tx: &Transaction, batches: &[Batch]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO inventory_batch (
                run_id, store_id, product_id, product_name, expiry_date,
                stock, shelf_life_days, avg_daily_sales, unit_price,
                days_to_expiry, remaining_ratio, expected_sales,
                predicted_demand, discount, final_price, surplus
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16
            )
            "#,
        )?;

        for batch in batches {
            stmt.execute(params![
                batch.run_id,
                batch.store_id,
                batch.product_id,
                batch.product_name,
                batch.expiry_date,
                batch.stock,
                batch.shelf_life_days,
                batch.avg_daily_sales,
                batch.unit_price,
                batch.days_to_expiry,
                batch.remaining_ratio,
                batch.expected_sales,
                batch.predicted_demand,
                batch.discount,
                batch.final_price,
                batch.surplus,
            ])?;
        }

        Ok(batches.len())
    }

    /// 在事务中写入调拨单
    fn insert_transfers_tx(tx: &Transaction, orders: &[TransferOrder]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO transfer_order (
                run_id, product_id, expiry_date, from_store, to_store,
                quantity, distance_km, remaining_ratio, days_to_expiry
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )?;

        for order in orders {
            stmt.execute(params![
                order.run_id,
                order.product_id,
                order.expiry_date,
                order.from_store,
                order.to_store,
                order.quantity,
                order.distance_km,
                order.remaining_ratio,
                order.days_to_expiry,
            ])?;
        }

        Ok(orders.len())
    }

    fn map_batch(row: &Row) -> rusqlite::Result<Batch> {
        Ok(Batch {
            run_id: row.get(0)?,
            store_id: row.get(1)?,
            product_id: row.get(2)?,
            product_name: row.get(3)?,
            expiry_date: row.get(4)?,
            stock: row.get(5)?,
            shelf_life_days: row.get(6)?,
            avg_daily_sales: row.get(7)?,
            unit_price: row.get(8)?,
            days_to_expiry: row.get(9)?,
            remaining_ratio: row.get(10)?,
            expected_sales: row.get(11)?,
            predicted_demand: row.get(12)?,
            discount: row.get(13)?,
            final_price: row.get(14)?,
            surplus: row.get(15)?,
        })
    }

    fn map_transfer(row: &Row) -> rusqlite::Result<TransferOrder> {
        Ok(TransferOrder {
            run_id: row.get(0)?,
            product_id: row.get(1)?,
            expiry_date: row.get(2)?,
            from_store: row.get(3)?,
            to_store: row.get(4)?,
            quantity: row.get(5)?,
            distance_km: row.get(6)?,
            remaining_ratio: row.get(7)?,
            days_to_expiry: row.get(8)?,
        })
    }

    fn map_run_log(row: &Row) -> rusqlite::Result<RunLogEntry> {
        Ok(RunLogEntry {
            run_id: row.get(0)?,
            run_at: row.get(1)?,
            batch_count: row.get::<_, i64>(2)? as usize,
            transfer_count: row.get::<_, i64>(3)? as usize,
            forecast_mse: row.get(4)?,
            forecast_fallback: row.get::<_, i64>(5)? != 0,
            units_moved: row.get(6)?,
        })
    }
}

#[async_trait]
impl RunOutputRepository for RunOutputRepositoryImpl {
    #[instrument(skip(self, output), fields(run_id = %output.run_id))]
    async fn replace_run_output(&self, output: &RunOutput) -> RepositoryResult<(usize, usize)> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM transfer_order", [])?;
        tx.execute("DELETE FROM inventory_batch", [])?;

        let batch_count = Self::insert_batches_tx(&tx, &output.batches)?;
        let transfer_count = Self::insert_transfers_tx(&tx, &output.transfers)?;

        tx.execute(
            r#"
            INSERT OR REPLACE INTO run_log (
                run_id, run_at, batch_count, transfer_count,
                forecast_mse, forecast_fallback, units_moved
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                output.run_id,
                output.run_at.to_rfc3339(),
                batch_count as i64,
                transfer_count as i64,
                output.forecast.mse,
                output.forecast.fallback as i64,
                output.plan_summary.units_moved,
            ],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(batch_count, transfer_count, "运行结果已整体替换");
        Ok((batch_count, transfer_count))
    }

    async fn list_batches(&self) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, store_id, product_id, product_name, expiry_date,
                   stock, shelf_life_days, avg_daily_sales, unit_price,
                   days_to_expiry, remaining_ratio, expected_sales,
                   predicted_demand, discount, final_price, surplus
            FROM inventory_batch
            ORDER BY id
            "#,
        )?;

        let batches = stmt
            .query_map([], Self::map_batch)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    async fn list_transfers(&self) -> RepositoryResult<Vec<TransferOrder>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, product_id, expiry_date, from_store, to_store,
                   quantity, distance_km, remaining_ratio, days_to_expiry
            FROM transfer_order
            ORDER BY id
            "#,
        )?;

        let orders = stmt
            .query_map([], Self::map_transfer)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(orders)
    }

    // 按写入顺序取最新一条：最后一次写回的运行即当前结果集
    async fn latest_run_id(&self) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let run_id = conn
            .query_row(
                "SELECT run_id FROM run_log ORDER BY rowid DESC LIMIT 1",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(run_id)
    }

    async fn list_runs(&self, limit: usize) -> RepositoryResult<Vec<RunLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, run_at, batch_count, transfer_count,
                   forecast_mse, forecast_fallback, units_moved
            FROM run_log
            ORDER BY rowid DESC
            LIMIT ?1
            "#,
        )?;

        let runs = stmt
            .query_map(params![limit as i64], Self::map_run_log)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}
