// ==========================================
// 智能库存调拨系统 - 运行结果 Repository Trait
// ==========================================
// 职责: 定义运行结果的持久化接口（不包含业务逻辑）
// 语义: 每次运行整体替换当前结果集；run_log 保留历史
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::run::RunOutput;
use crate::domain::transfer::TransferOrder;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 运行记录（run_log 表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub run_id: String,
    pub run_at: String, // RFC3339
    pub batch_count: usize,
    pub transfer_count: usize,
    pub forecast_mse: Option<f64>,
    pub forecast_fallback: bool,
    pub units_moved: i64,
}

// ==========================================
// RunOutputRepository Trait
// ==========================================
// 实现者: RunOutputRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait RunOutputRepository: Send + Sync {
    /// 删除全部已存批次与调拨单，写入本次结果（单事务）
    ///
    /// # 返回
    /// - Ok((batches, transfers)): 写入行数
    /// - Err: 数据库错误（整个事务回滚，旧结果保留）
    async fn replace_run_output(&self, output: &RunOutput) -> RepositoryResult<(usize, usize)>;

    /// 查询当前批次结果
    async fn list_batches(&self) -> RepositoryResult<Vec<Batch>>;

    /// 查询当前调拨单
    async fn list_transfers(&self) -> RepositoryResult<Vec<TransferOrder>>;

    /// 最近一次写入的 run_id
    async fn latest_run_id(&self) -> RepositoryResult<Option<String>>;

    /// 运行历史（新 → 旧）
    async fn list_runs(&self, limit: usize) -> RepositoryResult<Vec<RunLogEntry>>;
}
