// ==========================================
// 智能库存调拨系统 - 运行 API
// ==========================================
// 职责: 加载参数 → 执行流程 → 整体替换已存结果 → 只读查询
// 并发: 写回阶段持有 tokio Mutex，同一时刻至多一个写回
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{EngineConfig, EngineConfigReader};
use crate::domain::batch::Batch;
use crate::domain::run::{ForecastReport, RunOutput, TransferPlanSummary};
use crate::domain::transfer::TransferOrder;
use crate::engine::{EngineResult, PipelineOrchestrator, RunContext};
use crate::importer::{DataLoader, ParsedTable};
use crate::repository::{RunLogEntry, RunOutputRepository};

/// 单次运行响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub run_id: String,
    pub run_at: DateTime<Local>,
    pub batch_count: usize,
    pub transfer_count: usize,
    pub forecast: ForecastReport,
    pub plan_summary: TransferPlanSummary,
    pub batches: Vec<Batch>,
    pub transfers: Vec<TransferOrder>,
}

impl From<RunOutput> for RunResponse {
    fn from(output: RunOutput) -> Self {
        Self {
            run_id: output.run_id,
            run_at: output.run_at,
            batch_count: output.batches.len(),
            transfer_count: output.transfers.len(),
            forecast: output.forecast,
            plan_summary: output.plan_summary,
            batches: output.batches,
            transfers: output.transfers,
        }
    }
}

// ==========================================
// RunApi
// ==========================================
pub struct RunApi<C, R>
where
    C: EngineConfigReader,
    R: RunOutputRepository,
{
    config_reader: Arc<C>,
    repo: Arc<R>,
    write_lock: Mutex<()>,
}

impl<C, R> RunApi<C, R>
where
    C: EngineConfigReader,
    R: RunOutputRepository,
{
    pub fn new(config_reader: Arc<C>, repo: Arc<R>) -> Self {
        Self {
            config_reader,
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// 参数解析: 单次覆写优先，否则读取配置存储
    async fn resolve_config(&self, overrides: Option<EngineConfig>) -> ApiResult<EngineConfig> {
        match overrides {
            Some(config) => {
                config.validate()?;
                Ok(config)
            }
            None => Ok(self.config_reader.load_engine_config().await?),
        }
    }

    /// 从文件执行一次完整运行
    ///
    /// # 参数
    /// - inventory_path: 库存表（.csv / .xlsx / .xls）
    /// - distance_path: 门店距离表
    /// - overrides: 单次运行参数（None = 使用配置存储）
    #[instrument(skip(self, inventory_path, distance_path, overrides))]
    pub async fn run_files(
        &self,
        inventory_path: &Path,
        distance_path: &Path,
        overrides: Option<EngineConfig>,
    ) -> ApiResult<RunResponse> {
        let config = self.resolve_config(overrides).await?;
        let inventory: PathBuf = inventory_path.to_path_buf();
        let distance: PathBuf = distance_path.to_path_buf();

        let output = Self::compute(move || {
            PipelineOrchestrator::new(config).execute_files(inventory, distance, &RunContext::now())
        })
        .await?;

        self.persist(output).await
    }

    /// 从已解析的表格执行一次完整运行（上传内容）
    pub async fn run_tables(
        &self,
        inventory: ParsedTable,
        distance: ParsedTable,
        overrides: Option<EngineConfig>,
    ) -> ApiResult<RunResponse> {
        let config = self.resolve_config(overrides).await?;

        let output = Self::compute(move || {
            let loaded = DataLoader::default().load_tables(inventory, distance)?;
            PipelineOrchestrator::new(config).execute(
                loaded.records,
                &loaded.routes,
                &RunContext::now(),
            )
        })
        .await?;

        self.persist(output).await
    }

    /// 计算阶段放入阻塞线程池
    async fn compute<F>(job: F) -> ApiResult<RunOutput>
    where
        F: FnOnce() -> EngineResult<RunOutput> + Send + 'static,
    {
        let result = tokio::task::spawn_blocking(job)
            .await
            .map_err(|e| ApiError::InternalError(format!("计算任务异常退出: {}", e)))?;
        Ok(result?)
    }

    /// 写回（串行化）
    async fn persist(&self, output: RunOutput) -> ApiResult<RunResponse> {
        let _guard = self.write_lock.lock().await;
        let (batch_count, transfer_count) = self.repo.replace_run_output(&output).await?;

        info!(
            run_id = %output.run_id,
            batch_count,
            transfer_count,
            "运行结果已写回"
        );

        Ok(output.into())
    }

    /// 当前批次结果
    pub async fn list_inventory(&self) -> ApiResult<Vec<Batch>> {
        Ok(self.repo.list_batches().await?)
    }

    /// 当前调拨建议
    pub async fn list_transfers(&self) -> ApiResult<Vec<TransferOrder>> {
        Ok(self.repo.list_transfers().await?)
    }

    pub async fn latest_run_id(&self) -> ApiResult<Option<String>> {
        Ok(self.repo.latest_run_id().await?)
    }

    /// 运行历史
    pub async fn list_runs(&self, limit: usize) -> ApiResult<Vec<RunLogEntry>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(self.repo.list_runs(limit).await?)
    }
}
