// ==========================================
// 智能库存调拨系统 - 引擎编排器
// ==========================================
// 用途: 协调各引擎的执行顺序
// 流程: 加载 → 特征 → 预测 → 定价 → 过剩量 → 调拨
// 红线: 任一阶段出错整体失败，不产出部分结果
// ==========================================

use crate::config::EngineConfig;
use crate::domain::batch::RawBatchRecord;
use crate::domain::run::RunOutput;
use crate::domain::transfer::RouteTable;
use crate::engine::error::EngineResult;
use crate::engine::feature_builder::FeatureBuilder;
use crate::engine::forecast::DemandForecaster;
use crate::engine::pricing::PricingEngine;
use crate::engine::run_context::RunContext;
use crate::engine::transfer_planner::TransferPlanner;
use crate::importer::DataLoader;
use std::path::Path;
use tracing::{debug, info};

// ==========================================
// PipelineOrchestrator - 引擎编排器
// ==========================================
pub struct PipelineOrchestrator {
    config: EngineConfig,
    loader: DataLoader,
    features: FeatureBuilder,
    forecaster: DemandForecaster,
    pricing: PricingEngine,
    planner: TransferPlanner,
}

impl PipelineOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 已校验的引擎参数
    pub fn new(config: EngineConfig) -> Self {
        Self {
            loader: DataLoader::default(),
            features: FeatureBuilder::new(),
            forecaster: DemandForecaster::new(),
            pricing: PricingEngine::new(config.pricing.clone()),
            planner: TransferPlanner::new(config.transfer.clone()),
            config,
        }
    }

    /// 从文件执行完整流程
    pub fn execute_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        inventory_path: P,
        distance_path: Q,
        ctx: &RunContext,
    ) -> EngineResult<RunOutput> {
        let loaded = self.loader.load(inventory_path, distance_path)?;
        self.execute(loaded.records, &loaded.routes, ctx)
    }

    /// 从已映射的记录执行流程
    ///
    /// # 参数
    /// - records: 库存批次原始记录
    /// - routes: 有向路线表
    /// - ctx: 运行上下文（固定运行时刻与 run_id）
    pub fn execute(
        &self,
        records: Vec<RawBatchRecord>,
        routes: &RouteTable,
        ctx: &RunContext,
    ) -> EngineResult<RunOutput> {
        self.config.validate()?;

        info!(
            run_id = %ctx.run_id,
            run_date = %ctx.run_date,
            batches = records.len(),
            routes = routes.len(),
            "开始执行调拨计算流程"
        );

        // ==========================================
        // 步骤1: Feature Builder - 特征派生
        // ==========================================
        debug!("步骤1: 派生到期特征");
        let mut batches = self.features.build(&records, ctx);

        // ==========================================
        // 步骤2: Demand Forecaster - 需求预测
        // ==========================================
        debug!("步骤2: 需求预测");
        let forecast = self
            .forecaster
            .forecast(&mut batches, &self.config.forecast)?;

        // ==========================================
        // 步骤3: Pricing Engine - 动态折扣
        // ==========================================
        debug!("步骤3: 计算动态折扣");
        self.pricing.apply(&mut batches);

        // ==========================================
        // 步骤4: 过剩量
        // ==========================================
        debug!("步骤4: 计算过剩量");
        TransferPlanner::assign_surplus(&mut batches);

        // ==========================================
        // 步骤5: Transfer Planner - 调拨规划
        // ==========================================
        debug!("步骤5: 调拨规划");
        let plan = self.planner.plan(&batches, routes, &ctx.run_id);

        info!(
            run_id = %ctx.run_id,
            batches = batches.len(),
            transfers = plan.orders.len(),
            forecast_fallback = forecast.fallback,
            "调拨计算流程完成"
        );

        Ok(RunOutput {
            run_id: ctx.run_id.clone(),
            run_at: ctx.run_at,
            batches,
            transfers: plan.orders,
            forecast,
            plan_summary: plan.summary,
        })
    }
}

impl Default for PipelineOrchestrator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
