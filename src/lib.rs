// ==========================================
// 智能库存调拨系统 - 核心库
// ==========================================
// 流程: 加载 → 特征 → 需求预测 → 动态折扣 → 跨店调拨
// 技术栈: Rust + SQLite
// 系统定位: 决策支持（输出建议，不直接下发执行）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 引擎参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Batch, BatchRole, CohortKey, ForecastReport, RawBatchRecord, Route, RouteTable, RunOutput,
    TableKind, TransferOrder, TransferPlanSummary,
};

// 引擎
pub use engine::{
    DemandForecaster, EngineError, FeatureBuilder, PipelineOrchestrator, PricingEngine,
    RunContext, TransferPlanner,
};

// 配置
pub use config::{ConfigManager, EngineConfig};

// API
pub use api::{ApiError, RunApi, RunResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "智能库存调拨系统";
