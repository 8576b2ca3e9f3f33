// ==========================================
// 智能库存调拨系统 - 引擎层
// ==========================================
// 职责: 特征派生、需求预测、动态折扣、调拨规划
// 红线: Engine 不拼 SQL，不读系统时钟
// ==========================================

pub mod error;
pub mod feature_builder;
pub mod forecast;
pub mod orchestrator;
pub mod pricing;
pub mod run_context;
pub mod transfer_planner;

// 重导出核心引擎
pub use error::{EngineError, EngineResult, ForecastError};
pub use feature_builder::{DerivedFeatures, FeatureBuilder};
pub use forecast::{DemandForecaster, DemandModel, RandomForestRegressor, RegressionTree};
pub use orchestrator::PipelineOrchestrator;
pub use pricing::{DiscountBreakdown, PricingEngine};
pub use run_context::RunContext;
pub use transfer_planner::{TransferPlan, TransferPlanner};
