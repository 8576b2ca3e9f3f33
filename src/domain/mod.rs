// ==========================================
// 智能库存调拨系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod batch;
pub mod run;
pub mod transfer;
pub mod types;

// 重导出核心类型
pub use batch::{Batch, RawBatchRecord, UNKNOWN_PRODUCT_NAME};
pub use run::{ForecastReport, RunOutput, TransferPlanSummary};
pub use transfer::{Route, RouteTable, TransferOrder};
pub use types::{BatchRole, CohortKey, TableKind};
