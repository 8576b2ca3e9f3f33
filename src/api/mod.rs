// ==========================================
// 智能库存调拨系统 - API 层
// ==========================================
// 职责: 提供运行与查询接口，供二进制入口或外部服务调用
// ==========================================

pub mod error;
pub mod run_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use run_api::{RunApi, RunResponse};
