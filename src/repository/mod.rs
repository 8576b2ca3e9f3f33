// ==========================================
// 智能库存调拨系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod run_output_repo;
pub mod run_output_repo_impl;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use run_output_repo::{RunLogEntry, RunOutputRepository};
pub use run_output_repo_impl::RunOutputRepositoryImpl;
